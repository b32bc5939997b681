//! Process image replacement via `execve(2)`.

use std::convert::Infallible;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

use nix::unistd::execve;
use tracing::debug;

use super::{locate, LaunchMode, LaunchSpec, Launcher};
use crate::core::compose::ChildEnvironment;
use crate::error::{Error, LaunchError, Result};

/// Execs the program in place of the current process.
///
/// The environment list is passed to the kernel exactly as composed, so
/// duplicate names reach the program in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Replace;

impl Launcher for Replace {
    fn mode(&self) -> LaunchMode {
        LaunchMode::Replace
    }

    fn launch(&self, spec: LaunchSpec) -> Result<Infallible> {
        let path = locate(&spec.program)?;
        let path_c = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| LaunchError::InvalidArgument(path.display().to_string()))?;
        let argv = argv(&spec)?;
        let envp = envp(&spec.environment)?;

        debug!(
            path = %path.display(),
            args = spec.args.len(),
            vars = envp.len(),
            "replacing process image"
        );

        match execve(&path_c, &argv, &envp) {
            Ok(never) => match never {},
            Err(errno) => Err(LaunchError::Exec {
                program: spec.program,
                reason: errno.desc().to_string(),
            }
            .into()),
        }
    }
}

/// `argv[0]` is the program name as the user wrote it.
fn argv(spec: &LaunchSpec) -> Result<Vec<CString>> {
    std::iter::once(&spec.program)
        .chain(spec.args.iter())
        .map(|arg| {
            CString::new(arg.as_bytes())
                .map_err(|_| Error::from(LaunchError::InvalidArgument(arg.clone())))
        })
        .collect()
}

fn envp(environment: &ChildEnvironment) -> Result<Vec<CString>> {
    environment
        .iter()
        .map(|(name, value)| {
            let mut entry = Vec::with_capacity(name.len() + value.len() + 1);
            entry.extend_from_slice(name.as_bytes());
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            CString::new(entry).map_err(|_| {
                Error::from(LaunchError::InvalidEnvironment {
                    name: name.to_string_lossy().into_owned(),
                })
            })
        })
        .collect()
}
