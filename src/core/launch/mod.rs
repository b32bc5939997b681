//! Program launch.
//!
//! Two strategies sit behind the [`Launcher`] trait:
//!
//! - [`Replace`] execs the program in place of this process (Unix). The
//!   program keeps our PID, signals and process group, and its exit status
//!   goes straight to whoever started us.
//! - [`Spawn`] runs the program as a child with inherited stdio, waits, and
//!   exits with the child's code. Used where exec isn't available.
//!
//! The strategy is picked once, before anything runs.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::core::compose::ChildEnvironment;
use crate::error::{LaunchError, Result};

#[cfg(unix)]
mod replace;
mod spawn;

#[cfg(unix)]
pub use replace::Replace;
pub use spawn::{exit_code, Spawn};

/// How the target program is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Replace the current process image.
    Replace,
    /// Run a child process and mirror its exit code.
    Spawn,
}

impl LaunchMode {
    /// Best mode this platform supports.
    pub fn detect() -> Self {
        if Self::Replace.is_supported() {
            Self::Replace
        } else {
            Self::Spawn
        }
    }

    pub fn is_supported(self) -> bool {
        match self {
            Self::Replace => cfg!(unix),
            Self::Spawn => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "exec",
            Self::Spawn => "spawn",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exec" | "replace" => Ok(Self::Replace),
            "spawn" => Ok(Self::Spawn),
            _ => Err("expected 'exec' or 'spawn'".to_string()),
        }
    }
}

/// Everything needed to start the target program.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Program name as given; looked up on `PATH` unless it contains a separator.
    pub program: String,
    pub args: Vec<String>,
    pub environment: ChildEnvironment,
}

/// A way of starting the target program.
///
/// `launch` only returns on failure: on success this process either has
/// become the program or has exited with its status.
pub trait Launcher {
    fn mode(&self) -> LaunchMode;

    /// # Errors
    ///
    /// Returns `LaunchError` if the program can't be found or started.
    fn launch(&self, spec: LaunchSpec) -> Result<Infallible>;
}

/// Resolve the launch mode, falling back to spawn when the requested mode
/// isn't available here.
pub fn select(requested: Option<LaunchMode>) -> LaunchMode {
    match requested {
        Some(mode) if mode.is_supported() => mode,
        Some(mode) => {
            warn!("launch mode '{}' is not supported on this platform, using spawn", mode);
            LaunchMode::Spawn
        }
        None => LaunchMode::detect(),
    }
}

/// Launcher for a mode.
pub fn launcher(mode: LaunchMode) -> Box<dyn Launcher> {
    debug!(mode = %mode, "selected launcher");
    match mode {
        #[cfg(unix)]
        LaunchMode::Replace => Box::new(Replace),
        _ => Box::new(Spawn),
    }
}

/// Find the executable for `program` on the current `PATH`.
///
/// # Errors
///
/// Returns `LaunchError::ExecutableNotFound` if nothing matches.
pub fn locate(program: &str) -> Result<PathBuf> {
    let path = which::which(program).map_err(|_| LaunchError::ExecutableNotFound {
        program: program.to_string(),
    })?;
    debug!(program, path = %path.display(), "located executable");
    Ok(path)
}
