//! Spawn-and-wait launch.
//!
//! The child shares our stdin, stdout and stderr directly. When it exits we
//! exit with the same code; if it died without one (killed by a signal) we
//! exit with 1.

use std::convert::Infallible;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use super::{locate, LaunchMode, LaunchSpec, Launcher};
use crate::error::{LaunchError, Result};

/// Runs the program as a child process and mirrors its exit code.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spawn;

impl Spawn {
    /// Run the program to completion and return its status.
    ///
    /// The child gets exactly the composed environment. Duplicate names
    /// collapse with the last entry winning. The environment is wiped as
    /// soon as the child has started.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError` if the program can't be found, started or
    /// waited on.
    pub fn run(&self, spec: LaunchSpec) -> Result<ExitStatus> {
        let LaunchSpec {
            program,
            args,
            mut environment,
        } = spec;
        let path = locate(&program)?;

        // Installed before spawning so an early signal is held, not fatal
        #[cfg(unix)]
        let relay = relay::install();

        let spawned = {
            let mut cmd = Command::new(&path);
            cmd.args(&args)
                .env_clear()
                .envs(environment.iter())
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());

            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                cmd.arg0(&program);
            }

            cmd.spawn()
        };
        environment.wipe();

        let mut child = spawned.map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;
        debug!(pid = child.id(), program = %program, "spawned child");

        #[cfg(unix)]
        relay.attach(child.id());

        let status = child.wait().map_err(|source| LaunchError::Wait {
            program: program.clone(),
            source,
        })?;
        debug!(status = %status, "child exited");
        Ok(status)
    }
}

impl Launcher for Spawn {
    fn mode(&self) -> LaunchMode {
        LaunchMode::Spawn
    }

    fn launch(&self, spec: LaunchSpec) -> Result<Infallible> {
        let status = self.run(spec)?;
        std::process::exit(exit_code(&status));
    }
}

/// Exit code to report for a finished child.
pub fn exit_code(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Forwards termination signals to the running child.
///
/// The child stays in our process group so it keeps the terminal. Signals
/// the kernel sent to the whole foreground group (Ctrl-C, hangup) already
/// reached it and are not sent again. A signal that arrives before the child
/// exists is held and delivered once it does.
#[cfg(unix)]
mod relay {
    use std::sync::atomic::{AtomicI32, Ordering};

    use nix::libc::{c_int, c_void, siginfo_t};
    use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use nix::unistd::Pid;
    use tracing::debug;

    const FORWARDED: [Signal; 4] = [
        Signal::SIGINT,
        Signal::SIGTERM,
        Signal::SIGHUP,
        Signal::SIGQUIT,
    ];

    static CHILD_PID: AtomicI32 = AtomicI32::new(0);
    static PENDING: AtomicI32 = AtomicI32::new(0);

    fn send(pid: i32, signum: c_int) {
        if let Ok(sig) = Signal::try_from(signum) {
            let _ = signal::kill(Pid::from_raw(pid), sig);
        }
    }

    /// Deliver a held signal, if any. The swap makes sure only one caller
    /// sends it.
    fn flush(pid: i32) {
        let pending = PENDING.swap(0, Ordering::SeqCst);
        if pending != 0 {
            send(pid, pending);
        }
    }

    /// Whether the kernel generated this delivery for the whole process
    /// group, as the terminal driver does.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn from_terminal(info: *const siginfo_t) -> bool {
        // SAFETY: the kernel passes a valid siginfo_t to SA_SIGINFO handlers.
        !info.is_null() && unsafe { (*info).si_code } == nix::libc::SI_KERNEL
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn from_terminal(_info: *const siginfo_t) -> bool {
        false
    }

    extern "C" fn forward(signum: c_int, info: *mut siginfo_t, _context: *mut c_void) {
        if from_terminal(info) {
            return;
        }
        let pid = CHILD_PID.load(Ordering::SeqCst);
        if pid > 0 {
            send(pid, signum);
            return;
        }
        PENDING.store(signum, Ordering::SeqCst);
        // The child may have been attached while we were storing
        let pid = CHILD_PID.load(Ordering::SeqCst);
        if pid > 0 {
            flush(pid);
        }
    }

    /// Restores the previous handlers when dropped.
    pub struct Guard {
        previous: Vec<(Signal, SigAction)>,
    }

    pub fn install() -> Guard {
        CHILD_PID.store(0, Ordering::SeqCst);
        PENDING.store(0, Ordering::SeqCst);

        let action = SigAction::new(
            SigHandler::SigAction(forward),
            SaFlags::SA_RESTART | SaFlags::SA_SIGINFO,
            SigSet::empty(),
        );
        let mut previous = Vec::with_capacity(FORWARDED.len());
        for sig in FORWARDED {
            // SAFETY: the handler only touches atomics and calls kill(2),
            // all async-signal-safe.
            match unsafe { signal::sigaction(sig, &action) } {
                Ok(old) => previous.push((sig, old)),
                Err(err) => debug!(signal = %sig, error = %err, "signal relay not installed"),
            }
        }
        Guard { previous }
    }

    /// Signal held for a child that doesn't exist yet.
    #[cfg(test)]
    pub fn pending() -> i32 {
        PENDING.load(Ordering::SeqCst)
    }

    impl Guard {
        /// Start forwarding to `pid`, delivering anything held so far.
        pub fn attach(&self, pid: u32) {
            let pid = pid as i32;
            CHILD_PID.store(pid, Ordering::SeqCst);
            flush(pid);
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            CHILD_PID.store(0, Ordering::SeqCst);
            PENDING.store(0, Ordering::SeqCst);
            for (sig, old) in self.previous.drain(..) {
                // SAFETY: reinstates the disposition that was active before.
                let _ = unsafe { signal::sigaction(sig, &old) };
            }
        }
    }
}
