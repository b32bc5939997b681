//! Run command.
//!
//! Scans the environment, resolves every secret reference against Vault and
//! launches the program with the result.

use tracing::{debug, warn};

use crate::core::config::Settings;
use crate::core::launch::{self, LaunchMode, LaunchSpec};
use crate::core::plan::Plan;
use crate::core::store;
use crate::error::{LaunchError, Result};

/// Resolve secrets and launch `command`.
///
/// Does not return on success.
pub fn execute(command: &[String], spawn: bool, default_path: Option<&str>) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(LaunchError::NoProgram.into());
    };

    let settings = Settings::from_env()?;
    let mode = launch::select(if spawn {
        Some(LaunchMode::Spawn)
    } else {
        settings.launch_mode
    });

    let plan = Plan::scan(std::env::vars_os(), default_path);
    report(&plan);

    let environment = plan.resolve(|| store::connect(&settings))?;
    debug!(vars = environment.len(), "child environment ready");

    let spec = LaunchSpec {
        program: program.clone(),
        args: args.to_vec(),
        environment,
    };
    match launch::launcher(mode).launch(spec)? {}
}

/// Emit the warnings collected during the scan.
fn report(plan: &Plan) {
    for bad in &plan.malformed {
        warn!(
            "environment variable '{}' looks like a vault reference but is improperly formatted",
            bad.env_name
        );
    }
}
