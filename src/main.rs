//! vaultrun - resolve Vault secret references, then exec the program.

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vaultrun::cli::output;
use vaultrun::cli::{execute, Cli};
use vaultrun::core::constants::{LOG_FORMAT_VAR, LOG_VAR};
use vaultrun::error::{ConfigError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("vaultrun=debug")
        } else {
            EnvFilter::new("vaultrun=warn")
        }
    });

    // Logs go to stderr; stdout belongs to the launched program
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Store(StoreError::Unreachable { .. }) => Some("check VAULT_ADDR"),
            Error::Store(StoreError::PermissionDenied { .. }) => {
                Some("check VAULT_TOKEN or the VAULTRUN_KUBE_* login settings")
            }
            Error::Config(ConfigError::KubeAuthIncomplete) => {
                Some("set both variables, or neither to skip Kubernetes login")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
