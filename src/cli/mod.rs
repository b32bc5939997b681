//! Command-line interface.

pub mod completions;
pub mod output;
pub mod plan;
pub mod run;

use clap::{Parser, Subcommand};

/// vaultrun - resolve Vault secret references in the environment, then run a program.
#[derive(Parser)]
#[command(
    name = "vaultrun",
    about = "Resolve Vault secret references in the environment, then run a program",
    version,
    after_help = "References: NAME=$v:path#field (relative to the default path) or NAME=$v!:path#field (absolute)"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Prefix for relative references (overrides VAULTRUN_DEFAULT_PATH)
    #[arg(long, global = true, value_name = "PREFIX")]
    pub default_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve secret references and run a program with them
    Run {
        /// Spawn the program as a child instead of replacing this process
        #[arg(long)]
        spawn: bool,

        /// Program and arguments to run
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "PROGRAM"
        )]
        command: Vec<String>,
    },

    /// Show which secrets would be read, without contacting Vault
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> crate::error::Result<()> {
    use Command::*;

    let default_path = cli.default_path.as_deref();
    match cli.command {
        Run { spawn, command } => run::execute(&command, spawn, default_path),
        Plan { json } => plan::execute(json, default_path),
        Completions { shell } => completions::execute(shell),
    }
}
