//! Test support utilities for vaultrun integration tests.
//!
//! Provides an isolated environment for the binary and a Vault double.

#![allow(dead_code)]

pub mod assertions;
pub mod vault;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use vault::MockVault;

use tempfile::TempDir;

/// Test environment with an isolated home directory.
///
/// Each command starts from an empty environment plus PATH, HOME and the
/// variables the test adds, so nothing from the developer's shell (a real
/// VAULT_TOKEN, say) leaks into a run.
pub struct Test {
    /// Temporary home directory
    pub home: TempDir,
    /// Variables set on every command
    pub env: Vec<(String, String)>,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        Self {
            home,
            env: Vec::new(),
        }
    }

    /// Create a test environment pointed at a Vault double with a root token.
    pub fn with_vault(vault: &MockVault) -> Self {
        Self::new()
            .var("VAULT_ADDR", &vault.uri())
            .var("VAULT_TOKEN", ROOT_TOKEN)
    }

    /// Add a variable to every command.
    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.env.push((name.to_string(), value.to_string()));
        self
    }
}
