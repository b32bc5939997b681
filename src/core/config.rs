//! Run settings.
//!
//! Everything comes from the environment (Vault's own `VAULT_*` variables
//! plus the `VAULTRUN_*` ones) and can be narrowed by command-line flags.
//! The default path directive is not read here: it is an ordinary
//! environment entry handled by the scan.

use tracing::debug;

use crate::core::constants::LAUNCH_MODE_VAR;
use crate::core::launch::LaunchMode;
use crate::core::store::{KubeAuth, VaultConfig};
use crate::error::{ConfigError, Result};

/// Settings for one run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub vault: VaultConfig,
    pub kube: Option<KubeAuth>,
    /// Requested launch mode; `None` lets the platform decide.
    pub launch_mode: Option<LaunchMode>,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid or incomplete settings.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::from_lookup(&|name| std::env::var(name).ok())?;
        settings.vault = settings.vault.with_token_helper(dirs::home_dir());
        debug!(addr = %settings.vault.addr, kube = settings.kube.is_some(), "settings loaded");
        Ok(settings)
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid or incomplete settings.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let launch_mode = match lookup(LAUNCH_MODE_VAR).filter(|v| !v.is_empty()) {
            Some(raw) => Some(raw.parse::<LaunchMode>().map_err(|reason| {
                ConfigError::InvalidValue {
                    name: LAUNCH_MODE_VAR.to_string(),
                    value: raw.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(Self {
            vault: VaultConfig::from_lookup(lookup)?,
            kube: KubeAuth::from_lookup(lookup)?,
            launch_mode,
        })
    }
}
