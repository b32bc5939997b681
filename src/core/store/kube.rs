//! Kubernetes service account login.
//!
//! Exchanges the pod's service account token for a Vault token through the
//! Kubernetes auth method.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;

use super::VaultClient;
use crate::core::constants::{KUBE_PATH_VAR, KUBE_ROLE_VAR, KUBE_TOKEN_FILE, KUBE_TOKEN_FILE_VAR};
use crate::error::{AuthError, ConfigError, Result};

/// Settings for the Kubernetes auth exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeAuth {
    pub role: String,
    /// Vault login path, e.g. `auth/kubernetes/login`.
    pub path: String,
    pub token_file: PathBuf,
}

impl KubeAuth {
    /// Read the `VAULTRUN_KUBE_*` settings through `lookup`.
    ///
    /// Returns `Ok(None)` when neither role nor path is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::KubeAuthIncomplete` when only one of them is set.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        match (get(KUBE_ROLE_VAR), get(KUBE_PATH_VAR)) {
            (None, None) => Ok(None),
            (Some(role), Some(path)) => Ok(Some(Self {
                role,
                path,
                token_file: get(KUBE_TOKEN_FILE_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(KUBE_TOKEN_FILE)),
            })),
            _ => Err(ConfigError::KubeAuthIncomplete.into()),
        }
    }

    /// Load and decode the service account token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the file can't be read or isn't valid base64.
    pub fn load_jwt(&self) -> Result<String> {
        decode_token_file(&self.token_file)
    }

    /// Log in to Vault and return the client token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token can't be loaded or Vault rejects it.
    pub fn login(&self, client: &VaultClient) -> Result<String> {
        let jwt = self.load_jwt()?;
        let body = json!({ "role": self.role, "jwt": jwt });
        let response = client.write(&self.path, &body).map_err(AuthError::Login)?;

        let token = response
            .get("auth")
            .and_then(|auth| auth.get("client_token"))
            .and_then(|token| token.as_str())
            .ok_or_else(|| AuthError::Login("response missing auth.client_token".to_string()))?;
        Ok(token.to_string())
    }
}

fn decode_token_file(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path).map_err(|source| AuthError::TokenFile {
        path: path.display().to_string(),
        source,
    })?;
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|err| AuthError::InvalidToken {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    let jwt = String::from_utf8(bytes).map_err(|err| AuthError::InvalidToken {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(jwt)
}
