//! Secret store access.
//!
//! The pipeline only needs one operation from a store: read every field of
//! the secret at a path. [`VaultClient`] implements it over the Vault HTTP
//! API; [`MemoryStore`] keeps secrets in process for tests.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file next to `vault.rs`
//! 3. Re-export from this module

use std::collections::HashMap;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::Settings;
use crate::error::Result;

mod kube;
mod memory;
mod vault;

pub use kube::KubeAuth;
pub use memory::MemoryStore;
pub use vault::{VaultClient, VaultConfig};

/// Key-value secret storage, read by path.
///
/// Implementations must be shareable across threads: reads for distinct
/// paths may run concurrently.
pub trait SecretStore: Sync {
    /// Read all fields of the secret at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` naming the path when the secret is missing,
    /// access is denied, or the store can't be reached.
    fn read(&self, path: &str) -> Result<SecretPayload>;
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn read(&self, path: &str) -> Result<SecretPayload> {
        (**self).read(path)
    }
}

/// Field values returned by one secret read.
///
/// Values are wiped from memory when the payload is dropped.
#[derive(Default)]
pub struct SecretPayload {
    fields: HashMap<String, Zeroizing<String>>,
}

impl SecretPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(field.into(), Zeroizing::new(value.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|value| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.fields.keys().collect();
        fields.sort();
        f.debug_struct("SecretPayload")
            .field("fields", &fields)
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SecretPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (field, value) in iter {
            payload.insert(field, value);
        }
        payload
    }
}

/// Build a Vault client from settings, logging in first when Kubernetes
/// auth is configured.
///
/// # Errors
///
/// Returns `ConfigError` if the HTTP client can't be built, or `AuthError`
/// if the identity exchange fails.
pub fn connect(settings: &Settings) -> Result<VaultClient> {
    let mut client = VaultClient::new(settings.vault.clone())?;
    if let Some(kube) = &settings.kube {
        debug!(role = %kube.role, path = %kube.path, "exchanging service account token");
        let token = kube.login(&client)?;
        client.set_token(token);
    }
    Ok(client)
}
