//! In-process secret store.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{SecretPayload, SecretStore};
use crate::error::{Result, StoreError};

/// Secrets held in memory, with a log of every read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: HashMap<String, Vec<(String, String)>>,
    denied: HashSet<String>,
    reads: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret with the given fields, replacing any existing one.
    pub fn with_secret(mut self, path: &str, fields: &[(&str, &str)]) -> Self {
        self.insert(path, fields);
        self
    }

    /// Make reads of `path` fail with permission denied.
    pub fn with_denied(mut self, path: &str) -> Self {
        self.denied.insert(path.to_string());
        self
    }

    pub fn insert(&mut self, path: &str, fields: &[(&str, &str)]) {
        self.secrets.insert(
            path.to_string(),
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }

    /// Paths read so far, in call order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn read_count(&self) -> usize {
        self.reads().len()
    }
}

impl SecretStore for MemoryStore {
    fn read(&self, path: &str) -> Result<SecretPayload> {
        if let Ok(mut reads) = self.reads.lock() {
            reads.push(path.to_string());
        }
        if self.denied.contains(path) {
            return Err(StoreError::PermissionDenied {
                path: path.to_string(),
            }
            .into());
        }
        let fields = self.secrets.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        Ok(fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect())
    }
}
