//! The resolution pipeline.
//!
//! [`Plan::scan`] is pure: it classifies every environment entry, groups the
//! references and records warnings without printing anything.
//! [`Plan::resolve`] does the I/O and produces the child environment.

use std::ffi::OsString;

use tracing::debug;

use crate::core::compose::ChildEnvironment;
use crate::core::constants::{is_connection_var, DEFAULT_PATH, DEFAULT_PATH_VAR};
use crate::core::fetch;
use crate::core::group::SecretGroups;
use crate::core::reference::{classify, Classification, MalformedReference, SecretReference};
use crate::core::store::SecretStore;
use crate::error::Result;

/// Outcome of scanning an environment.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Entries forwarded unchanged, in original order.
    pub passthrough: Vec<(OsString, OsString)>,
    /// References grouped by resolved path.
    pub groups: SecretGroups,
    /// Reference-shaped values that failed to parse; also in `passthrough`.
    pub malformed: Vec<MalformedReference>,
    /// Names of variables kept away from the child.
    pub dropped: Vec<String>,
    /// Prefix applied to relative references.
    pub default_path: String,
}

impl Plan {
    /// Classify `vars` and group the references they contain.
    ///
    /// `prefix_override` beats the last `VAULTRUN_DEFAULT_PATH` entry, which
    /// beats the built-in `secret`. Empty values count as unset.
    pub fn scan<I, K, V>(vars: I, prefix_override: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut passthrough = Vec::new();
        let mut references: Vec<SecretReference> = Vec::new();
        let mut malformed = Vec::new();
        let mut dropped = Vec::new();
        let mut directive: Option<String> = None;

        for (name, value) in vars {
            let name: OsString = name.into();
            let value: OsString = value.into();

            let classification = match (name.to_str(), value.to_str()) {
                (Some(n), Some(v)) => classify(n, v),
                _ => {
                    let lossy = name.to_string_lossy();
                    if lossy == DEFAULT_PATH_VAR || is_connection_var(&lossy) {
                        Classification::Connection
                    } else {
                        Classification::Passthrough
                    }
                }
            };

            match classification {
                Classification::DefaultPath(path) => {
                    directive = Some(path);
                    dropped.push(name.to_string_lossy().into_owned());
                }
                Classification::Connection => {
                    dropped.push(name.to_string_lossy().into_owned());
                }
                Classification::Reference(reference) => references.push(reference),
                Classification::Malformed(bad) => {
                    malformed.push(bad);
                    passthrough.push((name, value));
                }
                Classification::Passthrough => passthrough.push((name, value)),
            }
        }

        let default_path = prefix_override
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or(directive.filter(|p| !p.is_empty()))
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let groups = SecretGroups::from_references(&references, &default_path);

        debug!(
            passthrough = passthrough.len(),
            references = references.len(),
            paths = groups.len(),
            malformed = malformed.len(),
            dropped = dropped.len(),
            default_path = %default_path,
            "environment scanned"
        );

        Self {
            passthrough,
            groups,
            malformed,
            dropped,
            default_path,
        }
    }

    /// Whether any secret has to be read.
    pub fn needs_store(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Fetch all secrets and build the child environment.
    ///
    /// `connect` is only called when there is something to read, so a run
    /// without references never touches the store.
    ///
    /// # Errors
    ///
    /// Returns the connection error, or the first read or field error.
    pub fn resolve<S, F>(self, connect: F) -> Result<ChildEnvironment>
    where
        S: SecretStore,
        F: FnOnce() -> Result<S>,
    {
        let resolved = if self.needs_store() {
            let store = connect()?;
            fetch::fetch_all(&store, &self.groups)?
        } else {
            Vec::new()
        };
        Ok(ChildEnvironment::compose(self.passthrough, resolved))
    }
}
