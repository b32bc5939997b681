//! Secret fetching.
//!
//! One read per distinct path. Reads run concurrently when there is more
//! than one path; the result is only used once every read has succeeded.

use std::thread;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::group::{SecretGroup, SecretGroups};
use crate::core::store::{SecretPayload, SecretStore};
use crate::error::{Error, Result};

/// A variable with its secret value filled in.
pub struct ResolvedEntry {
    pub name: String,
    pub value: Zeroizing<String>,
}

impl std::fmt::Debug for ResolvedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Read every group's secret and resolve all targets.
///
/// Entries come back in group order, then target order within a group.
///
/// # Errors
///
/// Returns the first failure in group order: a `StoreError` for a failed
/// read, or `Error::FieldNotFound` for a field missing from a payload.
pub fn fetch_all(store: &dyn SecretStore, groups: &SecretGroups) -> Result<Vec<ResolvedEntry>> {
    let payloads = read_all(store, groups);

    let mut resolved = Vec::with_capacity(groups.target_count());
    for (group, payload) in groups.iter().zip(payloads) {
        let payload = payload?;
        resolve_group(group, &payload, &mut resolved)?;
    }

    debug!(
        paths = groups.len(),
        variables = resolved.len(),
        "secrets resolved"
    );
    Ok(resolved)
}

fn read_all(store: &dyn SecretStore, groups: &SecretGroups) -> Vec<Result<SecretPayload>> {
    if groups.len() <= 1 {
        return groups.iter().map(|group| store.read(&group.path)).collect();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = groups
            .iter()
            .map(|group| scope.spawn(move || store.read(&group.path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

fn resolve_group(
    group: &SecretGroup,
    payload: &SecretPayload,
    resolved: &mut Vec<ResolvedEntry>,
) -> Result<()> {
    for target in &group.targets {
        let value = payload
            .get(&target.field)
            .ok_or_else(|| Error::FieldNotFound {
                path: group.path.clone(),
                field: target.field.clone(),
            })?;
        resolved.push(ResolvedEntry {
            name: target.env_name.clone(),
            value: Zeroizing::new(value.to_string()),
        });
    }
    Ok(())
}
