//! Child environment composition.

use std::ffi::{OsStr, OsString};

use zeroize::Zeroize;

use crate::core::fetch::ResolvedEntry;

/// The ordered `NAME=VALUE` list handed to the launched program.
///
/// Passthrough entries come first in their original order, then resolved
/// entries in group order. Names are not deduplicated: if a resolved name
/// matches a passthrough one, both are present and the launcher's platform
/// rules decide which the child sees.
///
/// Values are zeroized on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ChildEnvironment {
    entries: Vec<(OsString, OsString)>,
}

impl ChildEnvironment {
    /// Concatenate passthrough and resolved entries.
    pub fn compose(passthrough: Vec<(OsString, OsString)>, resolved: Vec<ResolvedEntry>) -> Self {
        let mut entries = passthrough;
        entries.reserve(resolved.len());
        entries.extend(
            resolved
                .into_iter()
                .map(|entry| (OsString::from(entry.name), OsString::from(entry.value.as_str()))),
        );
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_os_str(), value.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every value recorded for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&OsStr> {
        self.iter()
            .filter(|(n, _)| *n == OsStr::new(name))
            .map(|(_, v)| v)
            .collect()
    }

    /// The last value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.get_all(name).pop()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|(n, _)| n == OsStr::new(name))
    }

    /// Zeroize every value and empty the list.
    pub fn wipe(&mut self) {
        for (_, value) in self.entries.drain(..) {
            zeroize_os_string(value);
        }
    }

    /// Entries rendered as `NAME=VALUE`, lossily for non-Unicode data.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("{}={}", name.to_string_lossy(), value.to_string_lossy()))
            .collect()
    }
}

impl Drop for ChildEnvironment {
    fn drop(&mut self) {
        self.wipe();
    }
}

#[cfg(unix)]
fn zeroize_os_string(value: OsString) {
    use std::os::unix::ffi::OsStringExt;
    value.into_vec().zeroize();
}

#[cfg(not(unix))]
fn zeroize_os_string(value: OsString) {
    // Resolved values are always Unicode
    if let Ok(mut value) = value.into_string() {
        value.zeroize();
    }
}

impl std::fmt::Debug for ChildEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}
