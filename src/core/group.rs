//! Grouping of references by resolved store path.
//!
//! Each distinct path is read once no matter how many variables point into it.

use std::collections::HashMap;

use crate::core::reference::SecretReference;

/// One variable waiting on one field of a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub env_name: String,
    pub field: String,
}

/// All targets that read from the same store path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretGroup {
    pub path: String,
    pub targets: Vec<Target>,
}

/// References bucketed by resolved path.
///
/// Groups keep the order in which their path first appeared; targets keep
/// reference order. No group is ever empty.
#[derive(Debug, Clone, Default)]
pub struct SecretGroups {
    groups: Vec<SecretGroup>,
    index: HashMap<String, usize>,
}

impl SecretGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group references, resolving relative paths against `prefix`.
    pub fn from_references<'a>(
        references: impl IntoIterator<Item = &'a SecretReference>,
        prefix: &str,
    ) -> Self {
        let mut groups = Self::new();
        for reference in references {
            groups.insert(
                reference.resolve(prefix),
                Target {
                    env_name: reference.env_name.clone(),
                    field: reference.field.clone(),
                },
            );
        }
        groups
    }

    /// Add a target under `path`, creating the group on first use.
    pub fn insert(&mut self, path: String, target: Target) {
        match self.index.get(&path) {
            Some(&i) => self.groups[i].targets.push(target),
            None => {
                self.index.insert(path.clone(), self.groups.len());
                self.groups.push(SecretGroup {
                    path,
                    targets: vec![target],
                });
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&SecretGroup> {
        self.index.get(path).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SecretGroup> {
        self.groups.iter()
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of targets across all groups.
    pub fn target_count(&self) -> usize {
        self.groups.iter().map(|g| g.targets.len()).sum()
    }
}

impl<'a> IntoIterator for &'a SecretGroups {
    type Item = &'a SecretGroup;
    type IntoIter = std::slice::Iter<'a, SecretGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
