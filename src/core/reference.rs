//! Secret reference parsing.
//!
//! An environment value of the form `$v:path#field` or `$v!:path#field`
//! names one field of one secret. Classification is pure: callers decide
//! what to do with malformed references.

use crate::core::constants::{
    is_connection_var, ABSOLUTE_MARKER, DEFAULT_PATH_VAR, FIELD_SEPARATOR, RELATIVE_MARKER,
};

/// How a reference's path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Joined onto the default path prefix.
    Relative,
    /// Used as the store path unchanged.
    Absolute,
}

/// A well-formed reference parsed from one environment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    /// Variable that receives the resolved value.
    pub env_name: String,
    pub addressing: Addressing,
    /// Path as written, before any prefix is applied.
    pub path: String,
    pub field: String,
}

impl SecretReference {
    /// Absolute store path for this reference.
    ///
    /// Relative paths are joined onto `prefix` with exactly one `/`.
    pub fn resolve(&self, prefix: &str) -> String {
        match self.addressing {
            Addressing::Absolute => self.path.clone(),
            Addressing::Relative => join_path(prefix, &self.path),
        }
    }
}

/// Join a prefix and a relative fragment with a single separator.
pub fn join_path(prefix: &str, fragment: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return fragment.to_string();
    }
    format!("{}/{}", prefix, fragment)
}

/// A reference-shaped value that could not be split into path and field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedReference {
    pub env_name: String,
    pub value: String,
}

/// What one environment entry turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Sets the default prefix for relative references.
    DefaultPath(String),
    /// Store connection setting; never forwarded.
    Connection,
    Reference(SecretReference),
    /// Looked like a reference but failed to parse; forwarded unchanged.
    Malformed(MalformedReference),
    Passthrough,
}

/// Classify a single `name=value` environment entry.
///
/// Reserved names win over reference syntax, so connection variables are
/// never parsed even when their value carries a marker.
pub fn classify(name: &str, value: &str) -> Classification {
    if name == DEFAULT_PATH_VAR {
        return Classification::DefaultPath(value.to_string());
    }
    if is_connection_var(name) {
        return Classification::Connection;
    }

    // Check the longer marker first
    let (addressing, rest) = if let Some(rest) = value.strip_prefix(ABSOLUTE_MARKER) {
        (Addressing::Absolute, rest)
    } else if let Some(rest) = value.strip_prefix(RELATIVE_MARKER) {
        (Addressing::Relative, rest)
    } else {
        return Classification::Passthrough;
    };

    match split_reference(rest) {
        Some((path, field)) => Classification::Reference(SecretReference {
            env_name: name.to_string(),
            addressing,
            path: path.to_string(),
            field: field.to_string(),
        }),
        None => Classification::Malformed(MalformedReference {
            env_name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Split `path#field` into exactly two non-empty fragments.
fn split_reference(rest: &str) -> Option<(&str, &str)> {
    let mut parts = rest.split(FIELD_SEPARATOR);
    let path = parts.next()?;
    let field = parts.next()?;
    if parts.next().is_some() || path.is_empty() || field.is_empty() {
        return None;
    }
    Some((path, field))
}
