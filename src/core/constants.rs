//! Constants used throughout vaultrun.
//!
//! Centralizes the reference syntax and reserved variable names.

/// Marker for a reference resolved against the default path prefix (`$v:path#field`).
pub const RELATIVE_MARKER: &str = "$v:";

/// Marker for a reference naming an absolute store path (`$v!:path#field`).
pub const ABSOLUTE_MARKER: &str = "$v!:";

/// Separates the path fragment from the field name inside a reference.
pub const FIELD_SEPARATOR: char = '#';

/// Variable that sets the default prefix for relative references.
pub const DEFAULT_PATH_VAR: &str = "VAULTRUN_DEFAULT_PATH";

/// Prefix used for relative references when nothing overrides it.
pub const DEFAULT_PATH: &str = "secret";

/// Variables with these prefixes configure the store client and are never
/// forwarded to the child.
pub const CONNECTION_PREFIXES: &[&str] = &["VAULT_", "VAULTRUN_"];

/// Filter directive variable for log output.
pub const LOG_VAR: &str = "VAULTRUN_LOG";

/// Set to `json` for one JSON object per log line.
pub const LOG_FORMAT_VAR: &str = "VAULTRUN_LOG_FORMAT";

/// Launch mode override (`exec` or `spawn`).
pub const LAUNCH_MODE_VAR: &str = "VAULTRUN_LAUNCH_MODE";

/// Kubernetes auth role.
pub const KUBE_ROLE_VAR: &str = "VAULTRUN_KUBE_ROLE";

/// Vault login path for Kubernetes auth (e.g. `auth/kubernetes/login`).
pub const KUBE_PATH_VAR: &str = "VAULTRUN_KUBE_PATH";

/// Override for the service account token location.
pub const KUBE_TOKEN_FILE_VAR: &str = "VAULTRUN_KUBE_TOKEN_FILE";

/// Where Kubernetes mounts the service account token.
pub const KUBE_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Vault server address used when `VAULT_ADDR` is unset.
pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Vault client timeout in seconds when `VAULT_CLIENT_TIMEOUT` is unset.
pub const DEFAULT_VAULT_TIMEOUT_SECS: u64 = 60;

/// Token helper file written by `vault login`, relative to HOME.
pub const VAULT_TOKEN_FILE: &str = ".vault-token";

/// Whether a variable name is reserved for store connection settings.
pub fn is_connection_var(name: &str) -> bool {
    CONNECTION_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
