//! Error types.
//!
//! Every failure here is fatal to the run: the binary prints one diagnostic
//! and exits non-zero. Malformed references are not errors; they are reported
//! as warnings by the scan and passed through.

use thiserror::Error;

/// Top-level error for all vaultrun operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// The secret was read but does not carry the requested field.
    #[error("secret {path} has no field {field}")]
    FieldNotFound { path: String, field: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with settings taken from the environment or the command line.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("VAULTRUN_KUBE_ROLE and VAULTRUN_KUBE_PATH must both be set")]
    KubeAuthIncomplete,

    #[error("invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("failed to read {what} from {path}: {source}")]
    ReadFile {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build vault http client: {0}")]
    HttpClient(String),
}

/// Secret store read failures. Each names the path that failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret not found: {path}")]
    NotFound { path: String },

    #[error("permission denied reading secret {path}")]
    PermissionDenied { path: String },

    #[error("vault unreachable while reading {path}: {reason}")]
    Unreachable { path: String, reason: String },

    #[error("unexpected response reading {path}: {status} {body}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode secret {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl StoreError {
    /// The secret path this failure refers to.
    pub fn path(&self) -> &str {
        match self {
            StoreError::NotFound { path }
            | StoreError::PermissionDenied { path }
            | StoreError::Unreachable { path, .. }
            | StoreError::UnexpectedStatus { path, .. }
            | StoreError::Decode { path, .. } => path,
        }
    }
}

/// Identity exchange failures.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("couldn't load service account token from {path}: {source}")]
    TokenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account token in {path}: {reason}")]
    InvalidToken { path: String, reason: String },

    #[error("error exchanging kube token for vault token: {0}")]
    Login(String),
}

/// Launch failures. All of these happen before the process image is replaced.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no program specified")]
    NoProgram,

    #[error("executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("environment entry {name} contains a NUL byte")]
    InvalidEnvironment { name: String },

    #[error("argument contains a NUL byte: {0}")]
    InvalidArgument(String),

    #[error("failed to exec {program}: {reason}")]
    Exec { program: String, reason: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
