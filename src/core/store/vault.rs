//! HashiCorp Vault over its HTTP API.
//!
//! Reads are plain logical reads (`GET /v1/<path>`); the `data` object of the
//! response is the payload. Settings follow Vault's own environment
//! variables so an existing `vault` CLI setup works unchanged.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{SecretPayload, SecretStore};
use crate::core::constants::{DEFAULT_VAULT_ADDR, DEFAULT_VAULT_TIMEOUT_SECS, VAULT_TOKEN_FILE};
use crate::error::{ConfigError, Result, StoreError};

/// Connection settings for a Vault server.
#[derive(Clone)]
pub struct VaultConfig {
    pub addr: String,
    pub token: Option<String>,
    pub namespace: Option<String>,
    /// PEM or DER file with extra root certificates.
    pub ca_cert: Option<PathBuf>,
    pub skip_verify: bool,
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_VAULT_ADDR.to_string(),
            token: None,
            namespace: None,
            ca_cert: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_VAULT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("addr", &self.addr)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("ca_cert", &self.ca_cert)
            .field("skip_verify", &self.skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl VaultConfig {
    /// Read `VAULT_*` settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable timeout.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let timeout = match get("VAULT_CLIENT_TIMEOUT") {
            Some(raw) => {
                let secs = raw
                    .trim_end_matches('s')
                    .parse::<u64>()
                    .map_err(|err| ConfigError::InvalidValue {
                        name: "VAULT_CLIENT_TIMEOUT".to_string(),
                        value: raw.clone(),
                        reason: err.to_string(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_VAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            addr: get("VAULT_ADDR").unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
            token: get("VAULT_TOKEN"),
            namespace: get("VAULT_NAMESPACE"),
            ca_cert: get("VAULT_CACERT").map(PathBuf::from),
            skip_verify: get("VAULT_SKIP_VERIFY")
                .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(false),
            timeout,
        })
    }

    /// Fall back to the token left by `vault login` when none is set.
    pub fn with_token_helper(mut self, home: Option<PathBuf>) -> Self {
        if self.token.is_none() {
            self.token = home
                .map(|home| home.join(VAULT_TOKEN_FILE))
                .and_then(|path| std::fs::read_to_string(path).ok())
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty());
        }
        self
    }

    fn build_http_client(&self) -> Result<Client> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(path) = &self.ca_cert {
            let pem = std::fs::read(path).map_err(|source| ConfigError::ReadFile {
                what: "VAULT_CACERT",
                path: path.display().to_string(),
                source,
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .or_else(|_| reqwest::Certificate::from_der(&pem))
                .map_err(|err| ConfigError::HttpClient(format!("invalid VAULT_CACERT: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }
        if self.skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(client)
    }
}

/// Blocking Vault client.
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
}

impl VaultClient {
    /// # Errors
    ///
    /// Returns `ConfigError` if the CA bundle can't be loaded or the HTTP
    /// client can't be built.
    pub fn new(config: VaultConfig) -> Result<Self> {
        let http = config.build_http_client()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn set_token(&mut self, token: String) {
        self.config.token = Some(token);
    }

    /// Write `body` to `path` and return the parsed JSON response.
    pub fn write(&self, path: &str, body: &Value) -> std::result::Result<Value, String> {
        let response = self
            .request(Method::POST, path, Some(body))
            .map_err(|err| format!("vault request failed: {err}"))?;
        let status = response.status();
        let text = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(format!("{status} {}", text.trim()));
        }
        serde_json::from_str(&text).map_err(|err| format!("invalid response body: {err}"))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.addr.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> reqwest::Result<Response> {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.config.token {
            builder = builder.header("X-Vault-Token", token);
        }
        if let Some(namespace) = &self.config.namespace {
            builder = builder.header("X-Vault-Namespace", namespace);
        }
        if let Some(payload) = body {
            builder = builder.json(payload);
        }
        builder.send()
    }
}

impl SecretStore for VaultClient {
    fn read(&self, path: &str) -> Result<SecretPayload> {
        debug!(path, "reading secret");
        let response =
            self.request(Method::GET, path, None)
                .map_err(|err| StoreError::Unreachable {
                    path: path.to_string(),
                    reason: err.to_string(),
                })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                path: path.to_string(),
            }
            .into()),
            StatusCode::FORBIDDEN => Err(StoreError::PermissionDenied {
                path: path.to_string(),
            }
            .into()),
            status if status.is_success() => {
                let body = response.text().map_err(|err| StoreError::Unreachable {
                    path: path.to_string(),
                    reason: err.to_string(),
                })?;
                decode_payload(path, &body)
            }
            status => Err(StoreError::UnexpectedStatus {
                path: path.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default().trim().to_string(),
            }
            .into()),
        }
    }
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

fn decode_payload(path: &str, body: &str) -> Result<SecretPayload> {
    // 204 with an empty body means nothing is stored there
    if body.trim().is_empty() {
        return Err(StoreError::NotFound {
            path: path.to_string(),
        }
        .into());
    }
    let parsed: ReadResponse = serde_json::from_str(body).map_err(|err| StoreError::Decode {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    let data = parsed.data.ok_or_else(|| StoreError::NotFound {
        path: path.to_string(),
    })?;
    Ok(data
        .into_iter()
        .map(|(field, value)| (field, render_value(value)))
        .collect())
}

/// Strings are used verbatim; anything else keeps its JSON text.
fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
