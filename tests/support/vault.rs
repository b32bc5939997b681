//! Vault double backed by wiremock.
//!
//! The server runs on its own runtime so tests stay synchronous and the
//! vaultrun binary can talk to it over plain HTTP.

use serde_json::{json, Value};
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::ROOT_TOKEN;

pub struct MockVault {
    server: MockServer,
    runtime: Runtime,
}

impl MockVault {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("failed to build tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serve `data` at `secret_path`, expecting exactly one authenticated read.
    pub fn secret(&self, secret_path: &str, data: Value) -> &Self {
        self.secret_with_token(secret_path, ROOT_TOKEN, data)
    }

    /// Serve `data` at `secret_path` to requests carrying `token`.
    pub fn secret_with_token(&self, secret_path: &str, token: &str, data: Value) -> &Self {
        self.mount(
            Mock::given(method("GET"))
                .and(path(format!("/v1/{}", secret_path)))
                .and(header("X-Vault-Token", token))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "request_id": "00000000-0000-0000-0000-000000000000",
                    "lease_duration": 2764800,
                    "renewable": false,
                    "data": data,
                })))
                .expect(1),
        )
    }

    /// Answer reads of `secret_path` with a bare status code.
    pub fn status(&self, secret_path: &str, code: u16) -> &Self {
        self.mount(
            Mock::given(method("GET"))
                .and(path(format!("/v1/{}", secret_path)))
                .respond_with(
                    ResponseTemplate::new(code).set_body_json(json!({ "errors": [] })),
                ),
        )
    }

    pub fn mount(&self, mock: Mock) -> &Self {
        self.runtime.block_on(mock.mount(&self.server));
        self
    }

    /// Check every `expect` on mounted mocks.
    pub fn verify(&self) {
        self.runtime.block_on(self.server.verify());
    }

    /// Number of requests the server has seen.
    pub fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
