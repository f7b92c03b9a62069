//! Authenticated API client for the Freebox.
//!
//! `FreeboxClient::call` is the single entry point for every data endpoint.
//! It attaches the current session token, decodes the response envelope and
//! transparently recovers from the one recoverable failure: when the server
//! answers `auth_required`, it reopens the session and retries the call
//! exactly once. Every other failure is fatal to the run.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionManager;
use crate::models::Disk;

use super::{ApiEnvelope, ApiError};

/// Base address of the Freebox API on the LAN
pub const DEFAULT_BASE_URL: &str = "http://mafreebox.freebox.fr/api/v3/";

/// Header carrying the session token
const AUTH_HEADER: &str = "X-Fbx-App-Auth";

/// HTTP request timeout in seconds.
/// The Freebox is on the local network; anything slower than this is down.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Authenticated client for Freebox data endpoints.
pub struct FreeboxClient {
    http: Client,
    base_url: String,
    session: SessionManager,
}

impl FreeboxClient {
    /// Client against the well-known LAN address.
    pub fn new(session: SessionManager) -> Result<Self> {
        Self::with_base_url(session, DEFAULT_BASE_URL)
    }

    /// Client against an explicit base URL (must end with `/`).
    pub fn with_base_url(session: SessionManager, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
        })
    }

    /// Issue a GET call to an API endpoint and return its `result` payload.
    ///
    /// The retry is a bounded loop, not recursion: at most one session
    /// reopen per call. A missing session token is a legal initial state;
    /// the server rejects the bare call with `auth_required` and the normal
    /// recovery path takes over.
    pub async fn call(&mut self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut reopened = false;

        loop {
            let mut request = self.http.get(&url);
            if !params.is_empty() {
                request = request.query(params);
            }
            if let Some(token) = self.session.session_token() {
                request = request.header(AUTH_HEADER, token);
            }

            let envelope: ApiEnvelope = request
                .send()
                .await
                .map_err(ApiError::Network)
                .with_context(|| format!("Failed to send GET request to {url}"))?
                .json()
                .await
                .map_err(ApiError::Network)
                .with_context(|| format!("Failed to decode response from {url}"))?;

            match envelope.into_result() {
                Ok(result) => return Ok(result),
                Err(ApiError::AuthRequired) if !reopened => {
                    debug!(endpoint, "Session rejected, reopening");
                    self.session
                        .open_session(&self.http, &self.base_url)
                        .await
                        .context("Failed to reopen session")?;
                    reopened = true;
                }
                Err(err) => {
                    warn!(endpoint, error = %err, "API call failed");
                    return Err(err).with_context(|| format!("API call to {endpoint} failed"));
                }
            }
        }
    }

    /// Fetch the connected disks with display names and slugs filled in.
    pub async fn connected_disks(&mut self) -> Result<Vec<Disk>> {
        let result = self.call("storage/disk/", &[]).await?;
        serde_json::from_value(result).context("Failed to parse disk list")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{CredentialStore, Credentials};

    use super::*;

    fn envelope_ok(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": result}))
    }

    fn envelope_err(code: &str, msg: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({"success": false, "error_code": code, "msg": msg}))
    }

    fn client_for(server: &MockServer, dir: &tempfile::TempDir) -> FreeboxClient {
        let store = CredentialStore::at(dir.path().join("freebox.json"));
        let credentials = Credentials {
            app_token: "s3cr3t".to_string(),
            session_challenge: "old".to_string(),
            session_token: None,
        };
        store.save(&credentials).unwrap();
        let session = SessionManager::new(credentials, store);
        FreeboxClient::with_base_url(session, format!("{}/", server.uri())).unwrap()
    }

    async fn mount_session_endpoints(server: &MockServer, token: &str, expected_opens: u64) {
        Mock::given(method("GET"))
            .and(path("/login/"))
            .respond_with(envelope_ok(json!({"challenge": "abc123"})))
            .expect(expected_opens)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login/session/"))
            .respond_with(envelope_ok(json!({"session_token": token})))
            .expect(expected_opens)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_auth_required_triggers_single_reopen_and_retry() {
        let server = MockServer::start().await;
        mount_session_endpoints(&server, "tok-1", 1).await;

        // First data call has no token and is rejected.
        Mock::given(method("GET"))
            .and(path("/status/"))
            .respond_with(envelope_err("auth_required", "no session"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        // The retry must carry the token from the reopened session.
        Mock::given(method("GET"))
            .and(path("/status/"))
            .and(header(AUTH_HEADER, "tok-1"))
            .respond_with(envelope_ok(json!({"up": true})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut client = client_for(&server, &dir);

        let result = client.call("status/", &[]).await.unwrap();
        assert_eq!(result["up"], true);
    }

    #[tokio::test]
    async fn test_persistent_auth_required_fails_after_one_retry() {
        let server = MockServer::start().await;
        // Exactly one session-open exchange, never two.
        mount_session_endpoints(&server, "tok-1", 1).await;

        Mock::given(method("GET"))
            .and(path("/status/"))
            .respond_with(envelope_err("auth_required", "still no"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut client = client_for(&server, &dir);

        let err = client.call("status/", &[]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_non_auth_error_is_fatal_without_reopen() {
        let server = MockServer::start().await;

        // No login mocks mounted: any session-open attempt would 404 and
        // fail the envelope decode, so reaching the assertion below proves
        // no reopen was attempted.
        Mock::given(method("GET"))
            .and(path("/status/"))
            .respond_with(envelope_err("internal_error", "oops"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut client = client_for(&server, &dir);

        let err = client.call("status/", &[]).await.unwrap_err();
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Protocol { code, msg }) => {
                assert_eq!(code, "internal_error");
                assert_eq!(msg, "oops");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_call_passes_query_params_and_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rrd/"))
            .and(wiremock::matchers::query_param("db", "temp"))
            .and(header(AUTH_HEADER, "tok-0"))
            .respond_with(envelope_ok(json!([1, 2, 3])))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("freebox.json"));
        let credentials = Credentials {
            app_token: "s3cr3t".to_string(),
            session_challenge: "old".to_string(),
            session_token: Some("tok-0".to_string()),
        };
        store.save(&credentials).unwrap();
        let session = SessionManager::new(credentials, store);
        let mut client =
            FreeboxClient::with_base_url(session, format!("{}/", server.uri())).unwrap();

        let result = client.call("rrd/", &[("db", "temp")]).await.unwrap();
        assert_eq!(result, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_connected_disks_parses_inventory() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/disk/"))
            .and(header(AUTH_HEADER, "tok-0"))
            .respond_with(envelope_ok(json!([{
                "id": 0,
                "type": "internal",
                "model": "TOSHIBA MQ01ABD1",
                "serial": "X4PJW0DKT",
                "partitions": [{"label": "Disque dur", "total_bytes": 1000, "used_bytes": 250, "free_bytes": 750}]
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("freebox.json"));
        let credentials = Credentials {
            app_token: "s3cr3t".to_string(),
            session_challenge: "old".to_string(),
            session_token: Some("tok-0".to_string()),
        };
        store.save(&credentials).unwrap();
        let session = SessionManager::new(credentials, store);
        let mut client =
            FreeboxClient::with_base_url(session, format!("{}/", server.uri())).unwrap();

        let disks = client.connected_disks().await.unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].display_name(), "TOSHIBA MQ01ABD1 (internal)");
        assert_eq!(disks[0].slug(), "toshiba_mq01abd1");
    }
}
