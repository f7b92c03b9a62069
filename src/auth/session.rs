//! Session establishment from a stored app token.
//!
//! Session tokens are short-lived and the server gives no expiry hint, so
//! this is purely reactive: a session is opened on demand and reopened when
//! the API reports `auth_required`. Each open fetches a fresh challenge,
//! signs it with the app token and exchanges the signature for a token,
//! then persists the updated record immediately.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::ApiEnvelope;
use crate::config::{CredentialStore, Credentials};

use super::{sign_challenge, APP_ID};

#[derive(Debug, Deserialize)]
struct LoginResult {
    challenge: String,
}

#[derive(Debug, Deserialize)]
struct SessionResult {
    session_token: String,
}

/// Owns the credential record and keeps its session token fresh.
///
/// The record lives here exclusively while the process runs; every mutation
/// goes through `open_session`, which writes the store before returning, so
/// the in-memory and on-disk state never drift.
pub struct SessionManager {
    credentials: Credentials,
    store: CredentialStore,
}

impl SessionManager {
    pub fn new(credentials: Credentials, store: CredentialStore) -> Self {
        Self { credentials, store }
    }

    /// Current session token, if any session was ever opened.
    pub fn session_token(&self) -> Option<&str> {
        self.credentials.session_token.as_deref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Open a fresh session: fetch a challenge, sign it, exchange the
    /// signature for a session token, persist.
    ///
    /// Any server-side refusal (wrong token, revoked app, replayed nonce)
    /// surfaces as the same fatal error; the Freebox does not disambiguate.
    pub async fn open_session(&mut self, http: &Client, base_url: &str) -> Result<()> {
        let login_url = format!("{base_url}login/");

        let envelope: ApiEnvelope = http
            .get(&login_url)
            .send()
            .await
            .context("Failed to fetch login challenge")?
            .json()
            .await
            .context("Failed to decode login challenge")?;
        let login: LoginResult = envelope
            .take()
            .context("Could not retrieve challenge when opening session")?;

        let password = sign_challenge(&self.credentials.app_token, &login.challenge);

        let session_url = format!("{login_url}session/");
        let envelope: ApiEnvelope = http
            .post(&session_url)
            .json(&json!({"app_id": APP_ID, "password": password}))
            .send()
            .await
            .context("Failed to send session open request")?
            .json()
            .await
            .context("Failed to decode session open response")?;
        let session: SessionResult = envelope.take().context("Could not open session")?;

        debug!("Session opened");
        self.credentials.session_challenge = login.challenge;
        self.credentials.session_token = Some(session.session_token);
        self.store
            .save(&self.credentials)
            .context("Failed to persist session token")?;

        Ok(())
    }
}
