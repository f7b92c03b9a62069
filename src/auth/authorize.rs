//! One-time application authorization.
//!
//! The Freebox grants API access interactively: the client POSTs its
//! identity to `login/authorize/`, the router shows a prompt on its front
//! panel, and the client polls the returned track id until the operator
//! presses "Yes" (or the request times out / is denied). The granted app
//! token and first challenge are persisted; this whole flow runs once.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::ApiEnvelope;
use crate::config::{CredentialStore, Credentials};

use super::{APP_ID, APP_NAME, APP_VERSION};

/// Delay between authorization status polls.
/// The operator has to walk to the router; one second is plenty responsive.
const POLL_INTERVAL_SECS: u64 = 1;

/// Terminal outcomes of the authorization flow other than success.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization request timed out - re-run and approve on the Freebox faster")]
    Timeout,

    #[error("Authorization request was denied on the Freebox")]
    Denied,

    #[error("Freebox returned an unrecognized authorization status")]
    UnexpectedStatus,
}

#[derive(Debug, Serialize)]
struct AuthorizeRequest<'a> {
    app_id: &'a str,
    app_name: &'a str,
    app_version: &'a str,
    device_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthorizeGrant {
    app_token: String,
    track_id: i64,
}

/// Authorization poll status. Anything the server adds later decodes as
/// `Unknown` and fails loudly rather than silently succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TrackStatus {
    Pending,
    Timeout,
    Denied,
    Granted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TrackResult {
    status: TrackStatus,
    #[serde(default)]
    challenge: Option<String>,
}

/// Run the interactive authorization flow and persist the credentials.
///
/// Blocks (in human time) until the operator responds on the Freebox front
/// panel. The credential record is written exactly once, on success; a
/// timeout or denial leaves the store untouched.
pub async fn request_authorization(
    http: &Client,
    base_url: &str,
    store: &CredentialStore,
    device_name: &str,
) -> Result<Credentials> {
    let url = format!("{base_url}login/authorize/");

    let request = AuthorizeRequest {
        app_id: APP_ID,
        app_name: APP_NAME,
        app_version: APP_VERSION,
        device_name,
    };

    let envelope: ApiEnvelope = http
        .post(&url)
        .json(&request)
        .send()
        .await
        .context("Failed to send authorization request")?
        .json()
        .await
        .context("Failed to decode authorization response")?;

    let grant: AuthorizeGrant = envelope
        .take()
        .context("Freebox rejected the authorization request")?;
    debug!(track_id = grant.track_id, "Authorization request accepted, polling");

    println!("Waiting for you to press the \"Yes\" button on the Freebox");
    let challenge = poll_for_grant(http, &url, grant.track_id).await?;

    let credentials = Credentials {
        app_token: grant.app_token,
        session_challenge: challenge,
        session_token: None,
    };
    store
        .save(&credentials)
        .context("Failed to persist credentials after authorization")?;

    Ok(credentials)
}

/// Poll the track sub-resource until the request leaves the `pending` state.
/// Returns the challenge issued alongside the grant.
async fn poll_for_grant(http: &Client, authorize_url: &str, track_id: i64) -> Result<String> {
    let track_url = format!("{authorize_url}{track_id}");

    loop {
        let envelope: ApiEnvelope = http
            .get(&track_url)
            .send()
            .await
            .context("Failed to poll authorization status")?
            .json()
            .await
            .context("Failed to decode authorization status")?;

        let track: TrackResult = envelope
            .take()
            .context("Freebox rejected the authorization status poll")?;

        match track.status {
            TrackStatus::Pending => {
                print!(".");
                std::io::stdout().flush().ok();
                tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            }
            TrackStatus::Granted => {
                println!();
                return track.challenge.ok_or_else(|| {
                    anyhow::anyhow!("Authorization granted but no challenge was issued")
                });
            }
            TrackStatus::Timeout => return Err(AuthError::Timeout.into()),
            TrackStatus::Denied => return Err(AuthError::Denied.into()),
            TrackStatus::Unknown => return Err(AuthError::UnexpectedStatus.into()),
        }
    }
}
