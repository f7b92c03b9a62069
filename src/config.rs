//! Persisted Freebox credentials.
//!
//! The credential record is stored as JSON at
//! `~/.config/freebox-munin/freebox.json`. Field names match the file
//! written by earlier versions of this tool, so an existing record keeps
//! working across upgrades.
//!
//! The record is created once by the authorization flow (no session token
//! yet) and rewritten every time a session is opened. It is never deleted
//! here; revoking the app on the Freebox is the operator's job.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory under the OS config dir holding the credential file
const APP_DIR: &str = "freebox-munin";

/// Credential file name
const CREDENTIALS_FILE: &str = "freebox.json";

/// The long-lived credentials for one Freebox application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Secret issued once during human-approved authorization.
    pub app_token: String,
    /// Last challenge seen, refreshed on every session open.
    pub session_challenge: String,
    /// Current session token; absent until the first session is opened.
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Loads and saves the credential record at a fixed path.
///
/// The path is explicit rather than ambient so tests can point the store
/// at a scratch directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at the default per-user config location.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(Self {
            path: config_dir.join(APP_DIR).join(CREDENTIALS_FILE),
        })
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Credentials> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials at {}", self.path.display()))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write credentials to {}", self.path.display()))
    }
}
