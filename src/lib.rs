//! Freebox OS API client for munin telemetry.
//!
//! Talking to a Freebox takes three layers of credentials:
//!
//! 1. a one-time, human-approved authorization that yields a long-lived
//!    app token ([`auth::request_authorization`]);
//! 2. a per-run session token obtained by signing a server challenge with
//!    that app token ([`auth::SessionManager`]);
//! 3. the session token attached to every data call, with a single
//!    transparent reopen-and-retry when the server reports it stale
//!    ([`api::FreeboxClient`]).
//!
//! Credentials persist as a small JSON record ([`config::CredentialStore`]);
//! all other failures are fatal to the run and reported by the binary.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiError, FreeboxClient};
pub use auth::SessionManager;
pub use config::{CredentialStore, Credentials};
