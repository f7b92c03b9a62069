//! Freebox authorization and session management.
//!
//! Access to the API is bootstrapped once by [`request_authorization`]: the
//! operator approves the application on the Freebox front panel and the
//! server issues a long-lived app token. Every later run opens a short-lived
//! session from that token via [`SessionManager`], using the
//! challenge-response scheme in [`signer`].

pub mod authorize;
pub mod session;
pub mod signer;

pub use authorize::{request_authorization, AuthError};
pub use session::SessionManager;
pub use signer::sign_challenge;

/// Application id the Freebox trust decision is keyed to. This is the
/// legacy script name; changing it would break existing authorizations.
pub const APP_ID: &str = "freebox-revolution-munin";

/// Display name shown on the Freebox front panel during authorization
pub const APP_NAME: &str = "Freebox-OS-munin";

/// Version reported to the Freebox
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
