use thiserror::Error;

/// Errors surfaced by the Freebox API layer.
///
/// `AuthRequired` is the only recoverable variant: `FreeboxClient::call`
/// reopens the session and retries once when it sees it. Everything else
/// is fatal to the current run.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required - no valid session token")]
    AuthRequired,

    #[error("API error \"{code}\": {msg}")]
    Protocol { code: String, msg: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
