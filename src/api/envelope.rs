//! The uniform response envelope used by every Freebox API endpoint.
//!
//! Every response is `{success, result}` or `{success: false, error_code,
//! msg}`. Decoding the envelope is where server error codes get classified
//! into [`ApiError`] variants; nothing else in the crate compares error
//! strings.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::ApiError;

/// Error code the server sends when the session token is missing, expired
/// or revoked. The one recoverable code.
const AUTH_REQUIRED_CODE: &str = "auth_required";

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ApiEnvelope {
    /// Unwrap the envelope, classifying a failure into an [`ApiError`].
    ///
    /// A successful envelope with no `result` field yields `Value::Null`;
    /// some endpoints legitimately return nothing.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.success {
            return Ok(self.result.unwrap_or(Value::Null));
        }

        match self.error_code.as_deref() {
            Some(AUTH_REQUIRED_CODE) => Err(ApiError::AuthRequired),
            code => Err(ApiError::Protocol {
                code: code.unwrap_or("unknown").to_string(),
                msg: self.msg.unwrap_or_default(),
            }),
        }
    }

    /// Unwrap the envelope and decode `result` into a concrete type.
    pub fn take<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = self.into_result()?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
