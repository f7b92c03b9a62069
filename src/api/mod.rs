//! Freebox API client module.
//!
//! Every response from the Freebox uses the same success/error envelope;
//! [`envelope`] decodes it, [`error`] is the failure taxonomy and
//! [`client`] drives authenticated calls with transparent session renewal.

pub mod client;
pub mod envelope;
pub mod error;

pub use client::{FreeboxClient, DEFAULT_BASE_URL};
pub use envelope::ApiEnvelope;
pub use error::ApiError;
