//! Challenge signing for session establishment.
//!
//! The Freebox proves possession of the app token without ever sending it:
//! the server hands out a challenge nonce and the client answers with
//! `HMAC-SHA1(app_token, challenge)` as a lowercase hex digest. The digest
//! must match the server's byte for byte, so the algorithm is fixed.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Compute the session password for a server-issued challenge.
///
/// Returns the lowercase hex HMAC-SHA1 digest of `challenge` keyed by
/// `app_token` (40 characters). Deterministic, no side effects.
pub fn sign_challenge(app_token: &str, challenge: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(app_token.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(challenge.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
