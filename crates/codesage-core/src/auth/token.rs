//! Minimal JWT inspection.
//!
//! The client never verifies signatures (that is the backend's job); it only
//! reads the `exp` claim to decide whether a stored token is still worth
//! sending.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Decode the `exp` claim of a JWT. Returns `None` for anything that is not
/// a three-part token with a JSON payload carrying a numeric `exp`.
pub fn expiration(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    // Some issuers pad their segments; the URL-safe alphabet never needs it
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.exp?;
    Utc.timestamp_opt(exp as i64, 0).single()
}

/// A token is expired when `now >= exp`. Undecodable tokens count as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match expiration(token) {
        Some(exp) => now >= exp,
        None => true,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Build an unsigned token with the given `exp`, for tests.
#[cfg(test)]
pub(crate) fn unsigned_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp));
    format!("{}.{}.sig", header, payload)
}
