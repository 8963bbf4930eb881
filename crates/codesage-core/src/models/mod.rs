//! Data models for the review backend.
//!
//! This module contains the wire and persisted shapes:
//! - `user`: Authenticated user identity and auth payloads
//! - `review`: Languages, review requests/results and history entries
//!
//! The backend is not consistent about field names (local history uses
//! `inputCode`/`reviewedResult`, server rows use `code`/`reviewResult`), so
//! the deserializers accept both spellings.

pub mod review;
pub mod user;

pub use review::{HistoryEntry, HistoryResponse, Language, ReviewRequest, ReviewResult};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User};

/// Serde helpers shared by the models.
pub(crate) mod serde_ext {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Float(f64),
        Text(String),
    }

    fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(ms).single()
    }

    /// Accepts epoch milliseconds (number or numeric string) or RFC 3339.
    pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTimestamp::deserialize(deserializer)?;
        let parsed = match raw {
            RawTimestamp::Millis(ms) => from_millis(ms),
            RawTimestamp::Float(ms) => from_millis(ms as i64),
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(from_millis)),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("unrecognized timestamp"))
    }

    pub fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp_millis())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    /// Ids come back as numbers from some backends and strings from others.
    pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        })
    }
}
