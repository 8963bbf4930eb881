//! Local key-value persistence.
//!
//! This module provides `LocalStorage`, a directory of small files under
//! fixed keys that plays the role browser local storage played for the web
//! client. Reads never fail: missing or corrupt values are logged and
//! treated as absent so callers can substitute defaults.
//!
//! Persisted keys:
//! - `userInfo`: the session blob
//! - `inputCode`, `language`, `reviewedResult`: the reviewer's last state
//! - `codeReviewHistory`: bounded history list with the time it was written

pub mod local;

pub use local::{CachedData, LocalStorage};

/// Fixed storage keys.
pub mod keys {
    pub const SESSION: &str = "userInfo";
    pub const INPUT_CODE: &str = "inputCode";
    pub const LANGUAGE: &str = "language";
    pub const REVIEWED_RESULT: &str = "reviewedResult";
    pub const HISTORY: &str = "codeReviewHistory";

    /// Every key owned by the review store
    pub const REVIEW_KEYS: [&str; 4] = [INPUT_CODE, LANGUAGE, REVIEWED_RESULT, HISTORY];
}
