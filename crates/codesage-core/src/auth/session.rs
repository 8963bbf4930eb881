use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::User;
use crate::storage::{keys, LocalStorage};

use super::token;

/// Buffer before expiry at which the status bar starts warning (5 minutes)
const TOKEN_WARNING_BUFFER_MINUTES: i64 = 5;

/// The persisted session blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
        }
    }

    /// Expiry as stated by the token's `exp` claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        token::expiration(&self.token)
    }

    pub fn is_expired(&self) -> bool {
        token::is_expired(&self.token)
    }

    /// Check if the session will expire soon
    pub fn expires_soon(&self) -> bool {
        match self.expires_at() {
            Some(exp) => Utc::now() + Duration::minutes(TOKEN_WARNING_BUFFER_MINUTES) >= exp,
            None => true,
        }
    }

    pub fn time_until_expiry(&self) -> Duration {
        match self.expires_at() {
            Some(exp) => exp - Utc::now(),
            None => Duration::zero(),
        }
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }
}

/// Session persistence on top of local storage.
pub struct Session {
    storage: LocalStorage,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            data: None,
        }
    }

    /// Whether a session blob exists on disk, valid or not.
    pub fn has_stored(&self) -> bool {
        self.storage.get_item(keys::SESSION).is_some()
    }

    /// Load session from storage. Expiry is not checked here; that is the
    /// session store's `verify_token`. Returns whether a session was found.
    pub fn load(&mut self) -> bool {
        self.data = self.storage.get_json::<SessionData>(keys::SESSION);
        debug!(found = self.data.is_some(), "Session loaded");
        self.data.is_some()
    }

    /// Save session to storage
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            self.storage.set_json(keys::SESSION, data)?;
        }
        Ok(())
    }

    /// Clear session data, in memory and on disk
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        self.storage.remove_item(keys::SESSION)
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if one is held, expired or not
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Get the bearer token only if it has not expired
    pub fn valid_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .filter(|d| !d.is_expired())
            .map(|d| d.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.data.as_ref().map(|d| &d.user)
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.valid_token().is_some()
    }
}
