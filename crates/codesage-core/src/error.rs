//! Error taxonomy surfaced by the stores.
//!
//! Every async store operation returns `Result<_, StoreError>` and records
//! the error's message as the store's single user-visible `error`.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Rejected client-side before any network call
    #[error("{0}")]
    Validation(String),

    /// Missing, expired or rejected token
    #[error("{0}")]
    Auth(String),

    /// Transport failure (connect, timeout, unreadable response)
    #[error("{0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("{0}")]
    Backend(String),

    /// Corrupt or unreadable persisted data
    #[error("{0}")]
    Storage(String),
}

impl StoreError {
    pub fn is_auth(&self) -> bool {
        matches!(self, StoreError::Auth(_))
    }

    /// Map a failed API call, falling back to `fallback` when the failure
    /// carries nothing a user can act on.
    pub fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(_) => StoreError::Auth("Authentication required".to_string()),
            ApiError::NetworkError(_) => StoreError::Network(err.user_message()),
            ApiError::InvalidResponse(ref detail) => {
                tracing::debug!(detail = %detail, "Invalid backend response");
                StoreError::Network(fallback.to_string())
            }
            ApiError::RateLimited => StoreError::Backend(err.to_string()),
            other => {
                let message = other.user_message();
                if message.trim().is_empty() {
                    StoreError::Backend(fallback.to_string())
                } else {
                    StoreError::Backend(message)
                }
            }
        }
    }

    /// Map a failed login or registration. A 401 here means bad credentials,
    /// not a stale session, so the server's wording is kept.
    pub fn from_credentials_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized(message) => {
                StoreError::Auth(message.unwrap_or_else(|| fallback.to_string()))
            }
            other => Self::from_api(other, fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_unauthorized_is_auth() {
        let err = StoreError::from_api(ApiError::Unauthorized(None), "Review failed");
        assert!(err.is_auth());
    }

    #[test]
    fn test_from_api_keeps_server_message() {
        let err = StoreError::from_api(ApiError::Rejected("Email taken".into()), "Registration failed");
        assert_eq!(err, StoreError::Backend("Email taken".into()));
    }

    #[test]
    fn test_from_api_falls_back() {
        let err = StoreError::from_api(ApiError::ServerError(String::new()), "Review failed");
        assert_eq!(err.to_string(), "Review failed");

        let err = StoreError::from_api(ApiError::InvalidResponse("bad".into()), "Review failed");
        assert_eq!(err, StoreError::Network("Review failed".into()));
    }

    #[test]
    fn test_rejected_credentials_keep_server_message() {
        let err = StoreError::from_credentials_api(
            ApiError::Unauthorized(Some("Invalid credentials".into())),
            "Login failed",
        );
        assert_eq!(err, StoreError::Auth("Invalid credentials".into()));

        let err = StoreError::from_credentials_api(ApiError::Unauthorized(None), "Login failed");
        assert_eq!(err.to_string(), "Login failed");
    }
}
