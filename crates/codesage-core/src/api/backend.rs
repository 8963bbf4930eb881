use async_trait::async_trait;

use crate::models::{AuthResponse, HistoryEntry, LoginRequest, RegisterRequest, ReviewRequest};

use super::ApiError;

/// The five backend calls the client makes.
///
/// Authenticated calls take the bearer token explicitly; the stores decide
/// which token (if any) is valid to send.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    /// Submit code for review, returning the review text.
    async fn submit_code(&self, token: &str, request: &ReviewRequest) -> Result<String, ApiError>;

    async fn fetch_history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn delete_history(&self, token: &str) -> Result<(), ApiError>;
}
