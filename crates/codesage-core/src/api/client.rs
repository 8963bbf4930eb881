//! API client for communicating with the CodeSage REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests to log in, submit code and manage review history.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{
    AuthResponse, HistoryEntry, HistoryResponse, LoginRequest, RegisterRequest, ReviewRequest,
    ReviewResult,
};

use super::{ApiError, ReviewBackend};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither the environment nor the config names one
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// HTTP request timeout in seconds.
/// Reviews are generated synchronously by the backend, so this is generous.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the review backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against `base_url` (trailing slash optional)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(token: &str) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidResponse("Token contains invalid characters".into()))?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    /// `build` is called once per attempt since a sent request is consumed.
    async fn execute<F>(&self, what: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    debug!(request = what, status = %response.status(), "Request succeeded");
                    return Ok(response);
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(request = what, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl ReviewBackend for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.url("/auth/login");
        let response = self
            .execute("login", || self.client.post(&url).json(request))
            .await?;
        Self::parse_json(response, "login").await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let url = self.url("/auth/register");
        let response = self
            .execute("register", || self.client.post(&url).json(request))
            .await?;
        Self::parse_json(response, "register").await
    }

    async fn submit_code(&self, token: &str, request: &ReviewRequest) -> Result<String, ApiError> {
        let url = self.url("/code/submit");
        let headers = Self::auth_headers(token)?;
        let response = self
            .execute("submit", || {
                self.client
                    .post(&url)
                    .headers(headers.clone())
                    .json(request)
            })
            .await?;
        let result: ReviewResult = Self::parse_json(response, "submit").await?;
        Ok(result.into_text())
    }

    async fn fetch_history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        let url = self.url("/code/history");
        let headers = Self::auth_headers(token)?;
        let response = self
            .execute("history", || self.client.get(&url).headers(headers.clone()))
            .await?;
        let parsed: HistoryResponse = Self::parse_json(response, "history").await?;
        debug!(count = parsed.code_history.len(), "Fetched code history");
        Ok(parsed.code_history)
    }

    async fn delete_history(&self, token: &str) -> Result<(), ApiError> {
        let url = self.url("/code/history");
        let headers = Self::auth_headers(token)?;
        self.execute("delete history", || {
            self.client.delete(&url).headers(headers.clone())
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("/code/submit"), "http://localhost:3000/api/code/submit");
    }

    #[test]
    fn test_auth_headers() {
        let headers = ApiClient::auth_headers("abc.def.ghi").unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc.def.ghi");
        assert!(ApiClient::auth_headers("bad\ntoken").is_err());
    }
}
