//! Shared fixtures: an in-memory backend that records every call, and
//! unsigned tokens with a chosen expiry.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use tempfile::TempDir;

use codesage_core::api::{ApiError, ReviewBackend};
use codesage_core::models::{
    AuthResponse, HistoryEntry, LoginRequest, RegisterRequest, ReviewRequest, User,
};
use codesage_core::storage::LocalStorage;
use codesage_core::store::Stores;

pub fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

pub fn live_token() -> String {
    token_with_exp((Utc::now() + Duration::hours(1)).timestamp())
}

pub fn expired_token() -> String {
    token_with_exp((Utc::now() - Duration::minutes(1)).timestamp())
}

#[derive(Default)]
pub struct RecordingBackend {
    pub token: Mutex<Option<String>>,
    pub review_text: Mutex<String>,
    pub reject_reviews: bool,
    pub submissions: Mutex<Vec<ReviewRequest>>,
    pub submit_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn issuing(token: String) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            review_text: Mutex::new("Looks fine".to_string()),
            ..Default::default()
        }
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    fn auth_response(&self, email: &str) -> AuthResponse {
        AuthResponse {
            token: self.token.lock().unwrap().clone(),
            user: Some(User {
                id: "65f1".into(),
                username: "ada".into(),
                email: email.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ReviewBackend for RecordingBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.auth_response(&request.email))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.auth_response(&request.email))
    }

    async fn submit_code(&self, _token: &str, request: &ReviewRequest) -> Result<String, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().unwrap().push(request.clone());
        if self.reject_reviews {
            return Err(ApiError::Unauthorized(None));
        }
        Ok(self.review_text.lock().unwrap().clone())
    }

    async fn fetch_history(&self, _token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.submissions
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|r| HistoryEntry::new(r.code.clone(), r.language.clone(), "archived".into()))
            .collect())
    }

    async fn delete_history(&self, _token: &str) -> Result<(), ApiError> {
        self.submissions.lock().unwrap().clear();
        Ok(())
    }
}

/// Stores over a fresh temp data directory. Keep the `TempDir` alive for
/// the duration of the test.
pub fn stores(backend: Arc<RecordingBackend>) -> (Stores, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let storage = LocalStorage::new(dir.path().to_path_buf()).expect("storage");
    (Stores::new(backend, storage), dir)
}

pub fn reopen(backend: Arc<RecordingBackend>, dir: &TempDir) -> Stores {
    let storage = LocalStorage::new(dir.path().to_path_buf()).expect("storage");
    let mut stores = Stores::new(backend, storage);
    stores.restore();
    stores
}

pub fn credentials() -> LoginRequest {
    LoginRequest {
        email: "ada@example.com".into(),
        password: "secret1".into(),
    }
}
