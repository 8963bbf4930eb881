//! Client state containers.
//!
//! - `SessionStore`: who is signed in, backed by the persisted session
//! - `ReviewStore`: current input and result plus bounded history
//! - `Stores`: owns both and applies cross-store effects, so a rejected
//!   token seen by the review store signs the user out
//!
//! Each async operation is also exposed as `begin_*` / job `run` /
//! `finish_*` so a front-end can run the network half on a spawned task
//! and apply the result on its own loop.

pub mod review_store;
pub mod session_store;

use std::sync::Arc;

use tracing::info;

pub use review_store::{
    HistoryJob, HistoryOutcome, ReviewJob, ReviewStore, SubmitOutcome, HISTORY_LIMIT,
};
pub use session_store::{AuthJob, SessionStatus, SessionStore};

use crate::api::ReviewBackend;
use crate::error::StoreError;
use crate::models::Language;
use crate::storage::LocalStorage;

pub struct Stores {
    pub session: SessionStore,
    pub review: ReviewStore,
}

impl Stores {
    pub fn new(backend: Arc<dyn ReviewBackend>, storage: LocalStorage) -> Self {
        Self {
            session: SessionStore::new(Arc::clone(&backend), storage.clone()),
            review: ReviewStore::new(backend, storage),
        }
    }

    /// Restore both stores from local storage, verifying any stored session.
    pub fn restore(&mut self) {
        self.session.restore();
        self.review.restore();
    }

    /// Pass a review-store result through, signing out on an auth failure.
    pub fn observe<T>(&mut self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if let Err(ref e) = result {
            if e.is_auth() && self.session.data().is_some() {
                info!("Review request was not authorized, signing out");
                self.session.logout();
            }
        }
        result
    }

    pub async fn submit(&mut self, code: &str, language: Language) -> Result<String, StoreError> {
        let token = self.session.token().map(str::to_string);
        let result = self.review.submit(token.as_deref(), code, language).await;
        self.observe(result)
    }

    pub async fn fetch_history(&mut self) -> Result<(), StoreError> {
        let token = self.session.token().map(str::to_string);
        let result = self.review.fetch_history(token.as_deref()).await;
        self.observe(result)
    }

    pub async fn delete_history(&mut self) -> Result<(), StoreError> {
        let token = self.session.token().map(str::to_string);
        let result = self.review.delete_history(token.as_deref()).await;
        self.observe(result)
    }

    /// Sign out and drop every piece of review state.
    pub fn logout_and_clear(&mut self) -> Result<(), StoreError> {
        self.session.logout();
        self.review.clear_all()
    }
}
