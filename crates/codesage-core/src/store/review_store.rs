use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::ReviewBackend;
use crate::error::StoreError;
use crate::models::{HistoryEntry, Language, ReviewRequest};
use crate::storage::{keys, CachedData, LocalStorage};

/// Most history entries kept locally
pub const HISTORY_LIMIT: usize = 10;

const AUTH_REQUIRED: &str = "Authentication required";
const CODE_REQUIRED: &str = "Please provide code to review.";
const LANGUAGE_REQUIRED: &str = "Please provide a programming language.";
const REVIEW_FAILED: &str = "Review failed";
const FETCH_HISTORY_FAILED: &str = "Failed to fetch history";
const DELETE_HISTORY_FAILED: &str = "Failed to delete code history.";

/// A validated submission ready to send.
pub struct ReviewJob {
    backend: Arc<dyn ReviewBackend>,
    token: String,
    request: ReviewRequest,
    submission: u64,
}

/// What came back for a [`ReviewJob`], with the request it answers.
pub struct SubmitOutcome {
    pub request: ReviewRequest,
    pub result: Result<String, StoreError>,
    submission: u64,
}

impl ReviewJob {
    pub async fn run(self) -> SubmitOutcome {
        let result = self
            .backend
            .submit_code(&self.token, &self.request)
            .await
            .map_err(|e| StoreError::from_api(e, REVIEW_FAILED));
        SubmitOutcome {
            request: self.request,
            result,
            submission: self.submission,
        }
    }
}

enum HistoryAction {
    Fetch,
    Delete,
}

pub struct HistoryJob {
    backend: Arc<dyn ReviewBackend>,
    token: String,
    action: HistoryAction,
}

pub enum HistoryOutcome {
    Fetched(Result<Vec<HistoryEntry>, StoreError>),
    Deleted(Result<(), StoreError>),
}

impl HistoryJob {
    pub async fn run(self) -> HistoryOutcome {
        match self.action {
            HistoryAction::Fetch => HistoryOutcome::Fetched(
                self.backend
                    .fetch_history(&self.token)
                    .await
                    .map_err(|e| StoreError::from_api(e, FETCH_HISTORY_FAILED)),
            ),
            HistoryAction::Delete => HistoryOutcome::Deleted(
                self.backend
                    .delete_history(&self.token)
                    .await
                    .map_err(|e| StoreError::from_api(e, DELETE_HISTORY_FAILED)),
            ),
        }
    }
}

/// The reviewer's working state: current input and result, plus a bounded
/// newest-first history. Every change that matters across restarts is
/// written through to local storage.
pub struct ReviewStore {
    backend: Arc<dyn ReviewBackend>,
    storage: LocalStorage,
    input_code: String,
    language: Language,
    reviewed_result: String,
    history: CachedData<Vec<HistoryEntry>>,
    loading: bool,
    error: Option<String>,
    /// Number of the latest submission begun
    submission: u64,
}

impl ReviewStore {
    pub fn new(backend: Arc<dyn ReviewBackend>, storage: LocalStorage) -> Self {
        Self {
            backend,
            storage,
            input_code: String::new(),
            language: Language::default(),
            reviewed_result: String::new(),
            history: CachedData::new(Vec::new()),
            loading: false,
            error: None,
            submission: 0,
        }
    }

    /// Reload the last input, language, result and history from storage.
    /// Missing or unreadable values fall back to defaults.
    pub fn restore(&mut self) {
        self.input_code = self.storage.get_item(keys::INPUT_CODE).unwrap_or_default();
        self.language = self
            .storage
            .get_item(keys::LANGUAGE)
            .and_then(|l| Language::parse(l.trim()))
            .unwrap_or_default();
        self.reviewed_result = self.storage.get_item(keys::REVIEWED_RESULT).unwrap_or_default();

        if let Some(mut cached) = self.storage.load_cached::<Vec<HistoryEntry>>(keys::HISTORY) {
            cached.data.truncate(HISTORY_LIMIT);
            self.history = cached;
        }
        debug!(
            input_len = self.input_code.len(),
            language = %self.language,
            history = self.history.data.len(),
            "Restored review state"
        );
    }

    pub fn input_code(&self) -> &str {
        &self.input_code
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn reviewed_result(&self) -> &str {
        &self.reviewed_result
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history.data
    }

    /// How long ago the history was last written, e.g. "5m ago"
    pub fn history_age(&self) -> String {
        self.history.age_display()
    }

    pub fn history_is_stale(&self) -> bool {
        self.history.is_stale()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.input_code = code.into();
        self.persist(keys::INPUT_CODE, &self.input_code);
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.persist(keys::LANGUAGE, self.language.as_str());
    }

    /// Clear the input and the current result, keeping history.
    pub fn clear_current(&mut self) {
        self.input_code.clear();
        self.reviewed_result.clear();
        self.forget(keys::INPUT_CODE);
        self.forget(keys::REVIEWED_RESULT);
    }

    /// Reset everything, history included, and remove every persisted
    /// review key.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.input_code.clear();
        self.language = Language::default();
        self.reviewed_result.clear();
        self.history = CachedData::new(Vec::new());
        self.error = None;

        for key in keys::REVIEW_KEYS {
            self.storage
                .remove_item(key)
                .map_err(|e| self.fail(StoreError::Storage(e.to_string())))?;
        }
        info!("Cleared all review data");
        Ok(())
    }

    /// Validate a submission and prepare it for sending.
    ///
    /// Fails with `Validation` for blank code or an unset language and with
    /// `Auth` when `token` is absent, in both cases without touching the
    /// network. On success the previous result is cleared and `loading` is
    /// raised until [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(
        &mut self,
        token: Option<&str>,
        code: &str,
        language: Language,
    ) -> Result<ReviewJob, StoreError> {
        self.error = None;

        if code.trim().is_empty() {
            return Err(self.fail(StoreError::Validation(CODE_REQUIRED.to_string())));
        }
        if language.as_str().trim().is_empty() {
            return Err(self.fail(StoreError::Validation(LANGUAGE_REQUIRED.to_string())));
        }
        let token = match token {
            Some(t) => t.to_string(),
            None => return Err(self.fail(StoreError::Auth(AUTH_REQUIRED.to_string()))),
        };

        self.input_code = code.to_string();
        self.language = language.clone();
        self.reviewed_result.clear();
        self.loading = true;
        self.submission += 1;
        debug!(
            language = %language,
            chars = code.len(),
            submission = self.submission,
            "Submitting code for review"
        );

        Ok(ReviewJob {
            backend: Arc::clone(&self.backend),
            token,
            request: ReviewRequest {
                code: code.to_string(),
                language,
            },
            submission: self.submission,
        })
    }

    /// Apply a review. On success the result is stored, one history entry
    /// is prepended and the current state is persisted.
    ///
    /// Only the latest submission is applied. An outcome for a job that a
    /// later [`begin_submit`](Self::begin_submit) superseded is dropped and
    /// yields `Ok(None)` with the store untouched.
    pub fn finish_submit(
        &mut self,
        outcome: SubmitOutcome,
    ) -> Result<Option<String>, StoreError> {
        if outcome.submission != self.submission {
            debug!(
                submission = outcome.submission,
                latest = self.submission,
                "Dropping superseded review"
            );
            return Ok(None);
        }
        self.loading = false;
        let result = match outcome.result {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Review failed");
                return Err(self.fail(e));
            }
        };

        let ReviewRequest { code, language } = outcome.request;
        info!(language = %language, result_len = result.len(), "Review received");

        self.reviewed_result = result.clone();
        let mut history = std::mem::take(&mut self.history.data);
        history.insert(0, HistoryEntry::new(code, language, result.clone()));
        history.truncate(HISTORY_LIMIT);
        self.replace_history(history);

        self.persist(keys::INPUT_CODE, &self.input_code);
        self.persist(keys::LANGUAGE, self.language.as_str());
        self.persist(keys::REVIEWED_RESULT, &self.reviewed_result);
        Ok(Some(result))
    }

    pub async fn submit(
        &mut self,
        token: Option<&str>,
        code: &str,
        language: Language,
    ) -> Result<String, StoreError> {
        let job = self.begin_submit(token, code, language)?;
        let outcome = job.run().await;
        // Nothing can begin another submission while this one holds `&mut self`
        Ok(self.finish_submit(outcome)?.unwrap_or_default())
    }

    pub fn begin_fetch_history(&mut self, token: Option<&str>) -> Result<HistoryJob, StoreError> {
        self.begin_history(token, HistoryAction::Fetch)
    }

    pub fn begin_delete_history(&mut self, token: Option<&str>) -> Result<HistoryJob, StoreError> {
        self.begin_history(token, HistoryAction::Delete)
    }

    fn begin_history(
        &mut self,
        token: Option<&str>,
        action: HistoryAction,
    ) -> Result<HistoryJob, StoreError> {
        self.error = None;
        let token = match token {
            Some(t) => t.to_string(),
            None => return Err(self.fail(StoreError::Auth(AUTH_REQUIRED.to_string()))),
        };
        self.loading = true;
        Ok(HistoryJob {
            backend: Arc::clone(&self.backend),
            token,
            action,
        })
    }

    /// Apply a history fetch or delete. A fetch replaces local history with
    /// the backend's list; a delete clears it only once confirmed.
    pub fn finish_history(&mut self, outcome: HistoryOutcome) -> Result<(), StoreError> {
        self.loading = false;
        match outcome {
            HistoryOutcome::Fetched(Ok(mut entries)) => {
                debug!(count = entries.len(), "History fetched");
                entries.truncate(HISTORY_LIMIT);
                self.replace_history(entries);
                Ok(())
            }
            HistoryOutcome::Deleted(Ok(())) => {
                info!("History deleted");
                self.replace_history(Vec::new());
                Ok(())
            }
            HistoryOutcome::Fetched(Err(e)) | HistoryOutcome::Deleted(Err(e)) => {
                error!(error = %e, "History request failed");
                Err(self.fail(e))
            }
        }
    }

    pub async fn fetch_history(&mut self, token: Option<&str>) -> Result<(), StoreError> {
        let job = self.begin_fetch_history(token)?;
        let outcome = job.run().await;
        self.finish_history(outcome)
    }

    pub async fn delete_history(&mut self, token: Option<&str>) -> Result<(), StoreError> {
        let job = self.begin_delete_history(token)?;
        let outcome = job.run().await;
        self.finish_history(outcome)
    }

    fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = CachedData::new(entries);
        if let Err(e) = self.storage.set_json(keys::HISTORY, &self.history) {
            warn!(error = %e, "Failed to persist history");
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn!(key, error = %e, "Failed to persist review state");
        }
    }

    fn forget(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!(key, error = %e, "Failed to remove review state");
        }
    }

    fn fail(&mut self, err: StoreError) -> StoreError {
        self.error = Some(err.to_string());
        err
    }
}
