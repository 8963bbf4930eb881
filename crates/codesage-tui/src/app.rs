//! Application state management for the CodeSage terminal client.
//!
//! `App` owns the stores, the streaming revealer and all UI state. Network
//! work runs on spawned tasks; their results come back over an mpsc channel
//! and are applied to the stores in `check_background_tasks`, once per frame.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use codesage_core::api::ApiClient;
use codesage_core::auth::{CredentialStore, SessionData};
use codesage_core::config::Config;
use codesage_core::guard::{self, GuardDecision, Route};
use codesage_core::models::{LoginRequest, RegisterRequest};
use codesage_core::reveal::Revealer;
use codesage_core::storage::LocalStorage;
use codesage_core::store::{HistoryOutcome, Stores, SubmitOutcome};
use codesage_core::StoreError;

use crate::editor::CodeEditor;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Lines scrolled by page up/down in the review pane.
pub const PAGE_SCROLL_SIZE: u16 = 10;

/// Environment variables prefilling the auth form
pub const EMAIL_ENV: &str = "CODESAGE_EMAIL";
pub const PASSWORD_ENV: &str = "CODESAGE_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingClearAll,
    ConfirmingDeleteHistory,
    Quitting,
}

/// Which form the auth overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Auth form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFocus {
    Username,
    Email,
    Password,
    Button,
}

impl AuthFocus {
    /// Next field in the form for `mode`, wrapping around.
    /// The username field only exists when registering.
    pub fn next(&self, mode: AuthMode) -> Self {
        match (self, mode) {
            (AuthFocus::Username, _) => AuthFocus::Email,
            (AuthFocus::Email, _) => AuthFocus::Password,
            (AuthFocus::Password, _) => AuthFocus::Button,
            (AuthFocus::Button, AuthMode::Login) => AuthFocus::Email,
            (AuthFocus::Button, AuthMode::Register) => AuthFocus::Username,
        }
    }

    pub fn prev(&self, mode: AuthMode) -> Self {
        match (self, mode) {
            (AuthFocus::Username, _) => AuthFocus::Button,
            (AuthFocus::Email, AuthMode::Login) => AuthFocus::Button,
            (AuthFocus::Email, AuthMode::Register) => AuthFocus::Username,
            (AuthFocus::Password, _) => AuthFocus::Email,
            (AuthFocus::Button, _) => AuthFocus::Password,
        }
    }
}

/// Focus within the reviewer view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Review,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the event loop.
enum TaskResult {
    Auth {
        email: String,
        password: String,
        outcome: Result<SessionData, StoreError>,
    },
    Review(SubmitOutcome),
    History(HistoryOutcome),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub stores: Stores,
    pub revealer: Revealer,

    // UI State
    pub state: AppState,
    pub route: Route,
    pub focus: Focus,
    pub editor: CodeEditor,
    pub review_scroll: u16,
    pub history_selection: usize,
    pub history_scroll: u16,
    pub history_code_expanded: bool,

    // Auth form state
    pub auth_mode: AuthMode,
    pub auth_focus: AuthFocus,
    pub auth_username: String,
    pub auth_email: String,
    pub auth_password: String,

    // Status message
    pub status_message: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Build the app from config: open local storage, create the API client
    /// and restore both stores.
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");
        let storage = LocalStorage::new(data_dir)?;

        let api_url = config.api_url();
        info!(api_url = %api_url, "Using review backend");
        let api = ApiClient::new(api_url)?;

        let mut stores = Stores::new(Arc::new(api), storage);
        stores.restore();

        let mut revealer = Revealer::new(config.reveal_timing());
        if !stores.review.reviewed_result().is_empty() {
            revealer.start(stores.review.reviewed_result());
            revealer.finish();
        }

        let auth_email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let auth_password = Self::initial_password(&config, &auth_email);

        let route = if stores.session.is_authenticated() {
            Route::CodeReviewer
        } else {
            Route::Auth
        };

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let editor = CodeEditor::new(stores.review.input_code());

        let mut app = Self {
            config,
            stores,
            revealer,
            state: AppState::Normal,
            route,
            focus: Focus::Review,
            editor,
            review_scroll: 0,
            history_selection: 0,
            history_scroll: 0,
            history_code_expanded: false,
            auth_mode: AuthMode::Login,
            auth_focus: AuthFocus::Email,
            auth_username: String::new(),
            auth_email,
            auth_password,
            status_message: None,
            task_rx,
            task_tx,
        };
        if !app.auth_email.is_empty() {
            app.auth_focus = AuthFocus::Password;
        }
        Ok(app)
    }

    fn initial_password(config: &Config, email: &str) -> String {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            return password;
        }
        if config.remember_credentials && !email.is_empty() && CredentialStore::has_credentials(email) {
            match CredentialStore::get_password(email) {
                Ok(password) => return password,
                Err(e) => warn!(error = %e, "Failed to read stored password"),
            }
        }
        String::new()
    }

    /// Refresh history in the background when signed in and the local copy
    /// is stale or empty.
    pub fn refresh_history_if_stale(&mut self) {
        if self.stores.session.is_authenticated()
            && (self.stores.review.history_is_stale() || self.stores.review.history().is_empty())
        {
            self.fetch_history();
        }
    }

    // =========================================================================
    // Route guard
    // =========================================================================

    /// Current guard decision for the active route
    pub fn guard_decision(&self) -> GuardDecision {
        guard::decide(
            self.route,
            self.stores.session.status(),
            self.stores.session.loading(),
        )
    }

    /// Follow any redirect the guard asks for. Called once per frame.
    pub fn apply_guard(&mut self) {
        if let GuardDecision::Redirect(target) = self.guard_decision() {
            debug!(from = ?self.route, to = ?target, "Route redirect");
            self.route = target;
            if target == Route::Auth {
                self.start_auth();
            }
        }
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
        if route == Route::History {
            self.history_selection = 0;
            self.history_scroll = 0;
            self.refresh_history_if_stale();
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Reset the auth form for a fresh attempt
    pub fn start_auth(&mut self) {
        self.auth_focus = match self.auth_mode {
            AuthMode::Register => AuthFocus::Username,
            AuthMode::Login if self.auth_email.is_empty() => AuthFocus::Email,
            AuthMode::Login => AuthFocus::Password,
        };
    }

    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = self.auth_mode.toggle();
        self.stores.session.clear_error();
        self.start_auth();
    }

    /// Submit the auth form. Validation failures are left in the session
    /// store's error; otherwise the request runs in the background.
    pub fn submit_auth(&mut self) {
        let email = self.auth_email.trim().to_string();
        let password = self.auth_password.clone();

        let job = match self.auth_mode {
            AuthMode::Login => self.stores.session.begin_login(LoginRequest {
                email: email.clone(),
                password: password.clone(),
            }),
            AuthMode::Register => self.stores.session.begin_register(RegisterRequest {
                username: self.auth_username.trim().to_string(),
                email: email.clone(),
                password: password.clone(),
            }),
        };

        match job {
            Ok(job) => {
                self.status_message = Some(format!("{}...", self.auth_mode.title()));
                self.spawn_task(async move {
                    TaskResult::Auth {
                        email,
                        password,
                        outcome: job.run().await,
                    }
                });
            }
            Err(e) => debug!(error = %e, "Auth form rejected"),
        }
    }

    fn finish_auth(&mut self, email: String, password: String, outcome: Result<SessionData, StoreError>) {
        let registering = self.auth_mode == AuthMode::Register;
        match self.stores.session.finish_auth(outcome) {
            Ok(()) => {}
            Err(StoreError::Auth(_)) => {
                self.status_message = None;
                // A remembered password the server rejects is stale
                if self.config.remember_credentials && CredentialStore::has_credentials(&email) {
                    if let Err(e) = CredentialStore::delete(&email) {
                        warn!(error = %e, "Failed to delete stored credentials");
                    }
                }
                return;
            }
            Err(_) => {
                self.status_message = None;
                return;
            }
        }

        if self.config.remember_credentials {
            if let Err(e) = CredentialStore::store(&email, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.auth_password.clear();
        self.auth_username.clear();
        self.status_message = Some(if registering {
            "Registration & login successful!".to_string()
        } else {
            "Login successful!".to_string()
        });
        self.refresh_history_if_stale();
    }

    pub fn logout(&mut self) {
        self.stores.session.logout();
        self.status_message = Some("Logged out".to_string());
    }

    // =========================================================================
    // Reviewing
    // =========================================================================

    /// Copy the editor contents into the review store.
    pub fn sync_code(&mut self) {
        self.stores.review.set_code(self.editor.text());
    }

    pub fn cycle_language(&mut self, forward: bool) {
        let current = self.stores.review.language();
        let next = if forward { current.next() } else { current.prev() };
        self.stores.review.set_language(next);
    }

    pub fn submit_review(&mut self) {
        self.sync_code();
        let token = self.stores.session.token().map(str::to_string);
        let code = self.editor.text().to_string();
        let language = self.stores.review.language().clone();

        match self.stores.review.begin_submit(token.as_deref(), &code, language) {
            Ok(job) => {
                self.revealer.reset();
                self.review_scroll = 0;
                self.status_message = Some("Reviewing...".to_string());
                self.spawn_task(async move { TaskResult::Review(job.run().await) });
            }
            Err(e) => self.report::<()>(Err(e)),
        }
    }

    pub fn clear_current(&mut self) {
        self.stores.review.clear_current();
        self.editor.clear();
        self.revealer.reset();
        self.review_scroll = 0;
    }

    pub fn clear_all(&mut self) {
        let result = self.stores.review.clear_all();
        self.editor.clear();
        self.revealer.reset();
        self.history_selection = 0;
        if result.is_ok() {
            self.status_message = Some("Cleared all review data".to_string());
        }
        self.report(result);
    }

    pub fn fetch_history(&mut self) {
        let token = self.stores.session.token().map(str::to_string);
        match self.stores.review.begin_fetch_history(token.as_deref()) {
            Ok(job) => self.spawn_task(async move { TaskResult::History(job.run().await) }),
            Err(e) => self.report::<()>(Err(e)),
        }
    }

    pub fn delete_history(&mut self) {
        let token = self.stores.session.token().map(str::to_string);
        match self.stores.review.begin_delete_history(token.as_deref()) {
            Ok(job) => self.spawn_task(async move { TaskResult::History(job.run().await) }),
            Err(e) => self.report::<()>(Err(e)),
        }
    }

    /// Route a review-store result through the stores (auth failures sign
    /// out) and surface any error on the status bar.
    fn report<T>(&mut self, result: Result<T, StoreError>) {
        if let Err(e) = self.stores.observe(result) {
            self.status_message = Some(e.to_string());
        }
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            if tx.send(result).await.is_err() {
                debug!("Task result dropped, app is shutting down");
            }
        });
    }

    /// Apply every completed background task
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Auth {
                email,
                password,
                outcome,
            } => self.finish_auth(email, password, outcome),
            TaskResult::Review(outcome) => {
                let result = self.stores.review.finish_submit(outcome);
                match self.stores.observe(result) {
                    Ok(Some(text)) => {
                        self.revealer.start(text);
                        self.status_message = Some("Code reviewed successfully!".to_string());
                    }
                    Ok(None) => {}
                    Err(e) => self.status_message = Some(e.to_string()),
                }
            }
            TaskResult::History(outcome) => {
                let deleted = matches!(outcome, HistoryOutcome::Deleted(Ok(())));
                let result = self.stores.review.finish_history(outcome);
                if result.is_ok() {
                    let count = self.stores.review.history().len();
                    self.history_selection = self.history_selection.min(count.saturating_sub(1));
                    if deleted {
                        self.status_message = Some("Code history deleted.".to_string());
                    }
                }
                self.report(result);
            }
        }
    }

    /// Whether any request is in flight
    pub fn is_busy(&self) -> bool {
        self.stores.session.loading() || self.stores.review.loading()
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- AuthFocus ---

    #[test]
    fn test_login_focus_skips_username() {
        let mode = AuthMode::Login;
        let mut focus = AuthFocus::Email;
        let mut seen = Vec::new();
        for _ in 0..3 {
            focus = focus.next(mode);
            seen.push(focus);
        }
        assert_eq!(seen, vec![AuthFocus::Password, AuthFocus::Button, AuthFocus::Email]);
        assert_eq!(AuthFocus::Email.prev(mode), AuthFocus::Button);
    }

    #[test]
    fn test_register_focus_cycles_all_fields() {
        let mode = AuthMode::Register;
        assert_eq!(AuthFocus::Button.next(mode), AuthFocus::Username);
        assert_eq!(AuthFocus::Email.prev(mode), AuthFocus::Username);
        assert_eq!(AuthFocus::Username.prev(mode), AuthFocus::Button);
    }

    #[test]
    fn test_auth_mode_toggle() {
        assert_eq!(AuthMode::Login.toggle(), AuthMode::Register);
        assert_eq!(AuthMode::Register.toggle(), AuthMode::Login);
    }

    // --- Input validation ---

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, '@'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(254, 'a'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, ' '));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\t'));
    }
}
