use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ReviewBackend;
use crate::auth::{token, validate, Session, SessionData};
use crate::error::StoreError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::storage::LocalStorage;

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const NO_TOKEN_RECEIVED: &str = "No token received";
const NO_TOKEN_FOUND: &str = "No token found";
const TOKEN_EXPIRED: &str = "Token expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

enum AuthRequest {
    Login(LoginRequest),
    Register(RegisterRequest),
}

/// A validated login or registration, detached from the store so it can
/// run on a spawned task. Feed its outcome back through
/// [`SessionStore::finish_auth`].
pub struct AuthJob {
    backend: Arc<dyn ReviewBackend>,
    request: AuthRequest,
}

impl AuthJob {
    pub async fn run(self) -> Result<SessionData, StoreError> {
        let (response, email, fallback) = match &self.request {
            AuthRequest::Login(request) => {
                (self.backend.login(request).await, &request.email, LOGIN_FAILED)
            }
            AuthRequest::Register(request) => {
                (self.backend.register(request).await, &request.email, REGISTER_FAILED)
            }
        };
        let response = response.map_err(|e| StoreError::from_credentials_api(e, fallback))?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::Auth(NO_TOKEN_RECEIVED.to_string()))?;

        // Some backends only return the token
        let user = response.user.unwrap_or_else(|| User {
            id: String::new(),
            username: String::new(),
            email: email.clone(),
        });

        Ok(SessionData::new(token, user))
    }
}

/// Authentication state machine over the persisted session.
///
/// `Anonymous → Authenticating → Authenticated`, and back to `Anonymous` on
/// logout or failed verification. The async operations raise `loading`
/// while in flight and leave their failure in `error`.
pub struct SessionStore {
    backend: Arc<dyn ReviewBackend>,
    session: Session,
    status: SessionStatus,
    loading: bool,
    error: Option<String>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn ReviewBackend>, storage: LocalStorage) -> Self {
        Self {
            backend,
            session: Session::new(storage),
            status: SessionStatus::Anonymous,
            loading: false,
            error: None,
        }
    }

    /// Load the persisted session and verify it. Nothing stored means a
    /// plain anonymous start with no error.
    pub fn restore(&mut self) {
        if !self.session.has_stored() {
            debug!("No stored session");
            return;
        }
        self.session.load();
        if self.verify_token().is_ok() {
            info!("Restored session");
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
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

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn data(&self) -> Option<&SessionData> {
        self.session.data.as_ref()
    }

    /// Bearer token for authenticated calls, only while it is unexpired
    pub fn token(&self) -> Option<&str> {
        if self.is_authenticated() {
            self.session.valid_token()
        } else {
            None
        }
    }

    /// Validate a login form and move to `Authenticating`.
    pub fn begin_login(&mut self, request: LoginRequest) -> Result<AuthJob, StoreError> {
        validate::login(&request).map_err(|e| self.fail(e))?;
        Ok(self.begin(AuthRequest::Login(request)))
    }

    /// Validate a registration form and move to `Authenticating`.
    /// A successful registration also signs the user in.
    pub fn begin_register(&mut self, request: RegisterRequest) -> Result<AuthJob, StoreError> {
        validate::register(&request).map_err(|e| self.fail(e))?;
        Ok(self.begin(AuthRequest::Register(request)))
    }

    fn begin(&mut self, request: AuthRequest) -> AuthJob {
        self.status = SessionStatus::Authenticating;
        self.loading = true;
        self.error = None;
        AuthJob {
            backend: Arc::clone(&self.backend),
            request,
        }
    }

    /// Apply the outcome of an [`AuthJob`].
    pub fn finish_auth(&mut self, outcome: Result<SessionData, StoreError>) -> Result<(), StoreError> {
        self.loading = false;
        match outcome {
            Ok(data) => {
                info!(user = %data.user.display_name(), "Signed in");
                self.session.update(data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to persist session");
                }
                self.status = SessionStatus::Authenticated;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                self.status = SessionStatus::Anonymous;
                Err(self.fail(e))
            }
        }
    }

    pub async fn login(&mut self, request: LoginRequest) -> Result<(), StoreError> {
        let job = self.begin_login(request)?;
        let outcome = job.run().await;
        self.finish_auth(outcome)
    }

    pub async fn register(&mut self, request: RegisterRequest) -> Result<(), StoreError> {
        let job = self.begin_register(request)?;
        let outcome = job.run().await;
        self.finish_auth(outcome)
    }

    /// Local check of the held token. Fails closed: a missing, undecodable
    /// or expired token logs the user out and clears the persisted session.
    pub fn verify_token(&mut self) -> Result<(), StoreError> {
        let failure = match self.session.token() {
            None => Some(NO_TOKEN_FOUND),
            Some(t) if token::is_expired(t) => Some(TOKEN_EXPIRED),
            Some(_) => None,
        };

        match failure {
            None => {
                self.status = SessionStatus::Authenticated;
                self.error = None;
                Ok(())
            }
            Some(reason) => {
                info!(reason, "Session verification failed");
                self.drop_session();
                Err(self.fail(StoreError::Auth(reason.to_string())))
            }
        }
    }

    /// Forget the session in memory and on disk.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.drop_session();
        self.error = None;
    }

    fn drop_session(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
        self.status = SessionStatus::Anonymous;
        self.loading = false;
    }

    fn fail(&mut self, err: StoreError) -> StoreError {
        self.error = Some(err.to_string());
        err
    }
}
