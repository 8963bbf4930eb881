//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: Token-based session persistence with JWT expiry checks
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//! - `token`: Decoding of the JWT `exp` claim
//! - `validate`: Client-side checks of the login and register forms

pub mod credentials;
pub mod session;
pub mod token;
pub mod validate;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
