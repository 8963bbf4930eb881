//! REST API client module for the CodeSage review backend.
//!
//! This module provides the `ApiClient` for communicating with the backend
//! and the `ReviewBackend` trait the stores are written against, so they can
//! be exercised without a network.
//!
//! The backend uses JWT bearer token authentication obtained through the
//! `/auth/login` and `/auth/register` endpoints.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::ReviewBackend;
pub use client::ApiClient;
pub use error::ApiError;
