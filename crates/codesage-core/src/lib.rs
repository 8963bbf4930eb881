//! Core library for CodeSage.
//!
//! This crate contains everything that does not depend on a particular
//! front-end: the REST client for the review backend, the session and review
//! stores, local persistence, the streaming revealer, and the markdown
//! formatter used to render AI responses.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod guard;
pub mod models;
pub mod reveal;
pub mod storage;
pub mod store;
pub mod utils;

pub use error::StoreError;
