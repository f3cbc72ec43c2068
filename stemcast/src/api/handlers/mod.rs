//! HTTP request handlers for all API endpoints.
//!
//! - [`health`]: liveness greeting
//! - [`media`]: media upload, audio extraction and file retrieval
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] for request-level failures, which
//! converts to an appropriate HTTP status. Extraction failures and retrieval
//! misses are not errors at this level; they are encoded in 200 response
//! bodies (see [`crate::api::models::media`]).

pub mod health;
pub mod media;
