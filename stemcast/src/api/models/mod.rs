//! API request and response data models.
//!
//! These structures define the public API contract. They are annotated with
//! `utoipa` for OpenAPI generation and kept separate from the handlers so
//! the wire shapes are visible in one place.
//!
//! - [`health`]: liveness greeting
//! - [`media`]: upload results and the body-encoded not-found shape

pub mod health;
pub mod media;
