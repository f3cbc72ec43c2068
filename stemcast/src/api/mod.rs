//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Liveness** (`GET /`): fixed greeting
//! - **Upload** (`POST /upload`): multipart media upload with synchronous audio extraction
//! - **Retrieval** (`GET /uploads/{filename}`, `GET /audio/{filename}`): original and derived files
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! Interactive API documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
