//! REST API client module for the job board backend.
//!
//! This module provides the `ApiClient` for the auth, job, application,
//! and CV endpoints, speaking JSON over HTTPS.
//!
//! The API uses JWT bearer authentication: a short-lived access token on
//! every authenticated request, renewed via the refresh endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, MAX_CV_UPLOAD_BYTES};
pub use error::ApiError;
