//! Client library for the jobdeck job board API.
//!
//! The crate is organized around one authenticated session shared by all
//! consumers:
//!
//! - `auth`: session lifecycle (login, restore, logout, background token
//!   renewal) and secure token storage
//! - `api`: typed HTTP client for every backend endpoint
//! - `models`: boundary records for users, jobs, applications and CVs
//! - `config`: file and environment based configuration
//!
//! Consumers call [`SessionManager::valid_access_token`] before any
//! authenticated request and attach the result as a bearer header - the
//! `ApiClient` endpoint wrappers take the token as an argument for this
//! reason.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthApi, KeyringStore, MemoryStore, Session, SessionManager, TokenKey, TokenStore};
pub use config::Config;
