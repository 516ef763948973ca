//! Authentication module for managing user sessions and token storage.
//!
//! This module provides:
//! - `SessionManager`: access/refresh token lifecycle with background renewal
//! - `TokenStore`: secure persistence of the two token secrets, with an
//!   OS keychain implementation (`KeyringStore`) and an in-process one
//!   (`MemoryStore`)
//!
//! The access token is renewed every 4 minutes while a refresh token exists.

pub mod credentials;
pub mod session;

pub use credentials::{KeyringStore, MemoryStore, TokenKey, TokenStore};
pub use session::{AuthApi, Session, SessionManager};
