//! Bodega Client - HTTP client for the retail management API
//!
//! Provides the REST API client, the file-backed credential store and
//! the session store with its pending/authenticated/anonymous
//! lifecycle.

pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use session::{AuthMethod, AuthState, Session, SessionStore};
pub use storage::{CredentialStore, StorageError, StoredCredentials};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, LoginResponse, UserInfo};
