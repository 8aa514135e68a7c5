//! Persisted credential storage
//!
//! A small JSON file holding four string-valued fields: the bearer
//! token, the API key, the auth method and the serialized user. This is
//! the sole persistence mechanism in the system; it survives restarts
//! and is the client-side analogue of browser local storage.
//!
//! The store is read at request time by the API client and written only
//! by the session store's login/logout operations. A 401 response also
//! clears it as a side effect.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk credential fields. All values are strings; `user` is itself
/// serialized JSON, mirroring how the fields were originally stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
            && self.api_key.is_none()
            && self.auth_method.is_none()
            && self.user.is_none()
    }

    /// Deserialize the stored user, if any
    pub fn user_info(&self) -> Option<UserInfo> {
        self.user
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// File-backed credential store
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    data: Mutex<StoredCredentials>,
}

impl CredentialStore {
    /// Open the store, loading existing credentials when the file is
    /// present. A corrupt file is treated as absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt credential file");
                StoredCredentials::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredCredentials::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current credential fields
    pub fn snapshot(&self) -> StoredCredentials {
        self.lock().clone()
    }

    /// Persist a token-based session
    pub fn store_token(&self, token: &str, user: &UserInfo) -> Result<(), StorageError> {
        let data = StoredCredentials {
            token: Some(token.to_string()),
            api_key: None,
            auth_method: Some("token".to_string()),
            user: Some(serde_json::to_string(user)?),
        };
        self.replace(data)
    }

    /// Persist an API-key session
    pub fn store_api_key(&self, key: &str, user: &UserInfo) -> Result<(), StorageError> {
        let data = StoredCredentials {
            token: None,
            api_key: Some(key.to_string()),
            auth_method: Some("api-key".to_string()),
            user: Some(serde_json::to_string(user)?),
        };
        self.replace(data)
    }

    /// Clear every persisted field and remove the file. Idempotent.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = StoredCredentials::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn replace(&self, data: StoredCredentials) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&data)?)?;
        *self.lock() = data;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredCredentials> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
