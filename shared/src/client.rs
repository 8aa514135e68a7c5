//! Client-related types shared between the API client and the admin UI
//!
//! Request/response DTOs for the auth endpoints. The remaining resource
//! DTOs live next to their entities in [`crate::models`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request. The server accepts either a username or an email as
/// the identifier; exactly one of the two is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    pub fn with_username(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            email: None,
            password: password.into(),
        }
    }

    pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: None,
            email: Some(email.into()),
            password: password.into(),
        }
    }
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Identity attached to a session
///
/// `role` stays a plain string here: the server owns the role
/// vocabulary and the client only ever compares against "admin".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl UserInfo {
    /// Synthetic identity stored for API-key sessions. The key itself is
    /// validated by the server on every request, so the client only
    /// needs a placeholder user to render.
    pub fn api_key_user() -> Self {
        Self {
            id: "api-user".to_string(),
            username: "api-user".to_string(),
            role: "admin".to_string(),
            first_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_carries_exactly_one_identifier() {
        let by_name = serde_json::to_value(LoginRequest::with_username("admin", "pw")).unwrap();
        assert_eq!(by_name["username"], "admin");
        assert!(by_name.get("email").is_none());

        let by_email = serde_json::to_value(LoginRequest::with_email("a@b.com", "pw")).unwrap();
        assert_eq!(by_email["email"], "a@b.com");
        assert!(by_email.get("username").is_none());
    }
}
