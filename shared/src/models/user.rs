//! User (account) Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

/// User account (password is write-only and never present here)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Immutable after creation
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Create user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Update user payload. `username` is immutable and deliberately
/// absent; password changes go through their own flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    pub role: Role,
    pub active: bool,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Password change payload. Sent alone on `PUT /users/{id}` so no
/// other field of the record is touched.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserPasswordUpdate {
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

/// Payload for `PUT /users/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusUpdate {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_required_on_create_but_not_update() {
        let create = UserCreate {
            username: "cashier1".to_string(),
            password: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Employee,
            active: true,
        };
        assert!(create.validate().is_err());

        let update = UserUpdate {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Employee,
            active: true,
            password: None,
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn short_update_password_is_rejected() {
        let update = UserUpdate {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Manager,
            active: true,
            password: Some("123".to_string()),
        };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
