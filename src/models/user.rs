//! User model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use validator::Validate;

use crate::db::store::Entity;

/// Persisted user account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    #[serde(skip_serializing)]
    pub created_by: Option<i32>,
    #[serde(skip_serializing)]
    pub updated_by: Option<i32>,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const NAME: &'static str = "User";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "password_hash",
        "is_active",
        "is_superuser",
        "created_at",
        "updated_at",
        "deleted_at",
        "is_deleted",
        "created_by",
        "updated_by",
    ];

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            is_active: row.get("is_active"),
            is_superuser: row.get("is_superuser"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
            is_deleted: row.get("is_deleted"),
            created_by: row.get("created_by"),
            updated_by: row.get("updated_by"),
        }
    }
}

/// Request to create a user
#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_create_rules() {
        let valid = UserCreate {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = UserCreate {
            email: "nope".to_string(),
            ..valid_user()
        };
        assert!(bad_email.validate().is_err());

        let short_password = UserCreate {
            password: "short".to_string(),
            ..valid_user()
        };
        assert!(short_password.validate().is_err());

        let short_username = UserCreate {
            username: "ab".to_string(),
            ..valid_user()
        };
        assert!(short_username.validate().is_err());
    }

    #[test]
    fn test_user_update_allows_absent_fields() {
        let empty = UserUpdate {
            username: None,
            email: None,
            password: None,
        };
        assert!(empty.validate().is_ok());

        let bad = UserUpdate {
            username: None,
            email: Some("nope".to_string()),
            password: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            is_deleted: false,
            created_by: None,
            updated_by: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "alice");
    }

    fn valid_user() -> UserCreate {
        UserCreate {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
        }
    }
}
