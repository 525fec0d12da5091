//! Blog post model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use validator::Validate;

use crate::db::store::Entity;

/// Persisted blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub content: String,
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

impl Entity for Post {
    const TABLE: &'static str = "posts";
    const NAME: &'static str = "Post";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "author_id",
        "title",
        "content",
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
            author_id: row.get("author_id"),
            title: row.get("title"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
            is_deleted: row.get("is_deleted"),
            created_by: row.get("created_by"),
            updated_by: row.get("updated_by"),
        }
    }
}

/// Request to create a post
#[derive(Debug, Deserialize, Validate)]
pub struct PostCreate {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub author_id: i32,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct PostUpdate {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_create_rules() {
        let valid = PostCreate {
            title: "Q2 earnings roundup".to_string(),
            content: "Margins held up better than expected.".to_string(),
            author_id: 1,
        };
        assert!(valid.validate().is_ok());

        let no_title = PostCreate {
            title: String::new(),
            content: "body".to_string(),
            author_id: 1,
        };
        assert!(no_title.validate().is_err());
    }

    #[test]
    fn test_post_update_partial() {
        let title_only = PostUpdate {
            title: Some("Updated title".to_string()),
            content: None,
        };
        assert!(title_only.validate().is_ok());

        let empty_title = PostUpdate {
            title: Some(String::new()),
            content: None,
        };
        assert!(empty_title.validate().is_err());
    }
}
