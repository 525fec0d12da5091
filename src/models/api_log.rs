//! Request and error log models
//!
//! Rows are written by the edge audit middleware; this service only reads
//! them back out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio_postgres::Row;

use crate::db::store::Entity;

/// One logged API request
#[derive(Debug, Clone, Serialize)]
pub struct ApiLog {
    pub id: i32,
    pub url: String,
    pub method: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<Value>,
    pub header: Option<Value>,
    pub response: Option<Value>,
    pub system_details: Option<Value>,
    pub extra: Option<Value>,
    pub user_id: Option<i32>,
    pub status_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ApiLog {
    const TABLE: &'static str = "api_logs";
    const NAME: &'static str = "API log";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "url",
        "method",
        "ip",
        "user_agent",
        "body",
        "header",
        "response",
        "system_details",
        "extra",
        "user_id",
        "status_code",
        "created_at",
    ];

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            url: row.get("url"),
            method: row.get("method"),
            ip: row.get("ip"),
            user_agent: row.get("user_agent"),
            body: row.get("body"),
            header: row.get("header"),
            response: row.get("response"),
            system_details: row.get("system_details"),
            extra: row.get("extra"),
            user_id: row.get("user_id"),
            status_code: row.get("status_code"),
            created_at: row.get("created_at"),
        }
    }
}

/// One logged request failure
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLog {
    pub id: i32,
    pub url: String,
    pub method: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<Value>,
    pub header: Option<Value>,
    pub response: Option<Value>,
    pub system_details: Option<Value>,
    pub extra: Option<Value>,
    pub user_id: Option<i32>,
    pub status_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ErrorLog {
    const TABLE: &'static str = "error_logs";
    const NAME: &'static str = "Error log";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "url",
        "method",
        "ip",
        "user_agent",
        "body",
        "header",
        "response",
        "system_details",
        "extra",
        "user_id",
        "status_code",
        "created_at",
    ];

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            url: row.get("url"),
            method: row.get("method"),
            ip: row.get("ip"),
            user_agent: row.get("user_agent"),
            body: row.get("body"),
            header: row.get("header"),
            response: row.get("response"),
            system_details: row.get("system_details"),
            extra: row.get("extra"),
            user_id: row.get("user_id"),
            status_code: row.get("status_code"),
            created_at: row.get("created_at"),
        }
    }
}
