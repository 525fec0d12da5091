//! Stock and price history models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use validator::Validate;

use crate::db::store::Entity;

/// Persisted stock listing
#[derive(Debug, Clone, Serialize)]
pub struct Stock {
    pub id: i32,
    pub symbol: String,
    pub company_name: String,
    /// Price in minor currency units (cents)
    pub price: i64,
    pub last_updated: Option<DateTime<Utc>>,
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

impl Entity for Stock {
    const TABLE: &'static str = "stocks";
    const NAME: &'static str = "Stock";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "symbol",
        "company_name",
        "price",
        "last_updated",
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
            symbol: row.get("symbol"),
            company_name: row.get("company_name"),
            price: row.get("price"),
            last_updated: row.get("last_updated"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
            is_deleted: row.get("is_deleted"),
            created_by: row.get("created_by"),
            updated_by: row.get("updated_by"),
        }
    }
}

/// One row of price history; appended on creation and on every distinct
/// price change
#[derive(Debug, Clone, Serialize)]
pub struct StockHistory {
    #[serde(skip_serializing)]
    pub id: i32,
    pub stock_id: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl Entity for StockHistory {
    const TABLE: &'static str = "stock_history";
    const NAME: &'static str = "Stock history";
    const COLUMNS: &'static [&'static str] = &["id", "stock_id", "price", "created_at"];

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            stock_id: row.get("stock_id"),
            price: row.get("price"),
            created_at: row.get("created_at"),
        }
    }
}

/// Stock plus its full price history, for retrieve responses
#[derive(Debug, Serialize)]
pub struct StockWithHistory {
    #[serde(flatten)]
    pub stock: Stock,
    pub history: Vec<StockHistory>,
}

/// Request to create a stock
#[derive(Debug, Deserialize, Validate)]
pub struct StockCreate {
    #[validate(custom(function = "validate_symbol"))]
    pub symbol: String,
    #[validate(length(min = 1, max = 255, message = "company_name must be between 1 and 255 characters"))]
    pub company_name: String,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct StockUpdate {
    #[validate(custom(function = "validate_symbol"))]
    pub symbol: Option<String>,
    #[validate(length(min = 1, max = 255, message = "company_name must be between 1 and 255 characters"))]
    pub company_name: Option<String>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: Option<i64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Validate a ticker symbol
fn validate_symbol(symbol: &str) -> Result<(), validator::ValidationError> {
    // Uppercase letters, digits, and dots, starting with a letter
    let re = regex::Regex::new(r"^[A-Z][A-Z0-9.]{0,9}$").unwrap();

    if !re.is_match(symbol) {
        let mut err = validator::ValidationError::new("invalid_symbol");
        err.message = Some(
            "Symbol must be 1-10 uppercase letters, digits, or dots, starting with a letter".into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_rules() {
        for symbol in ["AAPL", "BRK.B", "X", "MSFT2"] {
            let req = StockCreate {
                symbol: symbol.to_string(),
                company_name: "Example Corp".to_string(),
                price: 100,
                last_updated: None,
            };
            assert!(req.validate().is_ok(), "{} should be valid", symbol);
        }

        for symbol in ["aapl", "", "1ABC", "TOOLONGSYMBOL", "A B"] {
            let req = StockCreate {
                symbol: symbol.to_string(),
                company_name: "Example Corp".to_string(),
                price: 100,
                last_updated: None,
            };
            assert!(req.validate().is_err(), "{} should be rejected", symbol);
        }
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let req = StockCreate {
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            price: -1,
            last_updated: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_stock_update_partial() {
        let price_only = StockUpdate {
            symbol: None,
            company_name: None,
            price: Some(19_950),
            last_updated: None,
        };
        assert!(price_only.validate().is_ok());
    }
}
