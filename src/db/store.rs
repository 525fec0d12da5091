//! Generic CRUD store
//!
//! Insert, paginated list, retrieve, partial update, and delete operations
//! parameterized by the [`Entity`] trait. Each entity declares its table,
//! display name, and column list; the store builds the SQL and maps rows
//! back. Works against both pooled clients and open transactions.
//!
//! Read paths never return soft-deleted rows.

use chrono::Utc;
use tokio_postgres::{types::ToSql, GenericClient, Row};

use crate::error::{map_db_error, AppError};
use crate::pagination::{Page, PageMeta, PageParams};

/// A persisted record the generic store can operate on.
///
/// Every table carries the audit column set (`created_at`, `updated_at`,
/// `deleted_at`, `is_deleted`, `created_by`, `updated_by`); `COLUMNS` lists
/// the subset the entity reads back.
pub trait Entity: Sized {
    /// Table name in the database
    const TABLE: &'static str;
    /// Human-readable name used in error messages
    const NAME: &'static str;
    /// Column list, in `from_row` order
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row) -> Self;

    fn select_list() -> String {
        Self::COLUMNS.join(", ")
    }

    fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found.", Self::NAME))
    }
}

/// A set of column assignments built from only the fields present in an
/// update payload. Unset fields are never touched.
pub struct Changes<'a> {
    columns: Vec<&'static str>,
    values: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Changes<'a> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn set(&mut self, column: &'static str, value: &'a (dyn ToSql + Sync)) {
        self.columns.push(column);
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for Changes<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert one row and return the stored entity.
///
/// `columns` and `values` cover the caller-supplied fields; defaulted
/// columns come back through `RETURNING`. Uniqueness violations surface as
/// a conflict; callers needing a pre-insert existence check (duplicate
/// username, email) must run it themselves.
pub async fn insert<E, C>(
    client: &C,
    columns: &[&str],
    values: &[&(dyn ToSql + Sync)],
) -> Result<E, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let sql = insert_sql::<E>(columns);
    let row = client
        .query_one(sql.as_str(), values)
        .await
        .map_err(map_db_error)?;
    Ok(E::from_row(&row))
}

/// Fetch one page of entities plus pagination metadata.
///
/// `order_by` is the caller-supplied ordering. Invalid page parameters and
/// out-of-range pages are rejected.
pub async fn fetch_page<E, C>(
    client: &C,
    order_by: &str,
    params: &PageParams,
) -> Result<Page<E>, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    params.validate()?;

    let count_row = client
        .query_one(count_sql::<E>().as_str(), &[])
        .await
        .map_err(map_db_error)?;
    let total: i64 = count_row.get(0);

    let meta = PageMeta::compute(total, params)?;

    let rows = client
        .query(
            select_page_sql::<E>(order_by).as_str(),
            &[&params.offset(), &params.page_size],
        )
        .await
        .map_err(map_db_error)?;

    Ok(Page {
        items: rows.iter().map(E::from_row).collect(),
        meta,
    })
}

/// Fetch a single entity by id.
pub async fn fetch_by_id<E, C>(client: &C, id: i32) -> Result<E, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    fetch_optional::<E, C>(client, "id = $1", &[&id])
        .await?
        .ok_or_else(E::not_found)
}

/// Fetch the first entity matching `filter`, if any.
pub async fn fetch_optional<E, C>(
    client: &C,
    filter: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Option<E>, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE ({}) AND is_deleted = FALSE",
        E::select_list(),
        E::TABLE,
        filter
    );
    let row = client
        .query_opt(sql.as_str(), params)
        .await
        .map_err(map_db_error)?;
    Ok(row.map(|r| E::from_row(&r)))
}

/// Fetch all entities matching `filter` in the given order.
pub async fn fetch_where<E, C>(
    client: &C,
    filter: &str,
    order_by: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Vec<E>, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE ({}) AND is_deleted = FALSE ORDER BY {}",
        E::select_list(),
        E::TABLE,
        filter,
        order_by
    );
    let rows = client
        .query(sql.as_str(), params)
        .await
        .map_err(map_db_error)?;
    Ok(rows.iter().map(E::from_row).collect())
}

/// Apply a partial update and return the stored entity.
///
/// Only the columns in `changes` are assigned; `updated_at` is always
/// touched. An empty change set degenerates to a plain fetch.
pub async fn update_by_id<E, C>(client: &C, id: i32, changes: Changes<'_>) -> Result<E, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    if changes.is_empty() {
        return fetch_by_id::<E, C>(client, id).await;
    }

    let now = Utc::now();
    let sql = update_sql::<E>(&changes.columns);
    let mut params: Vec<&(dyn ToSql + Sync)> = changes.values;
    params.push(&now);
    params.push(&id);

    let row = client
        .query_opt(sql.as_str(), &params)
        .await
        .map_err(map_db_error)?;
    match row {
        Some(row) => Ok(E::from_row(&row)),
        None => Err(E::not_found()),
    }
}

/// Flag an entity deleted without removing the row.
///
/// `is_deleted` and `deleted_at` are set together in one statement.
pub async fn soft_delete_by_id<E, C>(
    client: &C,
    id: i32,
    deleted_by: Option<i32>,
) -> Result<(), AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let now = Utc::now();
    let sql = format!(
        "UPDATE {} SET is_deleted = TRUE, deleted_at = $1, updated_at = $1, updated_by = $2 \
         WHERE id = $3 AND is_deleted = FALSE",
        E::TABLE
    );
    let affected = client
        .execute(sql.as_str(), &[&now, &deleted_by, &id])
        .await
        .map_err(map_db_error)?;
    if affected == 0 {
        return Err(E::not_found());
    }
    Ok(())
}

/// Physically delete a row. Legacy path, kept for the users router.
pub async fn hard_delete_by_id<E, C>(client: &C, id: i32) -> Result<(), AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
    let affected = client
        .execute(sql.as_str(), &[&id])
        .await
        .map_err(map_db_error)?;
    if affected == 0 {
        return Err(E::not_found());
    }
    Ok(())
}

/// Existence check used by routers for domain-specific pre-checks.
///
/// The filter is taken as-is; uniqueness pre-checks deliberately see
/// soft-deleted rows too, since unique indexes span them.
pub async fn exists<E, C>(
    client: &C,
    filter: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<bool, AppError>
where
    E: Entity,
    C: GenericClient + Sync,
{
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {})", E::TABLE, filter);
    let row = client
        .query_one(sql.as_str(), params)
        .await
        .map_err(map_db_error)?;
    Ok(row.get(0))
}

// ============================================
// SQL builders
// ============================================

fn insert_sql<E: Entity>(columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        E::TABLE,
        columns.join(", "),
        placeholders.join(", "),
        E::select_list()
    )
}

fn count_sql<E: Entity>() -> String {
    format!("SELECT COUNT(*) FROM {} WHERE is_deleted = FALSE", E::TABLE)
}

fn select_page_sql<E: Entity>(order_by: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE is_deleted = FALSE ORDER BY {} OFFSET $1 LIMIT $2",
        E::select_list(),
        E::TABLE,
        order_by
    )
}

fn update_sql<E: Entity>(columns: &[&'static str]) -> String {
    let mut assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ${}", col, i + 1))
        .collect();
    let n = columns.len();
    assignments.push(format!("updated_at = ${}", n + 1));
    format!(
        "UPDATE {} SET {} WHERE id = ${} AND is_deleted = FALSE RETURNING {}",
        E::TABLE,
        assignments.join(", "),
        n + 2,
        E::select_list()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Widget;

    impl Entity for Widget {
        const TABLE: &'static str = "widgets";
        const NAME: &'static str = "Widget";
        const COLUMNS: &'static [&'static str] = &["id", "label", "created_at", "updated_at"];

        fn from_row(_row: &Row) -> Self {
            Widget
        }
    }

    #[test]
    fn test_insert_sql() {
        let sql = insert_sql::<Widget>(&["label", "created_at", "updated_at"]);
        assert_eq!(
            sql,
            "INSERT INTO widgets (label, created_at, updated_at) VALUES ($1, $2, $3) \
             RETURNING id, label, created_at, updated_at"
        );
    }

    #[test]
    fn test_count_sql_excludes_deleted_rows() {
        assert_eq!(
            count_sql::<Widget>(),
            "SELECT COUNT(*) FROM widgets WHERE is_deleted = FALSE"
        );
    }

    #[test]
    fn test_select_page_sql() {
        let sql = select_page_sql::<Widget>("created_at DESC");
        assert_eq!(
            sql,
            "SELECT id, label, created_at, updated_at FROM widgets WHERE is_deleted = FALSE \
             ORDER BY created_at DESC OFFSET $1 LIMIT $2"
        );
    }

    #[test]
    fn test_update_sql_touches_updated_at_last() {
        let sql = update_sql::<Widget>(&["label"]);
        assert_eq!(
            sql,
            "UPDATE widgets SET label = $1, updated_at = $2 WHERE id = $3 AND is_deleted = FALSE \
             RETURNING id, label, created_at, updated_at"
        );
    }

    #[test]
    fn test_changes_tracks_only_present_fields() {
        let label = "renamed".to_string();
        let count: i64 = 4;

        let mut changes = Changes::new();
        assert!(changes.is_empty());

        changes.set("label", &label);
        changes.set("count", &count);

        assert!(!changes.is_empty());
        assert_eq!(changes.columns, vec!["label", "count"]);
        assert_eq!(changes.values.len(), 2);
    }

    #[test]
    fn test_entity_not_found_message() {
        let err = Widget::not_found();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Widget not found."));
    }
}
