//! Catalog models and shared record queries
//!
//! Each model implements [`Record`], which carries its table layout and the
//! allowlists that filter queries are checked against.

pub mod author;
pub mod quote;
pub mod tag;

pub use author::Author;
pub use quote::Quote;
pub use tag::Tag;

use crate::filter::{Association, Attribute, Search, Sort};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

/// A table-backed model
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// Model name used in messages and display names
    const MODEL: &'static str;
    const TABLE: &'static str;
    /// Columns selected for a full record
    const COLUMNS: &'static [&'static str];
    /// Attributes reachable from filter parameters
    const FILTERABLE_ATTRIBUTES: &'static [Attribute];
    /// Associations reachable from filter parameters
    const FILTERABLE_ASSOCIATIONS: &'static [Association] = &[];
}

/// Label shown for a record: its name, or `"<Model> #<id>"` when blank
pub fn display_name(model: &str, id: i64, name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{} #{}", model, id),
    }
}

fn select<R: Record>() -> QueryBuilder<'static, Sqlite> {
    let columns: Vec<String> = R::COLUMNS
        .iter()
        .map(|c| format!("{}.{}", R::TABLE, c))
        .collect();
    QueryBuilder::new(format!("SELECT {} FROM {}", columns.join(", "), R::TABLE))
}

/// Fetch a record by id
pub async fn find<R: Record>(pool: &SqlitePool, id: i64) -> Result<R> {
    let mut qb = select::<R>();
    qb.push(format!(" WHERE {}.id = ", R::TABLE));
    qb.push_bind(id);

    qb.build_query_as::<R>()
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} {}", R::MODEL, id)))
}

/// True when a record with `id` exists
pub async fn exists<R: Record>(pool: &SqlitePool, id: i64) -> Result<bool> {
    let found: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
        R::TABLE
    ))
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(found)
}

/// Filtered, sorted page of records
pub async fn search<R: Record>(
    pool: &SqlitePool,
    search: &Search,
    sort: Sort,
    limit: i64,
    offset: i64,
) -> Result<Vec<R>> {
    let mut qb = select::<R>();
    search.push_where(&mut qb, R::TABLE);
    sort.push_order_by(&mut qb, R::TABLE);
    qb.push(" LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    Ok(qb.build_query_as::<R>().fetch_all(pool).await?)
}

/// Number of records matching `search`
pub async fn count<R: Record>(pool: &SqlitePool, search: &Search) -> Result<i64> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", R::TABLE));
    search.push_where(&mut qb, R::TABLE);

    Ok(qb.build_query_scalar::<i64>().fetch_one(pool).await?)
}

/// Every record ordered by id, for select and check-box options
pub async fn all<R: Record>(pool: &SqlitePool) -> Result<Vec<R>> {
    let mut qb = select::<R>();
    qb.push(format!(" ORDER BY {}.id ASC", R::TABLE));

    Ok(qb.build_query_as::<R>().fetch_all(pool).await?)
}
