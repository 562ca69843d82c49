//! Quote records and their tag links
//!
//! A quote belongs to exactly one author and is linked to tags through the
//! `quotes_tags` join table. Join rows have no identity of their own and are
//! read back in insertion order.

use super::{author, tag, Record, Tag};
use crate::filter::{Association, AssociationKind, Attribute};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Quote {
    pub id: i64,
    pub author_id: i64,
    pub text: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Attribute values for insert and update. `None` leaves the column
/// untouched on update; `author_id` is required on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFields {
    pub author_id: Option<i64>,
    pub text: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Quote {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Record for Quote {
    const MODEL: &'static str = "Quote";
    const TABLE: &'static str = "quotes";
    const COLUMNS: &'static [&'static str] = &["id", "author_id", "text", "created_at", "updated_at"];
    const FILTERABLE_ATTRIBUTES: &'static [Attribute] = FILTERABLE_ATTRIBUTES;
    const FILTERABLE_ASSOCIATIONS: &'static [Association] = FILTERABLE_ASSOCIATIONS;
}

/// Foreign key to the owning author
pub const AUTHOR_ID: Attribute = Attribute::integer("author_id");

pub const FILTERABLE_ATTRIBUTES: &[Attribute] = &[AUTHOR_ID, Attribute::text("text")];

pub const FILTERABLE_ASSOCIATIONS: &[Association] = &[
    Association {
        name: "author",
        target_table: "authors",
        kind: AssociationKind::BelongsTo {
            foreign_key: "author_id",
        },
        target_attributes: author::FILTERABLE_ATTRIBUTES,
    },
    Association {
        name: "tags",
        target_table: "tags",
        kind: AssociationKind::HasAndBelongsToMany {
            join_table: "quotes_tags",
            owner_key: "quote_id",
            target_key: "tag_id",
        },
        target_attributes: tag::FILTERABLE_ATTRIBUTES,
    },
];

/// Insert a quote, returning its id.
///
/// A missing `author_id` is rejected here; one that names no author is
/// rejected by the foreign key.
pub async fn insert(conn: &mut SqliteConnection, fields: &QuoteFields) -> Result<i64> {
    let author_id = fields
        .author_id
        .ok_or_else(|| Error::InvalidInput("Author must exist".to_string()))?;

    let id = sqlx::query("INSERT INTO quotes (author_id, text) VALUES (?, ?)")
        .bind(author_id)
        .bind(&fields.text)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    info!("Created quote {} for author {}", id, author_id);
    Ok(id)
}

/// Apply the provided fields to an existing quote
pub async fn update(conn: &mut SqliteConnection, id: i64, fields: &QuoteFields) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE quotes
        SET author_id = COALESCE(?, author_id),
            text = COALESCE(?, text),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(fields.author_id)
    .bind(&fields.text)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Quote {}", id)));
    }

    info!("Updated quote {}", id);
    Ok(())
}

/// Delete a quote and its tag links
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM quotes_tags WHERE quote_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Quote {}", id)));
    }

    info!("Deleted quote {}", id);
    Ok(())
}

/// Tags linked to a quote, in link order. Duplicate links repeat the tag.
pub async fn tags_for(pool: &SqlitePool, quote_id: i64) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT tags.id, tags.name, tags.created_at, tags.updated_at
        FROM quotes_tags
        JOIN tags ON tags.id = quotes_tags.tag_id
        WHERE quotes_tags.quote_id = ?
        ORDER BY quotes_tags.rowid ASC
        "#,
    )
    .bind(quote_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Tags for many quotes at once, keyed by quote id
pub async fn tags_for_quotes(pool: &SqlitePool, quote_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>> {
    let mut by_quote: HashMap<i64, Vec<Tag>> = HashMap::new();
    if quote_ids.is_empty() {
        return Ok(by_quote);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT quotes_tags.quote_id AS quote_id, tags.id, tags.name, tags.created_at, tags.updated_at \
         FROM quotes_tags JOIN tags ON tags.id = quotes_tags.tag_id \
         WHERE quotes_tags.quote_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in quote_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY quotes_tags.rowid ASC");

    let rows = qb.build().fetch_all(pool).await?;
    for row in &rows {
        let quote_id: i64 = row.try_get("quote_id")?;
        by_quote.entry(quote_id).or_default().push(Tag::from_row(row)?);
    }

    Ok(by_quote)
}

/// Ids of tags linked to a quote, in link order
pub async fn tag_ids_for(pool: &SqlitePool, quote_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar(
        "SELECT tag_id FROM quotes_tags WHERE quote_id = ? ORDER BY rowid ASC",
    )
    .bind(quote_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Replace the tag set of a quote.
///
/// Repeated ids collapse to one link. Every id must name an existing tag.
pub async fn replace_tags(conn: &mut SqliteConnection, quote_id: i64, tag_ids: &[i64]) -> Result<()> {
    let mut unique: Vec<i64> = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    for tag_id in &unique {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?)")
            .bind(tag_id)
            .fetch_one(&mut *conn)
            .await?;
        if !found {
            return Err(Error::InvalidInput(format!("Tag {} does not exist", tag_id)));
        }
    }

    sqlx::query("DELETE FROM quotes_tags WHERE quote_id = ?")
        .bind(quote_id)
        .execute(&mut *conn)
        .await?;

    for tag_id in &unique {
        link_tag(&mut *conn, quote_id, *tag_id).await?;
    }

    Ok(())
}

/// Insert one join row. The join table has no uniqueness constraint, so
/// linking the same pair twice stores two rows.
pub async fn link_tag(conn: &mut SqliteConnection, quote_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO quotes_tags (quote_id, tag_id) VALUES (?, ?)")
        .bind(quote_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Tag names joined with `", "`; empty when there are no tags
pub fn tag_list(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.name.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(", ")
}
