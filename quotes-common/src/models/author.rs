//! Author records

use super::Record;
use crate::filter::Attribute;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};
use tracing::info;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Attribute values for insert and update. `None` leaves the column
/// untouched on update and stores NULL on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorFields {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Record for Author {
    const MODEL: &'static str = "Author";
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["id", "name", "image_url", "created_at", "updated_at"];
    const FILTERABLE_ATTRIBUTES: &'static [Attribute] = FILTERABLE_ATTRIBUTES;
}

/// Everything on an author is filterable
pub const FILTERABLE_ATTRIBUTES: &[Attribute] = &[
    Attribute::timestamp("created_at"),
    Attribute::integer("id"),
    Attribute::text("image_url"),
    Attribute::text("name"),
    Attribute::timestamp("updated_at"),
];

impl Author {
    pub fn display_name(&self) -> String {
        super::display_name(Self::MODEL, self.id, self.name.as_deref())
    }
}

/// Insert an author and return its id
pub async fn insert(pool: &SqlitePool, fields: &AuthorFields) -> Result<i64> {
    let id = sqlx::query("INSERT INTO authors (name, image_url) VALUES (?, ?)")
        .bind(&fields.name)
        .bind(&fields.image_url)
        .execute(pool)
        .await?
        .last_insert_rowid();

    info!("Created author {}", id);
    Ok(id)
}

/// Apply the provided fields to an existing author
pub async fn update(pool: &SqlitePool, id: i64, fields: &AuthorFields) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE authors
        SET name = COALESCE(?, name),
            image_url = COALESCE(?, image_url),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.image_url)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Author {}", id)));
    }

    info!("Updated author {}", id);
    Ok(())
}

/// Delete an author.
///
/// Quotes are not cascaded: deleting an author that still owns quotes
/// fails with a foreign key violation.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Author {}", id)));
    }

    info!("Deleted author {}", id);
    Ok(())
}
