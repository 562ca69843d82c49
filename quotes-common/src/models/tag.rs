//! Tag records

use super::Record;
use crate::filter::Attribute;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};
use tracing::info;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFields {
    pub name: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Tag {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Record for Tag {
    const MODEL: &'static str = "Tag";
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];
    const FILTERABLE_ATTRIBUTES: &'static [Attribute] = FILTERABLE_ATTRIBUTES;
}

pub const FILTERABLE_ATTRIBUTES: &[Attribute] = &[
    Attribute::timestamp("created_at"),
    Attribute::integer("id"),
    Attribute::text("name"),
    Attribute::timestamp("updated_at"),
];

impl Tag {
    pub fn display_name(&self) -> String {
        super::display_name(Self::MODEL, self.id, self.name.as_deref())
    }
}

pub async fn insert(pool: &SqlitePool, fields: &TagFields) -> Result<i64> {
    let id = sqlx::query("INSERT INTO tags (name) VALUES (?)")
        .bind(&fields.name)
        .execute(pool)
        .await?
        .last_insert_rowid();

    info!("Created tag {}", id);
    Ok(id)
}

pub async fn update(pool: &SqlitePool, id: i64, fields: &TagFields) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tags SET name = COALESCE(?, name), updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Tag {}", id)));
    }

    info!("Updated tag {}", id);
    Ok(())
}

/// Delete a tag and every link to it
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM quotes_tags WHERE tag_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Tag {}", id)));
    }

    info!("Deleted tag {}", id);
    Ok(())
}
