//! Database schema migrations
//!
//! Versioned migrations keyed by their creation timestamp and tracked in the
//! `schema_migrations` table. Each migration is idempotent on its own, so a
//! partially recorded run can be replayed safely.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field already recorded them
//! 2. **Always add new migrations** - append a new entry to [`MIGRATIONS`]
//! 3. **Use `IF NOT EXISTS`** - a migration may be replayed after an interrupted run

use crate::Result;
use sqlx::SqlitePool;
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

type MigrationFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A single schema change
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    run: for<'a> fn(&'a SqlitePool) -> MigrationFuture<'a>,
}

/// All migrations in application order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 20240627214716,
        name: "create_authors",
        run: run_create_authors,
    },
    Migration {
        version: 20240627215053,
        name: "create_join_table_quote_tag",
        run: run_create_join_table_quote_tag,
    },
];

/// Versions recorded in `schema_migrations`, ascending
pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<i64>> {
    let versions = sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version ASC")
        .fetch_all(pool)
        .await?;

    Ok(versions)
}

async fn record_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let applied = applied_migrations(pool).await?;
    let latest_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    if let Some(&newest) = applied.last() {
        if newest > latest_known {
            warn!(
                "Database schema version ({}) is newer than code version ({})",
                newest, latest_known
            );
            warn!("This may indicate a downgrade. Leaving schema untouched.");
            return Ok(());
        }
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    if pending.is_empty() {
        info!("Database schema is up to date ({})", latest_known);
        return Ok(());
    }

    for migration in pending {
        info!("Running migration {} {}", migration.version, migration.name);
        (migration.run)(pool).await?;
        record_migration(pool, migration).await?;
        info!("✓ Migration {} completed", migration.version);
    }

    info!("All migrations completed successfully");
    Ok(())
}

fn run_create_authors(pool: &SqlitePool) -> MigrationFuture<'_> {
    Box::pin(create_authors(pool))
}

fn run_create_join_table_quote_tag(pool: &SqlitePool) -> MigrationFuture<'_> {
    Box::pin(create_join_table_quote_tag(pool))
}

async fn create_authors(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            image_url TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Join table between quotes and tags.
///
/// Only single-column indexes: the same (quote, tag) pair may be stored
/// more than once, and neither column carries a foreign key.
async fn create_join_table_quote_tag(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quotes_tags (
            quote_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS index_quotes_tags_on_quote_id ON quotes_tags(quote_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS index_quotes_tags_on_tag_id ON quotes_tags(tag_id)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_and_unique() {
        for pair in MIGRATIONS.windows(2) {
            assert!(
                pair[0].version < pair[1].version,
                "Migration {} must come before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }
}
