//! Tests for database initialization, migrations and schema invariants

use quotes_common::db::init::init_database;
use quotes_common::db::migrations::{applied_migrations, run_migrations, MIGRATIONS};
use quotes_common::models::{author, quote, tag};
use quotes_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn fresh_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("quotes.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("quotes.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let (_dir, pool) = fresh_db().await;

    for table in ["authors", "quotes", "tags", "quotes_tags", "schema_migrations"] {
        assert!(table_exists(&pool, table).await, "Missing table {}", table);
    }
}

#[tokio::test]
async fn test_migrations_recorded_in_order() {
    let (_dir, pool) = fresh_db().await;

    let applied = applied_migrations(&pool).await.unwrap();
    assert_eq!(applied, vec![20240627214716, 20240627215053]);
    assert_eq!(applied.len(), MIGRATIONS.len());
}

#[tokio::test]
async fn test_reopen_and_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("quotes.db");

    let pool1 = init_database(&db_path).await.unwrap();
    run_migrations(&pool1).await.unwrap();
    drop(pool1);

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let applied = applied_migrations(&pool2.unwrap()).await.unwrap();
    assert_eq!(applied.len(), MIGRATIONS.len());
}

#[tokio::test]
async fn test_join_table_has_single_column_indexes_only() {
    let (_dir, pool) = fresh_db().await;

    let indexes: Vec<(String, i64)> = sqlx::query_as(
        r#"SELECT name, "unique" FROM pragma_index_list('quotes_tags') ORDER BY name"#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(
        indexes,
        vec![
            ("index_quotes_tags_on_quote_id".to_string(), 0),
            ("index_quotes_tags_on_tag_id".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn test_quote_with_unknown_author_rejected() {
    let (_dir, pool) = fresh_db().await;
    let mut conn = pool.acquire().await.unwrap();

    let result = quote::insert(
        &mut conn,
        &quote::QuoteFields {
            author_id: Some(999),
            text: Some("Orphan".to_string()),
        },
    )
    .await;

    let err = result.expect_err("Insert with unknown author must fail");
    assert!(err.is_constraint_violation(), "Unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_quote_without_author_rejected() {
    let (_dir, pool) = fresh_db().await;
    let mut conn = pool.acquire().await.unwrap();

    let result = quote::insert(&mut conn, &quote::QuoteFields::default()).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_duplicate_join_rows_allowed() {
    let (_dir, pool) = fresh_db().await;
    let author_id = author::insert(&pool, &author::AuthorFields::default()).await.unwrap();
    let tag_id = tag::insert(
        &pool,
        &tag::TagFields {
            name: Some("wisdom".to_string()),
        },
    )
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let quote_id = quote::insert(
        &mut conn,
        &quote::QuoteFields {
            author_id: Some(author_id),
            text: Some("Twice".to_string()),
        },
    )
    .await
    .unwrap();

    quote::link_tag(&mut conn, quote_id, tag_id).await.unwrap();
    quote::link_tag(&mut conn, quote_id, tag_id).await.unwrap();

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes_tags WHERE quote_id = ? AND tag_id = ?")
        .bind(quote_id)
        .bind(tag_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 2);
}

#[tokio::test]
async fn test_author_with_quotes_cannot_be_deleted() {
    let (_dir, pool) = fresh_db().await;
    let author_id = author::insert(&pool, &author::AuthorFields::default()).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    quote::insert(
        &mut conn,
        &quote::QuoteFields {
            author_id: Some(author_id),
            text: None,
        },
    )
    .await
    .unwrap();

    let err = author::delete(&mut conn, author_id)
        .await
        .expect_err("Delete must fail while quotes exist");
    assert!(err.is_constraint_violation(), "Unexpected error: {:?}", err);
}
