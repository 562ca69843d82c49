//! Tests for model queries and filter allowlists against a real database

use quotes_common::db::init::init_database;
use quotes_common::filter::{Search, Sort};
use quotes_common::models::{self, author, quote, tag, Author, Quote, Record, Tag};
use quotes_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

struct Catalog {
    _dir: TempDir,
    pool: SqlitePool,
}

impl Catalog {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("quotes.db")).await.unwrap();
        Self { _dir: dir, pool }
    }

    async fn author(&self, name: &str) -> i64 {
        author::insert(
            &self.pool,
            &author::AuthorFields {
                name: Some(name.to_string()),
                image_url: None,
            },
        )
        .await
        .unwrap()
    }

    async fn tag(&self, name: &str) -> i64 {
        tag::insert(
            &self.pool,
            &tag::TagFields {
                name: Some(name.to_string()),
            },
        )
        .await
        .unwrap()
    }

    async fn quote(&self, author_id: i64, text: &str, tag_ids: &[i64]) -> i64 {
        let mut conn = self.pool.acquire().await.unwrap();
        let id = quote::insert(
            &mut conn,
            &quote::QuoteFields {
                author_id: Some(author_id),
                text: Some(text.to_string()),
            },
        )
        .await
        .unwrap();
        quote::replace_tags(&mut conn, id, tag_ids).await.unwrap();
        id
    }

    async fn quote_ids(&self, pairs: &[(&str, &str)]) -> Vec<i64> {
        let params: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let search = Search::parse(&params, Quote::FILTERABLE_ATTRIBUTES, Quote::FILTERABLE_ASSOCIATIONS);
        let sort = Sort::parse(Some("id_asc"), &["id"], Sort::ID_DESC);
        models::search::<Quote>(&self.pool, &search, sort, 100, 0)
            .await
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect()
    }
}

#[tokio::test]
async fn test_filter_quotes_by_author() {
    let db = Catalog::new().await;
    let seneca = db.author("Seneca").await;
    let twain = db.author("Mark Twain").await;
    let q1 = db.quote(seneca, "Luck is what happens...", &[]).await;
    let _q2 = db.quote(twain, "The secret of getting ahead...", &[]).await;
    let q3 = db.quote(seneca, "While we wait for life...", &[]).await;

    let ids = db.quote_ids(&[("q[author_id_eq]", &seneca.to_string())]).await;
    assert_eq!(ids, vec![q1, q3]);
}

#[tokio::test]
async fn test_filter_quotes_by_author_name_through_association() {
    let db = Catalog::new().await;
    let seneca = db.author("Seneca").await;
    let twain = db.author("Mark Twain").await;
    db.quote(seneca, "Luck", &[]).await;
    let q2 = db.quote(twain, "Ahead", &[]).await;

    let ids = db.quote_ids(&[("q[author_name_cont]", "twain")]).await;
    assert_eq!(ids, vec![q2]);
}

#[tokio::test]
async fn test_filter_quotes_by_tag() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let inspiration = db.tag("Inspiration").await;
    let humor = db.tag("humor").await;
    let tagged = db.quote(author_id, "Begin at once to live", &[inspiration, humor]).await;
    db.quote(author_id, "Untagged", &[]).await;

    let ids = db.quote_ids(&[("q[tags_id_in][]", &inspiration.to_string())]).await;
    assert_eq!(ids, vec![tagged]);

    let ids = db.quote_ids(&[("q[tags_name_eq]", "Inspiration")]).await;
    assert_eq!(ids, vec![tagged]);
}

#[tokio::test]
async fn test_tag_filter_returns_each_quote_once_with_duplicate_links() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let wisdom = db.tag("wisdom").await;
    let quote_id = db.quote(author_id, "Twice linked", &[wisdom]).await;

    let mut conn = db.pool.acquire().await.unwrap();
    quote::link_tag(&mut conn, quote_id, wisdom).await.unwrap();

    let ids = db.quote_ids(&[("q[tags_id_eq]", &wisdom.to_string())]).await;
    assert_eq!(ids, vec![quote_id]);
}

#[tokio::test]
async fn test_filter_outside_allowlist_is_ignored() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let q1 = db.quote(author_id, "One", &[]).await;
    let q2 = db.quote(author_id, "Two", &[]).await;

    // Quote does not expose id or created_at; both conditions are dropped
    let ids = db
        .quote_ids(&[("q[id_eq]", &q1.to_string()), ("q[created_at_gteq]", "2999-01-01")])
        .await;
    assert_eq!(ids, vec![q1, q2]);
}

#[tokio::test]
async fn test_text_contains_filter_and_count() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    db.quote(author_id, "We suffer more in imagination", &[]).await;
    let q2 = db.quote(author_id, "100% of nothing", &[]).await;

    let params = vec![("q[text_cont]".to_string(), "100%".to_string())];
    let search = Search::parse(&params, Quote::FILTERABLE_ATTRIBUTES, Quote::FILTERABLE_ASSOCIATIONS);
    assert_eq!(models::count::<Quote>(&db.pool, &search).await.unwrap(), 1);
    assert_eq!(db.quote_ids(&[("q[text_cont]", "100%")]).await, vec![q2]);
}

#[tokio::test]
async fn test_tags_read_in_link_order() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let humor = db.tag("humor").await;
    let wisdom = db.tag("wisdom").await;
    let quote_id = db.quote(author_id, "Ordered", &[wisdom, humor]).await;

    let tags = quote::tags_for(&db.pool, quote_id).await.unwrap();
    assert_eq!(quote::tag_list(&tags), "wisdom, humor");

    let by_quote = quote::tags_for_quotes(&db.pool, &[quote_id]).await.unwrap();
    assert_eq!(quote::tag_list(&by_quote[&quote_id]), "wisdom, humor");
}

#[tokio::test]
async fn test_replace_tags_dedupes_and_validates() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let wisdom = db.tag("wisdom").await;
    let quote_id = db.quote(author_id, "Dedupe", &[wisdom, wisdom]).await;

    assert_eq!(quote::tag_ids_for(&db.pool, quote_id).await.unwrap(), vec![wisdom]);

    let mut conn = db.pool.acquire().await.unwrap();
    let result = quote::replace_tags(&mut conn, quote_id, &[wisdom, 404]).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // Rejected replacement leaves the existing links alone
    assert_eq!(quote::tag_ids_for(&db.pool, quote_id).await.unwrap(), vec![wisdom]);
}

#[tokio::test]
async fn test_delete_quote_and_tag_clean_join_rows() {
    let db = Catalog::new().await;
    let author_id = db.author("Seneca").await;
    let wisdom = db.tag("wisdom").await;
    let humor = db.tag("humor").await;
    let q1 = db.quote(author_id, "One", &[wisdom, humor]).await;
    let q2 = db.quote(author_id, "Two", &[wisdom]).await;

    let mut conn = db.pool.acquire().await.unwrap();
    quote::delete(&mut conn, q1).await.unwrap();
    tag::delete(&mut conn, wisdom).await.unwrap();

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes_tags")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
    assert!(models::exists::<Quote>(&db.pool, q2).await.unwrap());
    assert!(!models::exists::<Tag>(&db.pool, wisdom).await.unwrap());
}

#[tokio::test]
async fn test_update_applies_only_provided_fields() {
    let db = Catalog::new().await;
    let author_id = author::insert(
        &db.pool,
        &author::AuthorFields {
            name: Some("Seneca".to_string()),
            image_url: Some("https://example.com/seneca.png".to_string()),
        },
    )
    .await
    .unwrap();

    author::update(
        &db.pool,
        author_id,
        &author::AuthorFields {
            name: Some("Lucius Annaeus Seneca".to_string()),
            image_url: None,
        },
    )
    .await
    .unwrap();

    let author: Author = models::find(&db.pool, author_id).await.unwrap();
    assert_eq!(author.name.as_deref(), Some("Lucius Annaeus Seneca"));
    assert_eq!(author.image_url.as_deref(), Some("https://example.com/seneca.png"));
}

#[tokio::test]
async fn test_find_missing_record_is_not_found() {
    let db = Catalog::new().await;

    let result = models::find::<Tag>(&db.pool, 42).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
