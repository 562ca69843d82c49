//! Quote admin resource
//!
//! Permitted params: `author_id`, `text`, `tag_ids[]`.
//! Index columns: id, author, text, tags. Filters: author, text, tags.
//! Form: author (select), text, tags (check boxes). Show: author, text, tags.
//!
//! Quotes are also listed under their author at
//! `/admin/authors/:id/quotes`.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use quotes_common::filter::{Search, Sort};
use quotes_common::models::quote::{self, QuoteFields};
use quotes_common::models::{self, Author, Quote, Record, Tag};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

use super::BatchActionRequest;
use crate::error::AdminError;
use crate::pagination::Pagination;
use crate::views::{
    member_actions, text_value, BatchAction, Column, FilterField, FormField, FormPage, IndexPage,
    IndexParams, IndexRow, Link, Notice, SelectOption, ShowPage, ShowRow,
};
use crate::AppState;

const PATH: &str = "/admin/quotes";

const SORTABLE: &[&str] = &["id", "author_id", "text", "created_at", "updated_at"];

/// Fields accepted from create and update submissions. `tag_ids`, when
/// present, replaces the quote's whole tag set.
///
/// `author_id` distinguishes an omitted field (`None`, keep the current
/// author) from an explicit `null` (`Some(None)`, rejected).
#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    #[serde(default, deserialize_with = "present")]
    pub author_id: Option<Option<i64>>,
    pub text: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl QuoteParams {
    fn fields(&self) -> Result<QuoteFields, AdminError> {
        let author_id = match self.author_id {
            Some(None) => return Err(AdminError::Validation("Author must exist".to_string())),
            Some(Some(id)) => Some(id),
            None => None,
        };

        Ok(QuoteFields {
            author_id,
            text: self.text.clone(),
        })
    }
}

fn author_link(authors: &HashMap<i64, Author>, author_id: i64) -> Value {
    let label = authors
        .get(&author_id)
        .map(Author::display_name)
        .unwrap_or_else(|| models::display_name(Author::MODEL, author_id, None));
    Link::get(label, format!("/admin/authors/{}", author_id)).to_value()
}

fn author_options(authors: &[Author]) -> Vec<SelectOption> {
    authors
        .iter()
        .map(|a| SelectOption {
            value: a.id,
            label: a.display_name(),
        })
        .collect()
}

fn tag_options(tags: &[Tag]) -> Vec<SelectOption> {
    tags.iter()
        .map(|t| SelectOption {
            value: t.id,
            label: t.display_name(),
        })
        .collect()
}

/// GET /admin/quotes
pub async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<IndexPage>, AdminError> {
    render_index(&state, pairs, None).await.map(Json)
}

/// GET /admin/authors/:id/quotes
pub async fn author_index(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<IndexPage>, AdminError> {
    let author: Author = models::find(&state.db, author_id).await?;
    render_index(&state, pairs, Some(&author)).await.map(Json)
}

async fn render_index(
    state: &AppState,
    pairs: Vec<(String, String)>,
    scope: Option<&Author>,
) -> Result<IndexPage, AdminError> {
    let params = IndexParams::from_pairs(pairs);
    let mut search = Search::parse(
        &params.filters,
        Quote::FILTERABLE_ATTRIBUTES,
        Quote::FILTERABLE_ASSOCIATIONS,
    );
    if let Some(author) = scope {
        search = search.and_eq(&quote::AUTHOR_ID, author.id);
    }
    let sort = Sort::parse(params.order.as_deref(), SORTABLE, Sort::ID_DESC);

    let total = models::count::<Quote>(&state.db, &search).await?;
    let p = Pagination::new(total, params.page);
    let quotes = models::search::<Quote>(&state.db, &search, sort, p.limit(), p.offset).await?;

    let authors = models::all::<Author>(&state.db).await?;
    let all_tags = models::all::<Tag>(&state.db).await?;
    let quote_ids: Vec<i64> = quotes.iter().map(|q| q.id).collect();
    let tags_by_quote = quote::tags_for_quotes(&state.db, &quote_ids).await?;

    let filters = vec![
        FilterField::select("author", "author_id_eq", author_options(&authors)),
        FilterField::string("text"),
        FilterField::select("tags", "tags_id_in", tag_options(&all_tags)),
    ];

    let authors_by_id: HashMap<i64, Author> = authors.into_iter().map(|a| (a.id, a)).collect();
    let rows = quotes
        .iter()
        .map(|q| {
            let tags = tags_by_quote.get(&q.id).map(Vec::as_slice).unwrap_or(&[]);
            IndexRow::new(
                PATH,
                q.id,
                vec![
                    Value::from(q.id),
                    author_link(&authors_by_id, q.author_id),
                    text_value(&q.text),
                    Value::from(quote::tag_list(tags)),
                ],
            )
        })
        .collect();

    let (title, path) = match scope {
        Some(author) => (
            format!("{} / Quotes", author.display_name()),
            format!("/admin/authors/{}/quotes", author.id),
        ),
        None => ("Quotes".to_string(), PATH.to_string()),
    };

    let page = IndexPage {
        resource: "quotes",
        title,
        path,
        new_path: format!("{}/new", PATH),
        columns: vec![
            Column::id(),
            Column::new("author_id", true),
            Column::new("text", true),
            Column::new("tags", false),
        ],
        rows,
        filters,
        active_filters: search.active_filters(),
        order: sort.as_param(),
        batch_actions: vec![BatchAction::destroy("quotes")],
        total_count: 0,
        page: 0,
        page_size: 0,
        total_pages: 0,
    };

    Ok(page.paged(total, p))
}

async fn form(
    state: &AppState,
    title: String,
    action: String,
    method: &'static str,
    current: Option<&Quote>,
) -> Result<FormPage, AdminError> {
    let authors = models::all::<Author>(&state.db).await?;
    let tags = models::all::<Tag>(&state.db).await?;
    let checked = match current {
        Some(q) => quote::tag_ids_for(&state.db, q.id).await?,
        None => Vec::new(),
    };

    Ok(FormPage {
        resource: "quotes",
        title,
        legend: "Quote",
        action,
        method,
        fields: vec![
            FormField::select("author_id", author_options(&authors), current.map(|q| q.author_id)),
            FormField::string("text", current.and_then(|q| q.text.as_deref())),
            FormField::check_boxes("tag_ids", tag_options(&tags), &checked),
        ],
    })
}

/// GET /admin/quotes/new
pub async fn new_form(State(state): State<AppState>) -> Result<Json<FormPage>, AdminError> {
    form(&state, "New Quote".to_string(), PATH.to_string(), "POST", None)
        .await
        .map(Json)
}

/// GET /admin/quotes/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FormPage>, AdminError> {
    let record: Quote = models::find(&state.db, id).await?;
    form(
        &state,
        format!("Edit Quote #{}", id),
        format!("{}/{}", PATH, id),
        "PUT",
        Some(&record),
    )
    .await
    .map(Json)
}

async fn show_page(state: &AppState, id: i64) -> Result<ShowPage, AdminError> {
    let record: Quote = models::find(&state.db, id).await?;
    let author: Author = models::find(&state.db, record.author_id).await?;
    let tags = quote::tags_for(&state.db, id).await?;

    let author_link = Link::get(author.display_name(), format!("/admin/authors/{}", author.id));

    Ok(ShowPage {
        resource: "quotes",
        title: format!("Quote #{}", id),
        id,
        rows: vec![
            ShowRow::new("author_id", author_link.to_value()),
            ShowRow::new("text", text_value(&record.text)),
            ShowRow::new("tags", quote::tag_list(&tags)),
        ],
        actions: member_actions(PATH, id)
            .into_iter()
            .filter(|l| l.label != "View")
            .collect(),
    })
}

/// GET /admin/quotes/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShowPage>, AdminError> {
    show_page(&state, id).await.map(Json)
}

/// POST /admin/quotes
pub async fn create(
    State(state): State<AppState>,
    Json(params): Json<QuoteParams>,
) -> Result<impl IntoResponse, AdminError> {
    let fields = params.fields()?;
    let mut tx = state.db.begin().await?;
    let id = quote::insert(&mut tx, &fields).await?;
    if let Some(tag_ids) = &params.tag_ids {
        quote::replace_tags(&mut tx, id, tag_ids).await?;
    }
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{}/{}", PATH, id))],
        Json(show_page(&state, id).await?),
    ))
}

/// PUT/PATCH /admin/quotes/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(params): Json<QuoteParams>,
) -> Result<Json<ShowPage>, AdminError> {
    let fields = params.fields()?;
    let mut tx = state.db.begin().await?;
    quote::update(&mut tx, id, &fields).await?;
    if let Some(tag_ids) = &params.tag_ids {
        quote::replace_tags(&mut tx, id, tag_ids).await?;
    }
    tx.commit().await?;

    show_page(&state, id).await.map(Json)
}

/// DELETE /admin/quotes/:id
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notice>, AdminError> {
    let mut tx = state.db.begin().await?;
    quote::delete(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(Notice {
        notice: "Quote was successfully destroyed.".to_string(),
    }))
}

/// POST /admin/quotes/batch_action
pub async fn batch_action(
    State(state): State<AppState>,
    Json(request): Json<BatchActionRequest>,
) -> Result<Json<Notice>, AdminError> {
    let ids = request.destroy_selection()?;

    let mut tx = state.db.begin().await?;
    for id in &ids {
        quote::delete(&mut tx, *id).await?;
    }
    tx.commit().await?;

    Ok(Json(Notice {
        notice: format!("Successfully destroyed {} quotes", ids.len()),
    }))
}
