//! Author admin resource
//!
//! Permitted params: `name`, `image_url`.
//! Index columns: id, name, image_url. Filters: name.
//! Form: name, image_url. Show: name only; `image_url` is not shown on the
//! detail page even though it is listed and editable.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use quotes_common::filter::{Search, Sort};
use quotes_common::models::author::{self, AuthorFields};
use quotes_common::models::{self, Author, Record};
use serde::Deserialize;
use serde_json::Value;

use super::BatchActionRequest;
use crate::error::AdminError;
use crate::pagination::Pagination;
use crate::views::{
    member_actions, text_value, BatchAction, Column, FilterField, FormField, FormPage, IndexPage,
    IndexParams, IndexRow, Notice, ShowPage, ShowRow,
};
use crate::AppState;

const PATH: &str = "/admin/authors";

const SORTABLE: &[&str] = &["id", "name", "image_url", "created_at", "updated_at"];

/// Fields accepted from create and update submissions. Anything else in the
/// body is dropped during deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorParams {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl From<AuthorParams> for AuthorFields {
    fn from(params: AuthorParams) -> Self {
        AuthorFields {
            name: params.name,
            image_url: params.image_url,
        }
    }
}

/// GET /admin/authors
pub async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<IndexPage>, AdminError> {
    let params = IndexParams::from_pairs(pairs);
    let search = Search::parse(
        &params.filters,
        Author::FILTERABLE_ATTRIBUTES,
        Author::FILTERABLE_ASSOCIATIONS,
    );
    let sort = Sort::parse(params.order.as_deref(), SORTABLE, Sort::ID_DESC);

    let total = models::count::<Author>(&state.db, &search).await?;
    let p = Pagination::new(total, params.page);
    let authors = models::search::<Author>(&state.db, &search, sort, p.limit(), p.offset).await?;

    let rows = authors
        .iter()
        .map(|a| {
            IndexRow::new(
                PATH,
                a.id,
                vec![Value::from(a.id), text_value(&a.name), text_value(&a.image_url)],
            )
        })
        .collect();

    let page = IndexPage {
        resource: "authors",
        title: "Authors".to_string(),
        path: PATH.to_string(),
        new_path: format!("{}/new", PATH),
        columns: vec![
            Column::id(),
            Column::new("name", true),
            Column::new("image_url", true),
        ],
        rows,
        filters: vec![FilterField::string("name")],
        active_filters: search.active_filters(),
        order: sort.as_param(),
        batch_actions: vec![BatchAction::destroy("authors")],
        total_count: 0,
        page: 0,
        page_size: 0,
        total_pages: 0,
    };

    Ok(Json(page.paged(total, p)))
}

fn form(title: String, action: String, method: &'static str, author: Option<&Author>) -> FormPage {
    FormPage {
        resource: "authors",
        title,
        legend: "Author",
        action,
        method,
        fields: vec![
            FormField::string("name", author.and_then(|a| a.name.as_deref())),
            FormField::string("image_url", author.and_then(|a| a.image_url.as_deref())),
        ],
    }
}

/// GET /admin/authors/new
pub async fn new_form() -> Json<FormPage> {
    Json(form("New Author".to_string(), PATH.to_string(), "POST", None))
}

/// GET /admin/authors/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FormPage>, AdminError> {
    let author: Author = models::find(&state.db, id).await?;
    Ok(Json(form(
        format!("Edit {}", author.display_name()),
        format!("{}/{}", PATH, id),
        "PUT",
        Some(&author),
    )))
}

fn show_page(author: &Author) -> ShowPage {
    ShowPage {
        resource: "authors",
        title: author.display_name(),
        id: author.id,
        rows: vec![ShowRow::new("name", text_value(&author.name))],
        actions: member_actions(PATH, author.id)
            .into_iter()
            .filter(|l| l.label != "View")
            .collect(),
    }
}

/// GET /admin/authors/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShowPage>, AdminError> {
    let author: Author = models::find(&state.db, id).await?;
    Ok(Json(show_page(&author)))
}

/// POST /admin/authors
pub async fn create(
    State(state): State<AppState>,
    Json(params): Json<AuthorParams>,
) -> Result<impl IntoResponse, AdminError> {
    let id = author::insert(&state.db, &params.into()).await?;
    let author: Author = models::find(&state.db, id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{}/{}", PATH, id))],
        Json(show_page(&author)),
    ))
}

/// PUT/PATCH /admin/authors/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(params): Json<AuthorParams>,
) -> Result<Json<ShowPage>, AdminError> {
    author::update(&state.db, id, &params.into()).await?;
    let author: Author = models::find(&state.db, id).await?;
    Ok(Json(show_page(&author)))
}

/// DELETE /admin/authors/:id
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notice>, AdminError> {
    let mut tx = state.db.begin().await?;
    author::delete(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(Notice {
        notice: "Author was successfully destroyed.".to_string(),
    }))
}

/// POST /admin/authors/batch_action
pub async fn batch_action(
    State(state): State<AppState>,
    Json(request): Json<BatchActionRequest>,
) -> Result<Json<Notice>, AdminError> {
    let ids = request.destroy_selection()?;

    let mut tx = state.db.begin().await?;
    for id in &ids {
        author::delete(&mut tx, *id).await?;
    }
    tx.commit().await?;

    Ok(Json(Notice {
        notice: format!("Successfully destroyed {} authors", ids.len()),
    }))
}
