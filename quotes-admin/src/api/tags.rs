//! Tag admin resource
//!
//! Permitted params: `name`. Index, filter, form and show all use `name`.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use quotes_common::filter::{Search, Sort};
use quotes_common::models::tag::{self, TagFields};
use quotes_common::models::{self, Record, Tag};
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

const PATH: &str = "/admin/tags";

const SORTABLE: &[&str] = &["id", "name", "created_at", "updated_at"];

#[derive(Debug, Default, Deserialize)]
pub struct TagParams {
    pub name: Option<String>,
}

impl From<TagParams> for TagFields {
    fn from(params: TagParams) -> Self {
        TagFields { name: params.name }
    }
}

/// GET /admin/tags
pub async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<IndexPage>, AdminError> {
    let params = IndexParams::from_pairs(pairs);
    let search = Search::parse(
        &params.filters,
        Tag::FILTERABLE_ATTRIBUTES,
        Tag::FILTERABLE_ASSOCIATIONS,
    );
    let sort = Sort::parse(params.order.as_deref(), SORTABLE, Sort::ID_DESC);

    let total = models::count::<Tag>(&state.db, &search).await?;
    let p = Pagination::new(total, params.page);
    let tags = models::search::<Tag>(&state.db, &search, sort, p.limit(), p.offset).await?;

    let rows = tags
        .iter()
        .map(|t| IndexRow::new(PATH, t.id, vec![Value::from(t.id), text_value(&t.name)]))
        .collect();

    let page = IndexPage {
        resource: "tags",
        title: "Tags".to_string(),
        path: PATH.to_string(),
        new_path: format!("{}/new", PATH),
        columns: vec![Column::id(), Column::new("name", true)],
        rows,
        filters: vec![FilterField::string("name")],
        active_filters: search.active_filters(),
        order: sort.as_param(),
        batch_actions: vec![BatchAction::destroy("tags")],
        total_count: 0,
        page: 0,
        page_size: 0,
        total_pages: 0,
    };

    Ok(Json(page.paged(total, p)))
}

fn form(title: String, action: String, method: &'static str, tag: Option<&Tag>) -> FormPage {
    FormPage {
        resource: "tags",
        title,
        legend: "Tag",
        action,
        method,
        fields: vec![FormField::string("name", tag.and_then(|t| t.name.as_deref()))],
    }
}

/// GET /admin/tags/new
pub async fn new_form() -> Json<FormPage> {
    Json(form("New Tag".to_string(), PATH.to_string(), "POST", None))
}

/// GET /admin/tags/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FormPage>, AdminError> {
    let tag: Tag = models::find(&state.db, id).await?;
    Ok(Json(form(
        format!("Edit {}", tag.display_name()),
        format!("{}/{}", PATH, id),
        "PUT",
        Some(&tag),
    )))
}

fn show_page(tag: &Tag) -> ShowPage {
    ShowPage {
        resource: "tags",
        title: tag.display_name(),
        id: tag.id,
        rows: vec![ShowRow::new("name", text_value(&tag.name))],
        actions: member_actions(PATH, tag.id)
            .into_iter()
            .filter(|l| l.label != "View")
            .collect(),
    }
}

/// GET /admin/tags/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShowPage>, AdminError> {
    let tag: Tag = models::find(&state.db, id).await?;
    Ok(Json(show_page(&tag)))
}

/// POST /admin/tags
pub async fn create(
    State(state): State<AppState>,
    Json(params): Json<TagParams>,
) -> Result<impl IntoResponse, AdminError> {
    let id = tag::insert(&state.db, &params.into()).await?;
    let tag: Tag = models::find(&state.db, id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{}/{}", PATH, id))],
        Json(show_page(&tag)),
    ))
}

/// PUT/PATCH /admin/tags/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(params): Json<TagParams>,
) -> Result<Json<ShowPage>, AdminError> {
    tag::update(&state.db, id, &params.into()).await?;
    let tag: Tag = models::find(&state.db, id).await?;
    Ok(Json(show_page(&tag)))
}

/// DELETE /admin/tags/:id
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notice>, AdminError> {
    let mut tx = state.db.begin().await?;
    tag::delete(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(Notice {
        notice: "Tag was successfully destroyed.".to_string(),
    }))
}

/// POST /admin/tags/batch_action
pub async fn batch_action(
    State(state): State<AppState>,
    Json(request): Json<BatchActionRequest>,
) -> Result<Json<Notice>, AdminError> {
    let ids = request.destroy_selection()?;

    let mut tx = state.db.begin().await?;
    for id in &ids {
        tag::delete(&mut tx, *id).await?;
    }
    tx.commit().await?;

    Ok(Json(Notice {
        notice: format!("Successfully destroyed {} tags", ids.len()),
    }))
}
