//! Admin landing page: record counts per resource

use axum::{extract::State, Json};
use quotes_common::filter::Search;
use quotes_common::models::{self, Author, Quote, Record, Tag};
use serde::Serialize;

use crate::error::AdminError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub resources: Vec<ResourceSummary>,
}

#[derive(Debug, Serialize)]
pub struct ResourceSummary {
    pub name: &'static str,
    pub path: &'static str,
    pub count: i64,
}

async fn summary<R: Record>(
    state: &AppState,
    name: &'static str,
    path: &'static str,
) -> Result<ResourceSummary, AdminError> {
    Ok(ResourceSummary {
        name,
        path,
        count: models::count::<R>(&state.db, &Search::default()).await?,
    })
}

/// GET /admin
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AdminError> {
    Ok(Json(Dashboard {
        title: "Dashboard",
        resources: vec![
            summary::<Author>(&state, "Authors", "/admin/authors").await?,
            summary::<Quote>(&state, "Quotes", "/admin/quotes").await?,
            summary::<Tag>(&state, "Tags", "/admin/tags").await?,
        ],
    }))
}
