//! quotes-admin library - administrative back-office for the quotes catalog
//!
//! Each resource (authors, quotes, tags) gets index, new, create, show, edit,
//! update, destroy and batch-destroy endpoints under `/admin`, all returning
//! JSON view-models that the bundled UI renders.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod pagination;
pub mod views;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use api::{authors, quotes, tags};

    let admin = Router::new()
        .route("/admin", get(api::dashboard))
        // Authors
        .route("/admin/authors", get(authors::index).post(authors::create))
        .route("/admin/authors/new", get(authors::new_form))
        .route("/admin/authors/batch_action", post(authors::batch_action))
        .route(
            "/admin/authors/:id",
            get(authors::show)
                .put(authors::update)
                .patch(authors::update)
                .delete(authors::destroy),
        )
        .route("/admin/authors/:id/edit", get(authors::edit))
        .route("/admin/authors/:id/quotes", get(quotes::author_index))
        // Quotes
        .route("/admin/quotes", get(quotes::index).post(quotes::create))
        .route("/admin/quotes/new", get(quotes::new_form))
        .route("/admin/quotes/batch_action", post(quotes::batch_action))
        .route(
            "/admin/quotes/:id",
            get(quotes::show)
                .put(quotes::update)
                .patch(quotes::update)
                .delete(quotes::destroy),
        )
        .route("/admin/quotes/:id/edit", get(quotes::edit))
        // Tags
        .route("/admin/tags", get(tags::index).post(tags::create))
        .route("/admin/tags/new", get(tags::new_form))
        .route("/admin/tags/batch_action", post(tags::batch_action))
        .route(
            "/admin/tags/:id",
            get(tags::show)
                .put(tags::update)
                .patch(tags::update)
                .delete(tags::destroy),
        )
        .route("/admin/tags/:id/edit", get(tags::edit));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::status_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
