//! Admin API errors
//!
//! Every error renders as `{"error": message}` with a status that tells the
//! UI whether to re-show the form (422) or give up (404/500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(String),

    /// Rejected submission: missing author, unknown tag, broken foreign key
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<quotes_common::Error> for AdminError {
    fn from(err: quotes_common::Error) -> Self {
        use quotes_common::Error;

        match err {
            Error::NotFound(what) => AdminError::NotFound(what),
            Error::InvalidInput(msg) => AdminError::Validation(msg),
            err if err.is_constraint_violation() => AdminError::Validation(err.to_string()),
            err => AdminError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        quotes_common::Error::from(err).into()
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Database(msg) => {
                error!("Database error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
