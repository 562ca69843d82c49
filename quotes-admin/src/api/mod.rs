//! HTTP API handlers for quotes-admin

pub mod authors;
pub mod dashboard;
pub mod quotes;
pub mod status;
pub mod tags;
pub mod ui;

pub use dashboard::dashboard;
pub use status::status_routes;
pub use ui::{serve_app_js, serve_index};

use serde::Deserialize;

use crate::error::AdminError;

/// Body of `POST /admin/<resource>/batch_action`
#[derive(Debug, Deserialize)]
pub struct BatchActionRequest {
    pub batch_action: String,
    #[serde(default)]
    pub collection_selection: Vec<i64>,
}

impl BatchActionRequest {
    /// Selected ids for the only supported batch action, `destroy`, with
    /// repeats removed so each record is destroyed once
    pub fn destroy_selection(&self) -> Result<Vec<i64>, AdminError> {
        if self.batch_action != "destroy" {
            return Err(AdminError::BadRequest(format!(
                "Unknown batch action: {}",
                self.batch_action
            )));
        }

        let mut ids = Vec::with_capacity(self.collection_selection.len());
        for id in &self.collection_selection {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        Ok(ids)
    }
}
