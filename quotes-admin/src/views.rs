//! View-models returned by the admin endpoints
//!
//! Handlers build these directly; the UI only lays them out. Cell and row
//! values are plain JSON so a column can hold text, a number or a [`Link`].

use quotes_common::filter::ActiveFilter;
use serde::Serialize;
use serde_json::Value;

use crate::pagination::{Pagination, PAGE_SIZE};

/// Listing page for a resource
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub resource: &'static str,
    pub title: String,
    /// Collection path the page was served from (nested scopes included)
    pub path: String,
    pub new_path: String,
    pub columns: Vec<Column>,
    pub rows: Vec<IndexRow>,
    pub filters: Vec<FilterField>,
    pub active_filters: Vec<ActiveFilter>,
    pub order: String,
    pub batch_actions: Vec<BatchAction>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl IndexPage {
    /// Fill in paging fields from a calculated [`Pagination`]
    pub fn paged(mut self, total_count: i64, p: Pagination) -> Self {
        self.total_count = total_count;
        self.page = p.page;
        self.page_size = PAGE_SIZE;
        self.total_pages = p.total_pages;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub label: String,
    pub sortable: bool,
}

impl Column {
    pub fn new(key: &'static str, sortable: bool) -> Self {
        Self {
            key,
            label: humanize(key),
            sortable,
        }
    }

    pub fn id() -> Self {
        Self {
            key: "id",
            label: "Id".to_string(),
            sortable: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexRow {
    pub id: i64,
    pub cells: Vec<Value>,
    pub actions: Vec<Link>,
}

impl IndexRow {
    /// Row with View/Edit/Delete actions for the record at `base/id`
    pub fn new(base: &str, id: i64, cells: Vec<Value>) -> Self {
        Self {
            id,
            cells,
            actions: member_actions(base, id),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Link {
    pub label: String,
    pub href: String,
    pub method: &'static str,
}

impl Link {
    pub fn get(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: "GET",
        }
    }

    pub fn delete(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: "DELETE",
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// View/Edit/Delete links for one record
pub fn member_actions(base: &str, id: i64) -> Vec<Link> {
    vec![
        Link::get("View", format!("{}/{}", base, id)),
        Link::get("Edit", format!("{}/{}/edit", base, id)),
        Link::delete("Delete", format!("{}/{}", base, id)),
    ]
}

#[derive(Debug, Serialize)]
pub struct BatchAction {
    pub name: &'static str,
    pub label: &'static str,
    pub confirm: String,
}

impl BatchAction {
    pub fn destroy(plural: &str) -> Self {
        Self {
            name: "destroy",
            label: "Delete Selected",
            confirm: format!("Are you sure you want to delete these {}?", plural),
        }
    }
}

/// Sidebar filter
#[derive(Debug, Serialize)]
pub struct FilterField {
    pub name: &'static str,
    pub label: String,
    #[serde(flatten)]
    pub input: FilterInput,
}

#[derive(Debug, Serialize)]
#[serde(tag = "as", rename_all = "snake_case")]
pub enum FilterInput {
    /// Text box paired with a predicate choice; submits `q[<name>_<predicate>]`
    String { predicates: Vec<&'static str> },
    /// Select submitting `q[<param>]`
    Select {
        param: &'static str,
        options: Vec<SelectOption>,
    },
}

impl FilterField {
    pub fn string(name: &'static str) -> Self {
        Self {
            name,
            label: humanize(name),
            input: FilterInput::String {
                predicates: vec!["cont", "eq", "start", "end"],
            },
        }
    }

    pub fn select(name: &'static str, param: &'static str, options: Vec<SelectOption>) -> Self {
        Self {
            name,
            label: humanize(name),
            input: FilterInput::Select { param, options },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

/// Create or edit form
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub resource: &'static str,
    pub title: String,
    pub legend: &'static str,
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    #[serde(flatten)]
    pub input: FormInput,
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "as", rename_all = "snake_case")]
pub enum FormInput {
    String,
    Select {
        options: Vec<SelectOption>,
        include_blank: bool,
    },
    CheckBoxes { options: Vec<SelectOption> },
}

impl FormField {
    pub fn string(name: &'static str, value: Option<&str>) -> Self {
        Self {
            name,
            label: humanize(name),
            input: FormInput::String,
            value: value.map(Value::from).unwrap_or(Value::Null),
        }
    }

    pub fn select(name: &'static str, options: Vec<SelectOption>, selected: Option<i64>) -> Self {
        Self {
            name,
            label: humanize(name),
            input: FormInput::Select {
                options,
                include_blank: true,
            },
            value: selected.map(Value::from).unwrap_or(Value::Null),
        }
    }

    pub fn check_boxes(name: &'static str, options: Vec<SelectOption>, checked: &[i64]) -> Self {
        Self {
            name,
            label: humanize(name),
            input: FormInput::CheckBoxes { options },
            value: Value::from(checked.to_vec()),
        }
    }
}

/// Detail page for one record
#[derive(Debug, Serialize)]
pub struct ShowPage {
    pub resource: &'static str,
    pub title: String,
    pub id: i64,
    pub rows: Vec<ShowRow>,
    pub actions: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct ShowRow {
    pub key: &'static str,
    pub label: String,
    pub value: Value,
}

impl ShowRow {
    pub fn new(key: &'static str, value: impl Into<Value>) -> Self {
        Self {
            key,
            label: humanize(key),
            value: value.into(),
        }
    }
}

/// Message returned by destroy and batch actions
#[derive(Debug, Serialize)]
pub struct Notice {
    pub notice: String,
}

/// Index query string split into paging, ordering and `q[...]` filter pairs
#[derive(Debug, Default)]
pub struct IndexParams {
    pub page: i64,
    pub order: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl IndexParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = IndexParams {
            page: 1,
            ..Default::default()
        };

        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = value.parse().unwrap_or(1),
                "order" => params.order = Some(value),
                _ => params.filters.push((key, value)),
            }
        }

        params
    }
}

/// Attribute key as a label: `image_url` -> `Image url`, `author_id` -> `Author`
pub fn humanize(key: &str) -> String {
    let base = key.strip_suffix("_id").unwrap_or(key).replace('_', " ");
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Optional text as a JSON cell
pub fn text_value(text: &Option<String>) -> Value {
    text.as_deref().map(Value::from).unwrap_or(Value::Null)
}
