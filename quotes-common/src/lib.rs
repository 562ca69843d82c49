//! # Quotes Common Library
//!
//! Shared code for the quotes catalog services including:
//! - Database initialization and migrations
//! - Models (authors, quotes, tags) and their filterable allowlists
//! - Ransack-style filter and sort parsing
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;

pub use error::{Error, Result};
