//! Mango Core Library
//!
//! This crate provides the data model for CouchDB's Mango query API,
//! including:
//! - The closed operator vocabulary with exact wire strings
//! - A typed `Selector` expression tree
//! - `_find` request/response types
//! - `_index` request/response types
//! - Client configuration

pub mod config;
pub mod models;
pub mod operators;
pub mod selector;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
pub use operators::{CombinationOperator, ComparisonOperator, SortDirection, UnknownOperator};
pub use selector::Selector;
