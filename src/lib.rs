//! Topic discovery over free-text ticket tables.
//!
//! A run loads a table, normalizes the selected text columns, hands the batch
//! to a [`assign::TopicAssigner`], groups record identifiers per topic and
//! renders the grouping as text, JSON, CSV and an interactive HTML report.

pub mod aggregate;
pub mod algo;
pub mod assign;
pub mod config;
pub mod error;
pub mod forbidden;
pub mod naming;
pub mod pipeline;
pub mod preprocess;
pub mod render;
pub mod report;
pub mod resources;
pub mod sentiment;
pub mod table;
pub mod wordcloud;

pub use error::{Error, Result};
