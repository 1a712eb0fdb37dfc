//! Run configuration: column selection, row limit and language settings.
//!
//! Every value here is built once by the caller (CLI flags or the interactive
//! fallback) and handed to the pipeline; the library itself never prompts.

use std::str::FromStr;

use rust_stemmers::Algorithm;
use stop_words::LANGUAGE;
use tracing::warn;

use crate::error::{Error, Result};

/// Identifier column of the ticket exports this tool was built for.
pub const DEFAULT_ID_COLUMN: &str = "nummer";

/// Columns always shown in the report, never fed to topic discovery.
pub const DEFAULT_METADATA_COLUMNS: &[&str] = &[
    "nummer",
    "opened_at",
    "service_offering",
    "assignment_group",
    "category",
    "reassignment_count",
    "reopen_count",
];

pub const DEFAULT_OUTPUT_DIR: &str = "nlp_analysis_results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Dutch,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "dutch" | "nl" => Ok(Self::Dutch),
            _ => Err(Error::InvalidSelection(format!(
                "unknown language '{}'. Use: english, dutch",
                s.trim()
            ))),
        }
    }
}

impl Language {
    pub fn stop_words(self) -> Vec<String> {
        match self {
            Self::English => stop_words::get(LANGUAGE::English),
            Self::Dutch => stop_words::get(LANGUAGE::Dutch),
        }
    }

    pub fn stemming_algorithm(self) -> Algorithm {
        match self {
            Self::English => Algorithm::English,
            Self::Dutch => Algorithm::Dutch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Languages whose stopword lists are merged.
    pub languages: Vec<Language>,
    /// Snowball stemmer applied after lemmatization, off by default.
    pub stemming: Option<Language>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            languages: vec![Language::Dutch, Language::English],
            stemming: None,
        }
    }
}

impl LanguageConfig {
    /// Parse a comma-separated language list such as `"dutch,english"`.
    pub fn parse_languages(input: &str) -> Result<Vec<Language>> {
        input
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Language>())
            .collect()
    }
}

/// How many rows of the table to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    All,
    First(usize),
}

impl RowLimit {
    pub fn apply(self, total: usize) -> usize {
        match self {
            Self::All => total,
            Self::First(n) => n.min(total),
        }
    }
}

impl FromStr for RowLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<usize>().map(Self::First).map_err(|_| {
            Error::InvalidSelection(format!("row count must be 'all' or an integer, got '{s}'"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

/// Text columns chosen for analysis, by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection(pub Vec<ColumnRef>);

impl ColumnSelection {
    /// Parse `"2,5"` or `"short_description,description"` (mixing is allowed).
    pub fn parse(input: &str) -> Result<Self> {
        let refs: Vec<ColumnRef> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(i) => ColumnRef::Index(i),
                Err(_) => ColumnRef::Name(s.to_string()),
            })
            .collect();
        if refs.is_empty() {
            return Err(Error::InvalidSelection("no columns selected".into()));
        }
        Ok(Self(refs))
    }

    /// Resolve against the table header, keeping selection order and dropping repeats.
    pub fn resolve(&self, columns: &[String]) -> Result<Vec<String>> {
        let mut resolved: Vec<String> = Vec::with_capacity(self.0.len());
        for r in &self.0 {
            let name = match r {
                ColumnRef::Index(i) => columns.get(*i).cloned().ok_or_else(|| {
                    Error::InvalidSelection(format!(
                        "column index {i} out of range (table has {} columns)",
                        columns.len()
                    ))
                })?,
                ColumnRef::Name(n) => {
                    if !columns.contains(n) {
                        return Err(Error::InvalidSelection(format!("unknown column '{n}'")));
                    }
                    n.clone()
                }
            };
            if !resolved.contains(&name) {
                resolved.push(name);
            }
        }
        Ok(resolved)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub text_columns: Vec<String>,
    pub metadata_columns: Vec<String>,
    pub id_column: String,
    pub row_limit: RowLimit,
}

impl RunConfig {
    /// Resolve a selection against the table's columns.
    ///
    /// Metadata columns are removed from the text selection; metadata columns the
    /// table lacks are logged and omitted, a missing identifier column is fatal.
    pub fn resolve(
        table_columns: &[String],
        selection: &ColumnSelection,
        metadata_columns: &[String],
        id_column: &str,
        row_limit: RowLimit,
    ) -> Result<Self> {
        if !table_columns.iter().any(|c| c == id_column) {
            return Err(Error::InvalidSelection(format!(
                "identifier column '{id_column}' not found in table"
            )));
        }

        let text_columns: Vec<String> = selection
            .resolve(table_columns)?
            .into_iter()
            .filter(|c| !metadata_columns.contains(c))
            .collect();
        if text_columns.is_empty() {
            return Err(Error::InvalidSelection(
                "selection contains only metadata columns".into(),
            ));
        }

        let mut present = Vec::with_capacity(metadata_columns.len());
        for col in metadata_columns {
            if table_columns.contains(col) {
                present.push(col.clone());
            } else {
                warn!(column = %col, "metadata column missing from table, omitted from report");
            }
        }

        Ok(Self {
            text_columns,
            metadata_columns: present,
            id_column: id_column.to_string(),
            row_limit,
        })
    }
}

pub fn default_metadata_columns() -> Vec<String> {
    DEFAULT_METADATA_COLUMNS.iter().map(|c| c.to_string()).collect()
}
