//! Input tables: JSON arrays of objects, CSV and TSV files.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::preprocess::coerce_text;

pub type Row = Map<String, Value>;

/// One analyzable ticket: identifier, selected text cells, metadata cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub texts: Vec<Value>,
    pub metadata: Row,
}

impl Record {
    /// All text cells joined with a space, empty cells skipped.
    pub fn combined_text(&self) -> String {
        self.texts
            .iter()
            .map(coerce_text)
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    source: PathBuf,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Load by extension: `.json`, `.csv`, `.tsv` / `.txt`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let file = std::fs::File::open(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let table = match extension.as_str() {
            "json" => Self::from_json_reader(path, file)?,
            "csv" => Self::from_delimited_reader(path, file, b',')?,
            "tsv" | "txt" => Self::from_delimited_reader(path, file, b'\t')?,
            other => {
                return Err(Error::MalformedTable {
                    path: path.to_path_buf(),
                    reason: format!("unsupported table format '.{other}' (use json, csv or tsv)"),
                })
            }
        };
        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Build from JSON rows. Columns are the union of keys in first-seen order,
    /// so positional selections match the column order of the source file.
    pub fn from_rows(source: impl Into<PathBuf>, values: Vec<Value>) -> Result<Self> {
        let source = source.into();
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let Value::Object(obj) = value else {
                return Err(Error::MalformedTable {
                    path: source,
                    reason: format!("row {i} is not an object"),
                });
            };
            for key in obj.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
            rows.push(obj);
        }
        Ok(Self {
            source,
            columns,
            rows,
        })
    }

    fn from_json_reader<R: Read>(path: &Path, reader: R) -> Result<Self> {
        let parsed: Value =
            serde_json::from_reader(reader).map_err(|err| Error::MalformedTable {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        match parsed {
            Value::Array(arr) => Self::from_rows(path, arr),
            single => Self::from_rows(path, vec![single]),
        }
    }

    fn from_delimited_reader<R: Read>(path: &Path, reader: R, delimiter: u8) -> Result<Self> {
        let malformed = |err: csv::Error| Error::MalformedTable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            let row: Row = columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cell = record.get(i).map(str::trim).unwrap_or("");
                    let value = if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_string())
                    };
                    (col.clone(), value)
                })
                .collect();
            rows.push(row);
        }

        Ok(Self {
            source: path.to_path_buf(),
            columns,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract the first `row_limit` records. Identifiers must be present and unique.
    pub fn records(&self, config: &RunConfig) -> Result<Vec<Record>> {
        let limit = config.row_limit.apply(self.rows.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(limit);
        let mut records = Vec::with_capacity(limit);

        for (i, row) in self.rows.iter().take(limit).enumerate() {
            let id = row
                .get(&config.id_column)
                .map(coerce_text)
                .unwrap_or_default()
                .trim()
                .to_string();
            if id.is_empty() {
                return Err(Error::MalformedTable {
                    path: self.source.clone(),
                    reason: format!("row {i} has no '{}' identifier", config.id_column),
                });
            }
            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateId(id));
            }

            let texts = config
                .text_columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            let metadata = config
                .metadata_columns
                .iter()
                .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                .collect();

            records.push(Record { id, texts, metadata });
        }
        Ok(records)
    }
}
