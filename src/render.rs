//! Report renderers. Each writes one artifact from already computed run data.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::preprocess::coerce_text;
use crate::report::ReportData;
use crate::sentiment::SentimentDistribution;
use crate::wordcloud::WordFrequency;

pub const MAPPING_FILE: &str = "topics_and_records.txt";
pub const JSON_FILE: &str = "topic_report.json";
pub const HTML_FILE: &str = "topic_report.html";
pub const SUMMARY_FILE: &str = "topic_summary.csv";
pub const WORD_FREQUENCIES_FILE: &str = "word_frequencies.json";
pub const SENTIMENT_FILE: &str = "sentiment_distribution.json";

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

/// `Topic: <id>\nRecords: a, b\n\n` per topic, in ranked order.
pub fn render_mapping(report: &ReportData) -> String {
    let mut out = String::new();
    for (topic, members) in &report.mapping {
        let _ = write!(out, "Topic: {topic}\nRecords: {}\n\n", members.join(", "));
    }
    out
}

pub fn write_mapping(report: &ReportData, path: &Path) -> Result<()> {
    write_file(path, render_mapping(report).as_bytes())
}

pub fn write_json(report: &ReportData, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    write_file(path, &json)
}

pub fn write_summary_csv(report: &ReportData, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["topic", "count", "name", "terms"])?;
    for row in &report.summary {
        writer.write_record([
            row.id.to_string(),
            row.count.to_string(),
            row.name.clone(),
            row.terms.join(" "),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Output {
            path: path.to_path_buf(),
            source: err.into_error(),
        })?;
    write_file(path, &bytes)
}

pub fn write_word_frequencies(words: &[WordFrequency], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(words)?;
    write_file(path, &json)
}

pub fn write_sentiment(distribution: &SentimentDistribution, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(distribution)?;
    write_file(path, &json)
}

// ── HTML ─────────────────────────────────────────────────────────────────────

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Topic Report</title>
<style>
  body { font-family: Arial, sans-serif; margin: 20px; }
  h1 { text-align: center; }
  .topic { margin-bottom: 10px; padding: 10px; border: 1px solid #ddd; border-radius: 5px; background: #f9f9f9; cursor: pointer; }
  .records { display: none; width: 100%; border-collapse: collapse; margin-top: 10px; }
  .records th, .records td { border: 1px solid #ddd; padding: 8px; text-align: left; }
  .records th { background-color: #f2f2f2; }
  .count { font-weight: bold; }
  input { margin-top: 4px; padding: 4px; width: 90%; }
</style>
<script>
  function toggleTable(id) {
    var table = document.getElementById(id);
    table.style.display = (table.style.display === "table") ? "none" : "table";
  }
  function filterTable(id, col) {
    var needle = document.getElementById(id + "_filter_" + col).value.toLowerCase();
    var rows = document.getElementById(id).getElementsByTagName("tr");
    for (var i = 1; i < rows.length; i++) {
      var cell = rows[i].getElementsByTagName("td")[col];
      if (cell) {
        rows[i].style.display = cell.innerText.toLowerCase().includes(needle) ? "" : "none";
      }
    }
  }
</script>
</head>
<body>
<h1>Topic Report</h1>
<p>Click a topic to show its records.</p>
"#;

const HTML_TAIL: &str = "</body>\n</html>\n";

/// Escape text for element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn cell_text(value: &Value) -> String {
    escape_html(&coerce_text(value))
}

pub fn render_html(report: &ReportData) -> String {
    let mut out = String::from(HTML_HEAD);
    for topic in &report.topics {
        let table_id = format!("topic_{}", topic.id);
        let _ = writeln!(
            out,
            r#"<div class="topic" onclick="toggleTable('{table_id}')">Topic {}: <span class="count">({})</span> {}</div>"#,
            topic.id,
            topic.count,
            escape_html(&topic.name)
        );
        let _ = writeln!(out, r#"<table id="{table_id}" class="records">"#);
        out.push_str("  <tr>\n");
        for (col, name) in report.columns.iter().enumerate() {
            let _ = writeln!(
                out,
                r#"    <th>{}<br><input type="text" id="{table_id}_filter_{col}" onkeyup="filterTable('{table_id}', {col})" placeholder="Filter..."></th>"#,
                escape_html(name)
            );
        }
        out.push_str("  </tr>\n");
        for row in &topic.rows {
            out.push_str("  <tr>\n");
            for value in row {
                let _ = writeln!(out, "    <td>{}</td>", cell_text(value));
            }
            out.push_str("  </tr>\n");
        }
        out.push_str("</table>\n");
    }
    out.push_str(HTML_TAIL);
    out
}

pub fn write_html(report: &ReportData, path: &Path) -> Result<()> {
    write_file(path, render_html(report).as_bytes())
}
