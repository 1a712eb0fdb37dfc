//! Renderer-agnostic report structure.
//!
//! Topics are ranked by member count (descending, ties by id ascending). Every
//! renderer consumes [`ReportData`] as is and derives no aggregation of its own.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::aggregate::TopicGroups;
use crate::assign::{TopicId, TopicMetadata, OUTLIER_TOPIC};
use crate::error::Error;
use crate::table::{Record, Row};

pub const OUTLIER_NAME: &str = "Outliers";
pub const UNKNOWN_NAME: &str = "Unknown";

/// Terms shown in the summary name of a regular topic.
const SUMMARY_TERMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    pub id: TopicId,
    pub name: String,
    /// Number of records assigned to the topic.
    pub count: usize,
    /// One metadata row per resolved member, in record order, values in column order.
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub id: TopicId,
    pub count: usize,
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedReference {
    pub topic: TopicId,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportData {
    pub columns: Vec<String>,
    pub topics: Vec<TopicReport>,
    pub summary: Vec<TopicSummary>,
    /// Topic id → member identifiers, in ranked order.
    pub mapping: Vec<(TopicId, Vec<String>)>,
    pub skipped: Vec<SkippedReference>,
}

/// Joins topic groups with the metadata-only view of the records.
pub struct ReportDataBuilder {
    columns: Vec<String>,
    metadata: HashMap<String, Row>,
}

impl ReportDataBuilder {
    pub fn new(columns: Vec<String>, metadata: HashMap<String, Row>) -> Self {
        Self { columns, metadata }
    }

    pub fn from_records(columns: Vec<String>, records: &[Record]) -> Self {
        let metadata = records
            .iter()
            .map(|r| (r.id.clone(), r.metadata.clone()))
            .collect();
        Self::new(columns, metadata)
    }

    pub fn build(
        &self,
        groups: &TopicGroups,
        names: &HashMap<TopicId, String>,
        topics: &BTreeMap<TopicId, TopicMetadata>,
    ) -> ReportData {
        let mut ranked: Vec<_> = groups.iter().collect();
        ranked.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then_with(|| a.topic.cmp(&b.topic))
        });

        let mut report = ReportData {
            columns: self.columns.clone(),
            ..ReportData::default()
        };

        for group in ranked {
            let mut rows = Vec::with_capacity(group.members.len());
            for id in &group.members {
                match self.metadata.get(id) {
                    Some(row) => rows.push(
                        self.columns
                            .iter()
                            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                            .collect(),
                    ),
                    None => {
                        let err = Error::Reference {
                            id: id.clone(),
                            topic: group.topic,
                        };
                        warn!(error = %err, "skipping report row");
                        report.skipped.push(SkippedReference {
                            topic: group.topic,
                            id: id.clone(),
                        });
                    }
                }
            }

            report.topics.push(TopicReport {
                id: group.topic,
                name: display_name(group.topic, names),
                count: group.members.len(),
                rows,
            });
            report.summary.push(summarize(group.topic, group.members.len(), topics));
            report.mapping.push((group.topic, group.members.clone()));
        }

        info!(
            topics = report.topics.len(),
            skipped = report.skipped.len(),
            "report data built"
        );
        report
    }
}

fn display_name(topic: TopicId, names: &HashMap<TopicId, String>) -> String {
    if topic == OUTLIER_TOPIC {
        return OUTLIER_NAME.to_string();
    }
    match names.get(&topic) {
        Some(name) if !name.is_empty() => name.clone(),
        _ => UNKNOWN_NAME.to_string(),
    }
}

fn summarize(
    topic: TopicId,
    count: usize,
    topics: &BTreeMap<TopicId, TopicMetadata>,
) -> TopicSummary {
    let terms: Vec<String> = topics
        .get(&topic)
        .map(|m| m.terms.iter().map(|t| t.term.clone()).collect())
        .unwrap_or_default();
    let name = if topic == OUTLIER_TOPIC {
        OUTLIER_NAME.to_string()
    } else {
        terms
            .iter()
            .take(SUMMARY_TERMS)
            .cloned()
            .collect::<Vec<String>>()
            .join(", ")
    };
    TopicSummary {
        id: topic,
        count,
        name,
        terms,
    }
}
