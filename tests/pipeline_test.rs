use std::collections::{BTreeMap, HashSet};
use std::fs;

use serde_json::{json, Value};
use ticket_topics::assign::{
    Assignment, NmfAssigner, NmfConfig, PrecomputedAssigner, TopicAssigner, TopicId,
    TopicMetadata, TopicTerm,
};
use ticket_topics::config::{ColumnSelection, RowLimit, RunConfig};
use ticket_topics::forbidden::ForbiddenWordSet;
use ticket_topics::pipeline::Pipeline;
use ticket_topics::render;
use ticket_topics::resources::LanguageResources;
use ticket_topics::sentiment::{SentimentScorer, HISTOGRAM_BINS};
use ticket_topics::table::Table;
use ticket_topics::Error;

/// Returns fixed topic ids regardless of input.
struct StubAssigner(Vec<TopicId>);

impl TopicAssigner for StubAssigner {
    fn assign(&self, _texts: &[String]) -> ticket_topics::Result<Assignment> {
        let topics = [(0, "0_printer_jam_printer"), (1, "1_wifi_down"), (-1, "-1_login")]
            .into_iter()
            .map(|(id, label)| {
                let terms = label
                    .split('_')
                    .skip(1)
                    .map(|t| TopicTerm {
                        term: t.to_string(),
                        weight: 1.0,
                    })
                    .collect();
                (
                    id,
                    TopicMetadata {
                        id,
                        label: label.to_string(),
                        terms,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        Ok(Assignment {
            topic_ids: self.0.clone(),
            topics,
        })
    }
}

/// Returns fixed sentiment scores regardless of input.
struct StubScorer(Vec<f64>);

impl SentimentScorer for StubScorer {
    fn score(&self, _texts: &[String]) -> ticket_topics::Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}

fn tickets() -> Table {
    let texts = [
        "printer jam",
        "printer jam again",
        "wifi down",
        "wifi is down",
        "12/05/2023 printer error 42",
        "login issue",
    ];
    let rows = texts
        .iter()
        .enumerate()
        .map(|(i, t)| json!({"nummer": format!("rec{i}"), "description": t, "category": "it"}))
        .collect();
    Table::from_rows("<tickets>", rows).unwrap()
}

fn run_config(table: &Table) -> RunConfig {
    RunConfig::resolve(
        table.columns(),
        &ColumnSelection::parse("description").unwrap(),
        &["nummer".to_string(), "category".to_string()],
        "nummer",
        RowLimit::All,
    )
    .unwrap()
}

fn resources() -> LanguageResources {
    LanguageResources::with_stopwords(["is", "again"])
}

#[test]
fn six_ticket_scenario() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::from_lines(["issue"]);
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 0, 1, 1, 0, -1]))
        .unwrap();

    assert_eq!(
        output.preprocessed,
        vec![
            "printer jam",
            "printer jam",
            "wifi down",
            "wifi down",
            "printer error",
            "login"
        ]
    );
    for text in &output.preprocessed {
        for token in text.split_whitespace() {
            assert_ne!(token, "issue");
            assert!(!token.chars().any(|c| c.is_ascii_digit()), "{token}");
        }
    }

    let groups = &output.groups;
    assert_eq!(groups.get(0).unwrap().members, vec!["rec0", "rec1", "rec4"]);
    assert_eq!(groups.get(1).unwrap().members, vec!["rec2", "rec3"]);
    assert_eq!(groups.get(-1).unwrap().members, vec!["rec5"]);

    let ranked: Vec<(TopicId, &str)> = output
        .report
        .topics
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();
    assert_eq!(
        ranked,
        vec![(0, "Printer jam"), (1, "Wifi down"), (-1, "Outliers")]
    );
    assert_eq!(output.report.columns, vec!["nummer", "category"]);
    assert_eq!(
        output.report.topics[0].rows[2],
        vec![json!("rec4"), json!("it")]
    );
    assert!(output.report.skipped.is_empty());

    let top = &output.word_frequencies[0];
    assert_eq!((top.word.as_str(), top.count), ("printer", 3));
}

#[test]
fn artifacts_written_after_successful_run() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::from_lines(["issue"]);
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 0, 1, 1, 0, -1]))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("report");
    let written = output.write_artifacts(&target).unwrap();
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }

    let mapping = fs::read_to_string(target.join(render::MAPPING_FILE)).unwrap();
    assert_eq!(
        mapping,
        "Topic: 0\nRecords: rec0, rec1, rec4\n\n\
         Topic: 1\nRecords: rec2, rec3\n\n\
         Topic: -1\nRecords: rec5\n\n"
    );

    let html = fs::read_to_string(target.join(render::HTML_FILE)).unwrap();
    assert!(html.contains("Topic 0: <span class=\"count\">(3)</span> Printer jam"));

    let summary = fs::read_to_string(target.join(render::SUMMARY_FILE)).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "topic,count,name,terms");
    assert_eq!(lines[1], "0,3,\"printer, jam, printer\",printer jam printer");
    assert_eq!(lines[3], "-1,1,Outliers,login");

    let report: Value =
        serde_json::from_str(&fs::read_to_string(target.join(render::JSON_FILE)).unwrap())
            .unwrap();
    assert_eq!(report["topics"][2]["name"], json!("Outliers"));
}

#[test]
fn wrong_assignment_length_is_fatal() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::default();
    let err = Pipeline::new(&resources, &forbidden)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 1]))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            records: 6,
            topics: 2
        }
    ));
}

#[test]
fn row_limit_restricts_records() {
    let table = tickets();
    let mut config = run_config(&table);
    config.row_limit = RowLimit::First(4);
    let resources = resources();
    let forbidden = ForbiddenWordSet::default();
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &config, &StubAssigner(vec![0, 0, 1, 1]))
        .unwrap();
    assert_eq!(output.record_ids, vec!["rec0", "rec1", "rec2", "rec3"]);
    assert_eq!(output.groups.member_count(), 4);
}

#[test]
fn nmf_assigner_partitions_all_records() {
    let texts = [
        "printer jam in tray",
        "printer jam paper stuck",
        "printer toner empty",
        "wifi router down",
        "wifi signal weak router",
        "wifi down again router",
        "password reset request",
        "password expired reset",
    ];
    let rows = texts
        .iter()
        .enumerate()
        .map(|(i, t)| json!({"nummer": format!("INC{i:03}"), "description": t}))
        .collect();
    let table = Table::from_rows("<nmf>", rows).unwrap();
    let config = RunConfig::resolve(
        table.columns(),
        &ColumnSelection::parse("description").unwrap(),
        &["nummer".to_string(), "category".to_string()],
        "nummer",
        RowLimit::All,
    )
    .unwrap();
    assert_eq!(config.text_columns, vec!["description"]);
    assert_eq!(config.metadata_columns, vec!["nummer"]);

    let resources = LanguageResources::with_stopwords(["in", "again"]);
    let forbidden = ForbiddenWordSet::default();
    let assigner = NmfAssigner::new(NmfConfig {
        topics: 3,
        min_topic_size: 1,
        ..NmfConfig::default()
    });
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &config, &assigner)
        .unwrap();

    assert_eq!(output.assignment.topic_ids.len(), texts.len());
    assert_eq!(output.groups.member_count(), texts.len());
    let mut seen = HashSet::new();
    for group in output.groups.iter() {
        for id in &group.members {
            assert!(seen.insert(id.clone()));
        }
    }
    let counts: Vec<usize> = output.report.topics.iter().map(|t| t.count).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);
}

#[test]
fn precomputed_assignments_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assignments.json");
    fs::write(
        &path,
        r#"{"topic_ids": [2, 2, 5, 5, 2, -1],
            "topics": [{"id": 2, "label": "2_printer_printer_jam"}]}"#,
    )
    .unwrap();
    let assigner = PrecomputedAssigner::load(&path).unwrap();

    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::default();
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &run_config(&table), &assigner)
        .unwrap();

    let names: Vec<&str> = output
        .report
        .topics
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    // Topic 5 has no label beyond its id, which cleans to an empty name.
    assert_eq!(names, vec!["Printer jam", "Unknown", "Outliers"]);
}

#[test]
fn loading_from_disk_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("tickets.csv");
    fs::write(
        &table_path,
        "nummer,short_description,category\n\
         INC1,Printer jam,hardware\n\
         INC2,Printer jam again,hardware\n\
         INC3,Wifi down,network\n",
    )
    .unwrap();
    let forbidden_path = dir.path().join("forbidden.txt");
    fs::write(&forbidden_path, "Printer\n\n").unwrap();

    let table = Table::load(&table_path).unwrap();
    let forbidden = ForbiddenWordSet::load(&forbidden_path).unwrap();
    let config = RunConfig::resolve(
        table.columns(),
        &ColumnSelection::parse("short_description").unwrap(),
        &ticket_topics::config::default_metadata_columns(),
        "nummer",
        RowLimit::All,
    )
    .unwrap();
    assert_eq!(config.metadata_columns, vec!["nummer", "category"]);

    let resources = resources();
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &config, &StubAssigner(vec![0, 0, 1]))
        .unwrap();
    assert_eq!(output.preprocessed, vec!["jam", "jam", "wifi down"]);
    assert!(output
        .word_frequencies
        .iter()
        .all(|w| w.word != "printer"));
}

#[test]
fn sentiment_distribution_for_six_tickets() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::from_lines(["issue"]);
    let scorer = StubScorer(vec![0.5, 0.5, -0.5, -0.5, 0.0, 1.0]);
    let output = Pipeline::new(&resources, &forbidden)
        .with_sentiment(&scorer)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 0, 1, 1, 0, -1]))
        .unwrap();

    let sentiment = output.sentiment.as_ref().unwrap();
    assert_eq!(sentiment.records.len(), 6);
    assert_eq!(sentiment.records[5].id, "rec5");
    assert_eq!(sentiment.records[5].score, 1.0);
    assert_eq!(sentiment.histogram.len(), HISTOGRAM_BINS);
    assert_eq!(sentiment.histogram[0].count, 2);
    assert_eq!(
        sentiment.histogram.iter().map(|b| b.count).sum::<usize>(),
        6
    );
    assert_eq!(
        (sentiment.positive, sentiment.neutral, sentiment.negative),
        (3, 1, 2)
    );
    assert!((sentiment.mean - 1.0 / 6.0).abs() < 1e-9);

    let dir = tempfile::tempdir().unwrap();
    let written = output.write_artifacts(dir.path()).unwrap();
    assert_eq!(written.len(), 6);
    let parsed: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join(render::SENTIMENT_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(parsed["records"][0], json!({"id": "rec0", "score": 0.5}));
}

#[test]
fn sentiment_is_optional() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::default();
    let output = Pipeline::new(&resources, &forbidden)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 0, 1, 1, 0, -1]))
        .unwrap();
    assert!(output.sentiment.is_none());
}

#[test]
fn wrong_score_count_is_fatal() {
    let table = tickets();
    let resources = resources();
    let forbidden = ForbiddenWordSet::default();
    let scorer = StubScorer(vec![0.1, 0.2]);
    let err = Pipeline::new(&resources, &forbidden)
        .with_sentiment(&scorer)
        .run(&table, &run_config(&table), &StubAssigner(vec![0, 0, 1, 1, 0, -1]))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ScoreMismatch {
            records: 6,
            scores: 2
        }
    ));
}
