//! Topic discovery seam.
//!
//! The pipeline only talks to [`TopicAssigner`]: one batch call in, one topic
//! id per text plus per-topic metadata out. The clustering itself is swappable.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algo::{nmf, tfidf};
use crate::error::{Error, Result};

pub type TopicId = i64;

/// Records the collaborator could not place in any topic.
pub const OUTLIER_TOPIC: TopicId = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub id: TopicId,
    /// Raw collaborator label, conventionally `"<id>_<term>_<term>..."`.
    pub label: String,
    #[serde(default)]
    pub terms: Vec<TopicTerm>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Positionally aligned with the input texts.
    pub topic_ids: Vec<TopicId>,
    pub topics: BTreeMap<TopicId, TopicMetadata>,
}

pub trait TopicAssigner {
    /// Assign every normalized text to a topic (or [`OUTLIER_TOPIC`]).
    fn assign(&self, texts: &[String]) -> Result<Assignment>;
}

/// Run an assigner and enforce the one-id-per-text contract.
pub fn assign_checked(assigner: &dyn TopicAssigner, texts: &[String]) -> Result<Assignment> {
    let assignment = assigner.assign(texts)?;
    if assignment.topic_ids.len() != texts.len() {
        return Err(Error::ShapeMismatch {
            records: texts.len(),
            topics: assignment.topic_ids.len(),
        });
    }
    Ok(assignment)
}

/// `"<id>_<term>_<term>..."` from the first `n` terms.
pub fn label_from_terms(id: TopicId, terms: &[TopicTerm], n: usize) -> String {
    std::iter::once(id.to_string())
        .chain(terms.iter().take(n).map(|t| t.term.clone()))
        .collect::<Vec<String>>()
        .join("_")
}

fn to_terms(pairs: Vec<(String, f64)>) -> Vec<TopicTerm> {
    pairs
        .into_iter()
        .map(|(term, weight)| TopicTerm { term, weight })
        .collect()
}

// ── NMF ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NmfConfig {
    /// Number of topics to factorize into.
    pub topics: usize,
    /// Representative terms kept per topic.
    pub terms_per_topic: usize,
    pub max_iter: usize,
    pub vocab_limit: usize,
    /// Topics with fewer members are dissolved into the outlier topic.
    pub min_topic_size: usize,
    /// Terms used in the raw label.
    pub label_terms: usize,
}

impl Default for NmfConfig {
    fn default() -> Self {
        Self {
            topics: 10,
            terms_per_topic: 10,
            max_iter: 200,
            vocab_limit: 5000,
            min_topic_size: 2,
            label_terms: 4,
        }
    }
}

/// In-process collaborator: TF-IDF weighting followed by NMF.
#[derive(Debug, Clone, Default)]
pub struct NmfAssigner {
    pub config: NmfConfig,
}

impl NmfAssigner {
    pub fn new(config: NmfConfig) -> Self {
        Self { config }
    }
}

impl TopicAssigner for NmfAssigner {
    fn assign(&self, texts: &[String]) -> Result<Assignment> {
        let cfg = &self.config;
        let corpus = tfidf::Corpus::from_texts(texts);
        let vectors: Vec<HashMap<String, f64>> =
            (0..corpus.num_docs()).map(|i| corpus.tfidf_vector(i)).collect();

        let k = cfg.topics.min(texts.len());
        let factorization = nmf::factorize(&vectors, k, cfg.max_iter, cfg.vocab_limit);
        let dominant = factorization.dominant_topics();

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (doc, topic) in dominant.iter().enumerate() {
            if let Some(t) = topic {
                members.entry(*t).or_default().push(doc);
            }
        }

        // Surviving topics renumbered 0.. by size, ties by first member.
        let mut surviving: Vec<(usize, Vec<usize>)> = members
            .into_iter()
            .filter(|(_, docs)| docs.len() >= cfg.min_topic_size.max(1))
            .collect();
        surviving.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1[0].cmp(&b.1[0])));

        let mut topic_ids = vec![OUTLIER_TOPIC; texts.len()];
        let mut topics = BTreeMap::new();
        for (new_id, (nmf_topic, docs)) in surviving.iter().enumerate() {
            let id = new_id as TopicId;
            for &d in docs {
                topic_ids[d] = id;
            }
            let terms = to_terms(factorization.top_terms(*nmf_topic, cfg.terms_per_topic));
            let label = label_from_terms(id, &terms, cfg.label_terms);
            debug!(topic = id, size = docs.len(), label = %label, "topic discovered");
            topics.insert(id, TopicMetadata { id, label, terms });
        }

        let outliers: Vec<usize> = topic_ids
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == OUTLIER_TOPIC)
            .map(|(i, _)| i)
            .collect();
        if !outliers.is_empty() {
            let terms = to_terms(tfidf::top_terms(
                &corpus.merged_vector(&outliers),
                cfg.terms_per_topic,
            ));
            let label = label_from_terms(OUTLIER_TOPIC, &terms, cfg.label_terms);
            topics.insert(
                OUTLIER_TOPIC,
                TopicMetadata {
                    id: OUTLIER_TOPIC,
                    label,
                    terms,
                },
            );
        }

        info!(
            records = texts.len(),
            topics = surviving.len(),
            outliers = outliers.len(),
            "NMF topic assignment finished"
        );
        Ok(Assignment { topic_ids, topics })
    }
}

// ── Precomputed ──────────────────────────────────────────────────────────────

/// Output of an external topic model, read from JSON:
/// `{"topic_ids": [...], "topics": [{"id", "label", "terms": [{"term", "weight"}]}]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecomputedAssigner {
    pub topic_ids: Vec<TopicId>,
    #[serde(default)]
    pub topics: Vec<TopicMetadata>,
}

impl PrecomputedAssigner {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl TopicAssigner for PrecomputedAssigner {
    fn assign(&self, _texts: &[String]) -> Result<Assignment> {
        let mut topics: BTreeMap<TopicId, TopicMetadata> = self
            .topics
            .iter()
            .map(|t| (t.id, t.clone()))
            .collect();
        // Ids without metadata still become topics, labelled by their id.
        for &id in &self.topic_ids {
            topics.entry(id).or_insert_with(|| TopicMetadata {
                id,
                label: id.to_string(),
                terms: vec![],
            });
        }
        Ok(Assignment {
            topic_ids: self.topic_ids.clone(),
            topics,
        })
    }
}

// ── Timeout ──────────────────────────────────────────────────────────────────

/// Runs the wrapped assigner on a worker thread and gives up after `timeout`.
/// The worker is detached on timeout; its result is discarded.
pub struct TimeoutAssigner<A> {
    inner: Arc<A>,
    timeout: Duration,
}

impl<A> TimeoutAssigner<A> {
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }
}

impl<A> TopicAssigner for TimeoutAssigner<A>
where
    A: TopicAssigner + Send + Sync + 'static,
{
    fn assign(&self, texts: &[String]) -> Result<Assignment> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned = texts.to_vec();
        thread::spawn(move || {
            let _ = tx.send(inner.assign(&owned));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::AssignerTimeout(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Error::Assigner("topic assigner thread panicked".into()))
            }
        }
    }
}
