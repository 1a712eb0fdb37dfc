//! Sentiment seam.
//!
//! Like topic discovery, scoring is a swappable collaborator: one batch call,
//! one compound polarity in `[-1, 1]` per normalized text.

use serde::Serialize;
use tracing::info;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::{Error, Result};

/// Bins of the sentiment distribution.
pub const HISTOGRAM_BINS: usize = 20;

/// Scores within this distance of zero count as neutral.
const NEUTRAL_BAND: f64 = 0.05;

pub trait SentimentScorer {
    fn score(&self, texts: &[String]) -> Result<Vec<f64>>;
}

/// Run a scorer and enforce one score per text.
pub fn score_checked(scorer: &dyn SentimentScorer, texts: &[String]) -> Result<Vec<f64>> {
    let scores = scorer.score(texts)?;
    if scores.len() != texts.len() {
        return Err(Error::ScoreMismatch {
            records: texts.len(),
            scores: scores.len(),
        });
    }
    Ok(scores)
}

/// Lexicon-based VADER compound score.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl SentimentScorer for VaderScorer {
    fn score(&self, texts: &[String]) -> Result<Vec<f64>> {
        let analyzer = SentimentIntensityAnalyzer::new();
        Ok(texts
            .iter()
            .map(|text| {
                analyzer
                    .polarity_scores(text)
                    .get("compound")
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSentiment {
    pub id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub records: Vec<RecordSentiment>,
    pub histogram: Vec<HistogramBin>,
    pub mean: f64,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    /// `ids` and `scores` are positionally aligned.
    pub fn new(ids: &[String], scores: &[f64], bins: usize) -> Self {
        let records: Vec<RecordSentiment> = ids
            .iter()
            .zip(scores)
            .map(|(id, &score)| RecordSentiment {
                id: id.clone(),
                score,
            })
            .collect();

        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let positive = scores.iter().filter(|&&s| s > NEUTRAL_BAND).count();
        let negative = scores.iter().filter(|&&s| s < -NEUTRAL_BAND).count();

        let distribution = Self {
            records,
            histogram: histogram(scores, bins),
            mean,
            positive,
            neutral: scores.len() - positive - negative,
            negative,
        };
        info!(
            records = scores.len(),
            mean = distribution.mean,
            positive,
            negative,
            "sentiment scored"
        );
        distribution
    }
}

/// Equal-width bins over the observed range. A degenerate range is widened by
/// half a unit on both sides; the last bin includes its upper edge.
pub fn histogram(scores: &[f64], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }
    let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    let (mut lo, mut hi) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    if finite.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + i as f64 * width,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();
    for s in finite {
        let slot = (((s - lo) / width) as usize).min(bins - 1);
        histogram[slot].count += 1;
    }
    histogram
}
