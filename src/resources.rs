//! Language resources: stopword corpora and lemmatization data.
//!
//! Built by one explicit `init` call before the pipeline runs, then passed by
//! reference. Nothing here is process-global.

use std::collections::HashSet;

use tracing::info;

use crate::algo::lemmatizer::Lemmatizer;
use crate::config::LanguageConfig;

#[derive(Debug)]
pub struct LanguageResources {
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl LanguageResources {
    /// Load stopwords for every configured language and build the lemmatizer.
    /// Repeated calls with the same config produce equal resources.
    pub fn init(config: &LanguageConfig) -> Self {
        let stopwords: HashSet<String> = config
            .languages
            .iter()
            .flat_map(|lang| lang.stop_words())
            .map(|w| w.to_lowercase())
            .collect();
        let lemmatizer = Lemmatizer::new(config.stemming.map(|l| l.stemming_algorithm()));
        info!(
            languages = ?config.languages,
            stopwords = stopwords.len(),
            stemming = ?config.stemming,
            "language resources ready"
        );
        Self {
            stopwords,
            lemmatizer,
        }
    }

    /// Resources with an explicit stopword list and no stemming.
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            lemmatizer: Lemmatizer::default(),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }
}
