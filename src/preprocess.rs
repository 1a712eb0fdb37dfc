//! Text normalization: raw ticket text → lemmatized, stopword-free string.
//!
//! Pipeline per text (order matters):
//!   coerce to string → tokenize → drop dates and numbers → rejoin, strip
//!   punctuation, lowercase → re-tokenize → drop stopwords and forbidden words
//!   → lemmatize → join

use rayon::prelude::*;
use serde_json::Value;

use crate::algo::tokenizer::{is_date, is_numeric, strip_punctuation, word_tokenize, words};
use crate::forbidden::ForbiddenWordSet;
use crate::resources::LanguageResources;

/// String form of a table cell. Never fails: null becomes empty, scalars their
/// literal text, nested values their JSON text.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct TextPreprocessor<'a> {
    resources: &'a LanguageResources,
    forbidden: &'a ForbiddenWordSet,
}

impl<'a> TextPreprocessor<'a> {
    pub fn new(resources: &'a LanguageResources, forbidden: &'a ForbiddenWordSet) -> Self {
        Self {
            resources,
            forbidden,
        }
    }

    fn is_excluded(&self, token: &str) -> bool {
        self.resources.is_stopword(token) || self.forbidden.contains(token)
    }

    pub fn normalize(&self, text: &str) -> String {
        let kept: Vec<&str> = word_tokenize(text)
            .into_iter()
            .filter(|t| !is_date(t) && !is_numeric(t))
            .collect();

        let cleaned = strip_punctuation(&kept.join(" ")).to_lowercase();

        let lemmatizer = self.resources.lemmatizer();
        words(&cleaned)
            .into_iter()
            .filter(|t| !self.is_excluded(t))
            .map(|t| lemmatizer.lemmatize(t))
            // A lemma may collapse onto a forbidden word ("issues" → "issue").
            .filter(|lemma| !self.forbidden.contains(lemma))
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn normalize_value(&self, value: &Value) -> String {
        self.normalize(&coerce_text(value))
    }

    /// Normalize a batch in parallel; output order matches input order.
    pub fn normalize_all<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        texts.par_iter().map(|t| self.normalize(t.as_ref())).collect()
    }
}
