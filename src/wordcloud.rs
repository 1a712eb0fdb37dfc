//! Word-cloud input: raw word counts over one text column.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::forbidden::ForbiddenWordSet;
use crate::preprocess::coerce_text;
use crate::resources::LanguageResources;

pub const MAX_WORDS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Count purely alphabetic, whitespace-separated words, lowercased, with
/// stopwords and forbidden words removed. Sorted by count (descending) then
/// word, truncated to `max_words`.
pub fn word_frequencies<'v, I>(
    cells: I,
    resources: &LanguageResources,
    forbidden: &ForbiddenWordSet,
    max_words: usize,
) -> Vec<WordFrequency>
where
    I: IntoIterator<Item = &'v Value>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in cells {
        for token in coerce_text(cell).split_whitespace() {
            if !token.chars().all(char::is_alphabetic) {
                continue;
            }
            let word = token.to_lowercase();
            if resources.is_stopword(&word) || forbidden.contains(&word) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    if counts.is_empty() {
        info!("no words available for the word cloud");
        return Vec::new();
    }

    let mut ranked: Vec<WordFrequency> = counts
        .into_iter()
        .map(|(word, count)| WordFrequency { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(max_words);

    debug!(
        distinct = ranked.len(),
        top = ranked.first().map(|w| w.word.as_str()).unwrap_or(""),
        "word frequencies counted"
    );
    ranked
}
