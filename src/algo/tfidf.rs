use std::cmp::Ordering;
use std::collections::HashMap;

/// A corpus of tokenized documents for TF-IDF weighting.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// document_id -> term -> count
    doc_terms: Vec<HashMap<String, u32>>,
    /// term -> number of documents containing it
    doc_freq: HashMap<String, u32>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from whitespace-separated normalized texts.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut corpus = Self::new();
        for text in texts {
            corpus.add_document(text.as_ref().split_whitespace());
        }
        corpus
    }

    /// Add a document (as pre-tokenized terms) to the corpus.
    pub fn add_document<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *term_counts.entry(token.to_string()).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
        self.doc_terms.push(term_counts);
    }

    /// Smoothed IDF: ln((N - df + 0.5) / (df + 0.5) + 1)
    pub fn idf(&self, term: &str) -> f64 {
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
        let n = self.doc_terms.len() as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// TF-IDF vector for a document by index. Empty documents yield an empty map.
    pub fn tfidf_vector(&self, doc_idx: usize) -> HashMap<String, f64> {
        let doc = &self.doc_terms[doc_idx];
        let dl: u32 = doc.values().sum();
        if dl == 0 {
            return HashMap::new();
        }
        doc.iter()
            .map(|(term, &count)| {
                let tf = count as f64 / dl as f64;
                (term.clone(), tf * self.idf(term))
            })
            .collect()
    }

    /// Sum of the TF-IDF vectors of several documents.
    pub fn merged_vector(&self, docs: &[usize]) -> HashMap<String, f64> {
        let mut merged: HashMap<String, f64> = HashMap::new();
        for &d in docs {
            for (term, weight) in self.tfidf_vector(d) {
                *merged.entry(term).or_insert(0.0) += weight;
            }
        }
        merged
    }

    pub fn num_docs(&self) -> usize {
        self.doc_terms.len()
    }
}

/// Highest-weighted `n` terms, ties broken alphabetically so output is stable.
pub fn top_terms(vector: &HashMap<String, f64>, n: usize) -> Vec<(String, f64)> {
    let mut sorted: Vec<(String, f64)> = vector
        .iter()
        .filter(|(_, &w)| w > 0.0)
        .map(|(t, &w)| (t.clone(), w))
        .collect();
    sorted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    sorted.truncate(n);
    sorted
}
