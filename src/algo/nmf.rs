use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

type Matrix = Vec<Vec<f64>>;

const EPS: f64 = 1e-10;

/// Non-negative Matrix Factorization for topic modeling.
///
/// Given a document-term matrix V (n_docs × n_terms), decompose into:
///   V ≈ W × H
/// where W (n_docs × k) holds document-topic weights
/// and H (k × n_terms) holds topic-term weights.
///
/// Uses multiplicative update rules (Lee & Seung, 2001).
pub struct Factorization {
    pub doc_topics: Matrix,
    pub topic_terms: Matrix,
    /// Column index → term.
    pub vocabulary: Vec<String>,
    pub k: usize,
}

impl Factorization {
    /// Top `n` terms of topic `topic` by weight in H.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(String, f64)> {
        let Some(row) = self.topic_terms.get(topic) else {
            return vec![];
        };
        let mut indexed: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > EPS)
            .collect();
        indexed.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.vocabulary[a.0].cmp(&self.vocabulary[b.0]))
        });
        indexed
            .into_iter()
            .take(n)
            .map(|(i, w)| (self.vocabulary[i].clone(), w))
            .collect()
    }

    /// Dominant topic per document, `None` when a document carries no weight
    /// at all (empty text or only out-of-vocabulary terms).
    pub fn dominant_topics(&self) -> Vec<Option<usize>> {
        self.doc_topics
            .iter()
            .map(|row| {
                row.iter()
                    .copied()
                    .enumerate()
                    .filter(|(_, w)| *w > EPS)
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
                    .map(|(i, _)| i)
            })
            .collect()
    }
}

/// Run NMF on TF-IDF vectors.
///
/// * `vectors` - One map per document, term → weight.
/// * `k` - Number of topics.
/// * `max_iter` - Multiplicative update rounds.
/// * `vocab_limit` - Maximum vocabulary size (top terms by document frequency).
pub fn factorize(
    vectors: &[HashMap<String, f64>],
    k: usize,
    max_iter: usize,
    vocab_limit: usize,
) -> Factorization {
    let n_docs = vectors.len();
    let vocabulary = build_vocabulary(vectors, vocab_limit);
    let n_terms = vocabulary.len();

    let term_idx: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut v = vec![vec![0.0f64; n_terms]; n_docs];
    for (d, vec) in vectors.iter().enumerate() {
        for (term, &weight) in vec {
            if let Some(&idx) = term_idx.get(term.as_str()) {
                v[d][idx] = weight;
            }
        }
    }

    if n_docs == 0 || n_terms == 0 || k == 0 {
        return Factorization {
            doc_topics: vec![vec![0.0; k]; n_docs],
            topic_terms: vec![vec![0.0; n_terms]; k],
            vocabulary,
            k,
        };
    }

    // Deterministic positive initialisation. Rows of W for empty documents
    // collapse to zero after the first update since V is zero there.
    let mut w: Matrix = (0..n_docs)
        .map(|i| (0..k).map(|j| seed_value(i * k + j)).collect())
        .collect();
    let mut h: Matrix = (0..k)
        .map(|i| (0..n_terms).map(|j| seed_value(i * n_terms + j + 7)).collect())
        .collect();

    for _ in 0..max_iter {
        // H = H * (Wᵀ V) / (Wᵀ W H)
        let wt_v = mul_at_b(&w, &v, k, n_terms);
        let wt_w = mul_at_b(&w, &w, k, k);
        let wt_w_h = mul(&wt_w, &h, n_terms);
        for i in 0..k {
            for j in 0..n_terms {
                h[i][j] *= wt_v[i][j] / (wt_w_h[i][j] + EPS);
            }
        }

        // W = W * (V Hᵀ) / (W H Hᵀ)
        let v_ht = mul_a_bt(&v, &h);
        let wh = mul(&w, &h, n_terms);
        let wh_ht = mul_a_bt(&wh, &h);
        for i in 0..n_docs {
            for j in 0..k {
                w[i][j] *= v_ht[i][j] / (wh_ht[i][j] + EPS);
            }
        }
    }

    Factorization {
        doc_topics: w,
        topic_terms: h,
        vocabulary,
        k,
    }
}

fn seed_value(n: usize) -> f64 {
    0.1 + 0.01 * ((n * 37) % 100) as f64 / 100.0
}

/// Terms ordered by document frequency (descending), ties alphabetical.
fn build_vocabulary(vectors: &[HashMap<String, f64>], limit: usize) -> Vec<String> {
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for vec in vectors {
        for term in vec.keys() {
            *doc_freq.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let mut vocab: Vec<(&str, usize)> = doc_freq.into_iter().collect();
    vocab.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    vocab.truncate(limit);
    vocab.into_iter().map(|(t, _)| t.to_string()).collect()
}

// Aᵀ × B where A is (m × n) and B is (m × p); result is (n × p)
fn mul_at_b(a: &[Vec<f64>], b: &[Vec<f64>], n: usize, p: usize) -> Matrix {
    (0..n)
        .into_par_iter()
        .map(|i| {
            (0..p)
                .map(|j| a.iter().zip(b).map(|(ra, rb)| ra[i] * rb[j]).sum::<f64>())
                .collect::<Vec<f64>>()
        })
        .collect()
}

// A × B where B is (n × p)
fn mul(a: &[Vec<f64>], b: &[Vec<f64>], p: usize) -> Matrix {
    a.par_iter()
        .map(|row| {
            (0..p)
                .map(|j| row.iter().zip(b).map(|(x, rb)| x * rb[j]).sum::<f64>())
                .collect::<Vec<f64>>()
        })
        .collect()
}

// A × Bᵀ where A is (m × n) and B is (p × n)
fn mul_a_bt(a: &[Vec<f64>], b: &[Vec<f64>]) -> Matrix {
    a.par_iter()
        .map(|row| {
            b.iter()
                .map(|rb| row.iter().zip(rb).map(|(x, y)| x * y).sum::<f64>())
                .collect::<Vec<f64>>()
        })
        .collect()
}
