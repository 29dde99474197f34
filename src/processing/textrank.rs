//! Graph-based sentence ranking (TextRank).
//!
//! Sentences are nodes; edge weights are cosine similarity between their
//! token-frequency vectors. Scores come from PageRank power iteration.
//! Pure and deterministic: equal inputs give equal selections.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::tokenizer::tokenize;
use crate::constants::{TEXTRANK_DAMPING, TEXTRANK_EPSILON, TEXTRANK_MAX_ITERATIONS};

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+|\n+").expect("valid regex"));

/// Split on `.`, `!`, `?` and line breaks. Terminal punctuation stays with
/// its sentence; blank pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let end = if m.as_str().starts_with('\n') { m.start() } else { m.end() };
        push_sentence(&mut sentences, &text[start..end]);
        start = m.end();
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(out: &mut Vec<String>, piece: &str) {
    let s = piece.trim();
    if s.chars().any(char::is_alphanumeric) {
        out.push(s.to_string());
    }
}

/// Cosine similarity between two equal-length vectors (0.0 when either is zero).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Token-frequency vectors over a shared vocabulary, one per sentence.
fn frequency_vectors(sentences: &[String]) -> Vec<Vec<f32>> {
    let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();
    let mut vocab: HashMap<&str, usize> = HashMap::new();
    for tokens in &tokenized {
        for t in tokens {
            let next = vocab.len();
            vocab.entry(t.as_str()).or_insert(next);
        }
    }

    tokenized
        .iter()
        .map(|tokens| {
            let mut v = vec![0.0f32; vocab.len()];
            for t in tokens {
                if let Some(&i) = vocab.get(t.as_str()) {
                    v[i] += 1.0;
                }
            }
            v
        })
        .collect()
}

/// TextRank score per sentence, same order as the input.
pub fn score_sentences(sentences: &[String]) -> Vec<f64> {
    let n = sentences.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }

    let vectors = frequency_vectors(sentences);
    let mut weights = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = cosine_similarity(&vectors[i], &vectors[j]);
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }
    let out_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

    let base = (1.0 - TEXTRANK_DAMPING) / n as f64;
    let mut scores = vec![1.0 / n as f64; n];
    for iteration in 0..TEXTRANK_MAX_ITERATIONS {
        let next: Vec<f64> = (0..n)
            .map(|i| {
                let incoming: f64 = (0..n)
                    .filter(|&j| out_sums[j] > 0.0)
                    .map(|j| weights[j][i] / out_sums[j] * scores[j])
                    .sum();
                base + TEXTRANK_DAMPING * incoming
            })
            .collect();
        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < TEXTRANK_EPSILON {
            tracing::trace!(iteration, "TextRank converged");
            break;
        }
    }
    scores
}

/// The `count` best sentences of `text`, in document order.
pub fn summarize(text: &str, count: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.len() <= count {
        return sentences;
    }

    let scores = score_sentences(&sentences);
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    // Higher score first; earlier sentence wins ties.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    let mut picked: Vec<usize> = order.into_iter().take(count).collect();
    picked.sort_unstable();

    picked.into_iter().map(|i| sentences[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("First one. Second?! Third\nfourth line\n\n...");
        assert_eq!(s, vec!["First one.", "Second?!", "Third", "fourth line"]);
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_central_sentence_scores_highest() {
        let sentences: Vec<String> = [
            "faceit rating match",
            "faceit rating dropped",
            "faceit match tonight",
            "weather sunny outside",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let scores = score_sentences(&sentences);
        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best, 0);
        assert!(scores[3] < scores[1]);
    }

    #[test]
    fn test_summarize_keeps_document_order() {
        let text = "Weather sunny outside. Faceit rating match. Random noise here. \
                    Faceit rating dropped. Faceit match tonight.";
        let picked = summarize(text, 2);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|s| s.contains("Faceit")));
        let first = text.find(picked[0].as_str()).unwrap();
        let second = text.find(picked[1].as_str()).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let text = "alpha beta gamma. beta gamma delta. gamma delta alpha. unrelated words entirely.";
        assert_eq!(summarize(text, 2), summarize(text, 2));
        assert_eq!(summarize(text, 10).len(), 4);
    }
}
