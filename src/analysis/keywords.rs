//! TF-IDF keyword extraction / 基于 TF-IDF 的关键词提取

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::segmenter::{StopWords, TermWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub weight: f64,
}

/// Keyword extractor over segmented words / 关键词提取器
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    weights: Arc<TermWeights>,
    stop_words: Arc<StopWords>,
}

impl KeywordExtractor {
    pub fn new(weights: Arc<TermWeights>, stop_words: Arc<StopWords>) -> Self {
        Self {
            weights,
            stop_words,
        }
    }

    pub fn stop_words(&self) -> &Arc<StopWords> {
        &self.stop_words
    }

    /// Rank `words` by `tf * idf / total` and keep the best `top_k`.
    ///
    /// Single characters, blanks and stop words are skipped. Ties break on
    /// the word so the output is deterministic.
    pub fn extract<'a>(&self, words: impl IntoIterator<Item = &'a str>, top_k: usize) -> Vec<Keyword> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut total = 0usize;
        for word in words {
            let trimmed = word.trim();
            if trimmed.chars().count() < 2 || self.stop_words.contains(trimmed) {
                continue;
            }
            *counts.entry(trimmed).or_default() += 1;
            total += 1;
        }
        if total == 0 {
            return Vec::new();
        }

        let mut keywords: Vec<Keyword> = counts
            .into_iter()
            .map(|(word, count)| Keyword {
                word: word.to_string(),
                weight: self.weights.weight(word) * count as f64 / total as f64,
            })
            .collect();
        keywords.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.word.cmp(&b.word))
        });
        keywords.truncate(top_k);
        keywords
    }
}
