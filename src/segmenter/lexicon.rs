//! Term weight table and stop word list / 词权重表与停用词表

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Inverse document frequency weights / 逆文档频率权重
#[derive(Debug, Clone, Default)]
pub struct TermWeights {
    weights: HashMap<String, f64>,
    median: f64,
}

impl TermWeights {
    /// Load `word weight` lines / 加载权重文件
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::construction(path, e))?;
        Self::from_reader(path, BufReader::new(file))
    }

    fn from_reader(path: &Path, reader: impl BufRead) -> Result<Self> {
        let mut weights = HashMap::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::construction(path, e))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(word), Some(weight), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(Error::construction(
                    path,
                    format!("line {}: expected `word weight`", number + 1),
                ));
            };
            let weight: f64 = weight.parse().map_err(|e| {
                Error::construction(path, format!("line {}: bad weight: {}", number + 1, e))
            })?;
            weights.insert(word.to_string(), weight);
        }

        let mut sorted: Vec<f64> = weights.values().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let median = sorted.get(sorted.len() / 2).copied().unwrap_or(0.0);

        Ok(Self { weights, median })
    }

    /// Weight of `word`, falling back to the median / 未登录词使用中位数
    pub fn weight(&self, word: &str) -> f64 {
        self.weights.get(word).copied().unwrap_or(self.median)
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Stop word set / 停用词集合
#[derive(Debug, Clone, Default)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    /// One word per line; blank lines skipped
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::construction(path, e))?;
        let mut words = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::construction(path, e))?;
            let word = line.trim();
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }
        Ok(Self(words))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
