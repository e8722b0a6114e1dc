//! Analyzer - a tokenizer plus its filter chain / 分析器

use std::sync::Arc;

use super::filters::TokenFilter;
use super::{Token, Tokenizer};
use crate::error::Result;

pub struct Analyzer {
    name: String,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Box<dyn TokenFilter>>,
}

impl Analyzer {
    pub fn new(name: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            name: name.into(),
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared tokenizer instance, also the handle for release / 共享的分词器实例
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Tokenize then run every filter in order / 分词并依次过滤
    pub fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        let tokens = self.tokenizer.tokenize(text)?;
        Ok(self
            .filters
            .iter()
            .fold(tokens, |tokens, filter| filter.filter(tokens)))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &self.filter_names())
            .finish()
    }
}
