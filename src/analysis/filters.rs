//! Token filters applied after tokenization / 分词后过滤器
//!
//! Filters may drop tokens or rewrite their terms; offsets and positions of
//! the surviving tokens are left untouched.

use std::sync::Arc;

use super::Token;
use crate::error::{Error, Result};
use crate::segmenter::StopWords;

pub trait TokenFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;
}

/// Lowercase terms (ASCII and other cased scripts) / 转小写
pub struct LowercaseFilter;

impl TokenFilter for LowercaseFilter {
    fn name(&self) -> &'static str {
        "lowercase"
    }

    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        for token in &mut tokens {
            if token.term.chars().any(char::is_uppercase) {
                token.term = token.term.to_lowercase();
            }
        }
        tokens
    }
}

/// Drop stop words / 去除停用词
pub struct StopWordFilter {
    stop_words: Arc<StopWords>,
}

impl StopWordFilter {
    pub fn new(stop_words: Arc<StopWords>) -> Self {
        Self { stop_words }
    }
}

impl TokenFilter for StopWordFilter {
    fn name(&self) -> &'static str {
        "stop_words"
    }

    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        tokens.retain(|token| !self.stop_words.contains(&token.term));
        tokens
    }
}

/// Drop whitespace-only tokens / 去除空白分词
pub struct WhitespaceFilter;

impl TokenFilter for WhitespaceFilter {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        tokens.retain(|token| !token.term.trim().is_empty());
        tokens
    }
}

/// Build a filter by name / 按名称构造过滤器
///
/// `stop_words` comes from the analyzer's tokenizer.
pub fn filter_named(name: &str, stop_words: Option<Arc<StopWords>>) -> Result<Box<dyn TokenFilter>> {
    match name {
        "lowercase" => Ok(Box::new(LowercaseFilter)),
        "whitespace" => Ok(Box::new(WhitespaceFilter)),
        "stop_words" => {
            let stop_words = stop_words.ok_or_else(|| {
                Error::config("token_filters", "stop_words filter needs a tokenizer with stop words")
            })?;
            Ok(Box::new(StopWordFilter::new(stop_words)))
        }
        other => Err(Error::config(
            "token_filters",
            format!("unknown token filter `{}`", other),
        )),
    }
}
