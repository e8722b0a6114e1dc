//! Text analysis - tokenizers, filters and the analyzer registry / 文本分析
//!
//! Pipeline / 流程：
//! - options → [`crate::config::resolve`] → segmenter → [`SegmenterHandle`]
//! - handle → [`TokenizerAdapter`] → registered in an [`AnalyzerRegistry`]
//! - the host calls [`Tokenizer::tokenize`] / [`Analyzer::analyze`] per
//!   document and per query
//! - teardown releases every tokenizer through the registry

pub mod analyzer;
pub mod factory;
pub mod filters;
pub mod keywords;
pub mod lifecycle;
pub mod registry;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::segmenter::StopWords;

pub use analyzer::Analyzer;
pub use factory::JiebaTokenizerFactory;
pub use filters::TokenFilter;
pub use keywords::{Keyword, KeywordExtractor};
pub use lifecycle::SegmenterHandle;
pub use registry::{AnalyzerRegistry, TokenizerFactory};
pub use tokenizer::TokenizerAdapter;

/// One unit of tokenizer output / 分词单元
///
/// `start`/`end` are byte offsets into the analyzed text (end exclusive),
/// `position` is 1-based. As produced by a tokenizer, `term` equals
/// `text[start..end]`; filters may rewrite `term` but never the offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub term: String,
    pub start: usize,
    pub end: usize,
    pub position: usize,
}

/// Tokenizer capability handed out by the registry / 分词器能力
///
/// Release is part of the capability, so owners never need the concrete
/// type to free resources.
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &str;

    /// Split `text` into tokens / 分词
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Idempotent; `true` only for the call that freed resources / 释放资源
    fn release(&self) -> bool;

    fn is_released(&self) -> bool;

    /// Stop words loaded with this tokenizer, if any
    fn stop_words(&self) -> Option<Arc<StopWords>> {
        None
    }

    /// Top `top_k` weighted keywords of `text` / 关键词提取
    fn extract_keywords(&self, text: &str, top_k: usize) -> Result<Vec<Keyword>> {
        let _ = (text, top_k);
        Err(Error::config(
            crate::config::TERM_WEIGHT_PATH,
            format!("tokenizer `{}` has no term weights", self.name()),
        ))
    }
}
