//! Jieba word segmentation as a tokenizer for full-text indexing / 结巴分词索引分析器
//!
//! Layers / 层次：
//! - [`config`]: option validation into a [`config::SegmenterConfig`]
//! - [`segmenter`]: dictionary-backed segmentation engines
//! - [`analysis`]: tokenizer contract, lifecycle, filters and the registry
//! - [`search`]: in-memory index used to run analyzers end to end

pub mod analysis;
pub mod config;
pub mod error;
pub mod search;
pub mod segmenter;

#[cfg(test)]
mod testing;

pub use analysis::{Analyzer, AnalyzerRegistry, Keyword, Token, Tokenizer, TokenizerFactory};
pub use config::SegmenterConfig;
pub use error::{Error, Result};
pub use search::{IndexMapping, MemoryIndex, SearchHit, SearchRequest};
