//! Search module - a small in-memory host for the analyzers / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - The mapping owns the analyzer registry; the index only calls into it
//! - Documents and queries go through the same analyzers
//! - Closing the index releases every tokenizer of its mapping

pub mod engine;
pub mod mapping;
pub mod schema;

pub use engine::{MemoryIndex, VALUE_FIELD};
pub use mapping::{IndexMapping, DEFAULT_ANALYZER};
pub use schema::{IndexStats, SearchHit, SearchRequest, TermLocation};
