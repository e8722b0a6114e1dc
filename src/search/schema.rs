//! Search request/response types / 搜索请求与结果类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Search query options / 搜索查询选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text, analyzed with the default analyzer / 查询文本
    pub query: String,
    /// Maximum number of hits to return / 最大返回结果数
    pub limit: usize,
    /// Offset (for pagination) / 偏移量
    pub offset: usize,
    /// Return highlighted fragments / 返回高亮片段
    pub highlight: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            offset: 0,
            highlight: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }
}

/// Where a query term matched / 命中位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLocation {
    pub position: usize,
    /// Byte offsets into the field text
    pub start: usize,
    pub end: usize,
}

/// One matching document / 搜索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Relevance score / 相关性分数
    pub score: f64,
    /// field -> highlighted text, only with `highlight` / 高亮片段
    pub fragments: BTreeMap<String, Vec<String>>,
    /// field -> term -> locations, only with `highlight`
    pub locations: BTreeMap<String, BTreeMap<String, Vec<TermLocation>>>,
}

/// Index statistics / 索引统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: usize,
    /// Distinct indexed terms / 不同词项数
    pub term_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}
