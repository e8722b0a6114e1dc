//! Index mapping - which analyzer handles which field / 索引映射

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::analysis::{Analyzer, AnalyzerRegistry, Tokenizer};
use crate::error::Result;

pub const DEFAULT_ANALYZER: &str = "default";

/// Index mapping / 索引映射
///
/// Owns the analyzer registry of one index. Setup registers tokenizers and
/// analyzers here; teardown calls [`IndexMapping::release`].
#[derive(Default)]
pub struct IndexMapping {
    registry: AnalyzerRegistry,
    default_analyzer: Option<String>,
    field_analyzers: HashMap<String, String>,
}

impl IndexMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tokenizer from options / 注册自定义分词器
    pub fn add_custom_tokenizer(&self, name: &str, options: &Value) -> Result<Arc<dyn Tokenizer>> {
        self.registry.add_tokenizer(name, options)
    }

    /// Register an analyzer from options / 注册自定义分析器
    pub fn add_custom_analyzer(&self, name: &str, options: &Value) -> Result<Arc<Analyzer>> {
        self.registry.add_analyzer(name, options)
    }

    pub fn set_default_analyzer(&mut self, name: impl Into<String>) {
        self.default_analyzer = Some(name.into());
    }

    /// Analyzer for one field path, e.g. `title` or `meta.author`
    pub fn set_field_analyzer(&mut self, field: impl Into<String>, analyzer: impl Into<String>) {
        self.field_analyzers.insert(field.into(), analyzer.into());
    }

    pub fn default_analyzer_name(&self) -> &str {
        self.default_analyzer.as_deref().unwrap_or(DEFAULT_ANALYZER)
    }

    pub fn analyzer_named(&self, name: &str) -> Result<Arc<Analyzer>> {
        self.registry.analyzer_named(name)
    }

    /// Field analyzer, falling back to the default one
    pub fn analyzer_for_field(&self, field: &str) -> Result<Arc<Analyzer>> {
        let name = self
            .field_analyzers
            .get(field)
            .map(String::as_str)
            .unwrap_or_else(|| self.default_analyzer_name());
        self.registry.analyzer_named(name)
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    /// Check every referenced analyzer is registered / 校验映射
    pub fn validate(&self) -> Result<()> {
        self.analyzer_named(self.default_analyzer_name())?;
        for analyzer in self.field_analyzers.values() {
            self.analyzer_named(analyzer)?;
        }
        Ok(())
    }

    /// Release every tokenizer of this mapping / 释放映射的分词器
    pub fn release(&self) -> usize {
        self.registry.release_all()
    }
}

impl std::fmt::Debug for IndexMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexMapping")
            .field("default_analyzer", &self.default_analyzer_name())
            .field("field_analyzers", &self.field_analyzers)
            .field("analyzers", &self.registry.analyzer_names())
            .finish()
    }
}
