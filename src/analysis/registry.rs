//! Analyzer registry - name based tokenizer/analyzer binding / 分析器注册表
//!
//! One registry per index mapping; it is created during setup, read on
//! every index/query call and released at teardown. Lookups hand out the
//! registered `Arc` itself, so the owner can release the very instance
//! the pipeline has been using.

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::analyzer::Analyzer;
use super::factory::JiebaTokenizerFactory;
use super::filters::filter_named;
use super::Tokenizer;
use crate::config::{self, ConfigItem};
use crate::error::{Error, Result};

/// Tokenizer factory trait / 分词器工厂 trait
pub trait TokenizerFactory: Send + Sync {
    /// Implementation selector tag / 实现选择标签
    fn tokenizer_type(&self) -> &'static str;

    /// Other tags that select this factory
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Option items understood by this factory / 配置项
    fn option_items(&self) -> Vec<ConfigItem>;

    /// Build a tokenizer; all loading happens here, never on first use
    fn create_tokenizer(&self, name: &str, options: &Map<String, Value>) -> Result<Arc<dyn Tokenizer>>;

    /// Forget cached resources whose tokenizers are released / 清理已释放的缓存
    fn prune(&self) {}
}

/// Analyzer options / 分析器配置
#[derive(Debug, Deserialize)]
struct AnalyzerOptions {
    /// Informational only, e.g. "custom" or "jieba"
    #[serde(rename = "type", default)]
    kind: Option<String>,
    tokenizer: String,
    #[serde(default)]
    token_filters: Vec<String>,
}

/// Analyzer registry / 分析器注册表
pub struct AnalyzerRegistry {
    factories: RwLock<HashMap<String, Arc<dyn TokenizerFactory>>>,
    tokenizers: RwLock<HashMap<String, Arc<dyn Tokenizer>>>,
    analyzers: RwLock<HashMap<String, Arc<Analyzer>>>,
}

impl AnalyzerRegistry {
    /// Registry with the built-in jieba factory / 含内置 jieba 工厂
    pub fn new() -> Self {
        let registry = Self::empty();
        let mut factories = registry.factories.write();
        let jieba: Arc<dyn TokenizerFactory> = Arc::new(JiebaTokenizerFactory::new());
        factories.insert(jieba.tokenizer_type().to_string(), Arc::clone(&jieba));
        for alias in jieba.aliases() {
            factories.insert(alias.to_string(), Arc::clone(&jieba));
        }
        drop(factories);
        registry
    }

    /// Registry without any factory
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            tokenizers: RwLock::new(HashMap::new()),
            analyzers: RwLock::new(HashMap::new()),
        }
    }

    /// Register tokenizer factory / 注册分词器工厂
    pub fn register_factory(&self, factory: Box<dyn TokenizerFactory>) -> Result<()> {
        let factory: Arc<dyn TokenizerFactory> = Arc::from(factory);
        let tags: Vec<&'static str> = std::iter::once(factory.tokenizer_type())
            .chain(factory.aliases().iter().copied())
            .collect();

        let mut factories = self.factories.write();
        if let Some(taken) = tags.iter().find(|tag| factories.contains_key(**tag)) {
            return Err(Error::DuplicateName {
                kind: "tokenizer type",
                name: taken.to_string(),
            });
        }
        for tag in &tags {
            factories.insert(tag.to_string(), Arc::clone(&factory));
        }

        tracing::info!("Tokenizer factory registered: {}", factory.tokenizer_type());
        Ok(())
    }

    /// List available tokenizer types / 列出可用的分词器类型
    pub fn tokenizer_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Option items of one tokenizer type
    pub fn option_items(&self, tokenizer_type: &str) -> Option<Vec<ConfigItem>> {
        self.factories
            .read()
            .get(tokenizer_type)
            .map(|factory| factory.option_items())
    }

    /// Build and register a tokenizer from options / 按配置创建并注册分词器
    ///
    /// The name is checked before anything is loaded, and again before the
    /// result is inserted; no lock is held while the segmenter loads.
    pub fn add_tokenizer(&self, name: &str, options: &Value) -> Result<Arc<dyn Tokenizer>> {
        let options = options
            .as_object()
            .ok_or_else(|| Error::config("options", "expected a JSON object"))?;

        if self.tokenizers.read().contains_key(name) {
            return Err(duplicate_tokenizer(name));
        }

        let selector = config::implementation_selector(options)?;
        let factory = self.factories.read().get(&selector).cloned().ok_or_else(|| {
            Error::config(
                config::IMPLEMENTATION_SELECTOR,
                format!("no tokenizer type `{}`", selector),
            )
        })?;

        let tokenizer = factory.create_tokenizer(name, options).map_err(|e| {
            tracing::error!("Tokenizer creation failed: {} ({}) - {}", name, selector, e);
            e
        })?;

        let mut tokenizers = self.tokenizers.write();
        if tokenizers.contains_key(name) {
            // The segmenter may be shared with the winner, so it is dropped, not released
            tracing::warn!("Tokenizer {} was registered while loading; discarding the new one", name);
            return Err(duplicate_tokenizer(name));
        }
        tokenizers.insert(name.to_string(), Arc::clone(&tokenizer));

        tracing::info!("Tokenizer registered: {} ({})", name, selector);
        Ok(tokenizer)
    }

    /// Register an already built tokenizer / 注册已构造的分词器
    pub fn register_tokenizer(&self, name: &str, tokenizer: Arc<dyn Tokenizer>) -> Result<()> {
        let mut tokenizers = self.tokenizers.write();
        if tokenizers.contains_key(name) {
            return Err(duplicate_tokenizer(name));
        }
        tokenizers.insert(name.to_string(), tokenizer);
        tracing::info!("Tokenizer registered: {}", name);
        Ok(())
    }

    pub fn tokenizer_named(&self, name: &str) -> Result<Arc<dyn Tokenizer>> {
        self.tokenizers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTokenizer(name.to_string()))
    }

    /// Build and register an analyzer from options / 按配置创建并注册分析器
    ///
    /// `{"tokenizer": "<name>", "token_filters": ["lowercase", ...]}`
    pub fn add_analyzer(&self, name: &str, options: &Value) -> Result<Arc<Analyzer>> {
        let options: AnalyzerOptions = serde_json::from_value(options.clone())
            .map_err(|e| Error::config("analyzer", e.to_string()))?;
        let tokenizer = self.tokenizer_named(&options.tokenizer)?;

        let mut analyzer = Analyzer::new(name, Arc::clone(&tokenizer));
        for filter in &options.token_filters {
            analyzer = analyzer.with_filter(filter_named(filter, tokenizer.stop_words())?);
        }
        tracing::debug!(
            "Analyzer {} built: type={:?}, filters={:?}",
            name,
            options.kind,
            options.token_filters
        );
        self.register_analyzer(analyzer)
    }

    /// Register an analyzer / 注册分析器
    pub fn register_analyzer(&self, analyzer: Analyzer) -> Result<Arc<Analyzer>> {
        let mut analyzers = self.analyzers.write();
        if analyzers.contains_key(analyzer.name()) {
            return Err(Error::DuplicateName {
                kind: "analyzer",
                name: analyzer.name().to_string(),
            });
        }
        let analyzer = Arc::new(analyzer);
        analyzers.insert(analyzer.name().to_string(), Arc::clone(&analyzer));
        tracing::info!(
            "Analyzer registered: {} (tokenizer {})",
            analyzer.name(),
            analyzer.tokenizer().name()
        );
        Ok(analyzer)
    }

    pub fn analyzer_named(&self, name: &str) -> Result<Arc<Analyzer>> {
        self.analyzers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownAnalyzer(name.to_string()))
    }

    pub fn analyzer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.analyzers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn tokenizer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tokenizers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Release every registered tokenizer / 释放全部分词器
    ///
    /// Returns how many segmenters this call actually freed. Safe to repeat.
    pub fn release_all(&self) -> usize {
        let tokenizers = self.tokenizers.read();
        let released = tokenizers
            .values()
            .filter(|tokenizer| tokenizer.release())
            .count();
        tracing::info!(
            "Analyzer registry released {} segmenter(s) across {} tokenizer(s)",
            released,
            tokenizers.len()
        );
        drop(tokenizers);

        for factory in self.factories.read().values() {
            factory.prune();
        }
        released
    }
}

fn duplicate_tokenizer(name: &str) -> Error {
    Error::DuplicateName {
        kind: "tokenizer",
        name: name.to_string(),
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
