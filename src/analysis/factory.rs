use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use super::keywords::KeywordExtractor;
use super::lifecycle::SegmenterHandle;
use super::registry::TokenizerFactory;
use super::tokenizer::TokenizerAdapter;
use super::Tokenizer;
use crate::config::{self, ConfigItem, SegmenterConfig, OPTION_ITEMS};
use crate::error::{Error, Result};
use crate::segmenter::{JiebaSegmenter, StopWords, TermWeights};

/// Resources already loaded for one config / 同一配置已加载的资源
struct Loaded {
    handle: Weak<SegmenterHandle>,
    keywords: KeywordExtractor,
}

/// Builds jieba tokenizers, one segmenter per distinct config / jieba 分词器工厂
#[derive(Default)]
pub struct JiebaTokenizerFactory {
    loaded: Mutex<HashMap<SegmenterConfig, Loaded>>,
}

impl JiebaTokenizerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(name: &str, config: &SegmenterConfig) -> Result<(Arc<SegmenterHandle>, KeywordExtractor)> {
        let weights = TermWeights::load(&config.term_weight_path)?;
        let stop_words = StopWords::load(&config.stop_word_path)?;
        let segmenter = JiebaSegmenter::load(config)?;
        tracing::info!(
            "Jieba resources loaded for {}: {} term weights, {} stop words",
            name,
            weights.len(),
            stop_words.len()
        );

        let handle = Arc::new(SegmenterHandle::new(name, Box::new(segmenter)));
        let keywords = KeywordExtractor::new(Arc::new(weights), Arc::new(stop_words));
        Ok((handle, keywords))
    }
}

/// Dead or released handles no longer pin their lexicon tables
fn prune_dead(loaded: &mut HashMap<SegmenterConfig, Loaded>) {
    loaded.retain(|_, entry| entry.handle.upgrade().is_some_and(|h| !h.is_released()));
}

impl TokenizerFactory for JiebaTokenizerFactory {
    fn tokenizer_type(&self) -> &'static str {
        "jieba"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["gojieba"]
    }

    fn option_items(&self) -> Vec<ConfigItem> {
        OPTION_ITEMS.clone()
    }

    fn create_tokenizer(&self, name: &str, options: &Map<String, Value>) -> Result<Arc<dyn Tokenizer>> {
        let config = config::resolve(options)?;
        if config.implementation != self.tokenizer_type()
            && !self.aliases().contains(&config.implementation.as_str())
        {
            return Err(Error::config(
                config::IMPLEMENTATION_SELECTOR,
                format!("`{}` is not a jieba tokenizer", config.implementation),
            ));
        }

        let mut loaded = self.loaded.lock();
        prune_dead(&mut loaded);

        // Same config, still live: share the segmenter instead of loading again
        if let Some(entry) = loaded.get(&config) {
            if let Some(handle) = entry.handle.upgrade().filter(|h| !h.is_released()) {
                tracing::info!("Tokenizer {} shares segmenter {}", name, handle.label());
                let adapter = TokenizerAdapter::new(name, handle).with_keywords(entry.keywords.clone());
                return Ok(Arc::new(adapter));
            }
        }

        let (handle, keywords) = Self::load(name, &config)?;
        loaded.insert(
            config,
            Loaded {
                handle: Arc::downgrade(&handle),
                keywords: keywords.clone(),
            },
        );
        Ok(Arc::new(TokenizerAdapter::new(name, handle).with_keywords(keywords)))
    }

    fn prune(&self) {
        let mut loaded = self.loaded.lock();
        let before = loaded.len();
        prune_dead(&mut loaded);
        tracing::debug!("Jieba factory pruned {} cached config(s)", before - loaded.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jieba_options, options_map};
    use serde_json::json;

    #[test]
    fn test_create_tokenizer() {
        let factory = JiebaTokenizerFactory::new();
        let tokenizer = factory
            .create_tokenizer("jieba", &options_map(jieba_options()))
            .unwrap();
        assert_eq!(tokenizer.name(), "jieba");
        assert_eq!(tokenizer.tokenize("长江大桥").unwrap().len(), 2);
        assert!(tokenizer.stop_words().unwrap().contains("的"));
        tokenizer.release();
    }

    #[test]
    fn test_same_config_shares_segmenter() {
        let factory = JiebaTokenizerFactory::new();
        let options = options_map(jieba_options());
        let first = factory.create_tokenizer("first", &options).unwrap();
        let second = factory.create_tokenizer("second", &options).unwrap();

        assert!(second.release());
        assert!(first.is_released());
        assert!(matches!(first.tokenize("长江"), Err(Error::UseAfterFree(_))));
    }

    #[test]
    fn test_released_segmenter_is_reloaded() {
        let factory = JiebaTokenizerFactory::new();
        let options = options_map(jieba_options());
        let first = factory.create_tokenizer("first", &options).unwrap();
        first.release();

        let second = factory.create_tokenizer("second", &options).unwrap();
        assert!(!second.is_released());
        assert!(second.tokenize("长江").is_ok());
        second.release();
    }

    #[test]
    fn test_different_config_gets_own_segmenter() {
        let factory = JiebaTokenizerFactory::new();
        let mut options = options_map(jieba_options());
        let first = factory.create_tokenizer("first", &options).unwrap();
        options.insert(config::HMM.to_string(), json!(true));
        let second = factory.create_tokenizer("second", &options).unwrap();

        first.release();
        assert!(!second.is_released());
        second.release();
    }

    #[test]
    fn test_released_configs_are_pruned() {
        let factory = JiebaTokenizerFactory::new();
        let mut options = options_map(jieba_options());
        let first = factory.create_tokenizer("first", &options).unwrap();
        first.release();
        factory.prune();
        assert!(factory.loaded.lock().is_empty());

        // A dropped tokenizer leaves a dead entry that the next creation clears
        let second = factory.create_tokenizer("second", &options).unwrap();
        second.release();
        drop(second);
        options.insert(config::HMM.to_string(), json!(true));
        let third = factory.create_tokenizer("third", &options).unwrap();
        assert_eq!(factory.loaded.lock().len(), 1);
        third.release();
    }

    #[test]
    fn test_wrong_selector() {
        let factory = JiebaTokenizerFactory::new();
        let mut options = options_map(jieba_options());
        options.insert(config::IMPLEMENTATION_SELECTOR.to_string(), json!("unicode"));
        assert!(matches!(
            factory.create_tokenizer("x", &options),
            Err(Error::Config { key, .. }) if key == config::IMPLEMENTATION_SELECTOR
        ));
    }

    #[test]
    fn test_empty_stop_word_file() {
        let empty = tempfile::NamedTempFile::new().unwrap();
        let mut options = options_map(jieba_options());
        options.insert(config::STOP_WORD_PATH.to_string(), json!(empty.path()));

        let tokenizer = JiebaTokenizerFactory::new()
            .create_tokenizer("t", &options)
            .unwrap();
        assert!(tokenizer.stop_words().unwrap().is_empty());
        tokenizer.release();
    }

    #[test]
    fn test_broken_term_weights_fail_construction() {
        let mut weights = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut weights, "长江\n".as_bytes()).unwrap();
        let mut options = options_map(jieba_options());
        options.insert(config::TERM_WEIGHT_PATH.to_string(), json!(weights.path()));

        assert!(matches!(
            JiebaTokenizerFactory::new().create_tokenizer("t", &options),
            Err(Error::Construction { .. })
        ));
    }
}
