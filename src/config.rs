//! Tokenizer option resolution / 分词器配置解析
//!
//! Validates a flat option mapping and produces a [`SegmenterConfig`].
//! Nothing is loaded here; paths are only checked for readability.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DICTIONARY_PATH: &str = "dictionary-path";
pub const MODEL_PATH: &str = "model-path";
pub const USER_DICTIONARY_PATH: &str = "user-dictionary-path";
pub const TERM_WEIGHT_PATH: &str = "term-weight-path";
pub const STOP_WORD_PATH: &str = "stop-word-path";
pub const IMPLEMENTATION_SELECTOR: &str = "implementation-selector";
pub const HMM: &str = "hmm";

/// Option item definition / 配置项定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    /// Older spelling still accepted / 兼容旧名称
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigItem {
    pub fn new(name: &str, item_type: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            item_type: item_type.to_string(),
            default: None,
            required: false,
            help: None,
        }
    }

    pub fn alias(mut self, val: &str) -> Self {
        self.alias = Some(val.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, val: &str) -> Self {
        self.default = Some(val.to_string());
        self
    }

    pub fn help(mut self, val: &str) -> Self {
        self.help = Some(val.to_string());
        self
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.alias.as_deref() == Some(key)
    }

    /// Look the item up by name, then by alias
    fn lookup<'a>(&self, options: &'a Map<String, Value>) -> Option<&'a Value> {
        options
            .get(&self.name)
            .or_else(|| self.alias.as_ref().and_then(|alias| options.get(alias)))
    }
}

/// Recognized tokenizer options / 支持的分词器配置项
pub static OPTION_ITEMS: Lazy<Vec<ConfigItem>> = Lazy::new(|| {
    vec![
        ConfigItem::new(DICTIONARY_PATH, "path")
            .alias("dictpath")
            .required()
            .help("Main word dictionary"),
        ConfigItem::new(MODEL_PATH, "path")
            .alias("hmmpath")
            .required()
            .help("Statistical segmentation model"),
        ConfigItem::new(USER_DICTIONARY_PATH, "path")
            .alias("userdictpath")
            .required()
            .help("Custom terms loaded over the main dictionary"),
        ConfigItem::new(TERM_WEIGHT_PATH, "path")
            .alias("idf")
            .required()
            .help("Inverse document frequency weights for keyword extraction"),
        ConfigItem::new(STOP_WORD_PATH, "path")
            .alias("stop_words")
            .required()
            .help("Terms excluded from keywords and by the stop_words filter"),
        ConfigItem::new(IMPLEMENTATION_SELECTOR, "string")
            .alias("type")
            .required()
            .help("Tokenizer implementation tag"),
        ConfigItem::new(HMM, "bool")
            .default("false")
            .help("Use the statistical model for words missing from the dictionary"),
    ]
});

/// Validated segmenter construction descriptor / 分词器构造参数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmenterConfig {
    pub dictionary_path: PathBuf,
    pub model_path: PathBuf,
    pub user_dictionary_path: PathBuf,
    pub term_weight_path: PathBuf,
    pub stop_word_path: PathBuf,
    pub implementation: String,
    #[serde(default)]
    pub hmm: bool,
}

impl SegmenterConfig {
    /// Validate a JSON options object / 校验 JSON 配置对象
    pub fn from_value(options: &Value) -> Result<Self> {
        let map = options
            .as_object()
            .ok_or_else(|| Error::config("options", "expected a JSON object"))?;
        resolve(map)
    }
}

/// Resolve a flat option mapping into a [`SegmenterConfig`] / 解析配置
///
/// The first failing item (in [`OPTION_ITEMS`] order) is reported.
pub fn resolve(options: &Map<String, Value>) -> Result<SegmenterConfig> {
    for key in options.keys() {
        if !OPTION_ITEMS.iter().any(|item| item.matches(key)) {
            tracing::warn!("Ignoring unrecognized tokenizer option: {}", key);
        }
    }

    let config = SegmenterConfig {
        dictionary_path: path_option(options, DICTIONARY_PATH)?,
        model_path: path_option(options, MODEL_PATH)?,
        user_dictionary_path: path_option(options, USER_DICTIONARY_PATH)?,
        term_weight_path: path_option(options, TERM_WEIGHT_PATH)?,
        stop_word_path: path_option(options, STOP_WORD_PATH)?,
        implementation: string_option(options, IMPLEMENTATION_SELECTOR)?,
        hmm: bool_option(options, HMM)?,
    };

    tracing::debug!("Resolved segmenter config: {:?}", config);
    Ok(config)
}

/// Read only the implementation selector tag / 读取实现选择标签
pub fn implementation_selector(options: &Map<String, Value>) -> Result<String> {
    string_option(options, IMPLEMENTATION_SELECTOR)
}

fn item(name: &str) -> &'static ConfigItem {
    OPTION_ITEMS
        .iter()
        .find(|item| item.name == name)
        .unwrap_or_else(|| unreachable!("option {name} missing from OPTION_ITEMS"))
}

fn string_option(options: &Map<String, Value>, name: &str) -> Result<String> {
    let value = item(name)
        .lookup(options)
        .ok_or_else(|| Error::config(name, "required option is missing"))?;
    let text = value
        .as_str()
        .ok_or_else(|| Error::config(name, format!("expected a string, got {}", value)))?;
    if text.trim().is_empty() {
        return Err(Error::config(name, "must not be empty"));
    }
    Ok(text.to_string())
}

fn path_option(options: &Map<String, Value>, name: &str) -> Result<PathBuf> {
    let path = PathBuf::from(string_option(options, name)?);
    check_readable(name, &path)?;
    Ok(path)
}

fn bool_option(options: &Map<String, Value>, name: &str) -> Result<bool> {
    match item(name).lookup(options) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(Error::config(name, format!("expected a bool, got {}", other))),
    }
}

fn check_readable(name: &str, path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| Error::config(name, format!("cannot read {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(Error::config(
            name,
            format!("{} is not a regular file", path.display()),
        ));
    }
    File::open(path)
        .map_err(|e| Error::config(name, format!("cannot open {}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jieba_options, options_map};
    use serde_json::json;

    fn assert_config_error(result: Result<SegmenterConfig>, expected_key: &str) {
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected config error for {expected_key}, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_full_options() {
        let config = resolve(&options_map(jieba_options())).unwrap();
        assert_eq!(config.implementation, "jieba");
        assert!(!config.hmm);
        assert!(config.dictionary_path.ends_with("jieba.dict.utf8"));
        assert!(config.stop_word_path.ends_with("stop_words.utf8"));
    }

    #[test]
    fn test_missing_dictionary_path() {
        let mut options = options_map(jieba_options());
        options.remove(DICTIONARY_PATH);
        assert_config_error(resolve(&options), DICTIONARY_PATH);
    }

    #[test]
    fn test_every_required_key_is_enforced() {
        for item in OPTION_ITEMS.iter().filter(|item| item.required) {
            let mut options = options_map(jieba_options());
            options.remove(&item.name);
            assert_config_error(resolve(&options), &item.name);
        }
    }

    #[test]
    fn test_wrong_types() {
        let mut options = options_map(jieba_options());
        options.insert(MODEL_PATH.to_string(), json!(42));
        assert_config_error(resolve(&options), MODEL_PATH);

        let mut options = options_map(jieba_options());
        options.insert(HMM.to_string(), json!("yes"));
        assert_config_error(resolve(&options), HMM);

        let mut options = options_map(jieba_options());
        options.insert(IMPLEMENTATION_SELECTOR.to_string(), json!(""));
        assert_config_error(resolve(&options), IMPLEMENTATION_SELECTOR);
    }

    #[test]
    fn test_unreadable_paths() {
        let dir = tempfile::tempdir().unwrap();

        let mut options = options_map(jieba_options());
        let missing = dir.path().join("missing.utf8");
        options.insert(USER_DICTIONARY_PATH.to_string(), json!(missing));
        assert_config_error(resolve(&options), USER_DICTIONARY_PATH);

        let mut options = options_map(jieba_options());
        options.insert(TERM_WEIGHT_PATH.to_string(), json!(dir.path()));
        assert_config_error(resolve(&options), TERM_WEIGHT_PATH);
    }

    #[test]
    fn test_legacy_aliases() {
        let canonical = resolve(&options_map(jieba_options())).unwrap();
        let legacy = json!({
            "dictpath": canonical.dictionary_path,
            "hmmpath": canonical.model_path,
            "userdictpath": canonical.user_dictionary_path,
            "idf": canonical.term_weight_path,
            "stop_words": canonical.stop_word_path,
            "type": "gojieba",
            "hmm": true,
        });
        let config = SegmenterConfig::from_value(&legacy).unwrap();
        assert_eq!(config.implementation, "gojieba");
        assert!(config.hmm);
        assert_eq!(config.dictionary_path, canonical.dictionary_path);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut options = options_map(jieba_options());
        options.insert("color".to_string(), json!("blue"));
        assert!(resolve(&options).is_ok());
    }

    #[test]
    fn test_non_object_options() {
        assert_config_error(SegmenterConfig::from_value(&json!(["a"])), "options");
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = resolve(&options_map(jieba_options())).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        let back: SegmenterConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
