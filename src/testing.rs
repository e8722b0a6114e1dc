//! Test fixtures shared by unit tests / 单元测试共用工具

use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::{
    SegmenterConfig, DICTIONARY_PATH, IMPLEMENTATION_SELECTOR, MODEL_PATH, STOP_WORD_PATH,
    TERM_WEIGHT_PATH, USER_DICTIONARY_PATH,
};
use crate::segmenter::{Segment, Segmenter};

pub(crate) fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Complete option set pointing at the fixture dictionaries
pub(crate) fn jieba_options() -> Value {
    json!({
        DICTIONARY_PATH: data_path("jieba.dict.utf8"),
        MODEL_PATH: data_path("hmm_model.utf8"),
        USER_DICTIONARY_PATH: data_path("user.dict.utf8"),
        TERM_WEIGHT_PATH: data_path("idf.utf8"),
        STOP_WORD_PATH: data_path("stop_words.utf8"),
        IMPLEMENTATION_SELECTOR: "jieba",
    })
}

pub(crate) fn options_map(options: Value) -> Map<String, Value> {
    match options {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub(crate) fn jieba_config() -> SegmenterConfig {
    SegmenterConfig::from_value(&jieba_options()).unwrap()
}

type Script = Box<dyn for<'a> Fn(&'a str) -> Vec<Segment<'a>> + Send + Sync>;

/// Segmenter whose output is scripted by the test
pub(crate) struct ScriptedSegmenter {
    script: Script,
    releases: Arc<AtomicUsize>,
}

impl ScriptedSegmenter {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: for<'a> Fn(&'a str) -> Vec<Segment<'a>> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// One segment spanning the whole input
    pub(crate) fn whole_input() -> Self {
        Self::new(|text| {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::new(text, 0, text.len())]
            }
        })
    }

    /// One segment per character
    pub(crate) fn per_char() -> Self {
        Self::new(|text| {
            text.char_indices()
                .map(|(i, c)| Segment::new(&text[i..i + c.len_utf8()], i, i + c.len_utf8()))
                .collect()
        })
    }

    pub(crate) fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl Segmenter for ScriptedSegmenter {
    fn cut<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        (self.script)(text)
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
