//! Segmentation engine contract / 分词引擎约定
//!
//! A segmenter cuts text into ordered `(word, start, end)` triples. Offsets
//! are byte offsets into the UTF-8 input; engines that count characters
//! convert at their own boundary.

pub mod jieba;
pub mod lexicon;

pub use jieba::JiebaSegmenter;
pub use lexicon::{StopWords, TermWeights};

/// One segment reported by an engine / 分词结果片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub word: &'a str,
    /// Byte offset, inclusive
    pub start: usize,
    /// Byte offset, exclusive
    pub end: usize,
}

impl<'a> Segment<'a> {
    pub fn new(word: &'a str, start: usize, end: usize) -> Self {
        Self { word, start, end }
    }
}

/// Word segmentation engine / 分词引擎
pub trait Segmenter: Send + Sync {
    /// Cut `text` into ordered segments.
    fn cut<'a>(&self, text: &'a str) -> Vec<Segment<'a>>;

    /// Whether `cut` may run concurrently on one instance / 是否可并发调用
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Drop the loaded dictionaries and models / 释放已加载的数据
    ///
    /// Called once by the owning handle, never while a `cut` is running.
    fn release(&mut self) {}
}
