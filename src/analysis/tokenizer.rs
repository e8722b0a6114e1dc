//! Tokenizer adapter - segmenter output to token stream / 分词适配器
//!
//! Segments are taken in the order the engine reports them; nothing is
//! re-sorted or merged. A zero-length segment inside the input is dropped
//! whatever word it reports. Any other segment that breaks the offset
//! contract fails the whole call.

use std::sync::Arc;

use super::keywords::{Keyword, KeywordExtractor};
use super::lifecycle::SegmenterHandle;
use super::{Token, Tokenizer};
use crate::error::{Error, Result, Violation};
use crate::segmenter::{Segment, StopWords};

/// Wraps one shared segmenter handle / 包装一个分词器句柄
pub struct TokenizerAdapter {
    name: String,
    handle: Arc<SegmenterHandle>,
    keywords: Option<KeywordExtractor>,
}

impl TokenizerAdapter {
    pub fn new(name: impl Into<String>, handle: Arc<SegmenterHandle>) -> Self {
        Self {
            name: name.into(),
            handle,
            keywords: None,
        }
    }

    /// Attach term weights and stop words for keyword extraction
    pub fn with_keywords(mut self, keywords: KeywordExtractor) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn handle(&self) -> &Arc<SegmenterHandle> {
        &self.handle
    }

    /// Check engine output and number the tokens / 校验分词结果并编号
    fn to_tokens(&self, text: &str, segments: Vec<Segment<'_>>) -> Result<Vec<Token>> {
        let mut tokens = Vec::with_capacity(segments.len());
        let mut cursor = 0;

        for (index, segment) in segments.into_iter().enumerate() {
            let Segment { word, start, end } = segment;
            if start == end && end <= text.len() {
                continue;
            }
            if let Some(violation) = check_segment(text, cursor, &segment) {
                tracing::warn!(
                    "Tokenizer {} rejected segment #{} {:?} ({}..{}): {}",
                    self.name,
                    index,
                    word,
                    start,
                    end,
                    violation
                );
                return Err(Error::CorruptSegmentation {
                    tokenizer: self.name.clone(),
                    index,
                    start,
                    end,
                    violation,
                });
            }
            cursor = end;
            tokens.push(Token {
                term: word.to_string(),
                start,
                end,
                position: tokens.len() + 1,
            });
        }

        Ok(tokens)
    }
}

fn check_segment(text: &str, cursor: usize, segment: &Segment<'_>) -> Option<Violation> {
    let Segment { word, start, end } = *segment;
    if start > end || end > text.len() {
        return Some(Violation::OutOfBounds);
    }
    if start < cursor {
        return Some(Violation::Overlap);
    }
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Some(Violation::SplitsCharacter);
    }
    if &text[start..end] != word {
        return Some(Violation::WordMismatch);
    }
    None
}

impl Tokenizer for TokenizerAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        // The handle lock covers only the cut itself
        let segments = self.handle.with_segmenter(|segmenter| segmenter.cut(text))?;
        let tokens = self.to_tokens(text, segments)?;
        tracing::trace!("{} tokenized {} bytes into {} tokens", self.name, text.len(), tokens.len());
        Ok(tokens)
    }

    fn release(&self) -> bool {
        self.handle.release()
    }

    fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    fn stop_words(&self) -> Option<Arc<StopWords>> {
        self.keywords.as_ref().map(|k| Arc::clone(k.stop_words()))
    }

    fn extract_keywords(&self, text: &str, top_k: usize) -> Result<Vec<Keyword>> {
        let extractor = self.keywords.as_ref().ok_or_else(|| {
            Error::config(
                crate::config::TERM_WEIGHT_PATH,
                format!("tokenizer `{}` has no term weights", self.name),
            )
        })?;
        let tokens = self.tokenize(text)?;
        Ok(extractor.extract(tokens.iter().map(|t| t.term.as_str()), top_k))
    }
}

impl std::fmt::Debug for TokenizerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerAdapter")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("keywords", &self.keywords.is_some())
            .finish()
    }
}
