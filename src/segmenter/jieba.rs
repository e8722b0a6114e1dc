//! Jieba segmenter - dictionary + HMM Chinese word segmentation / jieba 中文分词
//!
//! Backed by jieba-rs. jieba-rs reports token positions in Unicode
//! characters; they are converted to byte offsets here so the rest of the
//! crate only ever sees byte offsets.

use jieba_rs::{Jieba, TokenizeMode};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{Segment, Segmenter};
use crate::config::SegmenterConfig;
use crate::error::{Error, Result};

/// Jieba segmentation engine / jieba 分词引擎
pub struct JiebaSegmenter {
    jieba: Jieba,
    hmm: bool,
}

impl JiebaSegmenter {
    /// Load dictionaries described by `config` / 按配置加载词典
    ///
    /// This is the expensive step; build one per distinct config and share it.
    pub fn load(config: &SegmenterConfig) -> Result<Self> {
        let mut jieba = {
            let path = &config.dictionary_path;
            let mut reader = open(path)?;
            Jieba::with_dict(&mut reader).map_err(|e| Error::construction(path, e))?
        };

        let path = &config.user_dictionary_path;
        let mut reader = open(path)?;
        jieba
            .load_dict(&mut reader)
            .map_err(|e| Error::construction(path, e))?;

        check_model(&config.model_path)?;

        tracing::info!(
            "Jieba segmenter loaded: dict={:?}, user_dict={:?}, hmm={}",
            config.dictionary_path,
            config.user_dictionary_path,
            config.hmm
        );
        Ok(Self {
            jieba,
            hmm: config.hmm,
        })
    }
}

impl Segmenter for JiebaSegmenter {
    fn cut<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        if text.is_empty() {
            return Vec::new();
        }

        // char index -> byte offset, with one trailing entry for the end of input
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        // A char offset past the table maps past the input so the adapter rejects it
        let to_byte = |chars: usize| boundaries.get(chars).copied().unwrap_or(usize::MAX);

        let segments: Vec<Segment<'a>> = self
            .jieba
            .tokenize(text, TokenizeMode::Default, self.hmm)
            .into_iter()
            .map(|token| Segment::new(token.word, to_byte(token.start), to_byte(token.end)))
            .collect();

        tracing::trace!("{:?} -> {} segments", text, segments.len());
        segments
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn release(&mut self) {
        self.jieba = Jieba::empty();
        tracing::debug!("Jieba dictionaries dropped");
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::construction(path, e))
}

/// jieba-rs ships its HMM parameters compiled in; the model file only has to
/// be present and non-empty.
fn check_model(path: &Path) -> Result<()> {
    let mut reader = open(path)?;
    let mut first = [0u8; 1];
    let read = reader
        .read(&mut first)
        .map_err(|e| Error::construction(path, e))?;
    if read == 0 {
        return Err(Error::construction(path, "model file is empty"));
    }
    Ok(())
}
