//! Error types / 错误类型

use std::fmt;
use std::path::PathBuf;

/// How a segmenter broke its output contract / 分词器违反的输出约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// `start > end` or `end` past the input length
    OutOfBounds,
    /// Segment starts before the previous segment ended
    Overlap,
    /// Offset falls inside a multi-byte UTF-8 character
    SplitsCharacter,
    /// Reported word differs from the input bytes at its offsets
    WordMismatch,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Violation::OutOfBounds => "offsets out of bounds",
            Violation::Overlap => "overlapping or decreasing offsets",
            Violation::SplitsCharacter => "offset splits a UTF-8 character",
            Violation::WordMismatch => "word does not match the input span",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, mistyped or unreadable option / 配置项缺失或无效
    #[error("invalid option `{key}`: {reason}")]
    Config { key: String, reason: String },

    /// Segmenter failed to load its backing data / 分词器数据加载失败
    #[error("failed to load segmenter data from {}: {reason}", path.display())]
    Construction { path: PathBuf, reason: String },

    #[error("tokenizer `{tokenizer}` got a corrupt segment #{index} ({start}..{end}): {violation}")]
    CorruptSegmentation {
        tokenizer: String,
        index: usize,
        start: usize,
        end: usize,
        violation: Violation,
    },

    /// Operation on a released segmenter handle / 分词器已释放
    #[error("tokenizer `{0}` used after its segmenter was released")]
    UseAfterFree(String),

    #[error("{kind} `{name}` is already registered")]
    DuplicateName { kind: &'static str, name: String },

    #[error("unknown analyzer `{0}`")]
    UnknownAnalyzer(String),

    #[error("unknown tokenizer `{0}`")]
    UnknownTokenizer(String),

    /// Document could not be turned into indexable fields / 文档无法索引
    #[error("document `{id}` cannot be indexed: {reason}")]
    Document { id: String, reason: String },

    #[error("index is closed")]
    IndexClosed,
}

impl Error {
    pub(crate) fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn construction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Construction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
