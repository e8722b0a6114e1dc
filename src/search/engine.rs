//! Search engine - in-memory full-text index / 内存全文索引
//!
//! Primitive operations only / 只暴露原语操作：
//! - index: analyze and store one document / 索引单个文档
//! - index_batch: parallel analysis, serial insert / 批量索引
//! - search: TF-IDF ranked query / 搜索
//! - delete: remove one document / 删除文档
//! - close: release every tokenizer / 关闭索引

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use super::mapping::IndexMapping;
use super::schema::{IndexStats, SearchHit, SearchRequest, TermLocation};
use crate::analysis::Token;
use crate::error::{Error, Result};

/// Field name used when the document itself is a bare string
pub const VALUE_FIELD: &str = "_value";

/// One analyzed string value / 已分析的字段值
#[derive(Debug)]
struct FieldValue {
    text: String,
    tokens: Vec<Token>,
}

#[derive(Debug)]
struct StoredDocument {
    fields: BTreeMap<String, Vec<FieldValue>>,
    term_freqs: HashMap<String, usize>,
    /// Total token count over all fields / 文档长度
    length: usize,
}

#[derive(Default)]
struct IndexState {
    documents: HashMap<String, StoredDocument>,
    /// Inverted index: term -> doc ids / 倒排索引
    postings: HashMap<String, HashSet<String>>,
}

impl IndexState {
    fn remove(&mut self, id: &str) -> bool {
        let Some(old) = self.documents.remove(id) else {
            return false;
        };
        for term in old.term_freqs.keys() {
            if let Some(ids) = self.postings.get_mut(term) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        true
    }

    fn insert(&mut self, id: String, document: StoredDocument) {
        self.remove(&id);
        for term in document.term_freqs.keys() {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(id.clone());
        }
        self.documents.insert(id, document);
    }
}

/// In-memory index over an [`IndexMapping`] / 内存索引
pub struct MemoryIndex {
    mapping: IndexMapping,
    state: RwLock<IndexState>,
    last_updated: Mutex<Option<DateTime<Utc>>>,
    closed: AtomicBool,
}

impl MemoryIndex {
    /// Open an index; every analyzer the mapping refers to must exist / 创建索引
    pub fn new(mapping: IndexMapping) -> Result<Self> {
        mapping.validate()?;
        tracing::info!("Memory index opened: {:?}", mapping);
        Ok(Self {
            mapping,
            state: RwLock::new(IndexState::default()),
            last_updated: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::IndexClosed);
        }
        Ok(())
    }

    fn touch(&self) {
        *self.last_updated.lock() = Some(Utc::now());
    }

    /// Analyze every string leaf with its field's analyzer / 分析文档
    fn analyze<T: Serialize + ?Sized>(&self, id: &str, document: &T) -> Result<StoredDocument> {
        let value = serde_json::to_value(document).map_err(|e| Error::Document {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let mut leaves = Vec::new();
        collect_strings(VALUE_FIELD, &value, &mut leaves);

        let mut fields: BTreeMap<String, Vec<FieldValue>> = BTreeMap::new();
        let mut term_freqs: HashMap<String, usize> = HashMap::new();
        let mut length = 0;
        for (field, text) in leaves {
            let tokens = self.mapping.analyzer_for_field(&field)?.analyze(&text)?;
            length += tokens.len();
            for token in &tokens {
                *term_freqs.entry(token.term.clone()).or_default() += 1;
            }
            fields.entry(field).or_default().push(FieldValue { text, tokens });
        }

        tracing::trace!("Analyzed document {}: {} tokens", id, length);
        Ok(StoredDocument {
            fields,
            term_freqs,
            length,
        })
    }

    /// Index single document, replacing any previous one with the same id / 索引单个文档
    pub fn index<T: Serialize + ?Sized>(&self, id: &str, document: &T) -> Result<()> {
        self.ensure_open()?;
        let stored = self.analyze(id, document)?;
        self.state.write().insert(id.to_string(), stored);
        self.touch();
        tracing::debug!("Indexed document {}", id);
        Ok(())
    }

    /// Batch indexing / 批量索引
    ///
    /// Nothing is inserted unless every document analyzes cleanly.
    pub fn index_batch<T: Serialize + Sync>(&self, documents: &[(String, T)]) -> Result<usize> {
        self.ensure_open()?;
        let analyzed = documents
            .par_iter()
            .map(|(id, document)| self.analyze(id, document).map(|stored| (id.clone(), stored)))
            .collect::<Result<Vec<_>>>()?;

        let count = analyzed.len();
        let mut state = self.state.write();
        for (id, stored) in analyzed {
            state.insert(id, stored);
        }
        drop(state);

        self.touch();
        tracing::info!("Indexed batch of {} documents", count);
        Ok(count)
    }

    /// Delete document / 删除文档
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.ensure_open()?;
        let removed = self.state.write().remove(id);
        if removed {
            self.touch();
            tracing::debug!("Deleted document {}", id);
        }
        Ok(removed)
    }

    pub fn document_count(&self) -> usize {
        self.state.read().documents.len()
    }

    /// Get index statistics / 获取索引统计信息
    pub fn stats(&self) -> IndexStats {
        let state = self.state.read();
        IndexStats {
            document_count: state.documents.len(),
            term_count: state.postings.len(),
            last_updated: *self.last_updated.lock(),
        }
    }

    /// Search / 搜索
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        self.ensure_open()?;
        let analyzer = self.mapping.analyzer_named(self.mapping.default_analyzer_name())?;

        let mut terms: Vec<String> = Vec::new();
        for token in analyzer.analyze(&request.query)? {
            if !terms.contains(&token.term) {
                terms.push(token.term);
            }
        }
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read();
        let total = state.documents.len() as f64;
        let idfs: Vec<f64> = terms
            .iter()
            .map(|term| {
                let df = state.postings.get(term).map_or(0, HashSet::len) as f64;
                1.0 + (total / (df + 1.0)).ln()
            })
            .collect();
        let query_norm = 1.0 / idfs.iter().map(|idf| idf * idf).sum::<f64>().sqrt();

        let candidates: HashSet<&String> = terms
            .iter()
            .filter_map(|term| state.postings.get(term))
            .flatten()
            .collect();

        let mut scored: Vec<(&String, f64)> = candidates
            .into_iter()
            .filter_map(|id| {
                let document = state.documents.get(id)?;
                let length = (document.length.max(1) as f64).sqrt();
                let mut matched = 0;
                let mut sum = 0.0;
                for (term, idf) in terms.iter().zip(&idfs) {
                    if let Some(&tf) = document.term_freqs.get(term) {
                        matched += 1;
                        sum += (tf as f64).sqrt() * idf * idf / length;
                    }
                }
                let coord = matched as f64 / terms.len() as f64;
                Some((id, coord * query_norm * sum))
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|(id, score)| {
                let mut hit = SearchHit {
                    id: id.clone(),
                    score,
                    fragments: BTreeMap::new(),
                    locations: BTreeMap::new(),
                };
                if request.highlight {
                    if let Some(document) = state.documents.get(id) {
                        highlight_hit(&mut hit, document, &terms);
                    }
                }
                hit
            })
            .collect();

        tracing::debug!("Query {:?} -> {} terms, {} hits", request.query, terms.len(), hits.len());
        Ok(hits)
    }

    /// Close index and release tokenizers / 关闭索引
    ///
    /// Idempotent; every later operation fails with [`Error::IndexClosed`].
    pub fn close(&self) -> usize {
        if self.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let released = self.mapping.release();
        tracing::info!("Memory index closed, {} segmenter(s) released", released);
        released
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for MemoryIndex {
    fn drop(&mut self) {
        if !self.is_closed() {
            // Tokenizers stay with whoever still holds them; handles warn on their own drop
            tracing::warn!("Memory index dropped without close(); tokenizers were not released");
        }
    }
}

/// Flatten string leaves into (field path, text) pairs / 展开字符串字段
fn collect_strings(field: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(text) => out.push((field.to_string(), text.clone())),
        Value::Array(items) => {
            for item in items {
                collect_strings(field, item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let path = if field == VALUE_FIELD {
                    key.clone()
                } else {
                    format!("{}.{}", field, key)
                };
                collect_strings(&path, item, out);
            }
        }
        _ => {}
    }
}

fn highlight_hit(hit: &mut SearchHit, document: &StoredDocument, terms: &[String]) {
    for (field, values) in &document.fields {
        for value in values {
            let matches: Vec<&Token> = value
                .tokens
                .iter()
                .filter(|token| terms.contains(&token.term))
                .collect();
            if matches.is_empty() {
                continue;
            }

            let locations = hit.locations.entry(field.clone()).or_default();
            for token in &matches {
                locations
                    .entry(token.term.clone())
                    .or_default()
                    .push(TermLocation {
                        position: token.position,
                        start: token.start,
                        end: token.end,
                    });
            }
            hit.fragments
                .entry(field.clone())
                .or_default()
                .push(mark(&value.text, &matches));
        }
    }
}

/// Wrap matched spans in `<mark>` tags / 高亮
fn mark(text: &str, matches: &[&Token]) -> String {
    let mut out = String::with_capacity(text.len() + matches.len() * 13);
    let mut cursor = 0;
    for token in matches {
        let (Some(before), Some(word)) = (text.get(cursor..token.start), text.get(token.start..token.end)) else {
            continue;
        };
        out.push_str(before);
        out.push_str("<mark>");
        out.push_str(word);
        out.push_str("</mark>");
        cursor = token.end;
    }
    out.push_str(&text[cursor..]);
    out
}
