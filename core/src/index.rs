use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// One entry in a term's posting list. Document ids are strictly increasing
/// across a posting list, positions strictly increasing within one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,
    /// Zero-based token positions within the document's filtered token stream.
    pub positions: Vec<u32>,
}

/// Dictionary-side record for a term: how many documents contain it, and
/// where its posting list starts in the postings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub doc_freq: u32,
    pub offset: u64,
}

/// Per-document statistics fixed at index time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocStats {
    /// Euclidean norm of the document's (1 + log10 tf) weight vector,
    /// the cosine-normalization denominator.
    pub norm: f32,
    /// Raw count of filtered tokens, used for BM25 length normalization.
    pub num_tokens: u32,
}

/// The resident half of an index segment: term entries plus the per-document
/// auxiliary maps. Explicit fields, so no real term can collide with a
/// reserved key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    pub terms: BTreeMap<String, TermEntry>,
    pub doc_stats: BTreeMap<DocId, DocStats>,
    pub important_words: BTreeMap<DocId, Vec<String>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.doc_stats.len()
    }
}
