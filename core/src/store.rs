use crate::persist::{load_dictionary, read_postings, IndexPaths};
use crate::{Dictionary, DocId, Posting};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Read-side view of a built index: the dictionary fully resident, posting
/// lists deserialized lazily by offset. Lookups are side-effect-free; each
/// store owns its own blob handle, so concurrent sessions each open their
/// own store rather than sharing a seek cursor.
pub struct PostingStore {
    dictionary: Dictionary,
    blob: File,
}

impl PostingStore {
    pub fn open(index_dir: &Path) -> Result<Self> {
        let paths = IndexPaths::new(index_dir);
        let dictionary = load_dictionary(&paths.dictionary())?;
        let blob = File::open(paths.postings())
            .with_context(|| format!("open {}", paths.postings().display()))?;
        tracing::debug!(
            terms = dictionary.terms.len(),
            docs = dictionary.document_count(),
            "loaded index"
        );
        Ok(Self { dictionary, blob })
    }

    /// Posting list for `term`; an unknown term is an empty list, not an
    /// error.
    pub fn lookup(&mut self, term: &str) -> Result<Vec<Posting>> {
        match self.dictionary.terms.get(term) {
            Some(entry) => read_postings(&mut self.blob, entry.offset),
            None => Ok(Vec::new()),
        }
    }

    pub fn doc_freq(&self, term: &str) -> u32 {
        self.dictionary.terms.get(term).map_or(0, |e| e.doc_freq)
    }

    pub fn document_count(&self) -> usize {
        self.dictionary.document_count()
    }

    /// Precomputed cosine norm of the document's weight vector, or zero for
    /// an unknown document.
    pub fn document_length(&self, doc_id: DocId) -> f32 {
        self.dictionary.doc_stats.get(&doc_id).map_or(0.0, |s| s.norm)
    }

    pub fn num_tokens(&self, doc_id: DocId) -> u32 {
        self.dictionary.doc_stats.get(&doc_id).map_or(0, |s| s.num_tokens)
    }

    /// Mean filtered-token count across the collection, for BM25 length
    /// normalization.
    pub fn avg_doc_tokens(&self) -> f32 {
        let n = self.dictionary.doc_stats.len();
        if n == 0 {
            return 0.0;
        }
        let total: u64 = self.dictionary.doc_stats.values().map(|s| s.num_tokens as u64).sum();
        total as f32 / n as f32
    }

    /// The document's cached top-frequency terms, used by pseudo-relevance
    /// feedback.
    pub fn important_words(&self, doc_id: DocId) -> &[String] {
        self.dictionary
            .important_words
            .get(&doc_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
