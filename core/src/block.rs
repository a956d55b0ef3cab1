//! Block inversion: turn one bounded batch of documents into a sorted
//! dictionary plus posting lists, ready to be written out as a segment.

use crate::persist::SegmentData;
use crate::{DocId, DocStats, Posting};
use std::collections::HashMap;

/// Term frequency weight used for document norms and cosine scoring.
pub fn tf_weight(term_freq: u32) -> f32 {
    1.0 + (term_freq as f32).log10()
}

/// Invert a block of (docID, token list) pairs. Documents are processed in
/// ascending docID order so posting lists come out sorted; an empty token
/// list contributes no terms but still gets a stats entry.
pub fn invert_block(
    mut docs: Vec<(DocId, Vec<String>)>,
    important_words_per_doc: usize,
) -> SegmentData {
    docs.sort_by_key(|(doc_id, _)| *doc_id);

    let mut segment = SegmentData::default();
    for (doc_id, tokens) in docs {
        let num_tokens = tokens.len() as u32;
        let counts = index_document(&tokens);

        let mut norm_sq = 0.0f32;
        for (term, (term_freq, positions)) in counts.iter() {
            let w = tf_weight(*term_freq);
            norm_sq += w * w;
            segment.postings.entry(term.clone()).or_default().push(Posting {
                doc_id,
                term_freq: *term_freq,
                positions: positions.clone(),
            });
        }

        segment
            .doc_stats
            .insert(doc_id, DocStats { norm: norm_sq.sqrt(), num_tokens });
        segment
            .important_words
            .insert(doc_id, top_frequent_terms(&counts, important_words_per_doc));
    }

    // Entry order within a term follows doc iteration order; make the
    // strictly-increasing docID invariant explicit.
    for postings in segment.postings.values_mut() {
        postings.sort_by_key(|p| p.doc_id);
        postings.dedup_by_key(|p| p.doc_id);
    }
    segment
}

/// Single scan of a document's token stream into term -> (frequency,
/// ascending position list).
fn index_document(tokens: &[String]) -> HashMap<String, (u32, Vec<u32>)> {
    let mut counts: HashMap<String, (u32, Vec<u32>)> = HashMap::new();
    for (position, term) in tokens.iter().enumerate() {
        let entry = counts.entry(term.clone()).or_insert((0, Vec::new()));
        entry.0 += 1;
        entry.1.push(position as u32);
    }
    counts
}

/// The document's top-K most frequent terms, the keyword cache consumed by
/// pseudo-relevance feedback. Ties break lexicographically for determinism.
fn top_frequent_terms(counts: &HashMap<String, (u32, Vec<u32>)>, k: usize) -> Vec<String> {
    let mut by_freq: Vec<(&String, u32)> =
        counts.iter().map(|(term, (tf, _))| (term, *tf)).collect();
    by_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    by_freq.into_iter().take(k).map(|(term, _)| term.clone()).collect()
}
