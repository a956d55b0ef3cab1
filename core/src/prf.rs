//! Pseudo-relevance feedback: mine expansion words from the cached keyword
//! sets of the top-ranked documents. The caller runs exactly one refinement
//! round with the words this module hands back.

use crate::store::PostingStore;
use crate::DocId;
use std::collections::BTreeSet;

/// Candidate expansion words from the top `prf_docs` results, keeping only
/// words whose informativeness (idf) is above the candidate average.
pub fn expansion_words(store: &PostingStore, ranked: &[DocId], prf_docs: usize) -> Vec<String> {
    let n = store.document_count() as f32;
    if n == 0.0 {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    let mut candidates: Vec<String> = Vec::new();
    for doc_id in ranked.iter().take(prf_docs) {
        for word in store.important_words(*doc_id) {
            if seen.insert(word.clone()) {
                candidates.push(word.clone());
            }
        }
    }

    // Informativeness is the plain idf of the cached word; words that fell
    // out of the dictionary contribute nothing.
    let scored: Vec<(String, f32)> = candidates
        .into_iter()
        .filter_map(|word| {
            let df = store.doc_freq(&word);
            if df == 0 {
                return None;
            }
            let idf = (n / df as f32).log10();
            Some((word, idf))
        })
        .collect();
    if scored.is_empty() {
        return Vec::new();
    }

    let avg = scored.iter().map(|(_, s)| s).sum::<f32>() / scored.len() as f32;
    scored
        .into_iter()
        .filter(|(_, s)| *s > avg)
        .map(|(word, _)| word)
        .collect()
}
