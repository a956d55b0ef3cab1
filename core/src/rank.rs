//! Scoring and result fusion: tf-idf cosine or BM25 over the free-text
//! vector space, then fusion with the boolean priority set.

use crate::block::tf_weight;
use crate::config::{RankingModel, SearchConfig};
use crate::query::ClauseKind;
use crate::store::PostingStore;
use crate::DocId;
use anyhow::Result;
use std::collections::BTreeMap;

/// Score every document matching at least one query term. Output is keyed by
/// ascending docID; ordering by score happens in [`fuse`].
pub fn score_documents(
    store: &mut PostingStore,
    query_tokens: &[String],
    model: RankingModel,
) -> Result<Vec<(DocId, f32)>> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for token in query_tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    if counts.is_empty() || store.document_count() == 0 {
        return Ok(Vec::new());
    }
    match model {
        RankingModel::TfIdfCosine => score_tfidf(store, &counts),
        RankingModel::Bm25 { k1, b } => score_bm25(store, &counts, k1, b),
    }
}

fn score_tfidf(
    store: &mut PostingStore,
    counts: &BTreeMap<&str, u32>,
) -> Result<Vec<(DocId, f32)>> {
    let n = store.document_count() as f32;

    // Precompute the query vector; unknown terms (df = 0) stay at weight zero.
    let mut weights: Vec<(&str, f32)> = Vec::with_capacity(counts.len());
    let mut norm_sq = 0.0f32;
    for (&term, &qtf) in counts {
        let df = store.doc_freq(term);
        let w = if df > 0 { tf_weight(qtf) * (n / df as f32).log10() } else { 0.0 };
        norm_sq += w * w;
        weights.push((term, w));
    }
    // A zero-norm query vector contributes zero score rather than NaN.
    let norm = norm_sq.sqrt();
    if norm == 0.0 {
        return Ok(Vec::new());
    }

    let mut scores: BTreeMap<DocId, f32> = BTreeMap::new();
    for (term, w) in weights {
        if w == 0.0 {
            continue;
        }
        let q_w = w / norm;
        for p in store.lookup(term)? {
            let doc_len = store.document_length(p.doc_id);
            if doc_len == 0.0 {
                continue;
            }
            // Document-side weights are pre-normalized by the stored norm.
            *scores.entry(p.doc_id).or_insert(0.0) += q_w * tf_weight(p.term_freq) / doc_len;
        }
    }
    Ok(scores.into_iter().collect())
}

fn score_bm25(
    store: &mut PostingStore,
    counts: &BTreeMap<&str, u32>,
    k1: f32,
    b: f32,
) -> Result<Vec<(DocId, f32)>> {
    let n = store.document_count() as f32;
    let avgdl = store.avg_doc_tokens();
    if avgdl == 0.0 {
        return Ok(Vec::new());
    }

    let mut scores: BTreeMap<DocId, f32> = BTreeMap::new();
    for (&term, &qtf) in counts {
        let df = store.doc_freq(term) as f32;
        if df == 0.0 {
            continue;
        }
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        for p in store.lookup(term)? {
            let tf = p.term_freq as f32;
            let dl = store.num_tokens(p.doc_id) as f32;
            let denom = tf + k1 * (1.0 - b + b * dl / avgdl);
            let contrib = idf * tf * (k1 + 1.0) / denom;
            *scores.entry(p.doc_id).or_insert(0.0) += qtf as f32 * contrib;
        }
    }
    Ok(scores.into_iter().collect())
}

fn mean_score<T>(scored: &[(T, f32)]) -> f32 {
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().map(|(_, s)| s).sum::<f32>() / scored.len() as f32
}

/// Fuse ranked scores with the boolean priority set.
///
/// Documents at or below the average-score benchmark are discarded as noise.
/// Priority documents missing from the ranked pass get a synthetic default
/// score; documents in both keep their score but inherit the priority
/// provenance. Phrase-tagged entries are boosted, a second benchmark pass
/// removes residual low-scorers, and the final order is score descending with
/// docID as the tie-break.
pub fn fuse(
    scored: Vec<(DocId, f32)>,
    priority: Vec<(DocId, ClauseKind)>,
    config: &SearchConfig,
) -> Vec<(DocId, f32)> {
    // A zero benchmark means every score is zero (degenerate idf, or nothing
    // scored); filtering on it would erase exact-phrase matches, so the
    // noise filters only engage with a positive benchmark.
    let benchmark = mean_score(&scored) * config.filter_strength;
    let filtered: Vec<(DocId, f32)> = if benchmark > 0.0 {
        scored.into_iter().filter(|(_, s)| *s > benchmark).collect()
    } else {
        scored
    };

    let default_score = mean_score(&filtered) * config.priority_weight;

    let mut combined: BTreeMap<DocId, (f32, ClauseKind)> = BTreeMap::new();
    for (doc_id, kind) in priority {
        combined.insert(doc_id, (default_score, kind));
    }
    for (doc_id, score) in filtered {
        combined
            .entry(doc_id)
            .and_modify(|e| e.0 = score)
            .or_insert((score, ClauseKind::FreeText));
    }

    let mut weighted: Vec<(DocId, f32)> = combined
        .into_iter()
        .map(|(doc_id, (score, kind))| {
            let score = if kind == ClauseKind::Phrasal {
                score * config.phrasal_weight
            } else {
                score
            };
            (doc_id, score)
        })
        .collect();

    let benchmark = mean_score(&weighted) * config.filter_strength;
    if benchmark > 0.0 {
        weighted.retain(|(_, s)| *s > benchmark);
    }

    weighted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    weighted
}
