//! Positional phrase matching: merge-walk posting lists by docID, then check
//! position adjacency inside each candidate document. Phrases are limited to
//! three words; longer phrases yield an empty result rather than an error.

use crate::{DocId, Posting};

pub const MAX_PHRASE_LEN: usize = 3;

/// Documents containing the exact phrase whose per-word posting lists are
/// given in order. A one-word phrase degenerates to the term's document list;
/// more than three words is a documented limitation and matches nothing.
pub fn phrase_docs(word_lists: &[Vec<Posting>]) -> Vec<DocId> {
    match word_lists {
        [single] => single.iter().map(|p| p.doc_id).collect(),
        [first, second] => two_word_phrase(first, second),
        [first, second, third] => three_word_phrase(first, second, third),
        _ => Vec::new(),
    }
}

fn two_word_phrase(first: &[Posting], second: &[Posting]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        if first[i].doc_id == second[j].doc_id {
            if contains_adjacent_pair(&first[i].positions, &second[j].positions) {
                result.push(first[i].doc_id);
            }
            i += 1;
            j += 1;
        } else if first[i].doc_id < second[j].doc_id {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

fn three_word_phrase(first: &[Posting], second: &[Posting], third: &[Posting]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < first.len() && j < second.len() && k < third.len() {
        let (a, b, c) = (first[i].doc_id, second[j].doc_id, third[k].doc_id);
        if a == b && a == c {
            if contains_adjacent_triple(
                &first[i].positions,
                &second[j].positions,
                &third[k].positions,
            ) {
                result.push(a);
            }
            i += 1;
            j += 1;
            k += 1;
        } else if a <= b && a <= c {
            i += 1;
        } else if b <= a && b <= c {
            j += 1;
        } else {
            k += 1;
        }
    }
    result
}

/// True if some p in `first` has p+1 in `second`. Pure membership query, so
/// the scan exits on the first hit.
fn contains_adjacent_pair(first: &[u32], second: &[u32]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        if first[i] + 1 == second[j] {
            return true;
        } else if first[i] >= second[j] {
            j += 1;
        } else {
            i += 1;
        }
    }
    false
}

/// True if some p has p, p+1, p+2 present in the three lists respectively.
/// Each step advances whichever pointer lags the expected offset chain.
fn contains_adjacent_triple(first: &[u32], second: &[u32], third: &[u32]) -> bool {
    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < first.len() && j < second.len() && k < third.len() {
        if first[i] + 1 == second[j] && first[i] + 2 == third[k] {
            return true;
        } else if first[i] >= second[j] {
            j += 1;
        } else if first[i] >= third[k] || second[j] >= third[k] {
            k += 1;
        } else {
            i += 1;
        }
    }
    false
}
