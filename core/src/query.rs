//! Query grammar and evaluation. A query is AND-connected groups of
//! OR-connected clauses; each clause is a quoted phrase or free text. Clause
//! doc-id sets build a priority set that biases ranking but never hard-filters
//! the ranked vector space.

use crate::algebra::{intersect_sorted_by, union_sorted_by};
use crate::config::SearchConfig;
use crate::phrase::{phrase_docs, MAX_PHRASE_LEN};
use crate::store::PostingStore;
use crate::tokenizer::tokenize;
use crate::{prf, rank, DocId};
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    FreeText,
    Phrasal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub text: String,
    pub kind: ClauseKind,
}

/// Split a raw query into AND-groups of clauses. The keyword `AND` only
/// separates groups outside quotes; within a group, quoted spans become
/// phrasal clauses and the remaining text becomes free-text clauses. An
/// unterminated quote leniently runs to the end of the string. Groups with no
/// clauses are dropped.
pub fn parse_query(raw: &str) -> Vec<Vec<Clause>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for word in raw.split_whitespace() {
        if !in_quote && word == "AND" {
            push_group(&mut groups, &current);
            current.clear();
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            if word.matches('"').count() % 2 == 1 {
                in_quote = !in_quote;
            }
        }
    }
    push_group(&mut groups, &current);
    groups
}

fn push_group(groups: &mut Vec<Vec<Clause>>, text: &str) {
    let clauses = parse_clauses(text);
    if !clauses.is_empty() {
        groups.push(clauses);
    }
}

/// Scan one group for quote-delimited spans: free text outside quotes,
/// phrasal inside.
fn parse_clauses(group: &str) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut buf = String::new();
    let mut in_quote = false;

    let flush = |buf: &mut String, kind: ClauseKind, clauses: &mut Vec<Clause>| {
        let text = buf.trim();
        if !text.is_empty() {
            clauses.push(Clause { text: text.to_string(), kind });
        }
        buf.clear();
    };

    for ch in group.chars() {
        if ch == '"' {
            let kind = if in_quote { ClauseKind::Phrasal } else { ClauseKind::FreeText };
            flush(&mut buf, kind, &mut clauses);
            in_quote = !in_quote;
        } else {
            buf.push(ch);
        }
    }
    // Trailing text: an open quote runs to end-of-string as a phrase.
    let kind = if in_quote { ClauseKind::Phrasal } else { ClauseKind::FreeText };
    flush(&mut buf, kind, &mut clauses);
    clauses
}

/// External word-expansion collaborator (thesaurus). Applied to free-text
/// clause terms only, never to phrases.
pub trait SynonymExpander {
    fn expand(&self, term: &str) -> Vec<String>;
}

/// One search session over a built index. Owns its store handle, so separate
/// sessions never share a seek cursor.
pub struct Searcher {
    store: PostingStore,
    config: SearchConfig,
    expander: Option<Box<dyn SynonymExpander>>,
}

impl Searcher {
    pub fn open(index_dir: &Path, config: SearchConfig) -> Result<Self> {
        let store = PostingStore::open(index_dir)?;
        Ok(Self { store, config, expander: None })
    }

    pub fn with_expander(mut self, expander: Box<dyn SynonymExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn store(&self) -> &PostingStore {
        &self.store
    }

    /// Evaluate a raw query to a ranked docID list. With PRF enabled this is
    /// two explicit phases: the initial evaluation, then one refinement pass
    /// over a query extended with feedback words. Never more than one round.
    pub fn search(&mut self, raw: &str) -> Result<Vec<DocId>> {
        let groups = parse_query(raw);
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let initial: Vec<DocId> =
            self.evaluate(&groups)?.into_iter().map(|(doc_id, _)| doc_id).collect();
        if !self.config.use_prf || initial.is_empty() {
            return Ok(initial);
        }

        let words = prf::expansion_words(&self.store, &initial, self.config.prf_docs);
        if words.is_empty() {
            return Ok(initial);
        }
        tracing::debug!(words = words.len(), "running feedback round");

        let mut expanded = groups;
        if let Some(last) = expanded.last_mut() {
            last.push(Clause { text: words.join(" "), kind: ClauseKind::FreeText });
        }
        let refined = self.evaluate(&expanded)?;
        Ok(refined.into_iter().map(|(doc_id, _)| doc_id).collect())
    }

    /// One full boolean + ranked pass over parsed groups.
    fn evaluate(&mut self, groups: &[Vec<Clause>]) -> Result<Vec<(DocId, f32)>> {
        let mut priority: Option<Vec<(DocId, ClauseKind)>> = None;
        let mut ranking_tokens: Vec<String> = Vec::new();

        for group in groups {
            let mut group_set: Vec<(DocId, ClauseKind)> = Vec::new();
            for clause in group {
                let docs = match clause.kind {
                    ClauseKind::Phrasal => {
                        let tokens = tokenize(&clause.text);
                        ranking_tokens.extend(tokens.iter().cloned());
                        self.phrase_clause(&tokens)?
                            .into_iter()
                            .map(|doc_id| (doc_id, ClauseKind::Phrasal))
                            .collect()
                    }
                    ClauseKind::FreeText => {
                        let tokens = self.expand_terms(tokenize(&clause.text));
                        ranking_tokens.extend(tokens.iter().cloned());
                        self.matching_docs(&tokens)?
                            .into_iter()
                            .map(|doc_id| (doc_id, ClauseKind::FreeText))
                            .collect()
                    }
                };
                // OR within a group; phrase provenance dominates on overlap.
                group_set = union_sorted_by(group_set, docs, |e| e.0, dominant_tag);
            }
            // AND between groups.
            priority = Some(match priority.take() {
                None => group_set,
                Some(prev) => intersect_sorted_by(prev, group_set, |e| e.0, dominant_tag),
            });
        }

        let scored = rank::score_documents(&mut self.store, &ranking_tokens, self.config.model)?;
        Ok(rank::fuse(scored, priority.unwrap_or_default(), &self.config))
    }

    /// All documents containing any of the given terms, ascending.
    fn matching_docs(&mut self, tokens: &[String]) -> Result<Vec<DocId>> {
        let mut docs = BTreeSet::new();
        for term in tokens {
            for p in self.store.lookup(term)? {
                docs.insert(p.doc_id);
            }
        }
        Ok(docs.into_iter().collect())
    }

    /// Document set for a phrase of up to three words; longer phrases and
    /// phrases that normalize to nothing match no documents.
    fn phrase_clause(&mut self, tokens: &[String]) -> Result<Vec<DocId>> {
        if tokens.is_empty() || tokens.len() > MAX_PHRASE_LEN {
            return Ok(Vec::new());
        }
        let mut lists = Vec::with_capacity(tokens.len());
        for term in tokens {
            lists.push(self.store.lookup(term)?);
        }
        Ok(phrase_docs(&lists))
    }

    fn expand_terms(&self, tokens: Vec<String>) -> Vec<String> {
        let Some(expander) = &self.expander else {
            return tokens;
        };
        let mut all = Vec::with_capacity(tokens.len());
        for term in tokens {
            let related = expander.expand(&term);
            all.push(term);
            for word in related {
                all.extend(tokenize(&word));
            }
        }
        all
    }
}

fn dominant_tag(a: (DocId, ClauseKind), b: (DocId, ClauseKind)) -> (DocId, ClauseKind) {
    if a.1 == ClauseKind::Phrasal {
        a
    } else {
        b
    }
}
