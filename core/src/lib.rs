//! quarry-core: SPIMI index construction and boolean/ranked query evaluation
//! over a positional inverted index.

pub mod algebra;
pub mod block;
pub mod builder;
pub mod config;
pub mod index;
pub mod merge;
pub mod persist;
pub mod phrase;
pub mod prf;
pub mod query;
pub mod rank;
pub mod store;
pub mod tokenizer;

pub use config::{IndexConfig, RankingModel, SearchConfig};
pub use index::{Dictionary, DocId, DocStats, Posting, TermEntry};
pub use query::{Clause, ClauseKind, Searcher, SynonymExpander};
pub use store::PostingStore;
