/// Scoring model used by the ranking engine. Chosen at construction time,
/// never switched mid-query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankingModel {
    /// Cosine similarity over (1 + log10 tf) x log10(N/df) weights.
    TfIdfCosine,
    /// Okapi BM25 with term-saturation k1 and length-normalization b.
    Bm25 { k1: f32, b: f32 },
}

impl Default for RankingModel {
    fn default() -> Self {
        RankingModel::TfIdfCosine
    }
}

impl RankingModel {
    pub fn bm25() -> Self {
        RankingModel::Bm25 { k1: 1.2, b: 0.75 }
    }
}

/// Knobs for index construction.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    /// Documents per SPIMI block.
    pub block_size: usize,
    /// How many top-frequency terms to cache per document for PRF.
    pub important_words_per_doc: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { block_size: 1000, important_words_per_doc: 5 }
    }
}

/// Knobs for query evaluation and result fusion.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub model: RankingModel,
    /// Multiplier applied to results that carry phrase provenance (> 1 boosts).
    pub phrasal_weight: f32,
    /// Multiplier on the synthetic score given to priority-set documents that
    /// the ranked pass did not reach.
    pub priority_weight: f32,
    /// Benchmark multiplier for the average-score noise filter; smaller is
    /// more forgiving.
    pub filter_strength: f32,
    /// Run one pseudo-relevance-feedback round after the initial evaluation.
    pub use_prf: bool,
    /// How many top-ranked documents feed the PRF word pool.
    pub prf_docs: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            model: RankingModel::TfIdfCosine,
            phrasal_weight: 1.7,
            priority_weight: 1.1,
            filter_strength: 1.2,
            use_prf: false,
            prf_docs: 30,
        }
    }
}
