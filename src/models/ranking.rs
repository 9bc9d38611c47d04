use serde::{Deserialize, Serialize};

/// Fixed-dimension feature vector describing a show
pub type Embedding = Vec<f64>;

/// Where a memory signal came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemorySource {
    /// Durable taste profile (e.g. the rated library)
    LongTerm,
    /// Recent, short-lived signal (e.g. this session's picks)
    ShortTerm,
}

/// A show being evaluated for ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub id: String,
    pub embedding: Embedding,
}

impl CandidateItem {
    pub fn new(id: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }
}

/// A weighted past-preference signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryItem {
    pub embedding: Embedding,
    /// Caller-supplied, must be non-negative
    pub weight: f64,
    pub source: MemorySource,
}

impl MemoryItem {
    pub fn new(embedding: Embedding, weight: f64, source: MemorySource) -> Self {
        Self {
            embedding,
            weight,
            source,
        }
    }
}

/// Scorer output: a candidate with its blended relevance score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub id: String,
    pub embedding: Embedding,
    pub score: f64,
}

/// Request body for the ranking endpoint
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub candidates: Vec<CandidateItem>,
    #[serde(default)]
    pub memory: Vec<MemoryItem>,
    pub seed_embedding: Embedding,
    /// Candidate IDs to drop in addition to the user's blocked shows
    #[serde(default)]
    pub exclude: Vec<String>,
}
