//! Merge lexical and semantic candidates into one ranked list.
//!
//! Semantic candidates are re-scored as
//! `0.6 * similarity + 0.4 * keyword_score`, then everything is merged in
//! priority order (name substring, content, semantic), deduplicated by id
//! with the first occurrence kept, stably sorted by score and truncated.
//! Semantic candidates whose blended score is zero are discarded.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::core::Candidate;
use crate::search::lexical::{KeywordScorer, LexicalMatches};

/// Blend weights for semantic candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub semantic: f32,
    pub keyword: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            keyword: 0.4,
        }
    }
}

impl BlendWeights {
    pub fn combine(&self, similarity: f32, keyword: f32) -> f32 {
        (self.semantic * similarity + self.keyword * keyword).clamp(0.0, 1.0)
    }
}

/// Result of ranking.
#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    Ranked(Vec<Candidate>),
    /// No tier produced anything; the caller should fall back.
    NoResults,
}

impl RankOutcome {
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::Ranked(candidates) => candidates,
            Self::NoResults => Vec::new(),
        }
    }
}

/// Hybrid ranker.
#[derive(Debug, Clone, Default)]
pub struct HybridRanker {
    weights: BlendWeights,
}

impl HybridRanker {
    pub const fn new(weights: BlendWeights) -> Self {
        Self { weights }
    }

    /// Rank lexical and semantic candidates for one query.
    ///
    /// Identity matches are returned untouched and `semantic` is ignored.
    pub fn rank(
        &self,
        lexical: LexicalMatches,
        semantic: Vec<Candidate>,
        scorer: &KeywordScorer<'_>,
        k: usize,
    ) -> RankOutcome {
        let (name, content) = match lexical {
            LexicalMatches::Identity(hits) => {
                return if hits.is_empty() {
                    RankOutcome::NoResults
                } else {
                    RankOutcome::Ranked(truncate(hits, k))
                };
            }
            LexicalMatches::Keyword { name, content } => (name, content),
        };

        // A zero blended score carries no signal; dropping it lets the
        // caller fall back instead of returning arbitrary rows.
        let rescored = semantic
            .into_iter()
            .map(|mut candidate| {
                let keyword = scorer.score(&candidate.record);
                candidate.similarity_score =
                    self.weights.combine(candidate.similarity_score, keyword);
                candidate
            })
            .filter(|candidate| candidate.similarity_score > 0.0);

        let mut seen = HashSet::new();
        let mut merged: Vec<Candidate> = name
            .into_iter()
            .chain(content)
            .chain(rescored)
            .filter(|candidate| candidate.id().is_some_and(|id| seen.insert(id)))
            .collect();

        if merged.is_empty() {
            debug!("hybrid ranking produced no candidates");
            return RankOutcome::NoResults;
        }

        merged.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });
        RankOutcome::Ranked(truncate(merged, k))
    }
}

fn truncate(mut candidates: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    candidates.truncate(k);
    candidates
}
