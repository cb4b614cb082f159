//! Embedding similarity over the flat index.

use tracing::{debug, warn};

use crate::core::{Candidate, MatchType, Query, Record};
use crate::search::embeddings::{Embedder, FlatIndex, Neighbor, l2_normalize};

/// Rows fetched per requested result, leaving room for the re-score.
pub const OVERFETCH_MULTIPLIER: usize = 10;

/// Map an inner-product score on unit vectors to a similarity in [0, 1].
pub fn similarity_from_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Semantic candidates for `query`, in index order (not re-ranked).
///
/// Neighbors that point outside the metadata, and records lacking an id or
/// a name, are dropped.
pub fn match_query(
    query: &Query,
    embedder: &dyn Embedder,
    index: &FlatIndex,
    metadata: &[Record],
    k: usize,
) -> Vec<Candidate> {
    let search_k = k.saturating_mul(OVERFETCH_MULTIPLIER).min(metadata.len());
    if search_k == 0 {
        return Vec::new();
    }

    let mut vector = embedder.embed(query.text());
    l2_normalize(&mut vector);

    let neighbors = match index.search(&vector, search_k) {
        Ok(neighbors) => neighbors,
        Err(err) => {
            warn!(error = %err, "semantic search failed");
            return Vec::new();
        }
    };

    let candidates: Vec<Candidate> = neighbors
        .iter()
        .filter_map(|neighbor| to_candidate(neighbor, metadata))
        .collect();
    debug!(
        requested = search_k,
        kept = candidates.len(),
        "semantic neighbors"
    );
    candidates
}

fn to_candidate(neighbor: &Neighbor, metadata: &[Record]) -> Option<Candidate> {
    let record = metadata.get(neighbor.row?)?;
    if record.id.is_none() || record.display_name().is_none() {
        return None;
    }
    Some(Candidate::new(
        record,
        similarity_from_score(neighbor.score),
        MatchType::Semantic,
    ))
}
