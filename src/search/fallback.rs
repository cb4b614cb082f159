//! Degraded search straight against the relational store.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::core::{Candidate, MatchType, Query};
use crate::error::Result;
use crate::storage::FacultyStore;

/// Score given to every fallback result; below every lexical tier.
pub const FALLBACK_SCORE: f32 = 0.70;

/// Substring search over the store. Never fails; errors become empty results.
#[derive(Debug, Clone)]
pub struct FallbackSearcher {
    config: StoreConfig,
    /// Pinned database file; skips the candidate-path lookup.
    path: Option<PathBuf>,
}

impl FallbackSearcher {
    pub const fn new(config: StoreConfig) -> Self {
        Self { config, path: None }
    }

    /// Search exactly the database at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config: StoreConfig::default(),
            path: Some(path.into()),
        }
    }

    pub fn search(&self, query: &Query, k: usize) -> Vec<Candidate> {
        match self.try_search(query, k) {
            Ok(candidates) => {
                debug!(hits = candidates.len(), "fallback search");
                candidates
            }
            Err(err) => {
                warn!(error = %err, "fallback search failed");
                Vec::new()
            }
        }
    }

    fn try_search(&self, query: &Query, k: usize) -> Result<Vec<Candidate>> {
        let store = self.open()?;
        let records = store.substring_records(query.text(), k)?;
        Ok(records
            .iter()
            .map(|record| Candidate::new(record, FALLBACK_SCORE, MatchType::Fallback))
            .collect())
    }

    fn open(&self) -> Result<FacultyStore> {
        match &self.path {
            Some(path) => FacultyStore::open(
                path,
                Duration::from_millis(self.config.busy_timeout_ms),
            ),
            None => FacultyStore::open_configured(&self.config),
        }
    }
}
