//! Search entry point.
//!
//! ```text
//! START -> empty query?            -> EMPTY
//!       -> resources unavailable?  -> FALLBACK
//!       -> exact/fuzzy name hit?   -> DONE
//!       -> hybrid rank empty?      -> FALLBACK
//!       -> DONE
//! ```
//!
//! Every path returns a list; nothing here returns an error.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::config::Config;
use crate::core::{Candidate, Query, normalize_k};
use crate::search::fallback::FallbackSearcher;
use crate::search::hybrid::{HybridRanker, RankOutcome};
use crate::search::lexical::{self, KeywordScorer, LexicalMatches, LexicalOptions};
use crate::search::resources::{ResourceBundle, ResourceLoader};
use crate::search::semantic;

/// Why the primary path handed over to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    ResourcesUnavailable,
    NoCandidates,
}

/// Which terminal state a search reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum SearchPath {
    EmptyQuery,
    Identity,
    Hybrid,
    Fallback(FallbackReason),
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => f.write_str("empty-query"),
            Self::Identity => f.write_str("identity"),
            Self::Hybrid => f.write_str("hybrid"),
            Self::Fallback(FallbackReason::ResourcesUnavailable) => {
                f.write_str("fallback (resources unavailable)")
            }
            Self::Fallback(FallbackReason::NoCandidates) => {
                f.write_str("fallback (no candidates)")
            }
        }
    }
}

/// Results plus the path that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<Candidate>,
    pub path: SearchPath,
}

/// Status of the primary retrieval before fallback is considered.
#[derive(Debug)]
enum Retrieval {
    Ok(Vec<Candidate>, SearchPath),
    Empty,
    Unavailable,
}

/// Hybrid search over a shared resource bundle.
#[derive(Debug)]
pub struct SearchEngine {
    loader: Arc<ResourceLoader>,
    fallback: FallbackSearcher,
    ranker: HybridRanker,
    options: LexicalOptions,
    default_k: usize,
}

impl SearchEngine {
    pub fn new(loader: Arc<ResourceLoader>, fallback: FallbackSearcher) -> Self {
        Self {
            loader,
            fallback,
            ranker: HybridRanker::default(),
            options: LexicalOptions::default(),
            default_k: crate::core::DEFAULT_K,
        }
    }

    /// Engine with a lazily loaded bundle and store lookup from `config`.
    pub fn from_config(config: &Config) -> Self {
        let loader = Arc::new(ResourceLoader::new(config.clone()));
        let fallback = FallbackSearcher::new(config.store.clone());
        Self::new(loader, fallback)
            .with_options(LexicalOptions::from(&config.search))
            .with_default_k(config.search.default_k)
    }

    /// Engine over an already built bundle.
    pub fn with_bundle(bundle: ResourceBundle, fallback: FallbackSearcher) -> Self {
        Self::new(Arc::new(ResourceLoader::preloaded(bundle)), fallback)
    }

    #[must_use]
    pub fn with_options(mut self, options: LexicalOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_default_k(mut self, default_k: usize) -> Self {
        if default_k > 0 {
            self.default_k = default_k;
        }
        self
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Ranked results for `query`; `k` of `None` or `<= 0` means the default.
    pub fn search(&self, query: &str, k: Option<i64>) -> Vec<Candidate> {
        self.search_with_outcome(query, k).results
    }

    pub fn search_with_outcome(&self, query: &str, k: Option<i64>) -> SearchOutcome {
        let Some(query) = Query::parse(query) else {
            return SearchOutcome {
                results: Vec::new(),
                path: SearchPath::EmptyQuery,
            };
        };
        let k = match k {
            Some(k) if k > 0 => normalize_k(Some(k)),
            _ => self.default_k,
        };

        let span = info_span!("search", query = query.text(), k);
        let _guard = span.enter();

        match self.retrieve(&query, k) {
            Retrieval::Ok(results, path) => SearchOutcome { results, path },
            Retrieval::Empty => self.fall_back(&query, k, FallbackReason::NoCandidates),
            Retrieval::Unavailable => {
                self.fall_back(&query, k, FallbackReason::ResourcesUnavailable)
            }
        }
    }

    fn retrieve(&self, query: &Query, k: usize) -> Retrieval {
        let bundle = self.loader.ensure_loaded();
        let (Some(embedder), Some(index)) = (bundle.embedder.as_deref(), bundle.index.as_ref())
        else {
            return Retrieval::Unavailable;
        };
        if bundle.metadata.is_empty() {
            return Retrieval::Unavailable;
        }
        let metadata = bundle.metadata.as_slice();

        let lexical = lexical::match_query(query, metadata, k, &self.options);
        if let LexicalMatches::Identity(hits) = lexical {
            return Retrieval::Ok(hits, SearchPath::Identity);
        }

        let semantic = semantic::match_query(query, embedder, index, metadata, k);
        let scorer = KeywordScorer::new(query, metadata, self.options.faculty_type_cutoff);
        match self.ranker.rank(lexical, semantic, &scorer, k) {
            RankOutcome::Ranked(results) => Retrieval::Ok(results, SearchPath::Hybrid),
            RankOutcome::NoResults => Retrieval::Empty,
        }
    }

    fn fall_back(&self, query: &Query, k: usize, reason: FallbackReason) -> SearchOutcome {
        debug!(?reason, "routing to fallback search");
        SearchOutcome {
            results: self.fallback.search(query, k),
            path: SearchPath::Fallback(reason),
        }
    }
}
