//! Hybrid search over faculty profiles
//!
//! Lexical tiers + hash-embedding similarity, with a store-backed fallback.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                 SearchEngine (engine.rs)                       │
//! └────────────────────────────────────────────────────────────────┘
//!                                │ ensure_loaded
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │  ResourceLoader (resources)   │──── unavailable ───┐
//!                └───────────────────────────────┘                    │
//!                     │                          │                    │
//!                     ▼                          ▼                    │
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐  │
//! │     Lexical tiers            │  │     Semantic matcher         │  │
//! │  (exact/fuzzy/substring)     │  │  (FlatIndex inner product)   │  │
//! └──────────────────────────────┘  └──────────────────────────────┘  │
//!                     │                          │                    │
//!                     └──────────┬───────────────┘                    │
//!                                ▼                                    │
//!                ┌───────────────────────────────┐                    │
//!                │   HybridRanker (hybrid.rs)    │──── no results ────┤
//!                └───────────────────────────────┘                    │
//!                                │                                    ▼
//!                                ▼                  ┌──────────────────────────┐
//!                     Combined ranked results       │ FallbackSearcher (store) │
//!                                                   └──────────────────────────┘
//! ```

pub mod embeddings;
pub mod engine;
pub mod fallback;
pub mod hybrid;
pub mod lexical;
pub mod persistence;
pub mod resources;
pub mod semantic;

// Re-export main types
pub use embeddings::{Embedder, FlatIndex, HashEmbedder, Neighbor, build_embedder};
pub use engine::{FallbackReason, SearchEngine, SearchOutcome, SearchPath};
pub use fallback::{FALLBACK_SCORE, FallbackSearcher};
pub use hybrid::{BlendWeights, HybridRanker, RankOutcome};
pub use lexical::{KeywordScorer, LexicalMatches, LexicalOptions};
pub use persistence::{read_index, read_metadata, write_index, write_metadata};
pub use resources::{ResourceBundle, ResourceLoader};
