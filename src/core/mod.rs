//! Core domain types.

pub mod record;

pub use record::{Candidate, DEFAULT_K, MatchType, Query, Record, normalize_k, normalize_text};
