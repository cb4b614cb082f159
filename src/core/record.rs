//! Record, candidate and query types shared by every search stage.

use serde::{Deserialize, Serialize};

/// Result count used when the caller passes a missing or non-positive `k`.
pub const DEFAULT_K: usize = 5;

/// One indexed faculty profile, as captured in the metadata snapshot.
///
/// The position of a record in the snapshot equals its row in the vector
/// index. Every field is nullable because the snapshot is produced by an
/// external batch job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub faculty_type: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub research: Option<String>,
    #[serde(default)]
    pub specializations: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    /// Textual summary of taught courses.
    #[serde(default)]
    pub teaching: Option<String>,
    /// Comma-joined subject tags from the enrichment source.
    #[serde(default)]
    pub topics: Option<String>,
}

impl Record {
    /// Convenience constructor used heavily in tests and fixtures.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_research(mut self, research: impl Into<String>) -> Self {
        self.research = Some(research.into());
        self
    }

    #[must_use]
    pub fn with_topics(mut self, topics: impl Into<String>) -> Self {
        self.topics = Some(topics.into());
        self
    }

    #[must_use]
    pub fn with_specializations(mut self, specializations: impl Into<String>) -> Self {
        self.specializations = Some(specializations.into());
        self
    }

    #[must_use]
    pub fn with_biography(mut self, biography: impl Into<String>) -> Self {
        self.biography = Some(biography.into());
        self
    }

    #[must_use]
    pub fn with_faculty_type(mut self, faculty_type: impl Into<String>) -> Self {
        self.faculty_type = Some(faculty_type.into());
        self
    }

    #[must_use]
    pub fn with_teaching(mut self, teaching: impl Into<String>) -> Self {
        self.teaching = Some(teaching.into());
        self
    }

    /// Name, if present and not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Which path produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactName,
    FuzzyName,
    /// Query contained in the name.
    KeywordPrimary,
    /// Query terms found in topics, research, specializations, type or biography.
    KeywordSecondary,
    Semantic,
    Fallback,
}

impl MatchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactName => "exact-name",
            Self::FuzzyName => "fuzzy-name",
            Self::KeywordPrimary => "keyword-primary",
            Self::KeywordSecondary => "keyword-secondary",
            Self::Semantic => "semantic",
            Self::Fallback => "fallback",
        }
    }

    /// Identity matches short-circuit the rest of the pipeline.
    pub const fn is_identity(self) -> bool {
        matches!(self, Self::ExactName | Self::FuzzyName)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value copy of a [`Record`] annotated with a score for one search call.
///
/// Serializes as the flattened record plus `similarity_score`; the match
/// type stays internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub record: Record,
    pub similarity_score: f32,
    #[serde(skip, default = "default_match_type")]
    pub match_type: MatchType,
}

const fn default_match_type() -> MatchType {
    MatchType::Fallback
}

impl Candidate {
    pub fn new(record: &Record, similarity_score: f32, match_type: MatchType) -> Self {
        Self {
            record: record.clone(),
            similarity_score,
            match_type,
        }
    }

    pub const fn id(&self) -> Option<i64> {
        self.record.id
    }
}

/// Lowercase `text` and collapse every whitespace run to a single space.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A validated, trimmed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    lowered: String,
    terms: Vec<String>,
}

impl Query {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let lowered = normalize_text(text);
        let terms = lowered.split_whitespace().map(str::to_string).collect();
        Some(Self {
            text: text.to_string(),
            lowered,
            terms,
        })
    }

    /// Trimmed query as typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased query with whitespace runs collapsed to one space.
    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    /// Whitespace-split lowercased terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Clamp a caller-supplied result count, defaulting to [`DEFAULT_K`].
pub fn normalize_k(k: Option<i64>) -> usize {
    match k {
        Some(k) if k > 0 => usize::try_from(k).unwrap_or(usize::MAX),
        _ => DEFAULT_K,
    }
}
