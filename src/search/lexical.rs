//! Tiered lexical matching over the metadata snapshot.
//!
//! Tiers, highest first:
//!
//! 1. exact name (1.0), then fuzzy name (0.98); either one ends the search
//! 2. query contained in the name (0.95)
//! 3. query terms found in content fields (0.78 up to a per-field ceiling)
//!
//! Everything here is a pure function of the query and the records.

use std::cmp::Ordering;

use strsim::normalized_levenshtein;
use tracing::debug;

use crate::config::SearchConfig;
use crate::core::{Candidate, MatchType, Query, Record, normalize_text};

pub const EXACT_NAME_SCORE: f32 = 1.0;
pub const FUZZY_NAME_SCORE: f32 = 0.98;
pub const NAME_SUBSTRING_SCORE: f32 = 0.95;
/// Score for a content field where a single term out of many matched.
pub const CONTENT_FLOOR: f32 = 0.78;

/// Content fields and the score reached when every query term is present.
const CONTENT_FIELDS: [(ContentField, f32); 5] = [
    (ContentField::Topics, 0.90),
    (ContentField::Research, 0.88),
    (ContentField::Specializations, 0.86),
    (ContentField::FacultyType, 0.84),
    (ContentField::Biography, 0.82),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentField {
    Topics,
    Research,
    Specializations,
    FacultyType,
    Biography,
}

impl ContentField {
    fn value(self, record: &Record) -> Option<&str> {
        match self {
            Self::Topics => record.topics.as_deref(),
            Self::Research => record.research.as_deref(),
            Self::Specializations => record.specializations.as_deref(),
            Self::FacultyType => record.faculty_type.as_deref(),
            Self::Biography => record.biography.as_deref(),
        }
    }
}

/// Thresholds for the fuzzy comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalOptions {
    pub fuzzy_name_cutoff: f64,
    pub fuzzy_name_limit: usize,
    pub faculty_type_cutoff: f64,
}

impl Default for LexicalOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for LexicalOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            fuzzy_name_cutoff: f64::from(config.fuzzy_name_cutoff),
            fuzzy_name_limit: config.fuzzy_name_limit,
            faculty_type_cutoff: f64::from(config.faculty_type_cutoff),
        }
    }
}

/// Output of the lexical matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum LexicalMatches {
    /// Exact or fuzzy name hits, already truncated to `k`.
    Identity(Vec<Candidate>),
    /// Name-substring and content hits, each list in rank order.
    Keyword {
        name: Vec<Candidate>,
        content: Vec<Candidate>,
    },
}

impl LexicalMatches {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Identity(hits) => hits.is_empty(),
            Self::Keyword { name, content } => name.is_empty() && content.is_empty(),
        }
    }
}

/// Run the lexical tiers for `query` over `metadata`.
///
/// Records without an id or a usable name are ignored.
pub fn match_query(
    query: &Query,
    metadata: &[Record],
    k: usize,
    options: &LexicalOptions,
) -> LexicalMatches {
    let eligible: Vec<&Record> = metadata.iter().filter(|r| is_matchable(r)).collect();

    let exact: Vec<Candidate> = eligible
        .iter()
        .filter(|record| normalized_name(record).as_deref() == Some(query.lowered()))
        .take(k)
        .map(|record| Candidate::new(record, EXACT_NAME_SCORE, MatchType::ExactName))
        .collect();
    if !exact.is_empty() {
        debug!(hits = exact.len(), "exact name match");
        return LexicalMatches::Identity(exact);
    }

    let fuzzy = fuzzy_name_matches(query, &eligible, k, options);
    if !fuzzy.is_empty() {
        debug!(hits = fuzzy.len(), "fuzzy name match");
        return LexicalMatches::Identity(fuzzy);
    }

    let scorer = KeywordScorer::new(query, metadata, options.faculty_type_cutoff);
    let mut name = Vec::new();
    let mut content = Vec::new();
    for record in &eligible {
        if let Some(score) = scorer.name_score(record) {
            name.push(Candidate::new(record, score, MatchType::KeywordPrimary));
        } else if let Some(score) = scorer.content_score(record) {
            content.push(Candidate::new(record, score, MatchType::KeywordSecondary));
        }
    }
    content.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        name_hits = name.len(),
        content_hits = content.len(),
        "keyword match"
    );
    LexicalMatches::Keyword { name, content }
}

fn is_matchable(record: &Record) -> bool {
    record.id.is_some() && record.display_name().is_some()
}

fn normalized_name(record: &Record) -> Option<String> {
    record.display_name().map(normalize_text)
}

/// Records whose name is among the closest `fuzzy_name_limit` names.
///
/// Ordered by name similarity, then by metadata position.
fn fuzzy_name_matches(
    query: &Query,
    records: &[&Record],
    k: usize,
    options: &LexicalOptions,
) -> Vec<Candidate> {
    let mut names: Vec<(String, f64)> = Vec::new();
    for record in records {
        let Some(name) = normalized_name(record) else {
            continue;
        };
        if names.iter().any(|(seen, _)| *seen == name) {
            continue;
        }
        let ratio = normalized_levenshtein(query.lowered(), &name);
        if ratio >= options.fuzzy_name_cutoff {
            names.push((name, ratio));
        }
    }
    names.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    names.truncate(options.fuzzy_name_limit);

    let mut hits: Vec<(usize, &Record)> = records
        .iter()
        .filter_map(|record| {
            let name = normalized_name(record)?;
            let rank = names.iter().position(|(accepted, _)| *accepted == name)?;
            Some((rank, *record))
        })
        .collect();
    hits.sort_by_key(|(rank, _)| *rank);

    hits.into_iter()
        .take(k)
        .map(|(_, record)| Candidate::new(record, FUZZY_NAME_SCORE, MatchType::FuzzyName))
        .collect()
}

/// Keyword scoring shared by the lexical tiers and the semantic re-score.
#[derive(Debug, Clone)]
pub struct KeywordScorer<'a> {
    query: &'a Query,
    /// Faculty types that fuzzily resemble the whole query.
    fuzzy_types: Vec<String>,
}

impl<'a> KeywordScorer<'a> {
    pub fn new(query: &'a Query, metadata: &[Record], faculty_type_cutoff: f64) -> Self {
        let mut fuzzy_types: Vec<String> = Vec::new();
        for faculty_type in metadata.iter().filter_map(|r| r.faculty_type.as_deref()) {
            let lowered = faculty_type.trim().to_lowercase();
            if lowered.is_empty() || fuzzy_types.contains(&lowered) {
                continue;
            }
            if faculty_type_ratio(query.lowered(), &lowered) >= faculty_type_cutoff {
                fuzzy_types.push(lowered);
            }
        }
        Self { query, fuzzy_types }
    }

    /// Name-substring score, if the name contains the whole query.
    pub fn name_score(&self, record: &Record) -> Option<f32> {
        let name = normalized_name(record)?;
        name.contains(self.query.lowered()).then_some(NAME_SUBSTRING_SCORE)
    }

    /// Best content-field score across topics, research, specializations,
    /// faculty type and biography.
    pub fn content_score(&self, record: &Record) -> Option<f32> {
        let terms = self.query.terms();
        if terms.is_empty() {
            return None;
        }

        let mut best: Option<f32> = None;
        for (field, ceiling) in CONTENT_FIELDS {
            let found = field.value(record).map_or(0, |value| {
                let value = value.to_lowercase();
                terms.iter().filter(|term| value.contains(term.as_str())).count()
            });

            let score = if found > 0 {
                let fraction = found as f32 / terms.len() as f32;
                Some(CONTENT_FLOOR + (ceiling - CONTENT_FLOOR) * fraction)
            } else if field == ContentField::FacultyType && self.is_fuzzy_type(record) {
                Some(ceiling)
            } else {
                None
            };

            if let Some(score) = score {
                best = Some(best.map_or(score, |current| current.max(score)));
            }
        }
        best
    }

    /// Keyword relevance in [0, 1]; 0 when nothing matches.
    pub fn score(&self, record: &Record) -> f32 {
        self.name_score(record)
            .or_else(|| self.content_score(record))
            .unwrap_or(0.0)
    }

    fn is_fuzzy_type(&self, record: &Record) -> bool {
        record
            .faculty_type
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .is_some_and(|value| self.fuzzy_types.contains(&value))
    }
}

/// Faculty types are stored hyphenated; compare both spellings.
fn faculty_type_ratio(query: &str, faculty_type: &str) -> f64 {
    let spaced = faculty_type.replace('-', " ");
    normalized_levenshtein(query, faculty_type).max(normalized_levenshtein(query, &spaced))
}
