//! Store fallback behaviour when the semantic artifacts cannot be used.

use facfind::core::{Candidate, MatchType};
use facfind::search::{FALLBACK_SCORE, FallbackReason, SearchPath};
use facfind::test_utils::{SearchFixture, TestLogger, sample_profiles};

fn ids(results: &[Candidate]) -> Vec<i64> {
    results.iter().filter_map(Candidate::id).collect()
}

#[test]
fn test_unavailable_resources_use_store() {
    let log = TestLogger::new("test_unavailable_resources_use_store");
    let fixture = SearchFixture::with_sample_data();

    let outcome = fixture.unavailable_engine().search_with_outcome("rao", Some(5));
    log.log_expected(&vec![1]);
    log.log_actual(&ids(&outcome.results));

    assert_eq!(
        outcome.path,
        SearchPath::Fallback(FallbackReason::ResourcesUnavailable)
    );
    assert_eq!(ids(&outcome.results), vec![1]);
    assert!((outcome.results[0].similarity_score - FALLBACK_SCORE).abs() < f32::EPSILON);
    assert_eq!(outcome.results[0].match_type, MatchType::Fallback);
    log.pass();
}

#[test]
fn test_missing_artifacts_use_store() {
    let fixture = SearchFixture::new();
    fixture.write_store(&sample_profiles());

    let outcome = fixture.engine().search_with_outcome("wireless", Some(5));
    assert_eq!(
        outcome.path,
        SearchPath::Fallback(FallbackReason::ResourcesUnavailable)
    );
    assert_eq!(ids(&outcome.results), vec![6]);
}

#[test]
fn test_fallback_matches_topics_and_research() {
    let fixture = SearchFixture::with_sample_data();
    let engine = fixture.unavailable_engine();

    assert_eq!(ids(&engine.search("Information Retrieval", None)), vec![2]);
    assert_eq!(ids(&engine.search("compiler", None)), vec![3]);
}

#[test]
fn test_fallback_is_case_insensitive_and_bounded() {
    let fixture = SearchFixture::with_sample_data();
    let results = fixture.unavailable_engine().search("AND", Some(2));
    assert_eq!(results.len(), 2);
    assert!(
        results
            .iter()
            .all(|c| (c.similarity_score - FALLBACK_SCORE).abs() < f32::EPSILON)
    );
}

#[test]
fn test_nothing_anywhere_returns_empty() {
    let fixture = SearchFixture::new();
    let outcome = fixture.engine().search_with_outcome("rao", Some(5));
    assert!(outcome.results.is_empty());
    assert!(matches!(outcome.path, SearchPath::Fallback(_)));
}
