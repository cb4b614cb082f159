//! Search workflow over on-disk artifacts.
//!
//! Each test builds an isolated fixture (index, metadata snapshot and store)
//! and drives the engine the same way the CLI does.

use std::collections::HashSet;
use std::sync::Arc;

use facfind::core::{Candidate, MatchType, Record};
use facfind::search::{FallbackReason, ResourceLoader, SearchPath};
use facfind::test_utils::{SearchFixture, TestLogger};

fn ids(results: &[Candidate]) -> Vec<i64> {
    results.iter().filter_map(Candidate::id).collect()
}

#[test]
fn test_exact_name_returns_single_identity_hit() {
    let log = TestLogger::new("test_exact_name_returns_single_identity_hit");
    let fixture = SearchFixture::with_sample_data();
    let engine = fixture.engine();

    log.log_input("query", &"Asha Rao");
    let outcome = engine.search_with_outcome("Asha Rao", Some(5));
    log.log_expected(&vec![1]);
    log.log_actual(&ids(&outcome.results));

    assert_eq!(outcome.path, SearchPath::Identity);
    assert_eq!(ids(&outcome.results), vec![1]);
    assert!((outcome.results[0].similarity_score - 1.0).abs() < f32::EPSILON);
    assert_eq!(outcome.results[0].match_type, MatchType::ExactName);
    log.pass();
}

#[test]
fn test_exact_name_ignores_case_and_padding() {
    let fixture = SearchFixture::with_sample_data();
    let results = fixture.engine().search("   MEERA krishnan ", None);
    assert_eq!(ids(&results), vec![4]);
}

#[test]
fn test_exact_name_ignores_inner_whitespace() {
    let fixture = SearchFixture::with_sample_data();
    let engine = fixture.engine();
    for query in ["Asha\tRao", "asha  rao"] {
        let outcome = engine.search_with_outcome(query, Some(5));
        assert_eq!(outcome.path, SearchPath::Identity, "query {query:?}");
        assert_eq!(ids(&outcome.results), vec![1]);
        assert_eq!(outcome.results[0].match_type, MatchType::ExactName);
        assert!((outcome.results[0].similarity_score - 1.0).abs() < f32::EPSILON);
    }
}

#[test]
fn test_shared_name_returns_every_holder() {
    let log = TestLogger::new("test_shared_name_returns_every_holder");
    let fixture = SearchFixture::with_sample_data();

    let results = fixture.engine().search("J. Patel", Some(5));
    log.log_actual(&ids(&results));

    assert_eq!(ids(&results), vec![2, 3]);
    assert!(
        results
            .iter()
            .all(|c| (c.similarity_score - 1.0).abs() < f32::EPSILON)
    );
    log.pass();
}

#[test]
fn test_shared_name_respects_k() {
    let fixture = SearchFixture::with_sample_data();
    assert_eq!(ids(&fixture.engine().search("j. patel", Some(1))), vec![2]);
}

#[test]
fn test_misspelled_name_matches_fuzzily() {
    let fixture = SearchFixture::with_sample_data();
    let outcome = fixture.engine().search_with_outcome("Asha Raoo", Some(5));

    assert_eq!(outcome.path, SearchPath::Identity);
    assert_eq!(ids(&outcome.results), vec![1]);
    assert_eq!(outcome.results[0].match_type, MatchType::FuzzyName);
    assert!((outcome.results[0].similarity_score - 0.98).abs() < 1e-6);
}

#[test]
fn test_partial_name_ranks_name_hit_first() {
    let log = TestLogger::new("test_partial_name_ranks_name_hit_first");
    let fixture = SearchFixture::with_sample_data();

    let outcome = fixture.engine().search_with_outcome("asha", Some(5));
    log.log_actual(&ids(&outcome.results));

    assert_eq!(outcome.path, SearchPath::Hybrid);
    assert_eq!(outcome.results[0].id(), Some(1));
    assert_eq!(outcome.results[0].match_type, MatchType::KeywordPrimary);
    assert!((outcome.results[0].similarity_score - 0.95).abs() < 1e-6);
    assert_eq!(ids(&outcome.results).iter().filter(|&&id| id == 1).count(), 1);
    log.pass();
}

#[test]
fn test_topic_query_hits_content_tier() {
    let fixture = SearchFixture::with_sample_data();
    let results = fixture.engine().search("cryptography", Some(3));

    assert_eq!(results[0].id(), Some(4));
    assert_eq!(results[0].match_type, MatchType::KeywordSecondary);
    assert!(results[0].similarity_score >= 0.78);
    assert!(results[0].similarity_score <= 0.90);
}

#[test]
fn test_misspelled_topic_is_found_semantically() {
    let log = TestLogger::new("test_misspelled_topic_is_found_semantically");
    let fixture = SearchFixture::with_sample_data();

    let results = fixture.engine().search("machne lerning", Some(5));
    log.log_actual(&ids(&results));

    let asha = results
        .iter()
        .find(|c| c.id() == Some(1))
        .expect("record 1 should be recalled");
    assert_eq!(asha.match_type, MatchType::Semantic);
    assert!(asha.similarity_score > 0.0);
    assert_eq!(results[0].id(), Some(1));
    log.pass();
}

#[test]
fn test_results_are_unique_and_bounded() {
    let fixture = SearchFixture::with_sample_data();
    let engine = fixture.engine();

    for query in ["learning", "systems", "faculty", "signal processing", "policy"] {
        for k in [1_i64, 2, 3, 5, 10] {
            let results = engine.search(query, Some(k));
            let limit = usize::try_from(k).unwrap();
            assert!(results.len() <= limit, "{query} k={k}");
            let unique: HashSet<i64> = ids(&results).into_iter().collect();
            assert_eq!(unique.len(), results.len(), "{query} k={k}");
        }
    }
}

#[test]
fn test_repeated_searches_are_identical() {
    let fixture = SearchFixture::with_sample_data();
    let engine = fixture.engine();
    let first = engine.search("wireless networks", Some(4));
    let second = engine.search("wireless networks", Some(4));
    assert_eq!(first, second);
}

#[test]
fn test_empty_query_never_touches_resources() {
    let fixture = SearchFixture::with_sample_data();
    let loader = fixture.loader();
    let engine = fixture.engine_with(Arc::clone(&loader));

    for query in ["", "   ", "\t\n"] {
        let outcome = engine.search_with_outcome(query, Some(5));
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.path, SearchPath::EmptyQuery);
    }
    assert_eq!(loader.load_count(), 0);
}

#[test]
fn test_resources_load_once_across_searches() {
    let fixture = SearchFixture::with_sample_data();
    let loader = fixture.loader();
    let engine = fixture.engine_with(Arc::clone(&loader));

    engine.search("asha", None);
    engine.search("quantum", None);
    engine.search("Lin Wei", None);

    assert_eq!(loader.load_count(), 1);
    assert!(loader.is_loaded());
}

#[test]
fn test_engines_share_one_loader_across_threads() {
    let fixture = SearchFixture::with_sample_data();
    let loader: Arc<ResourceLoader> = fixture.loader();
    let engine = Arc::new(fixture.engine_with(Arc::clone(&loader)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.search("Asha Rao", Some(3)))
        })
        .collect();
    for handle in handles {
        assert_eq!(ids(&handle.join().unwrap()), vec![1]);
    }
    assert_eq!(loader.load_count(), 1);
}

#[test]
fn test_misaligned_artifacts_fall_back_to_store() {
    let log = TestLogger::new("test_misaligned_artifacts_fall_back_to_store");
    let fixture = SearchFixture::with_sample_data();

    // Index built for two records, metadata describing all six.
    let sample = facfind::test_utils::sample_records();
    fixture.write_artifacts(&sample[..2]);
    facfind::search::write_metadata(&fixture.data_dir.join("metadata.json"), &sample)
        .expect("write metadata");

    let outcome = fixture.engine().search_with_outcome("krishnan", Some(5));
    log.log_actual(&outcome);

    assert_eq!(
        outcome.path,
        SearchPath::Fallback(FallbackReason::ResourcesUnavailable)
    );
    assert_eq!(ids(&outcome.results), vec![4]);
    log.pass();
}

#[test]
fn test_records_without_identity_are_never_returned() {
    let fixture = SearchFixture::new();
    let mut records = facfind::test_utils::sample_records();
    records.push(Record {
        research: Some("machine learning".to_string()),
        ..Default::default()
    });
    fixture.write_artifacts(&records);

    let results = fixture.engine().search("machine learning", Some(10));
    assert!(!results.is_empty());
    assert!(results.iter().all(|c| c.id().is_some() && c.record.name.is_some()));
}

#[test]
fn test_nonsense_query_has_no_semantic_support() {
    let bundle = facfind::test_utils::bundle_for(facfind::test_utils::sample_records());
    let embedder = bundle.embedder.as_deref().expect("embedder");
    let index = bundle.index.as_ref().expect("index");
    let query = facfind::core::Query::parse("zzyzx").expect("non-empty query");

    let candidates =
        facfind::search::semantic::match_query(&query, embedder, index, &bundle.metadata, 5);
    for candidate in &candidates {
        assert!(
            candidate.similarity_score < 0.1,
            "record {:?} scored {}",
            candidate.id(),
            candidate.similarity_score
        );
    }
}

#[test]
fn test_nonsense_query_falls_back_instead_of_ranking() {
    let log = TestLogger::new("test_nonsense_query_falls_back_instead_of_ranking");
    let fixture = SearchFixture::with_sample_data();

    let outcome = fixture.engine().search_with_outcome("zzyzx", Some(5));
    log.log_actual(&outcome);

    assert_eq!(outcome.path, SearchPath::Fallback(FallbackReason::NoCandidates));
    assert!(outcome.results.is_empty());
    log.pass();
}

#[test]
fn test_semantic_similarity_tracks_topic() {
    let fixture = SearchFixture::with_sample_data();
    let results = fixture.engine().search("wireless networks", Some(5));

    // Record 6 is the only profile about wireless networks.
    assert_eq!(results[0].id(), Some(6));
    let others_semantic = results
        .iter()
        .filter(|c| c.match_type == MatchType::Semantic)
        .all(|c| c.similarity_score < 0.5);
    assert!(others_semantic);
}
