//! Ranking invariants that must hold for any query.

use std::collections::HashSet;
use std::sync::LazyLock;

use proptest::prelude::*;

use facfind::core::{Candidate, Record, normalize_text};
use facfind::search::{FALLBACK_SCORE, FallbackSearcher, SearchEngine};
use facfind::test_utils::{SearchFixture, bundle_for, sample_records};

/// Engine over the sample bundle plus the fixture that backs its store.
static ENGINE: LazyLock<(SearchFixture, SearchEngine)> = LazyLock::new(|| {
    let fixture = SearchFixture::with_sample_data();
    let engine = SearchEngine::with_bundle(
        bundle_for(sample_records()),
        FallbackSearcher::with_path(&fixture.db_path),
    );
    (fixture, engine)
});

const VOCABULARY: &[&str] = &[
    "asha", "rao", "patel", "j.", "meera", "lin", "wei", "ravi", "menon", "machine", "learning",
    "machne", "lerning", "quantum", "cryptography", "database", "systems", "wireless", "signal",
    "policy", "economics", "faculty", "adjunct", "professor", "vision", "and", "zzyzx",
];

fn engine() -> &'static SearchEngine {
    &ENGINE.1
}

fn ids(results: &[Candidate]) -> Vec<i64> {
    results.iter().filter_map(Candidate::id).collect()
}

fn arb_query() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 1..4).prop_map(|words| words.join(" "))
}

fn arb_name() -> impl Strategy<Value = String> {
    let names: Vec<String> = sample_records()
        .iter()
        .filter_map(|record: &Record| record.name.clone())
        .collect();
    let gaps = prop::sample::select(vec![" ", "  ", "\t", " \n "]);
    (prop::sample::select(names), any::<bool>(), 0usize..3, gaps).prop_map(
        |(name, upper, pad, gap)| {
            let name = if upper { name.to_uppercase() } else { name };
            let name = name.split(' ').collect::<Vec<_>>().join(gap);
            format!("{}{name}{}", " ".repeat(pad), "\t".repeat(pad))
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn results_never_exceed_k(query in arb_query(), k in 1i64..12) {
        let results = engine().search(&query, Some(k));
        prop_assert!(results.len() <= usize::try_from(k).unwrap());
    }

    #[test]
    fn result_ids_are_unique(query in arb_query(), k in 1i64..12) {
        let results = engine().search(&query, Some(k));
        let unique: HashSet<i64> = ids(&results).into_iter().collect();
        prop_assert_eq!(unique.len(), results.len());
    }

    #[test]
    fn scores_are_bounded_and_sorted(query in arb_query()) {
        let results = engine().search(&query, Some(10));
        for candidate in &results {
            prop_assert!((0.0..=1.0).contains(&candidate.similarity_score));
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[test]
    fn search_is_deterministic(query in arb_query(), k in 1i64..8) {
        prop_assert_eq!(engine().search(&query, Some(k)), engine().search(&query, Some(k)));
    }

    #[test]
    fn growing_k_preserves_relative_order(query in arb_query(), k in 1i64..6) {
        let smaller = ids(&engine().search(&query, Some(k)));
        let larger = ids(&engine().search(&query, Some(k + 1)));
        let common: Vec<i64> = larger.iter().copied().filter(|id| smaller.contains(id)).collect();
        let expected: Vec<i64> = smaller.iter().copied().filter(|id| larger.contains(id)).collect();
        prop_assert_eq!(common, expected);
    }

    #[test]
    fn exact_names_rank_first(name in arb_name()) {
        let results = engine().search(&name, Some(5));
        prop_assert!(!results.is_empty());
        let wanted = normalize_text(&name);
        let top = normalize_text(results[0].record.name.as_deref().unwrap_or_default());
        prop_assert_eq!(top, wanted);
        prop_assert!((results[0].similarity_score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_queries_return_nothing(blank in "[ \t\n\r]{0,8}") {
        prop_assert!(engine().search(&blank, Some(5)).is_empty());
    }

    #[test]
    fn arbitrary_text_never_panics(query in "\\PC{0,40}", k in -3i64..20) {
        let results = engine().search(&query, Some(k));
        prop_assert!(results.len() <= usize::try_from(k.max(5)).unwrap());
    }

    #[test]
    fn fallback_scores_are_fixed(query in prop::sample::select(VOCABULARY)) {
        let (fixture, _) = &*ENGINE;
        let results = fixture.unavailable_engine().search(query, Some(5));
        prop_assert!(results.len() <= 5);
        let matches_store = sample_records().iter().any(|record| {
            [
                &record.name,
                &record.research,
                &record.topics,
                &record.specializations,
                &record.faculty_type,
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(query))
        });
        prop_assert_eq!(results.is_empty(), !matches_store);
        for candidate in &results {
            prop_assert!((candidate.similarity_score - FALLBACK_SCORE).abs() < f32::EPSILON);
        }
    }
}
