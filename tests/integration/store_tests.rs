//! Relational store queries against the fixture database.

use std::time::Duration;

use facfind::FfError;
use facfind::storage::{FacultyStore, FacultyType};
use facfind::test_utils::{SearchFixture, sample_records};

fn open(fixture: &SearchFixture) -> FacultyStore {
    FacultyStore::open(&fixture.db_path, Duration::from_millis(500)).expect("open store")
}

fn ids(profiles: &[facfind::storage::FacultyProfile]) -> Vec<i64> {
    profiles.iter().map(|p| p.id).collect()
}

#[test]
fn test_store_round_trips_profiles() {
    let fixture = SearchFixture::with_sample_data();
    let store = open(&fixture);

    assert_eq!(store.count().unwrap(), 6);
    let asha = store.get(1).unwrap().expect("profile 1");
    assert_eq!(asha.name.as_deref(), Some("Asha Rao"));
    assert_eq!(
        asha.teaching,
        Some(vec!["Machine Learning".to_string(), "Data Mining".to_string()])
    );
    assert_eq!(
        asha.phone.map(|p| p.mobile),
        Some(vec!["98450 00001".to_string()])
    );
    assert!(store.get(99).unwrap().is_none());
}

#[test]
fn test_store_records_match_metadata_snapshot() {
    let fixture = SearchFixture::with_sample_data();
    let store = open(&fixture);
    let expected = sample_records();

    assert_eq!(store.substring_records("rao", 5).unwrap(), vec![expected[0].clone()]);
}

#[test]
fn test_list_pages_in_id_order() {
    let fixture = SearchFixture::with_sample_data();
    let store = open(&fixture);

    assert_eq!(ids(&store.list(4, 0).unwrap()), vec![1, 2, 3, 4]);
    assert_eq!(ids(&store.list(4, 4).unwrap()), vec![5, 6]);
    assert!(store.list(4, 10).unwrap().is_empty());
}

#[test]
fn test_filters() {
    let fixture = SearchFixture::with_sample_data();
    let store = open(&fixture);

    assert_eq!(ids(&store.find_by_name("patel").unwrap()), vec![2, 3]);
    assert_eq!(ids(&store.find_by_type(FacultyType::Faculty).unwrap()), vec![1, 4]);
    assert_eq!(
        ids(&store.find_by_type(FacultyType::AdjunctFaculty).unwrap()),
        vec![2]
    );
    assert_eq!(ids(&store.keyword_search("database").unwrap()), vec![2]);
}

#[test]
fn test_configured_store_lookup() {
    let fixture = SearchFixture::with_sample_data();
    let config = fixture.config();

    assert_eq!(FacultyStore::locate(&config.store), Some(fixture.db_path.clone()));
    let store = FacultyStore::open_configured(&config.store).unwrap();
    assert_eq!(store.path(), fixture.db_path.as_path());
}

#[test]
fn test_missing_store_is_unavailable() {
    let fixture = SearchFixture::new();
    let err = FacultyStore::open(&fixture.db_path, Duration::from_millis(10)).unwrap_err();
    assert!(matches!(err, FfError::StoreUnavailable(_)));
}
