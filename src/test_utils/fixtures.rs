use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::config::Config;
use crate::core::Record;
use crate::search::embeddings::{Embedder, FlatIndex, HashEmbedder};
use crate::search::persistence::{write_index, write_metadata};
use crate::search::{FallbackSearcher, LexicalOptions, ResourceBundle, ResourceLoader, SearchEngine};
use crate::storage::{FACULTY_SCHEMA, FacultyProfile, PhoneNumbers};

/// Embedding dimension used by fixtures.
pub const FIXTURE_DIMS: usize = 256;

/// Text embedded for one record when building a fixture index.
pub fn document_text(record: &Record) -> String {
    [
        record.name.as_deref(),
        record.faculty_type.as_deref(),
        record.education.as_deref(),
        record.research.as_deref(),
        record.specializations.as_deref(),
        record.teaching.as_deref(),
        record.topics.as_deref(),
        record.biography.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

/// A small directory that exercises every matcher tier.
pub fn sample_profiles() -> Vec<FacultyProfile> {
    vec![
        FacultyProfile {
            id: 1,
            faculty_type: Some("faculty".to_string()),
            name: Some("Asha Rao".to_string()),
            education: Some("PhD, Indian Institute of Science".to_string()),
            phone: Some(PhoneNumbers {
                mobile: vec!["98450 00001".to_string()],
                landline: vec!["080 2293 2001".to_string()],
            }),
            email: Some(vec!["asha.rao@example.edu".to_string()]),
            specializations: Some("Deep learning; Neural networks".to_string()),
            teaching: Some(vec!["Machine Learning".to_string(), "Data Mining".to_string()]),
            research: Some("machine learning".to_string()),
            citations: Some(1200),
            works_count: Some(48),
            topics: Some("Machine Learning, Computer Vision, Pattern Recognition".to_string()),
            ..Default::default()
        },
        FacultyProfile {
            id: 2,
            faculty_type: Some("adjunct-faculty".to_string()),
            name: Some("J. Patel".to_string()),
            teaching: Some(vec!["Database Systems".to_string()]),
            research: Some("database systems and query optimization".to_string()),
            topics: Some("Databases, Information Retrieval".to_string()),
            ..Default::default()
        },
        FacultyProfile {
            id: 3,
            faculty_type: Some("distinguished-professor".to_string()),
            name: Some("J. Patel".to_string()),
            research: Some("compiler construction and program analysis".to_string()),
            topics: Some("Programming Languages, Software Engineering".to_string()),
            ..Default::default()
        },
        FacultyProfile {
            id: 4,
            faculty_type: Some("faculty".to_string()),
            name: Some("Meera Krishnan".to_string()),
            biography: Some("Works on post-quantum cryptography and secure hardware.".to_string()),
            research: Some("quantum computing and cryptography".to_string()),
            topics: Some("Quantum Information, Cryptography".to_string()),
            ..Default::default()
        },
        FacultyProfile {
            id: 5,
            faculty_type: Some("professor-practice".to_string()),
            name: Some("Lin Wei".to_string()),
            research: Some("public policy and development economics".to_string()),
            topics: Some("Economics, Public Policy".to_string()),
            ..Default::default()
        },
        FacultyProfile {
            id: 6,
            faculty_type: Some("adjunct-faculty-international".to_string()),
            name: Some("Ravi Menon".to_string()),
            research: Some("wireless networks and signal processing".to_string()),
            topics: Some("Wireless Communication, Signal Processing".to_string()),
            ..Default::default()
        },
    ]
}

/// Metadata snapshot matching [`sample_profiles`], in the same order.
pub fn sample_records() -> Vec<Record> {
    sample_profiles().iter().map(FacultyProfile::to_record).collect()
}

/// Isolated data directory with index, metadata and store.
pub struct SearchFixture {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl SearchFixture {
    /// Empty fixture; nothing is written yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");
        let db_path = temp_dir.path().join("faculty.db");

        println!("[FIXTURE] Created temp directory: {:?}", temp_dir.path());

        Self {
            temp_dir,
            data_dir,
            db_path,
        }
    }

    /// Fixture populated with [`sample_profiles`] and matching artifacts.
    pub fn with_sample_data() -> Self {
        let fixture = Self::new();
        fixture.write_artifacts(&sample_records());
        fixture.write_store(&sample_profiles());
        fixture
    }

    /// Write `faculty.index` and `metadata.json` for `records`.
    pub fn write_artifacts(&self, records: &[Record]) {
        let index = build_index(records);
        write_index(&self.data_dir.join("faculty.index"), &index).expect("Failed to write index");
        write_metadata(&self.data_dir.join("metadata.json"), records)
            .expect("Failed to write metadata");
        println!("[FIXTURE] Wrote {} indexed records", records.len());
    }

    /// Create the faculty table and insert `profiles`.
    pub fn write_store(&self, profiles: &[FacultyProfile]) {
        let conn = Connection::open(&self.db_path).expect("Failed to create store");
        conn.execute_batch(FACULTY_SCHEMA).expect("Failed to create schema");
        for profile in profiles {
            insert_profile(&conn, profile);
        }
        println!("[FIXTURE] Wrote {} store rows", profiles.len());
    }

    /// Config pointing only at this fixture.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.resources.data_dirs = vec![self.data_dir.display().to_string()];
        config.store.db_paths = vec![self.db_path.display().to_string()];
        config.search.embedding_dims = u32::try_from(FIXTURE_DIMS).unwrap_or(u32::MAX);
        config
    }

    /// Write [`Self::config`] as TOML and return its path.
    pub fn write_config_file(&self) -> PathBuf {
        let path = self.temp_dir.path().join("facfind.toml");
        let raw = toml::to_string(&self.config()).expect("Failed to encode config");
        std::fs::write(&path, raw).expect("Failed to write config");
        path
    }

    pub fn loader(&self) -> Arc<ResourceLoader> {
        Arc::new(ResourceLoader::new(self.config()))
    }

    /// Engine loading lazily from this fixture, falling back to its store.
    pub fn engine(&self) -> SearchEngine {
        self.engine_with(self.loader())
    }

    pub fn engine_with(&self, loader: Arc<ResourceLoader>) -> SearchEngine {
        SearchEngine::new(loader, FallbackSearcher::with_path(&self.db_path))
            .with_options(LexicalOptions::from(&self.config().search))
    }

    /// Engine whose bundle is forced empty.
    pub fn unavailable_engine(&self) -> SearchEngine {
        SearchEngine::with_bundle(
            ResourceBundle::empty(),
            FallbackSearcher::with_path(&self.db_path),
        )
    }
}

impl Default for SearchFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory bundle over `records`, indexed the same way as the fixture files.
pub fn bundle_for(records: Vec<Record>) -> ResourceBundle {
    let index = build_index(&records);
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(FIXTURE_DIMS));
    ResourceBundle::new(embedder, index, records).expect("Fixture bundle is aligned")
}

fn build_index(records: &[Record]) -> FlatIndex {
    let embedder = HashEmbedder::new(FIXTURE_DIMS);
    FlatIndex::from_rows(
        FIXTURE_DIMS,
        records.iter().map(|record| embedder.embed(&document_text(record))),
    )
    .expect("Fixture rows match dimension")
}

fn insert_profile(conn: &Connection, profile: &FacultyProfile) {
    conn.execute(
        "INSERT INTO faculty (id, faculty_type, name, education, phone, address, email, \
         specializations, biography, teaching, research, publications, website_links, \
         image_url, openalex_id, citations, works_count, topics) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            profile.id,
            profile.faculty_type,
            profile.name,
            profile.education,
            encode(profile.phone.as_ref()),
            profile.address,
            encode(profile.email.as_ref()),
            profile.specializations,
            profile.biography,
            encode(profile.teaching.as_ref()),
            profile.research,
            encode(profile.publications.as_ref()),
            encode(profile.website_links.as_ref()),
            profile.image_url,
            profile.openalex_id,
            profile.citations,
            profile.works_count,
            profile.topics,
        ],
    )
    .expect("Failed to insert profile");
}

fn encode<T: serde::Serialize>(value: Option<&T>) -> Option<String> {
    value.map(|value| serde_json::to_string(value).expect("Fixture JSON encodes"))
}
