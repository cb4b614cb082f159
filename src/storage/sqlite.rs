use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, Row, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StoreConfig;
use crate::core::Record;
use crate::error::{FfError, Result};

/// DDL for the canonical faculty table written by the loading pipeline.
///
/// The store never runs this itself; it is here for fixtures and tooling.
pub const FACULTY_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS faculty (
    id INTEGER PRIMARY KEY,
    faculty_type TEXT,
    name TEXT,
    education TEXT,
    phone TEXT,
    address TEXT,
    email TEXT,
    specializations TEXT,
    biography TEXT,
    teaching TEXT,
    research TEXT,
    publications TEXT,
    website_links TEXT,
    image_url TEXT,
    openalex_id TEXT,
    citations INTEGER,
    works_count INTEGER,
    topics TEXT
)";

const PROFILE_COLUMNS: &str = "id, faculty_type, name, education, phone, address, email, \
     specializations, biography, teaching, research, publications, website_links, \
     image_url, openalex_id, citations, works_count, topics";

const RECORD_COLUMNS: &str =
    "id, name, faculty_type, education, research, specializations, biography, teaching, topics";

/// Read-only handle on the faculty database.
pub struct FacultyStore {
    conn: Connection,
    path: PathBuf,
}

impl fmt::Debug for FacultyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacultyStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Contact numbers decoded from the `phone` JSON column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumbers {
    #[serde(default)]
    pub mobile: Vec<String>,
    #[serde(default)]
    pub landline: Vec<String>,
}

/// Appointment categories used by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacultyType {
    Faculty,
    AdjunctFaculty,
    AdjunctFacultyInternational,
    DistinguishedProfessor,
    ProfessorPractice,
}

impl FacultyType {
    pub const ALL: [Self; 5] = [
        Self::Faculty,
        Self::AdjunctFaculty,
        Self::AdjunctFacultyInternational,
        Self::DistinguishedProfessor,
        Self::ProfessorPractice,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Faculty => "faculty",
            Self::AdjunctFaculty => "adjunct-faculty",
            Self::AdjunctFacultyInternational => "adjunct-faculty-international",
            Self::DistinguishedProfessor => "distinguished-professor",
            Self::ProfessorPractice => "professor-practice",
        }
    }
}

impl fmt::Display for FacultyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacultyType {
    type Err = FfError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                FfError::InvalidQuery(format!(
                    "unknown faculty type '{raw}' (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// A full faculty row with JSON columns decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyProfile {
    pub id: i64,
    pub faculty_type: Option<String>,
    pub name: Option<String>,
    pub education: Option<String>,
    pub phone: Option<PhoneNumbers>,
    pub address: Option<String>,
    pub email: Option<Vec<String>>,
    pub specializations: Option<String>,
    pub biography: Option<String>,
    pub teaching: Option<Vec<String>>,
    pub research: Option<String>,
    pub publications: Option<Vec<String>>,
    pub website_links: Option<BTreeMap<String, Vec<String>>>,
    pub image_url: Option<String>,
    pub openalex_id: Option<String>,
    pub citations: Option<i64>,
    pub works_count: Option<i64>,
    pub topics: Option<String>,
}

impl FacultyProfile {
    /// The searchable subset of this profile.
    pub fn to_record(&self) -> Record {
        Record {
            id: Some(self.id),
            name: self.name.clone(),
            faculty_type: self.faculty_type.clone(),
            education: self.education.clone(),
            research: self.research.clone(),
            specializations: self.specializations.clone(),
            biography: self.biography.clone(),
            teaching: self
                .teaching
                .as_ref()
                .filter(|courses| !courses.is_empty())
                .map(|courses| courses.join("; ")),
            topics: self.topics.clone(),
        }
    }
}

impl FacultyStore {
    /// Open an existing database read-only.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FfError::StoreUnavailable(format!(
                "database {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(busy_timeout)?;
        debug!(path = %path.display(), "opened faculty store");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// First configured or built-in database path that exists.
    pub fn locate(config: &StoreConfig) -> Option<PathBuf> {
        config.candidate_paths().into_iter().find(|path| path.is_file())
    }

    /// Locate and open the database named by `config`.
    pub fn open_configured(config: &StoreConfig) -> Result<Self> {
        let path = Self::locate(config).ok_or_else(|| {
            FfError::StoreUnavailable("no faculty database found".to_string())
        })?;
        Self::open(path, Duration::from_millis(config.busy_timeout_ms))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM faculty", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn get(&self, id: i64) -> Result<Option<FacultyProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROFILE_COLUMNS} FROM faculty WHERE id = ?"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(profile_from_row(row)?));
        }
        Ok(None)
    }

    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<FacultyProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM faculty ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(params![to_sql_int(limit), to_sql_int(offset)], |row| {
            profile_from_row(row)
        })?;
        collect_rows(rows)
    }

    /// Substring match on the name; LIKE ignores case for ASCII letters only.
    pub fn find_by_name(&self, fragment: &str) -> Result<Vec<FacultyProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM faculty \
             WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id"
        ))?;
        let rows = stmt.query_map([like_pattern(fragment)], profile_from_row)?;
        collect_rows(rows)
    }

    pub fn find_by_type(&self, faculty_type: FacultyType) -> Result<Vec<FacultyProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM faculty WHERE faculty_type = ? ORDER BY id"
        ))?;
        let rows = stmt.query_map([faculty_type.as_str()], profile_from_row)?;
        collect_rows(rows)
    }

    /// Substring match over research, teaching and specializations.
    ///
    /// LIKE ignores case for ASCII letters only.
    pub fn keyword_search(&self, keyword: &str) -> Result<Vec<FacultyProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM faculty \
             WHERE research LIKE ?1 ESCAPE '\\' \
                OR teaching LIKE ?1 ESCAPE '\\' \
                OR specializations LIKE ?1 ESCAPE '\\' \
             ORDER BY id"
        ))?;
        let rows = stmt.query_map([like_pattern(keyword)], profile_from_row)?;
        collect_rows(rows)
    }

    /// Records whose name, research, topics, specializations or faculty type
    /// contain `query` ignoring case, at most `limit` of them in id order.
    ///
    /// Case folding is Unicode-aware, unlike LIKE which folds ASCII only.
    pub fn substring_records(&self, query: &str, limit: usize) -> Result<Vec<Record>> {
        let needle = query.to_lowercase();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM faculty ORDER BY id"))?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut hits = Vec::new();
        for row in rows {
            if hits.len() >= limit {
                break;
            }
            let record = row?;
            if record_contains(&record, &needle) {
                hits.push(record);
            }
        }
        Ok(hits)
    }
}

/// Whether any searchable field of `record` contains the lowercased `needle`.
fn record_contains(record: &Record, needle: &str) -> bool {
    [
        &record.name,
        &record.research,
        &record.topics,
        &record.specializations,
        &record.faculty_type,
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(needle))
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>> {
    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `%fragment%` with LIKE wildcards in `fragment` escaped.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<FacultyProfile> {
    let teaching: Option<String> = row.get(9)?;
    Ok(FacultyProfile {
        id: row.get(0)?,
        faculty_type: row.get(1)?,
        name: row.get(2)?,
        education: row.get(3)?,
        phone: decode_json(row.get(4)?),
        address: row.get(5)?,
        email: decode_json(row.get(6)?),
        specializations: row.get(7)?,
        biography: row.get(8)?,
        teaching: teaching.as_deref().map(decode_teaching),
        research: row.get(10)?,
        publications: decode_json(row.get(11)?),
        website_links: decode_json(row.get(12)?),
        image_url: row.get(13)?,
        openalex_id: row.get(14)?,
        citations: row.get(15)?,
        works_count: row.get(16)?,
        topics: row.get(17)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let teaching: Option<String> = row.get(7)?;
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        faculty_type: row.get(2)?,
        education: row.get(3)?,
        research: row.get(4)?,
        specializations: row.get(5)?,
        biography: row.get(6)?,
        teaching: teaching.as_deref().and_then(teaching_summary),
        topics: row.get(8)?,
    })
}

/// Decode a JSON column; blank or malformed text decodes to `None`.
fn decode_json<T: serde::de::DeserializeOwned>(raw: Option<String>) -> Option<T> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "undecodable JSON column");
            None
        }
    }
}

/// Course list from the `teaching` column; plain text becomes one entry.
fn decode_teaching(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw.trim()).unwrap_or_else(|_| {
        let text = raw.trim();
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        }
    })
}

fn teaching_summary(raw: &str) -> Option<String> {
    let courses = decode_teaching(raw);
    (!courses.is_empty()).then(|| courses.join("; "))
}
