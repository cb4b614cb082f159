use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FfError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration layered over defaults.
    ///
    /// An explicit path (or `FACFIND_CONFIG`) replaces the global + project
    /// lookup. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("FACFIND_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(FfError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a config document from a TOML string, merged over defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)
            .map_err(|err| FfError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.embedding_dims == 0 {
            return Err(FfError::Config(
                "search.embedding_dims must be greater than 0".to_string(),
            ));
        }
        if self.search.default_k == 0 {
            return Err(FfError::Config(
                "search.default_k must be greater than 0".to_string(),
            ));
        }
        for (key, value) in [
            ("search.fuzzy_name_cutoff", self.search.fuzzy_name_cutoff),
            ("search.faculty_type_cutoff", self.search.faculty_type_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FfError::Config(format!(
                    "{key} must be within 0.0..=1.0 (got {value})"
                )));
            }
        }
        if self.search.fuzzy_name_limit == 0 {
            return Err(FfError::Config(
                "search.fuzzy_name_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("facfind/config.toml"))
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join("facfind.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| FfError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| FfError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.resources {
            self.resources.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.store {
            self.store.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("FACFIND_DATA_DIR") {
            self.resources.data_dirs.insert(0, value);
        }
        if let Some(value) = env_string("FACFIND_DB_PATH") {
            self.store.db_paths.insert(0, value);
        }
        if let Some(value) = env_string("FACFIND_EMBEDDING_BACKEND") {
            self.search.embedding_backend = value;
        }
        if let Some(value) = env_u32("FACFIND_EMBEDDING_DIMS")? {
            self.search.embedding_dims = value;
        }
        if let Some(value) = env_u32("FACFIND_DEFAULT_K")? {
            self.search.default_k = value as usize;
        }
        if let Some(value) = env_f32("FACFIND_FUZZY_CUTOFF")? {
            self.search.fuzzy_name_cutoff = value;
        }
        if let Some(value) = env_u64("FACFIND_BUSY_TIMEOUT_MS")? {
            self.store.busy_timeout_ms = value;
        }
        Ok(())
    }
}

/// Where the index + metadata artifacts may live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Directories tried before the built-in locations.
    #[serde(default)]
    pub data_dirs: Vec<String>,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

fn default_index_file() -> String {
    "faculty.index".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            data_dirs: Vec::new(),
            index_file: default_index_file(),
            metadata_file: default_metadata_file(),
        }
    }
}

impl ResourcesConfig {
    fn merge(&mut self, patch: ResourcesPatch) {
        if let Some(value) = patch.data_dirs {
            self.data_dirs = value;
        }
        if let Some(value) = patch.index_file {
            self.index_file = value;
        }
        if let Some(value) = patch.metadata_file {
            self.metadata_file = value;
        }
    }

    /// Candidate artifact directories in lookup order.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.data_dirs.iter().map(PathBuf::from).collect();
        dirs.push(PathBuf::from("pipeline/data"));
        dirs.push(PathBuf::from("data"));
        if let Some(data_dir) = dirs::data_dir() {
            dirs.push(data_dir.join("facfind"));
        }
        dirs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub embedding_backend: String,
    #[serde(default)]
    pub embedding_dims: u32,
    #[serde(default)]
    pub default_k: usize,
    #[serde(default)]
    pub fuzzy_name_cutoff: f32,
    #[serde(default)]
    pub fuzzy_name_limit: usize,
    #[serde(default)]
    pub faculty_type_cutoff: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_backend: "hash".to_string(),
            embedding_dims: 384,
            default_k: crate::core::DEFAULT_K,
            fuzzy_name_cutoff: 0.75,
            fuzzy_name_limit: 3,
            faculty_type_cutoff: 0.8,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.embedding_backend {
            self.embedding_backend = value;
        }
        if let Some(value) = patch.embedding_dims {
            self.embedding_dims = value;
        }
        if let Some(value) = patch.default_k {
            self.default_k = value;
        }
        if let Some(value) = patch.fuzzy_name_cutoff {
            self.fuzzy_name_cutoff = value;
        }
        if let Some(value) = patch.fuzzy_name_limit {
            self.fuzzy_name_limit = value;
        }
        if let Some(value) = patch.faculty_type_cutoff {
            self.faculty_type_cutoff = value;
        }
    }
}

/// Relational store used by the fallback path and the lookup commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database files tried before the built-in locations.
    #[serde(default)]
    pub db_paths: Vec<String>,
    #[serde(default)]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_paths: Vec::new(),
            busy_timeout_ms: 2_000,
        }
    }
}

impl StoreConfig {
    fn merge(&mut self, patch: StorePatch) {
        if let Some(value) = patch.db_paths {
            self.db_paths = value;
        }
        if let Some(value) = patch.busy_timeout_ms {
            self.busy_timeout_ms = value;
        }
    }

    /// Candidate database files in lookup order.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.db_paths.iter().map(PathBuf::from).collect();
        paths.push(PathBuf::from("pipeline/outputs/faculty.db"));
        paths.push(PathBuf::from("outputs/faculty.db"));
        if let Some(data_dir) = dirs::data_dir() {
            paths.push(data_dir.join("facfind/faculty.db"));
        }
        paths
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub resources: Option<ResourcesPatch>,
    pub search: Option<SearchPatch>,
    pub store: Option<StorePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResourcesPatch {
    pub data_dirs: Option<Vec<String>>,
    pub index_file: Option<String>,
    pub metadata_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub embedding_backend: Option<String>,
    pub embedding_dims: Option<u32>,
    pub default_k: Option<usize>,
    pub fuzzy_name_cutoff: Option<f32>,
    pub fuzzy_name_limit: Option<usize>,
    pub faculty_type_cutoff: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorePatch {
    pub db_paths: Option<Vec<String>>,
    pub busy_timeout_ms: Option<u64>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|err| FfError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| FfError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_f32(key: &str) -> Result<Option<f32>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<f32>()
            .map(Some)
            .map_err(|err| FfError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
