use std::io;

use thiserror::Error;

/// Main error type for facfind operations.
///
/// The search entry point never returns these; they surface from store
/// lookups, configuration loading and artifact I/O.
#[derive(Error, Debug)]
pub enum FfError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store not available: {0}")]
    StoreUnavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FfError {
    /// Short machine-readable code for JSON output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "SERIALIZATION_ERROR",
            Self::Index(_) => "INDEX_INVALID",
            Self::Metadata(_) => "METADATA_INVALID",
            Self::Config(_) => "CONFIG_INVALID",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::InvalidQuery(_) => "QUERY_INVALID",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}

pub type Result<T> = std::result::Result<T, FfError>;
