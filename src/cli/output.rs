use clap::ValueEnum;
use serde::Serialize;

use crate::error::{FfError, Result};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Human layout without colors
    Plain,
}

impl OutputFormat {
    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON body reported for a failed command.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub code: &'static str,
    pub message: String,
}

impl From<&FfError> for ErrorBody {
    fn from(err: &FfError) -> Self {
        Self {
            error: true,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flags() {
        assert!(OutputFormat::Human.use_colors());
        assert!(!OutputFormat::Plain.use_colors());
        assert!(OutputFormat::Json.is_machine_readable());
        assert!(!OutputFormat::Human.is_machine_readable());
    }

    #[test]
    fn error_body_carries_code() {
        let err = FfError::NotFound("faculty 9".to_string());
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Not found: faculty 9");
    }
}
