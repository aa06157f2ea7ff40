use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, warn};

use crate::models::violation::Violation;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", join_violations(.violations))]
    ValidationFailed { violations: Vec<Violation> },

    #[error("malformed preset library: {message}")]
    MalformedLibrary { message: String },

    #[error("malformed import payload: {message}")]
    MalformedImportPayload { message: String },

    #[error("no valid presets found")]
    NoValidPresets,

    #[error("io failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preset not found: {id}")]
    NotFound { id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| violation.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    pub fn validation_failed(violations: Vec<Violation>) -> Self {
        warn!(
            target: "app::validation",
            count = violations.len(),
            violations = %join_violations(&violations),
            "preset failed validation"
        );
        AppError::ValidationFailed { violations }
    }

    pub fn malformed_library(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::library", %message, "malformed library");
        AppError::MalformedLibrary { message }
    }

    pub fn malformed_import(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::import", %message, "malformed import payload");
        AppError::MalformedImportPayload { message }
    }

    pub fn no_valid_presets() -> Self {
        warn!(target: "app::import", "import payload contained no valid presets");
        AppError::NoValidPresets
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        error!(target: "app::io", path = %path.display(), error = %source, "io failure");
        AppError::Io { path, source }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        let id = id.into();
        warn!(target: "app::library", preset_id = %id, "preset not found");
        AppError::NotFound { id }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            AppError::ValidationFailed { violations } => Some(violations),
            _ => None,
        }
    }
}
