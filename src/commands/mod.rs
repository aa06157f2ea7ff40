pub mod category;
pub mod library;
pub mod preset;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::CreatorSettings;
use crate::services::category_service::CategoryService;
use crate::services::export_service::ExportService;
use crate::services::library_service::LibraryService;
use crate::services::validation_service::ValidationPolicy;

/// Services shared by every command. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<CreatorSettings>,
    library_service: Arc<LibraryService>,
    category_service: Arc<CategoryService>,
    export_service: Arc<ExportService>,
}

impl AppState {
    pub fn new(settings: CreatorSettings) -> AppResult<Self> {
        let library_service = Arc::new(LibraryService::open(
            settings.library_path.clone(),
            settings.created_with.clone(),
        )?);
        let category_service = Arc::new(CategoryService::open(settings.categories_path.clone()));
        let export_service = Arc::new(ExportService::new(
            settings.created_with.clone(),
            settings.compatible_with.clone(),
        ));

        Ok(Self {
            settings: Arc::new(settings),
            library_service,
            category_service,
            export_service,
        })
    }

    pub fn settings(&self) -> Arc<CreatorSettings> {
        Arc::clone(&self.settings)
    }

    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library_service)
    }

    pub fn categories(&self) -> Arc<CategoryService> {
        Arc::clone(&self.category_service)
    }

    pub fn exporter(&self) -> Arc<ExportService> {
        Arc::clone(&self.export_service)
    }

    /// Problems found while opening the state that did not stop it, such as
    /// an unreadable library file. Empty once they have been resolved.
    pub fn startup_warnings(&self) -> AppResult<Vec<String>> {
        Ok(self.library_service.load_error()?.into_iter().collect())
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            strict_subcategories: self.settings.strict_subcategories,
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let message = error.to_string();
        match error {
            AppError::ValidationFailed { violations } => CommandError::new(
                "VALIDATION_FAILED",
                message,
                Some(json!({ "violations": violations })),
            ),
            AppError::MalformedLibrary { .. } => {
                CommandError::new("MALFORMED_LIBRARY", message, None)
            }
            AppError::MalformedImportPayload { .. } => {
                CommandError::new("MALFORMED_IMPORT_PAYLOAD", message, None)
            }
            AppError::NoValidPresets => CommandError::new("NO_VALID_PRESETS", message, None),
            AppError::Io { path, source } => {
                error!(target: "app::command", path = %path.display(), error = %source, "io error in command");
                CommandError::new(
                    "IO_FAILURE",
                    message,
                    Some(json!({ "path": path.display().to_string() })),
                )
            }
            AppError::NotFound { id } => {
                CommandError::new("NOT_FOUND", message, Some(json!({ "id": id })))
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Other(detail) => {
                warn!(target: "app::command", message = %detail, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
