pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::Path;

use tracing::{info, warn};

use crate::commands::AppState;
use crate::error::{AppError, AppResult};
use crate::services::settings_service::SettingsService;

/// Sets up logging under `data_dir/logs`, reads the settings file and opens
/// the library and category files it points at.
pub fn bootstrap(data_dir: &Path) -> AppResult<AppState> {
    std::fs::create_dir_all(data_dir).map_err(|err| AppError::io(data_dir, err))?;
    crate::utils::logger::init_logging(&data_dir.join("logs"))?;

    let settings = SettingsService::new(data_dir).load()?;
    info!(
        library = %settings.library_path.display(),
        categories = %settings.categories_path.display(),
        "preset creator starting"
    );
    let state = AppState::new(settings)?;
    for warning in state.startup_warnings()? {
        warn!(%warning, "preset creator started degraded");
    }
    Ok(state)
}
