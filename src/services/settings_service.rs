use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::settings::CreatorSettings;
use crate::utils::fs::{read_optional, write_atomic};

pub const SETTINGS_FILE: &str = "preset_creator.json";

/// Loads and stores [`CreatorSettings`] in a data directory. Relative paths
/// in the file are resolved against that directory.
pub struct SettingsService {
    data_dir: PathBuf,
}

impl SettingsService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Settings with every path absolute. A missing file yields defaults.
    pub fn load(&self) -> AppResult<CreatorSettings> {
        let path = self.settings_path();
        let mut settings = match read_optional(&path)? {
            Some(bytes) => serde_json::from_slice::<CreatorSettings>(&bytes)?,
            None => {
                debug!(target: "app::settings", path = %path.display(), "no settings file, using defaults");
                CreatorSettings::default()
            }
        };
        ensure_valid(&settings)?;
        settings.library_path = self.resolve(&settings.library_path);
        settings.categories_path = self.resolve(&settings.categories_path);
        Ok(settings)
    }

    pub fn save(&self, settings: &CreatorSettings) -> AppResult<()> {
        ensure_valid(settings)?;
        let bytes = serde_json::to_vec_pretty(settings)?;
        let path = self.settings_path();
        write_atomic(&path, &bytes)?;
        info!(target: "app::settings", path = %path.display(), "settings saved");
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

fn ensure_valid(settings: &CreatorSettings) -> AppResult<()> {
    if settings.created_with.trim().is_empty() {
        return Err(AppError::other("settings: createdWith must not be empty"));
    }
    if settings.compatible_with.trim().is_empty() {
        return Err(AppError::other("settings: compatibleWith must not be empty"));
    }
    if settings.library_path.as_os_str().is_empty() {
        return Err(AppError::other("settings: libraryPath must not be empty"));
    }
    if settings.categories_path.as_os_str().is_empty() {
        return Err(AppError::other("settings: categoriesPath must not be empty"));
    }
    Ok(())
}
