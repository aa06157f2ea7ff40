use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::category::CategoryRegistry;
use crate::utils::fs::{read_optional, write_atomic};

/// Owns the category registry and its file. Editing individual categories
/// happens elsewhere; this service only swaps in whole registries.
pub struct CategoryService {
    path: PathBuf,
    registry: RwLock<CategoryRegistry>,
}

impl CategoryService {
    /// Loads `path`. A missing or unreadable file falls back to the built-in
    /// categories so the editor always has something to offer.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let registry = match load_registry(&path) {
            Ok(Some(registry)) => {
                info!(target: "app::categories", path = %path.display(), count = registry.len(), "categories loaded");
                registry
            }
            Ok(None) => CategoryRegistry::builtin(),
            Err(err) => {
                warn!(
                    target: "app::categories",
                    path = %path.display(),
                    error = %err,
                    "failed to load categories, using defaults"
                );
                CategoryRegistry::builtin()
            }
        };

        Self {
            path,
            registry: RwLock::new(registry),
        }
    }

    pub fn registry(&self) -> AppResult<CategoryRegistry> {
        self.registry
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::other("category lock poisoned"))
    }

    pub fn replace(&self, registry: CategoryRegistry) -> AppResult<()> {
        *self
            .registry
            .write()
            .map_err(|_| AppError::other("category lock poisoned"))? = registry;
        Ok(())
    }

    pub fn reset_to_defaults(&self) -> AppResult<CategoryRegistry> {
        let defaults = CategoryRegistry::builtin();
        self.replace(defaults.clone())?;
        info!(target: "app::categories", "categories reset to defaults");
        Ok(defaults)
    }

    pub fn save(&self) -> AppResult<()> {
        let registry = self.registry()?;
        let bytes = serde_json::to_vec_pretty(&registry)?;
        write_atomic(&self.path, &bytes)?;
        info!(target: "app::categories", path = %self.path.display(), "categories saved");
        Ok(())
    }
}

fn load_registry(path: &std::path::Path) -> AppResult<Option<CategoryRegistry>> {
    match read_optional(path)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}
