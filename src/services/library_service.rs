use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::category::CategoryRegistry;
use crate::models::library::{ImportOutcome, PresetLibrary};
use crate::models::preset::{Preset, PresetType};
use crate::utils::fs::{read, read_optional, write_atomic};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub key: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total: usize,
    pub static_count: usize,
    pub progressive_count: usize,
    pub by_category: Vec<CategoryCount>,
}

/// The library bound to its file on disk. In-memory state only changes
/// after an operation has fully succeeded.
pub struct LibraryService {
    path: RwLock<PathBuf>,
    library: RwLock<PresetLibrary>,
    created_with: String,
    load_error: RwLock<Option<String>>,
}

impl LibraryService {
    /// Opens `path`, starting with an empty library when the file does not
    /// exist yet. A file that exists but cannot be parsed also starts empty;
    /// the parse error is kept for [`load_error`](Self::load_error) and the
    /// file is left alone until the next explicit save.
    pub fn open(path: impl Into<PathBuf>, created_with: impl Into<String>) -> AppResult<Self> {
        let path = path.into();
        let created_with = created_with.into();
        let mut load_error = None;
        let library = match read_optional(&path)? {
            Some(bytes) => match PresetLibrary::load(&bytes) {
                Ok(library) => {
                    info!(
                        target: "app::library",
                        path = %path.display(),
                        count = library.len(),
                        "library loaded"
                    );
                    library
                }
                Err(err @ AppError::MalformedLibrary { .. }) => {
                    warn!(
                        target: "app::library",
                        path = %path.display(),
                        error = %err,
                        "library file unreadable, starting with an empty library"
                    );
                    load_error = Some(err.to_string());
                    PresetLibrary::new(created_with.clone())
                }
                Err(err) => return Err(err),
            },
            None => {
                info!(target: "app::library", path = %path.display(), "no library found, starting fresh");
                PresetLibrary::new(created_with.clone())
            }
        };

        Ok(Self {
            path: RwLock::new(path),
            library: RwLock::new(library),
            created_with,
            load_error: RwLock::new(load_error),
        })
    }

    /// Why the library file could not be read at open, until a later load
    /// or save replaces it.
    pub fn load_error(&self) -> AppResult<Option<String>> {
        self.load_error
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::other("library load error lock poisoned"))
    }

    fn clear_load_error(&self) -> AppResult<()> {
        *self
            .load_error
            .write()
            .map_err(|_| AppError::other("library load error lock poisoned"))? = None;
        Ok(())
    }

    pub fn path(&self) -> AppResult<PathBuf> {
        self.path
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::other("library path lock poisoned"))
    }

    pub fn snapshot(&self) -> AppResult<PresetLibrary> {
        self.read(|library| library.clone())
    }

    pub fn get(&self, id: &str) -> AppResult<Preset> {
        self.read(|library| library.get(id).cloned())?
            .ok_or_else(|| AppError::not_found(id))
    }

    /// Presets matching `search`, sorted by name then id.
    pub fn list(&self, search: Option<&str>) -> AppResult<Vec<Preset>> {
        let term = search.unwrap_or_default();
        let mut presets = self.read(|library| {
            library
                .iter()
                .filter(|preset| preset.matches_search(term))
                .cloned()
                .collect::<Vec<_>>()
        })?;
        presets.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        debug!(target: "app::library", count = presets.len(), "presets listed");
        Ok(presets)
    }

    pub fn upsert(&self, preset: Preset) -> AppResult<String> {
        self.write(|library| library.upsert(preset))
    }

    pub fn delete(&self, id: &str) -> AppResult<bool> {
        self.write(|library| library.delete(id))
    }

    pub fn import_bytes(&self, source: &[u8]) -> AppResult<ImportOutcome> {
        // work on a copy so a failed import leaves the library untouched
        let mut working = self.snapshot()?;
        let outcome = working.import_presets(source)?;
        self.write(|library| *library = working)?;
        Ok(outcome)
    }

    pub fn import_file(&self, path: &Path) -> AppResult<ImportOutcome> {
        let bytes = read(path)?;
        let outcome = self.import_bytes(&bytes)?;
        info!(
            target: "app::import",
            path = %path.display(),
            count = outcome.count(),
            "import file absorbed"
        );
        Ok(outcome)
    }

    /// Replaces the in-memory library with the one at `path` and makes that
    /// the save target. On any failure the current library and path stay.
    pub fn load_from(&self, path: &Path) -> AppResult<usize> {
        let bytes = read(path)?;
        let loaded = PresetLibrary::load(&bytes)?;
        let count = loaded.len();
        self.write(|library| *library = loaded)?;
        *self
            .path
            .write()
            .map_err(|_| AppError::other("library path lock poisoned"))? = path.to_path_buf();
        self.clear_load_error()?;
        info!(target: "app::library", path = %path.display(), count, "library loaded");
        Ok(count)
    }

    /// Writes the whole library to its current path.
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = self.path()?;
        self.save_to(&path)?;
        self.clear_load_error()?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let bytes = self.read(|library| {
            let mut stamped = library.clone();
            if stamped.created_with.is_empty() {
                stamped.created_with = self.created_with.clone();
            }
            stamped.save()
        })??;
        write_atomic(path, &bytes)?;
        info!(target: "app::library", path = %path.display(), "library saved");
        Ok(())
    }

    pub fn stats(&self, categories: &CategoryRegistry) -> AppResult<LibraryStats> {
        self.read(|library| {
            let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
            for preset in library.iter() {
                let key = if preset.category.trim().is_empty() {
                    "unknown".to_string()
                } else {
                    preset.category.trim().to_string()
                };
                *per_category.entry(key).or_default() += 1;
            }

            LibraryStats {
                total: library.len(),
                static_count: library.count_by_type(PresetType::Static),
                progressive_count: library.count_by_type(PresetType::Progressive),
                by_category: per_category
                    .into_iter()
                    .map(|(key, count)| CategoryCount {
                        name: categories.label_for(&key),
                        key,
                        count,
                    })
                    .collect(),
            }
        })
    }

    fn read<T>(&self, f: impl FnOnce(&PresetLibrary) -> T) -> AppResult<T> {
        let guard = self
            .library
            .read()
            .map_err(|_| AppError::other("library lock poisoned"))?;
        Ok(f(&guard))
    }

    fn write<T>(&self, f: impl FnOnce(&mut PresetLibrary) -> T) -> AppResult<T> {
        let mut guard = self.library.write().map_err(|_| {
            warn!(target: "app::library", "library lock poisoned");
            AppError::other("library lock poisoned")
        })?;
        Ok(f(&mut guard))
    }
}
