use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::AppResult;
use crate::models::export::{
    BulkData, BulkEnvelope, BulkExportInfo, ExportInfo, ImportPayload, PresetEnvelope,
};
use crate::models::library::{PresetLibrary, LIBRARY_FORMAT_VERSION};
use crate::models::preset::Preset;
use crate::models::settings::{DEFAULT_COMPATIBLE_WITH, DEFAULT_CREATED_WITH};
use crate::utils::fs::write_atomic;

pub const BULK_EXPORT_FILE_NAME: &str = "ortoiot_presets_export.json";

/// Writes the envelope formats the automation controller imports.
/// Nothing here mutates the presets or the library.
#[derive(Debug, Clone)]
pub struct ExportService {
    created_with: String,
    compatible_with: String,
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new(DEFAULT_CREATED_WITH, DEFAULT_COMPATIBLE_WITH)
    }
}

impl ExportService {
    pub fn new(created_with: impl Into<String>, compatible_with: impl Into<String>) -> Self {
        Self {
            created_with: created_with.into(),
            compatible_with: compatible_with.into(),
        }
    }

    pub fn envelope_for(&self, preset: &Preset) -> PresetEnvelope {
        PresetEnvelope {
            preset: preset.clone(),
            export_info: ExportInfo {
                exported_at: Utc::now().to_rfc3339(),
                created_with: self.created_with.clone(),
                version: LIBRARY_FORMAT_VERSION.to_string(),
                compatible_with: self.compatible_with.clone(),
            },
        }
    }

    pub fn bulk_envelope_for(&self, library: &PresetLibrary) -> BulkEnvelope {
        let now = Utc::now().to_rfc3339();
        BulkEnvelope {
            data: BulkData::new(now.clone(), library.presets.clone()),
            export_info: BulkExportInfo {
                exported_at: now,
                created_with: self.created_with.clone(),
                preset_count: library.len(),
                compatible_with: self.compatible_with.clone(),
            },
        }
    }

    pub fn export_one(&self, preset: &Preset) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.envelope_for(preset))?)
    }

    pub fn export_all(&self, library: &PresetLibrary) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.bulk_envelope_for(library))?)
    }

    pub fn write_one(&self, preset: &Preset, path: &Path) -> AppResult<()> {
        let bytes = self.export_one(preset)?;
        write_atomic(path, &bytes)?;
        info!(
            target: "app::export",
            preset_id = %preset.id,
            path = %path.display(),
            "preset exported"
        );
        Ok(())
    }

    pub fn write_all(&self, library: &PresetLibrary, path: &Path) -> AppResult<usize> {
        let bytes = self.export_all(library)?;
        write_atomic(path, &bytes)?;
        info!(
            target: "app::export",
            count = library.len(),
            path = %path.display(),
            "library exported"
        );
        Ok(library.len())
    }

    /// Reads either envelope (or a raw library file) back into candidate
    /// presets. Ids are left as found; the library re-keys on import.
    pub fn read(&self, bytes: &[u8]) -> AppResult<Vec<Preset>> {
        Ok(ImportPayload::parse(bytes)?.presets)
    }
}

/// `Veg Mix` → `Veg_Mix_preset.json`.
pub fn suggested_file_name(preset: &Preset) -> String {
    let stem = preset.name.trim().replace(' ', "_");
    if stem.is_empty() {
        "preset.json".to_string()
    } else {
        format!("{stem}_preset.json")
    }
}
