use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::library::LIBRARY_FORMAT_VERSION;
use crate::models::preset::Preset;

/// Single-preset export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEnvelope {
    pub preset: Preset,
    pub export_info: ExportInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub exported_at: String,
    pub created_with: String,
    pub version: String,
    pub compatible_with: String,
}

/// Whole-library export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEnvelope {
    pub data: BulkData,
    pub export_info: BulkExportInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkData {
    pub version: String,
    pub created_at: String,
    pub presets: BTreeMap<String, Preset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkExportInfo {
    pub exported_at: String,
    pub created_with: String,
    pub preset_count: usize,
    pub compatible_with: String,
}

impl BulkData {
    pub fn new(created_at: String, presets: BTreeMap<String, Preset>) -> Self {
        Self {
            version: LIBRARY_FORMAT_VERSION.to_string(),
            created_at,
            presets,
        }
    }
}

/// Which shape an import payload was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    SinglePreset,
    BulkExport,
    Library,
    Unrecognised,
}

/// Candidate presets pulled out of an import payload, ids untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPayload {
    pub source: ImportSource,
    pub presets: Vec<Preset>,
    pub skipped: usize,
}

impl ImportPayload {
    /// Accepts `{"preset": …}`, `{"data": {"presets": {…}}}` or a raw
    /// library `{"presets": {…}}`. Entries that do not parse as a preset are
    /// skipped; a payload that is not a JSON object is rejected.
    pub fn parse(bytes: &[u8]) -> AppResult<Self> {
        let value: JsonValue = serde_json::from_slice(bytes)
            .map_err(|err| AppError::malformed_import(err.to_string()))?;
        let JsonValue::Object(mut root) = value else {
            return Err(AppError::malformed_import("expected a JSON object"));
        };

        let (source, candidates) = if let Some(preset) = root.remove("preset") {
            (ImportSource::SinglePreset, vec![preset])
        } else if let Some(presets) = root
            .get_mut("data")
            .and_then(JsonValue::as_object_mut)
            .and_then(|data| data.remove("presets"))
        {
            (ImportSource::BulkExport, map_values(presets))
        } else if let Some(presets) = root.remove("presets") {
            (ImportSource::Library, map_values(presets))
        } else {
            (ImportSource::Unrecognised, Vec::new())
        };

        let total = candidates.len();
        let presets: Vec<Preset> = candidates
            .into_iter()
            .filter(JsonValue::is_object)
            .filter_map(|candidate| match serde_json::from_value::<Preset>(candidate) {
                Ok(preset) => Some(preset),
                Err(err) => {
                    warn!(target: "app::import", error = %err, "skipping unreadable preset entry");
                    None
                }
            })
            .collect();
        let skipped = total - presets.len();
        debug!(target: "app::import", ?source, found = presets.len(), skipped, "import payload parsed");

        Ok(Self {
            source,
            presets,
            skipped,
        })
    }
}

fn map_values(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Object(map) => map.into_iter().map(|(_, preset)| preset).collect(),
        _ => Vec::new(),
    }
}
