use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::export::ImportPayload;
use crate::models::preset::{new_preset_id, Preset, PresetType};

pub const LIBRARY_FORMAT_VERSION: &str = "2.0";

fn default_version() -> String {
    LIBRARY_FORMAT_VERSION.to_string()
}

/// The persisted preset collection. `id` is the map key; a preset stored
/// under a key always carries that key as its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetLibrary {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub created_with: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub imported_ids: Vec<String>,
    pub skipped: usize,
}

impl ImportOutcome {
    pub fn count(&self) -> usize {
        self.imported_ids.len()
    }
}

impl PresetLibrary {
    pub fn new(created_with: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            created_with: created_with.into(),
            created_at: Utc::now().to_rfc3339(),
            presets: BTreeMap::new(),
            extra: JsonMap::new(),
        }
    }

    /// Parses the storage format. Nothing is mutated on failure, so a caller
    /// holding an older library keeps it intact.
    pub fn load(bytes: &[u8]) -> AppResult<Self> {
        let mut library: PresetLibrary = serde_json::from_slice(bytes)
            .map_err(|err| AppError::malformed_library(err.to_string()))?;

        for (key, preset) in library.presets.iter_mut() {
            if preset.id != *key {
                if !preset.id.is_empty() {
                    warn!(
                        target: "app::library",
                        key = %key,
                        preset_id = %preset.id,
                        "preset id differs from its library key, using the key"
                    );
                }
                preset.id = key.clone();
            }
        }

        debug!(target: "app::library", count = library.presets.len(), "library parsed");
        Ok(library)
    }

    pub fn save(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Inserts or wholly replaces the preset stored under `preset.id`.
    /// A preset without an id gets one minted first.
    pub fn upsert(&mut self, mut preset: Preset) -> String {
        if preset.id.trim().is_empty() {
            preset.id = self.mint_id();
        }
        let id = preset.id.clone();
        let replaced = self.presets.insert(id.clone(), preset).is_some();
        debug!(target: "app::library", preset_id = %id, replaced, "preset upserted");
        id
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let removed = self.presets.remove(id).is_some();
        if removed {
            info!(target: "app::library", preset_id = %id, "preset deleted");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.presets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    pub fn count_by_type(&self, preset_type: PresetType) -> usize {
        self.iter()
            .filter(|preset| preset.preset_type == preset_type)
            .count()
    }

    /// Absorbs every preset found in `source` under a freshly minted id.
    /// Existing entries are never touched.
    pub fn import_presets(&mut self, source: &[u8]) -> AppResult<ImportOutcome> {
        let payload = ImportPayload::parse(source)?;
        if payload.presets.is_empty() {
            return Err(AppError::no_valid_presets());
        }

        let mut imported_ids = Vec::with_capacity(payload.presets.len());
        for mut preset in payload.presets {
            let original_id = std::mem::take(&mut preset.id);
            preset.id = self.mint_id();
            debug!(
                target: "app::import",
                original_id = %original_id,
                preset_id = %preset.id,
                "preset imported under new id"
            );
            imported_ids.push(self.upsert(preset));
        }

        info!(
            target: "app::import",
            count = imported_ids.len(),
            skipped = payload.skipped,
            "presets imported"
        );
        Ok(ImportOutcome {
            imported_ids,
            skipped: payload.skipped,
        })
    }

    fn mint_id(&self) -> String {
        loop {
            let id = new_preset_id();
            if !self.presets.contains_key(&id) {
                return id;
            }
        }
    }
}
