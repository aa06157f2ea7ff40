use serde::Serialize;
use tracing::{debug, info};

use crate::models::preset::{Preset, PresetType};
use crate::models::violation::Violation;
use crate::services::library_service::LibraryStats;
use crate::services::validation_service::PresetValidator;

use super::{AppState, CommandResult};

/// One row of the preset list. The id travels with the label so a
/// selection maps straight back to its preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetListItem {
    pub id: String,
    pub label: String,
    pub name: String,
    pub category: String,
    pub preset_type: PresetType,
}

impl From<&Preset> for PresetListItem {
    fn from(preset: &Preset) -> Self {
        Self {
            id: preset.id.clone(),
            label: preset.display_label(),
            name: preset.name.clone(),
            category: preset.category.clone(),
            preset_type: preset.preset_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Empty means savable.
    pub violations: Vec<Violation>,
    /// Channel values out of type or range; informational.
    pub automation: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_savable(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn presets_list(state: &AppState, search: Option<&str>) -> CommandResult<Vec<PresetListItem>> {
    let presets = state.library().list(search)?;
    let items: Vec<PresetListItem> = presets.iter().map(PresetListItem::from).collect();
    debug!(target: "app::command", count = items.len(), "presets_list");
    Ok(items)
}

pub fn presets_get(state: &AppState, id: &str) -> CommandResult<Preset> {
    Ok(state.library().get(id)?)
}

pub fn presets_validate(state: &AppState, draft: &Preset) -> CommandResult<ValidationReport> {
    let registry = state.categories().registry()?;
    let validator = PresetValidator::with_policy(&registry, state.validation_policy());
    Ok(ValidationReport {
        violations: validator.validate(draft),
        automation: validator.validate_automation(draft),
    })
}

/// Validates the draft, commits it and absorbs it into the library.
/// Returns the stored form.
pub fn presets_save(state: &AppState, draft: &Preset) -> CommandResult<Preset> {
    let committed = commit_valid(state, draft)?;
    state.library().upsert(committed.clone())?;
    info!(target: "app::command", preset_id = %committed.id, name = %committed.name, "preset saved");
    Ok(committed)
}

pub fn presets_delete(state: &AppState, id: &str) -> CommandResult<bool> {
    Ok(state.library().delete(id)?)
}

pub fn presets_stats(state: &AppState) -> CommandResult<LibraryStats> {
    let registry = state.categories().registry()?;
    Ok(state.library().stats(&registry)?)
}

/// Validation gate shared by save and export.
pub(crate) fn commit_valid(state: &AppState, draft: &Preset) -> CommandResult<Preset> {
    let registry = state.categories().registry()?;
    let validator = PresetValidator::with_policy(&registry, state.validation_policy());
    validator.ensure_savable(draft)?;
    Ok(draft.committed())
}
