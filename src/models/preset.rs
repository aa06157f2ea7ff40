use std::collections::BTreeSet;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::models::automation::AutomationSettings;
use crate::models::phase::Phase;

pub const DEFAULT_ICON: &str = "🌱";
pub const COMMON_ICONS: [&str; 8] = ["🌱", "🌿", "🌾", "🌸", "🥬", "🍃", "🌳", "🌺"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetType {
    #[default]
    Static,
    Progressive,
}

impl PresetType {
    pub fn as_str(self) -> &'static str {
        match self {
            PresetType::Static => "static",
            PresetType::Progressive => "progressive",
        }
    }

    /// Glyph shown next to the preset name in lists.
    pub fn glyph(self) -> &'static str {
        match self {
            PresetType::Static => "🔒",
            PresetType::Progressive => "🔄",
        }
    }
}

impl fmt::Display for PresetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

/// A cultivation preset.
///
/// A draft may hold both `settings` and `phases` while the user flips
/// `preset_type` back and forth; [`Preset::commit`] keeps only the payload
/// selected by the type. Unknown top-level keys are carried in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    /// Empty means no subcategory.
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(rename = "type", default)]
    pub preset_type: PresetType,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
    #[serde(default)]
    pub settings: AutomationSettings,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            icon: default_icon(),
            category: String::new(),
            subcategory: String::new(),
            tags: BTreeSet::new(),
            preset_type: PresetType::Static,
            created_at: String::new(),
            updated_at: String::new(),
            settings: AutomationSettings::new(),
            phases: Vec::new(),
            extra: JsonMap::new(),
        }
    }
}

impl Preset {
    /// Fresh static draft with a new identity and every channel disabled
    /// at its default value.
    pub fn new() -> Self {
        Self {
            id: new_preset_id(),
            created_at: Utc::now().to_rfc3339(),
            settings: AutomationSettings::defaults(),
            ..Self::default()
        }
    }

    pub fn is_progressive(&self) -> bool {
        self.preset_type == PresetType::Progressive
    }

    pub fn subcategory(&self) -> Option<&str> {
        let trimmed = self.subcategory.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn set_tags_from_text(&mut self, text: &str) {
        self.tags = parse_tags(text);
    }

    pub fn tags_text(&self) -> String {
        self.tags.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Appends a default phase and returns its index.
    pub fn add_phase(&mut self) -> usize {
        let index = self.phases.len();
        self.phases.push(Phase::new(index));
        index
    }

    /// Swaps the phase with its predecessor. Returns the phase's new index,
    /// or `None` when it is already first or does not exist.
    pub fn move_phase_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.phases.len() {
            return None;
        }
        self.phases.swap(index, index - 1);
        Some(index - 1)
    }

    /// Swaps the phase with its successor. Returns the phase's new index,
    /// or `None` when it is already last or does not exist.
    pub fn move_phase_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.phases.len() {
            return None;
        }
        self.phases.swap(index, index + 1);
        Some(index + 1)
    }

    pub fn delete_phase(&mut self, index: usize) -> Option<Phase> {
        (index < self.phases.len()).then(|| self.phases.remove(index))
    }

    /// Normalises the draft for storage: trims text, tidies tags, drops the
    /// payload the type does not select and stamps `updated_at`.
    pub fn commit(&mut self) {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.category = self.category.trim().to_string();
        self.subcategory = self.subcategory.trim().to_string();
        self.tags = normalize_tags(std::mem::take(&mut self.tags));
        match self.preset_type {
            PresetType::Static => self.phases.clear(),
            PresetType::Progressive => self.settings.clear(),
        }
        if self.created_at.is_empty() {
            self.created_at = Utc::now().to_rfc3339();
        }
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn committed(&self) -> Preset {
        let mut preset = self.clone();
        preset.commit();
        preset
    }

    pub fn display_label(&self) -> String {
        format!("{} {} {}", self.icon, self.name, self.preset_type.glyph())
    }

    /// Case-insensitive substring match over name, description and category.
    /// An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        format!("{} {} {}", self.name, self.description, self.category)
            .to_lowercase()
            .contains(&term)
    }
}

pub fn new_preset_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Splits a comma-separated tag list. Whitespace is trimmed, empty entries
/// dropped and duplicates collapsed.
pub fn parse_tags(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_tags(tags: BTreeSet<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
