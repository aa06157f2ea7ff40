use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIBRARY_FILE: &str = "presets_library.json";
pub const DEFAULT_CATEGORIES_FILE: &str = "custom_categories.json";
pub const DEFAULT_CREATED_WITH: &str = "OrtoIoT Preset Creator v1.0";
pub const DEFAULT_COMPATIBLE_WITH: &str = "OrtoIoT v4.0+";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatorSettings {
    pub library_path: PathBuf,
    pub categories_path: PathBuf,
    /// Stamped into library files and export envelopes.
    pub created_with: String,
    pub compatible_with: String,
    /// Reject subcategories outside the selected category's list.
    pub strict_subcategories: bool,
}

impl Default for CreatorSettings {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from(DEFAULT_LIBRARY_FILE),
            categories_path: PathBuf::from(DEFAULT_CATEGORIES_FILE),
            created_with: DEFAULT_CREATED_WITH.to_string(),
            compatible_with: DEFAULT_COMPATIBLE_WITH.to_string(),
            strict_subcategories: false,
        }
    }
}
