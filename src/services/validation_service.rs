use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::category::CategoryLookup;
use crate::models::preset::{Preset, PresetType};
use crate::models::violation::Violation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Also require `subcategory`, when set, to be listed under the category.
    pub strict_subcategories: bool,
}

/// Checks presets against the save rules. Every rule runs on every call so
/// callers get the full list of problems at once.
pub struct PresetValidator<'a, C: CategoryLookup + ?Sized> {
    categories: &'a C,
    policy: ValidationPolicy,
}

impl<'a, C: CategoryLookup + ?Sized> PresetValidator<'a, C> {
    pub fn new(categories: &'a C) -> Self {
        Self::with_policy(categories, ValidationPolicy::default())
    }

    pub fn with_policy(categories: &'a C, policy: ValidationPolicy) -> Self {
        Self { categories, policy }
    }

    /// Empty result means the preset is savable.
    pub fn validate(&self, preset: &Preset) -> Vec<Violation> {
        let mut violations = Vec::new();

        if preset.name.trim().is_empty() {
            violations.push(Violation::new("name", "Name is required"));
        }

        if preset.description.trim().is_empty() {
            violations.push(Violation::new("description", "Description is required"));
        }

        let category = preset.category.trim();
        if category.is_empty() {
            violations.push(Violation::new("category", "Category is required"));
        } else if !self.categories.contains_category(category) {
            violations.push(Violation::new(
                "category",
                format!("Unknown category '{category}'"),
            ));
        }

        if preset.preset_type == PresetType::Progressive {
            if preset.phases.is_empty() {
                violations.push(Violation::new(
                    "phases",
                    "Progressive presets must have at least one phase",
                ));
            }
            for (index, phase) in preset.phases.iter().enumerate() {
                let number = index + 1;
                if phase.name.trim().is_empty() {
                    violations.push(Violation::new(
                        format!("phases[{index}].name"),
                        format!("Phase {number} name is required"),
                    ));
                }
                if phase.duration <= 0 {
                    violations.push(Violation::new(
                        format!("phases[{index}].duration"),
                        format!("Phase {number} duration must be greater than 0"),
                    ));
                }
            }
        }

        if self.policy.strict_subcategories {
            if let Some(violation) = self.check_subcategory(preset) {
                violations.push(violation);
            }
        }

        debug!(
            target: "app::validation",
            preset_id = %preset.id,
            violations = violations.len(),
            "preset validated"
        );
        violations
    }

    /// Type and range checks of the channel values in the active payload.
    /// Kept apart from [`validate`](Self::validate): out-of-range values
    /// are reported, the caller decides whether to clamp or reject.
    pub fn validate_automation(&self, preset: &Preset) -> Vec<Violation> {
        match preset.preset_type {
            PresetType::Static => preset.settings.validate("settings"),
            PresetType::Progressive => preset
                .phases
                .iter()
                .enumerate()
                .flat_map(|(index, phase)| phase.settings.validate(&format!("phases[{index}].settings")))
                .collect(),
        }
    }

    pub fn ensure_savable(&self, preset: &Preset) -> AppResult<()> {
        let violations = self.validate(preset);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation_failed(violations))
        }
    }

    fn check_subcategory(&self, preset: &Preset) -> Option<Violation> {
        let subcategory = preset.subcategory()?;
        // unknown categories are already reported by the category rule
        let allowed = self.categories.subcategories(preset.category.trim())?;
        if allowed.iter().any(|candidate| candidate == subcategory) {
            None
        } else {
            Some(Violation::new(
                "subcategory",
                format!(
                    "Subcategory '{subcategory}' does not belong to category '{}'",
                    preset.category.trim()
                ),
            ))
        }
    }
}
