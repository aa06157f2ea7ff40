use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::AppResult;
use crate::models::automation::{AutomationChannel, ChannelSettings};
use crate::models::phase::Phase;
use crate::models::preset::{Preset, PresetType, COMMON_ICONS};

/// Fields of a phase the editor can change in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseUpdate {
    pub name: Option<String>,
    pub duration: Option<i64>,
    pub description: Option<String>,
}

/// An editing session over a draft preset.
///
/// The draft keeps both the static settings and the phase list while the
/// type is switched; only [`PresetEditor::commit`] drops the inactive one.
/// The library never sees the draft itself, only committed copies.
#[derive(Debug, Clone)]
pub struct PresetEditor {
    draft: Preset,
    selected_phase: Option<usize>,
}

impl Default for PresetEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetEditor {
    pub fn new() -> Self {
        Self::open(Preset::new())
    }

    pub fn open(preset: Preset) -> Self {
        debug!(target: "app::editor", preset_id = %preset.id, "editor opened");
        Self {
            draft: preset,
            selected_phase: None,
        }
    }

    pub fn draft(&self) -> &Preset {
        &self.draft
    }

    pub fn id(&self) -> &str {
        &self.draft.id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.draft.icon = icon.into();
    }

    /// Icons offered for quick selection. Any other glyph is accepted too.
    pub fn icon_palette() -> &'static [&'static str] {
        &COMMON_ICONS
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = category.into();
    }

    pub fn set_subcategory(&mut self, subcategory: impl Into<String>) {
        self.draft.subcategory = subcategory.into();
    }

    pub fn set_tags_text(&mut self, text: &str) {
        self.draft.set_tags_from_text(text);
    }

    pub fn set_type(&mut self, preset_type: PresetType) {
        self.draft.preset_type = preset_type;
    }

    pub fn channel(&self, channel: AutomationChannel) -> Option<&ChannelSettings> {
        self.draft.settings.get(channel)
    }

    pub fn set_channel_enabled(&mut self, channel: AutomationChannel, enabled: bool) {
        self.draft.settings.channel_mut(channel).enabled = enabled;
    }

    /// Stores the value as given; range problems surface in validation.
    pub fn set_channel_value(
        &mut self,
        channel: AutomationChannel,
        field: &str,
        value: impl Into<JsonValue>,
    ) {
        self.draft.settings.channel_mut(channel).set(field, value);
    }

    pub fn selected_phase(&self) -> Option<usize> {
        self.selected_phase
    }

    pub fn select_phase(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(index) if index >= self.draft.phases.len() => false,
            _ => {
                self.selected_phase = index;
                true
            }
        }
    }

    /// Appends a default phase and selects it.
    pub fn add_phase(&mut self) -> usize {
        let index = self.draft.add_phase();
        self.selected_phase = Some(index);
        index
    }

    pub fn delete_selected_phase(&mut self) -> Option<Phase> {
        let index = self.selected_phase.take()?;
        self.draft.delete_phase(index)
    }

    pub fn move_selected_phase_up(&mut self) -> bool {
        self.move_selected(Preset::move_phase_up)
    }

    pub fn move_selected_phase_down(&mut self) -> bool {
        self.move_selected(Preset::move_phase_down)
    }

    fn move_selected(&mut self, step: fn(&mut Preset, usize) -> Option<usize>) -> bool {
        let Some(index) = self.selected_phase else {
            return false;
        };
        match step(&mut self.draft, index) {
            Some(new_index) => {
                self.selected_phase = Some(new_index);
                true
            }
            None => false,
        }
    }

    pub fn update_phase(&mut self, index: usize, update: PhaseUpdate) -> bool {
        let Some(phase) = self.draft.phases.get_mut(index) else {
            return false;
        };
        if let Some(name) = update.name {
            phase.name = name;
        }
        if let Some(duration) = update.duration {
            phase.duration = duration;
        }
        if let Some(description) = update.description {
            phase.description = description.trim().to_string();
        }
        true
    }

    pub fn set_phase_channel(
        &mut self,
        index: usize,
        channel: AutomationChannel,
        settings: ChannelSettings,
    ) -> bool {
        match self.draft.phases.get_mut(index) {
            Some(phase) => {
                phase.settings.insert(channel, settings);
                true
            }
            None => false,
        }
    }

    pub fn phase_labels(&self) -> Vec<String> {
        self.draft
            .phases
            .iter()
            .enumerate()
            .map(|(index, phase)| phase.display_label(index))
            .collect()
    }

    /// The draft as it would be stored.
    pub fn commit(&self) -> Preset {
        self.draft.committed()
    }

    /// Pretty JSON of [`commit`](Self::commit).
    pub fn preview(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.commit())?)
    }
}
