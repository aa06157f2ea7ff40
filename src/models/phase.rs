use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::models::automation::{AutomationChannel, AutomationSettings};

pub const DEFAULT_PHASE_DURATION_DAYS: i64 = 14;

/// One timed stage of a progressive preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default)]
    pub name: String,
    /// Days. Integral floats and numeric strings are accepted on read;
    /// anything else reads as 0 so validation reports the phase instead of
    /// the whole library failing to load.
    #[serde(default, deserialize_with = "lenient_duration")]
    pub duration: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: AutomationSettings,
}

impl Phase {
    /// Default phase for position `index` (0-based).
    pub fn new(index: usize) -> Self {
        let number = index + 1;
        Self {
            name: format!("Phase {number}"),
            duration: DEFAULT_PHASE_DURATION_DAYS,
            description: format!("Phase {number} description"),
            settings: AutomationSettings::with_channels(&AutomationChannel::PHASE_DEFAULTS),
        }
    }

    pub fn display_label(&self, index: usize) -> String {
        format!("{}. {} ({} days)", index + 1, self.name, self.duration)
    }
}

fn lenient_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = JsonValue::deserialize(deserializer)?;
    let days = duration_days(&raw);
    if days.is_none() {
        warn!(target: "app::library", value = %raw, "unreadable phase duration");
    }
    Ok(days.unwrap_or(0))
}

fn duration_days(raw: &JsonValue) -> Option<i64> {
    match raw {
        JsonValue::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|days| days.fract() == 0.0 && days.abs() <= i64::MAX as f64)
                .map(|days| days as i64)
        }),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
