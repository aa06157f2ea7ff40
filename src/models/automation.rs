use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tracing::{debug, warn};

use crate::models::violation::Violation;

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid clock regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationChannel {
    Temperature,
    Humidity,
    Co2,
    Ec,
    Irrigation,
    Light,
    Lamp,
    Ventilation,
    FoliarFeeding,
}

impl AutomationChannel {
    pub const ALL: [AutomationChannel; 9] = [
        AutomationChannel::Temperature,
        AutomationChannel::Humidity,
        AutomationChannel::Co2,
        AutomationChannel::Ec,
        AutomationChannel::Irrigation,
        AutomationChannel::Light,
        AutomationChannel::Lamp,
        AutomationChannel::Ventilation,
        AutomationChannel::FoliarFeeding,
    ];

    /// Channels a phase is seeded with.
    pub const PHASE_DEFAULTS: [AutomationChannel; 3] = [
        AutomationChannel::Temperature,
        AutomationChannel::Humidity,
        AutomationChannel::Light,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AutomationChannel::Temperature => "temperature",
            AutomationChannel::Humidity => "humidity",
            AutomationChannel::Co2 => "co2",
            AutomationChannel::Ec => "ec",
            AutomationChannel::Irrigation => "irrigation",
            AutomationChannel::Light => "light",
            AutomationChannel::Lamp => "lamp",
            AutomationChannel::Ventilation => "ventilation",
            AutomationChannel::FoliarFeeding => "foliar_feeding",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.as_str() == key)
    }

    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            AutomationChannel::Temperature => &TEMPERATURE_FIELDS,
            AutomationChannel::Humidity => &HUMIDITY_FIELDS,
            AutomationChannel::Co2 => &CO2_FIELDS,
            AutomationChannel::Ec => &EC_FIELDS,
            AutomationChannel::Irrigation => &IRRIGATION_FIELDS,
            AutomationChannel::Light => &LIGHT_FIELDS,
            AutomationChannel::Lamp => &LAMP_FIELDS,
            AutomationChannel::Ventilation => &VENTILATION_FIELDS,
            AutomationChannel::FoliarFeeding => &FOLIAR_FEEDING_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.schema().iter().find(|spec| spec.name == name)
    }
}

impl fmt::Display for AutomationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Float { min: f64, max: f64, default: f64 },
    Integer { min: i64, max: i64, default: i64 },
    /// `HH:MM`, 24 hour clock.
    ClockTime { default: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn float(name: &'static str, unit: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            unit,
            kind: FieldKind::Float { min, max, default },
        }
    }

    const fn integer(name: &'static str, unit: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            name,
            unit,
            kind: FieldKind::Integer { min, max, default },
        }
    }

    const fn clock(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            unit: "HH:MM",
            kind: FieldKind::ClockTime { default },
        }
    }

    pub fn default_value(&self) -> JsonValue {
        match self.kind {
            FieldKind::Float { default, .. } => json!(default),
            FieldKind::Integer { default, .. } => json!(default),
            FieldKind::ClockTime { default } => json!(default),
        }
    }

    fn check(&self, channel: AutomationChannel, value: &JsonValue) -> Option<Violation> {
        let field = format!("{}.{}", channel, self.name);
        match self.kind {
            FieldKind::Float { min, max, .. } => match value.as_f64() {
                None => Some(Violation::new(&field, format!("{field} must be a number"))),
                Some(number) if number < min || number > max => Some(Violation::new(
                    &field,
                    format!("{field} must be between {min} and {max} {}", self.unit),
                )),
                Some(_) => None,
            },
            FieldKind::Integer { min, max, .. } => match value.as_i64() {
                None => Some(Violation::new(&field, format!("{field} must be an integer"))),
                Some(number) if number < min || number > max => Some(Violation::new(
                    &field,
                    format!("{field} must be between {min} and {max} {}", self.unit),
                )),
                Some(_) => None,
            },
            FieldKind::ClockTime { .. } => match value.as_str() {
                Some(text) if CLOCK_TIME.is_match(text) => None,
                _ => Some(Violation::new(
                    &field,
                    format!("{field} must be a time in HH:MM format"),
                )),
            },
        }
    }
}

const TEMPERATURE_FIELDS: [FieldSpec; 1] = [FieldSpec::float("value", "°C", 15.0, 35.0, 22.0)];
const HUMIDITY_FIELDS: [FieldSpec; 1] = [FieldSpec::float("value", "%", 30.0, 90.0, 60.0)];
const CO2_FIELDS: [FieldSpec; 1] = [FieldSpec::integer("value", "ppm", 400, 1500, 800)];
const EC_FIELDS: [FieldSpec; 1] = [FieldSpec::float("value", "mS/cm", 0.5, 3.0, 1.2)];
const IRRIGATION_FIELDS: [FieldSpec; 2] = [
    FieldSpec::integer("duration", "min", 1, 60, 5),
    FieldSpec::integer("interval", "h", 1, 72, 12),
];
const LIGHT_FIELDS: [FieldSpec; 2] = [
    FieldSpec::clock("startTime", "06:00"),
    FieldSpec::integer("duration", "h", 6, 24, 18),
];
const LAMP_FIELDS: [FieldSpec; 1] = [FieldSpec::integer("distance", "cm", 10, 100, 30)];
const VENTILATION_FIELDS: [FieldSpec; 2] = [
    FieldSpec::integer("duration", "min", 5, 60, 15),
    FieldSpec::integer("interval", "h", 1, 12, 3),
];
const FOLIAR_FEEDING_FIELDS: [FieldSpec; 2] = [
    FieldSpec::integer("frequency", "days", 1, 14, 3),
    FieldSpec::integer("duration", "min", 1, 10, 2),
];

/// Parameters of one channel. `enabled` is independent of the stored
/// values: switching a channel off keeps its parameters so switching it
/// back on restores them. Fields outside the channel schema are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: JsonMap<String, JsonValue>,
}

impl ChannelSettings {
    /// Disabled, with every schema field at its default.
    pub fn defaults(channel: AutomationChannel) -> Self {
        let params = channel
            .schema()
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default_value()))
            .collect();
        Self {
            enabled: false,
            params,
        }
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.params.get(field)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.params.get(field).and_then(JsonValue::as_f64)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.params.get(field).and_then(JsonValue::as_i64)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.params.get(field).and_then(JsonValue::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) {
        self.params.insert(field.into(), value.into());
    }

    /// Checks type and inclusive range of every schema field present.
    /// Absent fields are not reported (phases carry partial sets) and a
    /// disabled channel is checked like an enabled one.
    pub fn validate(&self, channel: AutomationChannel) -> Vec<Violation> {
        channel
            .schema()
            .iter()
            .filter_map(|spec| {
                self.params
                    .get(spec.name)
                    .and_then(|value| spec.check(channel, value))
            })
            .collect()
    }

    /// Pulls out-of-range numbers back to the nearest bound. Returns
    /// whether anything changed. Ill-typed values are left for validation.
    pub fn clamp(&mut self, channel: AutomationChannel) -> bool {
        let mut changed = false;
        for spec in channel.schema() {
            let Some(value) = self.params.get_mut(spec.name) else {
                continue;
            };
            match spec.kind {
                FieldKind::Float { min, max, .. } => {
                    if let Some(number) = value.as_f64() {
                        let clamped = number.clamp(min, max);
                        if clamped != number {
                            *value = json!(clamped);
                            changed = true;
                        }
                    }
                }
                FieldKind::Integer { min, max, .. } => {
                    if let Some(number) = value.as_i64() {
                        let clamped = number.clamp(min, max);
                        if clamped != number {
                            *value = json!(clamped);
                            changed = true;
                        }
                    }
                }
                FieldKind::ClockTime { .. } => {}
            }
        }
        changed
    }
}

/// Sparse channel map. Static presets usually carry all nine channels,
/// phases only the ones they override.
///
/// Keys this build does not recognise (channels added by newer
/// controllers) and known channels whose body cannot be read are kept in
/// `unknown` and written back verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutomationSettings {
    channels: BTreeMap<AutomationChannel, ChannelSettings>,
    unknown: JsonMap<String, JsonValue>,
}

impl AutomationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every channel, disabled, at default values.
    pub fn defaults() -> Self {
        Self::with_channels(&AutomationChannel::ALL)
    }

    pub fn with_channels(channels: &[AutomationChannel]) -> Self {
        Self {
            channels: channels
                .iter()
                .map(|channel| (*channel, ChannelSettings::defaults(*channel)))
                .collect(),
            unknown: JsonMap::new(),
        }
    }

    pub fn get(&self, channel: AutomationChannel) -> Option<&ChannelSettings> {
        self.channels.get(&channel)
    }

    pub fn get_mut(&mut self, channel: AutomationChannel) -> Option<&mut ChannelSettings> {
        self.channels.get_mut(&channel)
    }

    /// Returns the channel, inserting defaults if it is not present yet.
    pub fn channel_mut(&mut self, channel: AutomationChannel) -> &mut ChannelSettings {
        self.unknown.remove(channel.as_str());
        self.channels
            .entry(channel)
            .or_insert_with(|| ChannelSettings::defaults(channel))
    }

    pub fn insert(&mut self, channel: AutomationChannel, settings: ChannelSettings) {
        self.unknown.remove(channel.as_str());
        self.channels.insert(channel, settings);
    }

    pub fn remove(&mut self, channel: AutomationChannel) -> Option<ChannelSettings> {
        self.channels.remove(&channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AutomationChannel, &ChannelSettings)> {
        self.channels.iter().map(|(channel, settings)| (*channel, settings))
    }

    /// Entries passed through untouched, keyed as found on disk.
    pub fn unknown_channels(&self) -> &JsonMap<String, JsonValue> {
        &self.unknown
    }

    pub fn enabled_channels(&self) -> Vec<AutomationChannel> {
        self.iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(channel, _)| channel)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.unknown.is_empty()
    }

    /// Number of recognised channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
        self.unknown.clear();
    }

    /// Violations of every channel, prefixed with `prefix` (e.g. `settings`).
    pub fn validate(&self, prefix: &str) -> Vec<Violation> {
        self.iter()
            .flat_map(|(channel, settings)| settings.validate(channel))
            .map(|violation| Violation {
                field: format!("{prefix}.{}", violation.field),
                message: violation.message,
            })
            .collect()
    }
}

impl Serialize for AutomationSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len() + self.unknown.len()))?;
        for (channel, settings) in &self.channels {
            map.serialize_entry(channel.as_str(), settings)?;
        }
        for (key, value) in &self.unknown {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AutomationSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonMap::<String, JsonValue>::deserialize(deserializer)?;
        let mut settings = AutomationSettings::new();
        for (key, value) in raw {
            let Some(channel) = AutomationChannel::from_key(&key) else {
                debug!(target: "app::library", channel = %key, "passing through unknown channel");
                settings.unknown.insert(key, value);
                continue;
            };
            match ChannelSettings::deserialize(&value) {
                Ok(parsed) => {
                    settings.channels.insert(channel, parsed);
                }
                Err(err) => {
                    warn!(target: "app::library", %channel, error = %err, "unreadable channel kept as-is");
                    settings.unknown.insert(key, value);
                }
            }
        }
        Ok(settings)
    }
}

pub fn validate_channel(channel: AutomationChannel, settings: &ChannelSettings) -> Vec<Violation> {
    settings.validate(channel)
}
