//! User settings and the store that persists and broadcasts them.
//!
//! Settings are serialized as a single camelCase JSON record under
//! [`STORAGE_KEY`]. Keys missing from the record take their defaults; a record
//! that does not parse at all is discarded in favour of the defaults.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{KvBackend, MemoryStore};
use crate::error::ConfigError;
use crate::events::SettingsChanged;
use crate::notify::{Notifier, Subscription};
use crate::timer::Phase;

/// Storage key of the settings record.
pub const STORAGE_KEY: &str = "clockSettings";

pub const MIN_DURATION_MIN: u32 = 1;
pub const MAX_DURATION_MIN: u32 = 120;

/// Clock hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::H12 => "12h",
            TimeFormat::H24 => "24h",
        }
    }
}

impl FromStr for TimeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "12h" => Ok(TimeFormat::H12),
            "24h" => Ok(TimeFormat::H24),
            other => Err(ConfigError::InvalidValue {
                key: SettingKey::TimeFormat.to_string(),
                message: format!("expected 12h or 24h, got '{other}'"),
            }),
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub time_format: TimeFormat,
    /// Work interval in minutes.
    #[serde(deserialize_with = "lenient_minutes")]
    pub work_time: u32,
    /// Break interval in minutes.
    #[serde(deserialize_with = "lenient_minutes")]
    pub break_time: u32,
    pub sound_enabled: bool,
    /// Empty means "use the localized default".
    pub work_label: String,
    pub break_label: String,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H24,
            work_time: 25,
            break_time: 5,
            sound_enabled: true,
            work_label: String::new(),
            break_label: String::new(),
            language: "ko".into(),
        }
    }
}

impl Settings {
    /// Configured duration of `phase` in minutes.
    pub fn duration_min(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_time,
            Phase::Break => self.break_time,
        }
    }

    /// Stored label of `phase`; may be empty.
    pub fn label(&self, phase: Phase) -> &str {
        match phase {
            Phase::Work => &self.work_label,
            Phase::Break => &self.break_label,
        }
    }

    fn normalized(mut self) -> Self {
        self.work_time = clamp_minutes(i64::from(self.work_time));
        self.break_time = clamp_minutes(i64::from(self.break_time));
        self
    }
}

/// Clamp a minute count into the accepted duration range.
pub(crate) fn clamp_minutes(minutes: i64) -> u32 {
    minutes.clamp(i64::from(MIN_DURATION_MIN), i64::from(MAX_DURATION_MIN)) as u32
}

/// Accept any JSON number as a duration: fractions truncate, then the
/// value is clamped. Non-numbers are still a type error.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let minutes = match (value.as_i64(), value.as_f64()) {
        (Some(n), _) => n,
        (None, Some(f)) => f.trunc() as i64,
        (None, None) => {
            return Err(de::Error::invalid_type(
                de::Unexpected::Other("non-numeric duration"),
                &"a number of minutes",
            ));
        }
    };
    Ok(clamp_minutes(minutes))
}

/// Addressable settings fields, named as in the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    TimeFormat,
    WorkTime,
    BreakTime,
    SoundEnabled,
    WorkLabel,
    BreakLabel,
    Language,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::TimeFormat,
        SettingKey::WorkTime,
        SettingKey::BreakTime,
        SettingKey::SoundEnabled,
        SettingKey::WorkLabel,
        SettingKey::BreakLabel,
        SettingKey::Language,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TimeFormat => "timeFormat",
            SettingKey::WorkTime => "workTime",
            SettingKey::BreakTime => "breakTime",
            SettingKey::SoundEnabled => "soundEnabled",
            SettingKey::WorkLabel => "workLabel",
            SettingKey::BreakLabel => "breakLabel",
            SettingKey::Language => "language",
        }
    }

    /// Duration key for `phase`.
    pub fn duration_of(phase: Phase) -> Self {
        match phase {
            Phase::Work => SettingKey::WorkTime,
            Phase::Break => SettingKey::BreakTime,
        }
    }

    /// Label key for `phase`.
    pub fn label_of(phase: Phase) -> Self {
        match phase {
            Phase::Work => SettingKey::WorkLabel,
            Phase::Break => SettingKey::BreakLabel,
        }
    }

    /// The phase whose duration this key configures, if any.
    pub fn duration_phase(&self) -> Option<Phase> {
        match self {
            SettingKey::WorkTime => Some(Phase::Work),
            SettingKey::BreakTime => Some(Phase::Break),
            _ => None,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn value_of(s: &Settings, key: SettingKey) -> Value {
    match key {
        SettingKey::TimeFormat => Value::from(s.time_format.as_str()),
        SettingKey::WorkTime => Value::from(s.work_time),
        SettingKey::BreakTime => Value::from(s.break_time),
        SettingKey::SoundEnabled => Value::from(s.sound_enabled),
        SettingKey::WorkLabel => Value::from(s.work_label.clone()),
        SettingKey::BreakLabel => Value::from(s.break_label.clone()),
        SettingKey::Language => Value::from(s.language.clone()),
    }
}

/// Settings handle shared between the engine, locale and alarm services.
pub type SharedSettings = Rc<RefCell<SettingsStore>>;

/// Owns the current settings, writes them through to a [`KvBackend`] and
/// broadcasts every change.
pub struct SettingsStore {
    current: Settings,
    backend: Box<dyn KvBackend>,
    changes: Notifier<SettingsChanged>,
}

impl SettingsStore {
    /// Load settings from `backend`, merging persisted values over defaults.
    ///
    /// Never fails: unreadable or corrupt data yields the defaults.
    pub fn load(backend: impl KvBackend + 'static) -> Self {
        let current = match backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => settings.normalized(),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt settings record");
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "settings storage unavailable, using defaults");
                Settings::default()
            }
        };

        Self {
            current,
            backend: Box::new(backend),
            changes: Notifier::new(),
        }
    }

    /// Store backed by volatile memory, starting from defaults.
    pub fn in_memory() -> Self {
        Self::load(MemoryStore::new())
    }

    pub fn into_shared(self) -> SharedSettings {
        Rc::new(RefCell::new(self))
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    /// Current value of `key`.
    pub fn get(&self, key: SettingKey) -> Value {
        value_of(&self.current, key)
    }

    /// Set `key` to `value`, persist, and broadcast the change.
    ///
    /// Durations are clamped into `1..=120`. A value of the wrong JSON type
    /// is rejected without touching the settings.
    pub fn update(&mut self, key: SettingKey, value: Value) -> Result<SettingsChanged, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        match key {
            SettingKey::TimeFormat => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("expected a string, got {value}")))?;
                self.current.time_format = raw.parse()?;
            }
            SettingKey::WorkTime | SettingKey::BreakTime => {
                let minutes = value
                    .as_i64()
                    .ok_or_else(|| invalid(format!("expected an integer, got {value}")))?;
                let minutes = clamp_minutes(minutes);
                if key == SettingKey::WorkTime {
                    self.current.work_time = minutes;
                } else {
                    self.current.break_time = minutes;
                }
            }
            SettingKey::SoundEnabled => {
                self.current.sound_enabled = value
                    .as_bool()
                    .ok_or_else(|| invalid(format!("expected a boolean, got {value}")))?;
            }
            SettingKey::WorkLabel | SettingKey::BreakLabel | SettingKey::Language => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("expected a string, got {value}")))?
                    .to_string();
                match key {
                    SettingKey::WorkLabel => self.current.work_label = text,
                    SettingKey::BreakLabel => self.current.break_label = text,
                    _ => self.current.language = text,
                }
            }
        }

        self.save();

        let change = SettingsChanged {
            key,
            value: self.get(key),
            settings: self.current.clone(),
        };
        tracing::debug!(key = %key, value = %change.value, "setting updated");
        self.changes.publish(&change);
        Ok(change)
    }

    /// Parse `raw` according to the type of `key` and apply it.
    pub fn update_from_str(&mut self, key: &str, raw: &str) -> Result<SettingsChanged, ConfigError> {
        let key: SettingKey = key.parse()?;
        let value = match key {
            SettingKey::WorkTime | SettingKey::BreakTime => {
                let n = raw.trim().parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{raw}' as integer"),
                })?;
                Value::from(n)
            }
            SettingKey::SoundEnabled => {
                let b = raw.trim().parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{raw}' as boolean"),
                })?;
                Value::from(b)
            }
            _ => Value::from(raw),
        };
        self.update(key, value)
    }

    /// Restore every setting to its default, broadcasting each key that changed.
    pub fn reset(&mut self) -> Vec<SettingsChanged> {
        let previous = std::mem::take(&mut self.current);
        self.save();

        let mut changes = Vec::new();
        for key in SettingKey::ALL {
            let value = self.get(key);
            if value_of(&previous, key) != value {
                let change = SettingsChanged {
                    key,
                    value,
                    settings: self.current.clone(),
                };
                self.changes.publish(&change);
                changes.push(change);
            }
        }
        changes
    }

    /// Receive every future [`SettingsChanged`].
    pub fn subscribe(&self) -> Subscription<SettingsChanged> {
        self.changes.subscribe()
    }

    fn save(&self) {
        let result = serde_json::to_string(&self.current)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.backend
                    .set(STORAGE_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist settings");
        }
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current)
            .field("subscribers", &self.changes.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use serde_json::json;

    struct BrokenStore;

    impl KvBackend for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("no storage".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("no storage".into()))
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.time_format, TimeFormat::H24);
        assert_eq!(s.work_time, 25);
        assert_eq!(s.break_time, 5);
        assert!(s.sound_enabled);
        assert!(s.work_label.is_empty());
        assert!(s.break_label.is_empty());
        assert_eq!(s.language, "ko");
    }

    #[test]
    fn persisted_record_uses_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "timeFormat": "24h",
                "workTime": 25,
                "breakTime": 5,
                "soundEnabled": true,
                "workLabel": "",
                "breakLabel": "",
                "language": "ko"
            })
        );
    }

    #[test]
    fn load_merges_partial_record_over_defaults() {
        let backend = MemoryStore::with_entry(STORAGE_KEY, r#"{"workTime": 40, "language": "en"}"#);
        let store = SettingsStore::load(backend);
        assert_eq!(store.settings().work_time, 40);
        assert_eq!(store.settings().language, "en");
        assert_eq!(store.settings().break_time, 5);
        assert_eq!(store.settings().time_format, TimeFormat::H24);
    }

    #[test]
    fn load_discards_corrupt_record() {
        let backend = MemoryStore::with_entry(STORAGE_KEY, "{not json");
        let store = SettingsStore::load(backend);
        assert_eq!(store.settings(), &Settings::default());

        let backend = MemoryStore::with_entry(STORAGE_KEY, r#"{"workTime": "forty"}"#);
        let store = SettingsStore::load(backend);
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn load_clamps_out_of_range_durations() {
        let backend = MemoryStore::with_entry(STORAGE_KEY, r#"{"workTime": 0, "breakTime": 999}"#);
        let store = SettingsStore::load(backend);
        assert_eq!(store.settings().work_time, 1);
        assert_eq!(store.settings().break_time, 120);
    }

    #[test]
    fn load_keeps_record_with_negative_or_fractional_duration() {
        let backend = MemoryStore::with_entry(
            STORAGE_KEY,
            r#"{"workTime": -5, "breakTime": 7.9, "language": "en", "soundEnabled": false}"#,
        );
        let store = SettingsStore::load(backend);
        assert_eq!(store.settings().work_time, 1);
        assert_eq!(store.settings().break_time, 7);
        assert_eq!(store.settings().language, "en");
        assert!(!store.settings().sound_enabled);
    }

    #[test]
    fn unavailable_storage_degrades_to_defaults() {
        let mut store = SettingsStore::load(BrokenStore);
        assert_eq!(store.settings(), &Settings::default());

        // Writes still take effect in memory.
        store.update(SettingKey::WorkTime, json!(30)).unwrap();
        assert_eq!(store.settings().work_time, 30);
    }

    #[test]
    fn update_persists_and_broadcasts() {
        let mut store = SettingsStore::in_memory();
        let sub = store.subscribe();

        let change = store.update(SettingKey::BreakTime, json!(10)).unwrap();
        assert_eq!(change.key, SettingKey::BreakTime);
        assert_eq!(change.value, json!(10));
        assert_eq!(change.settings.break_time, 10);

        let received = sub.drain();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].key, SettingKey::BreakTime);

        let raw = store.backend.get(STORAGE_KEY).unwrap().unwrap();
        let persisted: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.break_time, 10);
    }

    #[test]
    fn update_clamps_durations() {
        let mut store = SettingsStore::in_memory();
        assert_eq!(store.update(SettingKey::WorkTime, json!(500)).unwrap().value, json!(120));
        assert_eq!(store.update(SettingKey::WorkTime, json!(-3)).unwrap().value, json!(1));
    }

    #[test]
    fn update_rejects_wrong_types() {
        let mut store = SettingsStore::in_memory();
        assert!(store.update(SettingKey::SoundEnabled, json!("yes")).is_err());
        assert!(store.update(SettingKey::TimeFormat, json!("13h")).is_err());
        assert!(store.update(SettingKey::WorkTime, json!("25")).is_err());
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn update_from_str_parses_by_key_type() {
        let mut store = SettingsStore::in_memory();
        store.update_from_str("soundEnabled", "false").unwrap();
        store.update_from_str("workTime", "45").unwrap();
        store.update_from_str("timeFormat", "12h").unwrap();
        store.update_from_str("workLabel", "Deep work").unwrap();

        let s = store.settings();
        assert!(!s.sound_enabled);
        assert_eq!(s.work_time, 45);
        assert_eq!(s.time_format, TimeFormat::H12);
        assert_eq!(s.work_label, "Deep work");

        assert!(matches!(
            store.update_from_str("volume", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(store.update_from_str("breakTime", "soon").is_err());
    }

    #[test]
    fn get_returns_json_values() {
        let store = SettingsStore::in_memory();
        assert_eq!(store.get(SettingKey::TimeFormat), json!("24h"));
        assert_eq!(store.get(SettingKey::WorkTime), json!(25));
        assert_eq!(store.get(SettingKey::SoundEnabled), json!(true));
        assert_eq!(store.get(SettingKey::Language), json!("ko"));
    }

    #[test]
    fn reset_broadcasts_only_changed_keys() {
        let mut store = SettingsStore::in_memory();
        store.update(SettingKey::WorkTime, json!(50)).unwrap();
        store.update(SettingKey::Language, json!("en")).unwrap();
        let sub = store.subscribe();

        let changes = store.reset();
        let keys: Vec<_> = changes.iter().map(|c| c.key).collect();
        assert_eq!(keys, vec![SettingKey::WorkTime, SettingKey::Language]);
        assert_eq!(sub.drain().len(), 2);
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn setting_keys_round_trip_through_names() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
    }
}
