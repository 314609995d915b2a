use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{SettingKey, Settings};
use crate::timer::{EditTarget, Phase, TimerStatus};

/// Every state change of the timer engine produces an Event.
/// Display adapters subscribe to them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u32,
        total_secs: u32,
        /// True when continuing a paused interval.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerTick {
        remaining_secs: u32,
        total_secs: u32,
        /// Elapsed fraction of the interval, 0.0 ..= 1.0.
        progress: f64,
        display: String,
        at: DateTime<Utc>,
    },
    /// An interval ran out. The engine is idle in the next phase.
    IntervalCompleted {
        completed: Phase,
        next: Phase,
        next_total_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    /// Duration of the current phase changed through adjust, edit or settings.
    DurationChanged {
        phase: Phase,
        minutes: u32,
        at: DateTime<Utc>,
    },
    EditStarted {
        target: EditTarget,
        draft: String,
        at: DateTime<Utc>,
    },
    EditCancelled {
        target: EditTarget,
        at: DateTime<Utc>,
    },
    LabelChanged {
        phase: Phase,
        label: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        status: TimerStatus,
        remaining_secs: u32,
        total_secs: u32,
        progress: f64,
        display: String,
        at: DateTime<Utc>,
    },
}

/// Broadcast by the settings store after every successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChanged {
    pub key: SettingKey,
    pub value: serde_json::Value,
    pub settings: Settings,
}

/// Broadcast by the locale service when the active locale switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleChanged {
    pub locale: String,
}
