use serde::{Deserialize, Serialize};

use crate::storage::settings::{MAX_DURATION_MIN, MIN_DURATION_MIN};

/// Interval type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn opposite(&self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    /// Catalog key of the localized default label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

/// Coarse state derived from the `running`/`paused` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// What an in-progress edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditTarget {
    Duration,
    Label,
}

/// Countdown state owned by the timer engine.
///
/// `paused` implies `running`, and `remaining_secs` never exceeds
/// `total_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub running: bool,
    pub paused: bool,
    pub remaining_secs: u32,
    pub total_secs: u32,
    #[serde(default)]
    pub editing: bool,
    #[serde(default)]
    pub editing_label: bool,
}

impl TimerState {
    /// Fresh idle state for `phase` with a full interval of `minutes`.
    pub fn idle(phase: Phase, minutes: u32) -> Self {
        let total_secs = minutes.saturating_mul(60);
        Self {
            phase,
            running: false,
            paused: false,
            remaining_secs: total_secs,
            total_secs,
            editing: false,
            editing_label: false,
        }
    }

    pub fn status(&self) -> TimerStatus {
        match (self.running, self.paused) {
            (false, _) => TimerStatus::Idle,
            (true, false) => TimerStatus::Running,
            (true, true) => TimerStatus::Paused,
        }
    }

    /// Actively counting down (running and not paused).
    pub fn is_ticking(&self) -> bool {
        self.running && !self.paused
    }

    /// Elapsed fraction of the interval, 0.0 ..= 1.0.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        f64::from(self.total_secs - self.remaining_secs) / f64::from(self.total_secs)
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    /// Whole minutes shown when a duration edit begins; `05:00` edits as `5`.
    pub fn displayed_minutes(&self) -> u32 {
        self.remaining_secs.div_ceil(60)
    }

    /// Re-establish the invariants after restoring from untrusted input.
    pub(crate) fn sanitized(mut self) -> Self {
        self.total_secs = self
            .total_secs
            .clamp(MIN_DURATION_MIN * 60, MAX_DURATION_MIN * 60);
        self.remaining_secs = self.remaining_secs.min(self.total_secs);
        if !self.running {
            self.paused = false;
        }
        if self.running {
            self.editing = false;
        }
        self
    }
}

/// Format seconds as zero-padded `mm:ss`. Minutes are not wrapped into hours.
pub fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
