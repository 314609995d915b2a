//! Timer engine implementation.
//!
//! The engine is a Pomodoro state machine alternating between Work and Break
//! intervals. It owns no thread: a [`TickDriver`] decides when ticks are due
//! and the host calls [`TimerEngine::pump`] to deliver them.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |          |
//!   +--------+----------+   (reset, or interval completion)
//! ```
//!
//! Completion flips the phase and leaves the engine idle; the next interval
//! starts only on an explicit `start`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings, locale, driver).with_alarm(alarm);
//! engine.start();
//! // In a loop:
//! for event in engine.pump() { render(&event) }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::driver::TickDriver;
use super::state::{EditTarget, Phase, TimerState, TimerStatus};
use crate::alarm::Alarm;
use crate::events::{Event, SettingsChanged};
use crate::locale::LocaleService;
use crate::notify::{Notifier, Subscription};
use crate::storage::settings::clamp_minutes;
use crate::storage::{SettingKey, SharedSettings};

/// Everything a user (or the host loop) can ask of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// Add this many minutes to the current duration.
    Adjust(i32),
    BeginEdit,
    CommitEdit(String),
    CancelEdit,
    BeginLabelEdit,
    CommitLabelEdit(String),
    CancelLabelEdit,
    Tick,
    /// Deliver settings changes and due ticks.
    Pump,
}

/// Render-ready view of the engine for display adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: Phase,
    pub status: TimerStatus,
    pub display: String,
    pub progress: f64,
    pub label: String,
    /// "Start" for a fresh interval, "Continue" while paused.
    pub start_caption: String,
    pub remaining_secs: u32,
    pub total_secs: u32,
}

/// Core timer engine.
pub struct TimerEngine {
    state: RefCell<TimerState>,
    settings: SharedSettings,
    settings_changes: Subscription<SettingsChanged>,
    locale: Rc<LocaleService>,
    alarm: Option<Box<dyn Alarm>>,
    driver: Box<dyn TickDriver>,
    events: Notifier<Event>,
}

impl TimerEngine {
    /// Create an engine idle in the Work phase with the configured duration.
    pub fn new(
        settings: SharedSettings,
        locale: Rc<LocaleService>,
        driver: impl TickDriver + 'static,
    ) -> Self {
        let (minutes, settings_changes) = {
            let store = settings.borrow();
            (store.settings().work_time, store.subscribe())
        };
        Self {
            state: RefCell::new(TimerState::idle(Phase::Work, minutes)),
            settings,
            settings_changes,
            locale,
            alarm: None,
            driver: Box::new(driver),
            events: Notifier::new(),
        }
    }

    pub fn with_alarm(mut self, alarm: impl Alarm + 'static) -> Self {
        self.alarm = Some(Box::new(alarm));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────
    //
    // Every query applies pending settings changes first.

    pub fn state(&self) -> TimerState {
        self.sync_settings();
        *self.state.borrow()
    }

    pub fn status(&self) -> TimerStatus {
        self.state().status()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn is_driver_armed(&self) -> bool {
        self.driver.is_armed()
    }

    /// Label of the current phase: the stored one, or the localized default.
    pub fn label(&self) -> String {
        let phase = self.phase();
        let stored = self.settings.borrow().settings().label(phase).to_string();
        if stored.is_empty() {
            self.locale.translate(phase.label_key()).to_string()
        } else {
            stored
        }
    }

    /// Catalog key of the start control caption.
    pub fn start_caption_key(&self) -> &'static str {
        if self.state().paused {
            "continue"
        } else {
            "start"
        }
    }

    pub fn view(&self) -> TimerView {
        let state = self.state();
        TimerView {
            phase: state.phase,
            status: state.status(),
            display: state.display(),
            progress: state.progress(),
            label: self.label(),
            start_caption: self.locale.translate(self.start_caption_key()).to_string(),
            remaining_secs: state.remaining_secs,
            total_secs: state.total_secs,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let state = self.state();
        Event::StateSnapshot {
            phase: state.phase,
            status: state.status(),
            remaining_secs: state.remaining_secs,
            total_secs: state.total_secs,
            progress: state.progress(),
            display: state.display(),
            at: Utc::now(),
        }
    }

    /// Receive every event the engine produces from now on.
    pub fn subscribe(&self) -> Subscription<Event> {
        self.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dispatch a command, returning every event it produced.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = self.sync_settings();
        let produced = match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
            Command::Adjust(delta) => self.adjust(delta),
            Command::BeginEdit => self.begin_edit(),
            Command::CommitEdit(text) => self.commit_edit(&text),
            Command::CancelEdit => self.cancel_edit(),
            Command::BeginLabelEdit => self.begin_label_edit(),
            Command::CommitLabelEdit(text) => self.commit_label_edit(&text),
            Command::CancelLabelEdit => self.cancel_label_edit(),
            Command::Tick => self.tick(),
            Command::Pump => {
                events.extend(self.pump());
                None
            }
        };
        events.extend(produced);
        events
    }

    /// Start a fresh interval or continue a paused one.
    pub fn start(&mut self) -> Option<Event> {
        let mut state = self.state();
        if state.is_ticking() {
            return None;
        }

        let resumed = state.paused;
        if !state.running {
            if state.editing {
                tracing::debug!("start discards pending duration edit");
                state.editing = false;
            }
            if state.remaining_secs == 0 {
                let minutes = self.configured_minutes(state.phase);
                state = TimerState {
                    editing_label: state.editing_label,
                    ..TimerState::idle(state.phase, minutes)
                };
            }
        }

        state.running = true;
        state.paused = false;
        *self.state.get_mut() = state;
        self.driver.arm();
        tracing::debug!(phase = ?state.phase, remaining = state.remaining_secs, resumed, "timer started");

        Some(self.emit(Event::TimerStarted {
            phase: state.phase,
            remaining_secs: state.remaining_secs,
            total_secs: state.total_secs,
            resumed,
            at: Utc::now(),
        }))
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.sync_settings();
        let state = self.state.get_mut();
        if !state.is_ticking() {
            return None;
        }
        state.paused = true;
        let remaining_secs = state.remaining_secs;
        self.driver.disarm();
        tracing::debug!(remaining = remaining_secs, "timer paused");

        Some(self.emit(Event::TimerPaused {
            remaining_secs,
            at: Utc::now(),
        }))
    }

    /// Back to an idle Work interval, whatever the current phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.sync_settings();
        self.driver.disarm();
        let minutes = self.configured_minutes(Phase::Work);
        let state = TimerState::idle(Phase::Work, minutes);
        *self.state.get_mut() = state;
        tracing::debug!("timer reset");

        Some(self.emit(Event::TimerReset {
            total_secs: state.total_secs,
            at: Utc::now(),
        }))
    }

    /// Change the current duration by `delta` minutes. Rejected while running.
    pub fn adjust(&mut self, delta: i32) -> Option<Event> {
        let state = self.state();
        if state.running {
            tracing::debug!(delta, "adjust rejected while running");
            return None;
        }
        let minutes = clamp_minutes(i64::from(state.displayed_minutes()) + i64::from(delta));
        Some(self.set_duration(minutes))
    }

    /// Enter duration edit mode with the displayed minutes as the draft.
    pub fn begin_edit(&mut self) -> Option<Event> {
        self.sync_settings();
        let state = self.state.get_mut();
        if state.running {
            return None;
        }
        state.editing = true;
        let draft = state.displayed_minutes().to_string();
        Some(self.emit(Event::EditStarted {
            target: EditTarget::Duration,
            draft,
            at: Utc::now(),
        }))
    }

    /// Apply the typed minutes. Unparseable or zero input counts as 1.
    pub fn commit_edit(&mut self, text: &str) -> Option<Event> {
        self.sync_settings();
        let state = self.state.get_mut();
        if !state.editing {
            return None;
        }
        state.editing = false;
        let minutes = match parse_leading_int(text) {
            Some(n) if n != 0 => clamp_minutes(n),
            _ => 1,
        };
        Some(self.set_duration(minutes))
    }

    pub fn cancel_edit(&mut self) -> Option<Event> {
        let state = self.state.get_mut();
        if !state.editing {
            return None;
        }
        state.editing = false;
        Some(self.emit(Event::EditCancelled {
            target: EditTarget::Duration,
            at: Utc::now(),
        }))
    }

    /// Enter label edit mode with the stored label as the draft.
    pub fn begin_label_edit(&mut self) -> Option<Event> {
        self.sync_settings();
        let state = self.state.get_mut();
        state.editing_label = true;
        let phase = state.phase;
        let draft = self.settings.borrow().settings().label(phase).to_string();
        Some(self.emit(Event::EditStarted {
            target: EditTarget::Label,
            draft,
            at: Utc::now(),
        }))
    }

    /// Store the typed label; blank input stores the localized default.
    pub fn commit_label_edit(&mut self, text: &str) -> Option<Event> {
        self.sync_settings();
        let state = self.state.get_mut();
        if !state.editing_label {
            return None;
        }
        state.editing_label = false;

        let phase = state.phase;
        let label = match text.trim() {
            "" => self.locale.translate(phase.label_key()).to_string(),
            trimmed => trimmed.to_string(),
        };
        let result = self
            .settings
            .borrow_mut()
            .update(SettingKey::label_of(phase), Value::from(label.clone()));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to store label");
        }

        Some(self.emit(Event::LabelChanged {
            phase,
            label,
            at: Utc::now(),
        }))
    }

    pub fn cancel_label_edit(&mut self) -> Option<Event> {
        let state = self.state.get_mut();
        if !state.editing_label {
            return None;
        }
        state.editing_label = false;
        Some(self.emit(Event::EditCancelled {
            target: EditTarget::Label,
            at: Utc::now(),
        }))
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::IntervalCompleted)` when the interval runs out.
    pub fn tick(&mut self) -> Option<Event> {
        let state = self.state.get_mut();
        if !state.is_ticking() {
            return None;
        }
        state.remaining_secs = state.remaining_secs.saturating_sub(1);
        if state.remaining_secs == 0 {
            return Some(self.complete());
        }

        let state = *state;
        Some(self.emit(Event::TimerTick {
            remaining_secs: state.remaining_secs,
            total_secs: state.total_secs,
            progress: state.progress(),
            display: state.display(),
            at: Utc::now(),
        }))
    }

    /// Deliver pending settings changes, then every tick the driver has due.
    pub fn pump(&mut self) -> Vec<Event> {
        let mut events = self.sync_settings();
        let due = self.driver.poll();
        for _ in 0..due {
            if !self.state.get_mut().is_ticking() {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// React to duration changes made through the settings store.
    ///
    /// While idle, a change to the current phase's duration reloads the
    /// interval. A running or paused countdown is never touched. Queries
    /// call this on their own; hosts only need it to collect the events.
    pub fn sync_settings(&self) -> Vec<Event> {
        let mut events = Vec::new();
        for change in self.settings_changes.drain() {
            let mut state = self.state.borrow_mut();
            if state.running || change.key.duration_phase() != Some(state.phase) {
                continue;
            }
            let minutes = change.settings.duration_min(state.phase);
            let reloaded = TimerState {
                editing: state.editing,
                editing_label: state.editing_label,
                ..TimerState::idle(state.phase, minutes)
            };
            if reloaded != *state {
                *state = reloaded;
                drop(state);
                events.push(self.emit(Event::DurationChanged {
                    phase: reloaded.phase,
                    minutes,
                    at: Utc::now(),
                }));
            }
        }
        events
    }

    /// Replace the countdown state, e.g. when restoring a saved session.
    pub fn restore(&mut self, state: TimerState) {
        self.sync_settings();
        let state = state.sanitized();
        *self.state.get_mut() = state;
        if state.is_ticking() {
            self.driver.arm();
        } else {
            self.driver.disarm();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        self.driver.disarm();
        if let Some(alarm) = self.alarm.as_mut() {
            alarm.play_alarm();
        }

        let previous = *self.state.get_mut();
        let completed = previous.phase;
        let next = completed.opposite();
        let minutes = self.configured_minutes(next);
        let state = TimerState {
            editing_label: previous.editing_label,
            ..TimerState::idle(next, minutes)
        };
        *self.state.get_mut() = state;
        tracing::debug!(?completed, ?next, "interval completed");

        self.emit(Event::IntervalCompleted {
            completed,
            next,
            next_total_secs: state.total_secs,
            at: Utc::now(),
        })
    }

    /// Write `minutes` for the current phase and restart its progress.
    fn set_duration(&mut self, minutes: u32) -> Event {
        let state = self.state.get_mut();
        let phase = state.phase;
        state.total_secs = minutes * 60;
        state.remaining_secs = state.total_secs;

        let result = self
            .settings
            .borrow_mut()
            .update(SettingKey::duration_of(phase), Value::from(minutes));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to store duration");
        }
        // Our own write comes back as a no-op reload; consume it now.
        self.sync_settings();

        self.emit(Event::DurationChanged {
            phase,
            minutes,
            at: Utc::now(),
        })
    }

    fn configured_minutes(&self, phase: Phase) -> u32 {
        self.settings.borrow().settings().duration_min(phase)
    }

    fn emit(&self, event: Event) -> Event {
        self.events.publish(&event);
        event
    }
}

/// Integer prefix of `text` after leading whitespace, like a lenient `parseInt`.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs; they clamp to the maximum anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}
