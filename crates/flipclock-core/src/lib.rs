//! # Flipclock Core Library
//!
//! Business logic of the flip clock and Pomodoro timer widget. Front ends
//! (the `flipclock-cli` binary, or any other display adapter) are thin layers
//! over this crate: they send commands to the engine and render the events it
//! publishes.
//!
//! ## Architecture
//!
//! - **Timer Engine**: Work/Break countdown state machine driven by an
//!   injectable tick driver; the host calls `pump()` to deliver due ticks
//! - **Settings**: JSON record in a SQLite key-value table, broadcast on change
//! - **Locale**: `ko`/`en` string catalogs and long-form dates
//! - **Alarm**: beep patterns gated on the sound setting
//! - **Clock**: flip-card digit faces, zoom overlay, embed options
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SettingsStore`]: Persisted, observable user settings
//! - [`LocaleService`]: Translations and date formatting
//! - [`AlarmService`]: Completion alarm

pub mod alarm;
pub mod clock;
pub mod error;
pub mod events;
pub mod locale;
pub mod notify;
pub mod slider;
pub mod storage;
pub mod timer;

pub use alarm::{Alarm, AlarmService, ToneSink};
pub use clock::{ClockFace, ClockZoom, EmbedOptions, FlipClock};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Event, LocaleChanged, SettingsChanged};
pub use locale::{Locale, LocaleService};
pub use slider::{Slide, Slider};
pub use storage::{KvStore, MemoryStore, SettingKey, Settings, SettingsStore, SharedSettings};
pub use timer::{Command, Phase, TimerEngine, TimerState, TimerStatus, TimerView};
