//! Audible alerts.
//!
//! [`AlarmService`] decides *whether* to sound (the `soundEnabled` setting)
//! and *what* to sound; a [`ToneSink`] turns a [`BeepPattern`] into actual
//! audio. Without a sink every call is a silent no-op.

use std::io;

use crate::storage::SharedSettings;

/// A single sine beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beep {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

/// `count` beeps, one every `spacing_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepPattern {
    pub beep: Beep,
    pub count: u32,
    pub spacing_ms: u32,
}

/// Played once per completed interval.
pub const ALARM_PATTERN: BeepPattern = BeepPattern {
    beep: Beep {
        frequency_hz: 800,
        duration_ms: 200,
    },
    count: 3,
    spacing_ms: 500,
};

/// Button feedback.
pub const CLICK_PATTERN: BeepPattern = BeepPattern {
    beep: Beep {
        frequency_hz: 1000,
        duration_ms: 50,
    },
    count: 1,
    spacing_ms: 0,
};

/// Audio output capability.
pub trait ToneSink {
    fn play(&mut self, pattern: &BeepPattern) -> io::Result<()>;

    /// Best-effort stop of a sequence in progress.
    fn stop(&mut self) {}
}

/// What the timer engine calls when an interval completes.
pub trait Alarm {
    fn play_alarm(&mut self);

    fn stop_alarm(&mut self) {}
}

pub struct AlarmService {
    settings: SharedSettings,
    sink: Option<Box<dyn ToneSink>>,
}

impl AlarmService {
    /// Service with no audio capability; every call is a no-op.
    pub fn silent(settings: SharedSettings) -> Self {
        Self {
            settings,
            sink: None,
        }
    }

    pub fn with_sink(settings: SharedSettings, sink: impl ToneSink + 'static) -> Self {
        Self {
            settings,
            sink: Some(Box::new(sink)),
        }
    }

    /// Short feedback beep, gated on the same setting as the alarm.
    pub fn click(&mut self) {
        self.emit(&CLICK_PATTERN);
    }

    fn emit(&mut self, pattern: &BeepPattern) {
        if !self.settings.borrow().settings().sound_enabled {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            tracing::debug!("no audio sink, skipping beep");
            return;
        };
        if let Err(e) = sink.play(pattern) {
            tracing::warn!(error = %e, "failed to play tone");
        }
    }
}

impl Alarm for AlarmService {
    fn play_alarm(&mut self) {
        self.emit(&ALARM_PATTERN);
    }

    fn stop_alarm(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SettingKey, SettingsStore};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<BeepPattern>>>,
        fail: bool,
    }

    impl ToneSink for Recorder {
        fn play(&mut self, pattern: &BeepPattern) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "no device"));
            }
            self.played.borrow_mut().push(*pattern);
            Ok(())
        }
    }

    #[test]
    fn alarm_plays_three_beeps() {
        let settings = SettingsStore::in_memory().into_shared();
        let recorder = Recorder::default();
        let mut alarm = AlarmService::with_sink(settings, recorder.clone());

        alarm.play_alarm();
        let played = recorder.played.borrow();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].count, 3);
        assert_eq!(played[0].beep.frequency_hz, 800);
        assert_eq!(played[0].beep.duration_ms, 200);
        assert_eq!(played[0].spacing_ms, 500);
    }

    #[test]
    fn muted_when_sound_disabled() {
        let settings = SettingsStore::in_memory().into_shared();
        settings
            .borrow_mut()
            .update(SettingKey::SoundEnabled, json!(false))
            .unwrap();
        let recorder = Recorder::default();
        let mut alarm = AlarmService::with_sink(settings, recorder.clone());

        alarm.play_alarm();
        alarm.click();
        assert!(recorder.played.borrow().is_empty());
    }

    #[test]
    fn missing_or_failing_sink_is_silent() {
        let settings = SettingsStore::in_memory().into_shared();
        let mut silent = AlarmService::silent(settings.clone());
        silent.play_alarm();
        silent.stop_alarm();

        let broken = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut alarm = AlarmService::with_sink(settings, broken);
        alarm.play_alarm();
    }

    #[test]
    fn click_is_a_single_short_beep() {
        let settings = SettingsStore::in_memory().into_shared();
        let recorder = Recorder::default();
        let mut alarm = AlarmService::with_sink(settings, recorder.clone());
        alarm.click();
        assert_eq!(recorder.played.borrow().as_slice(), &[CLICK_PATTERN]);
    }
}
