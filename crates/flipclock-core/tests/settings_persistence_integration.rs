//! Settings round-trips through the SQLite key-value store on disk.

use std::rc::Rc;

use flipclock_core::storage::{KvBackend, TimeFormat, STORAGE_KEY};
use flipclock_core::timer::{IntervalDriver, ManualClock};
use flipclock_core::{KvStore, LocaleService, SettingKey, SettingsStore, TimerEngine};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn edits_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flipclock.db");

    {
        let settings = SettingsStore::load(KvStore::open_at(&path).unwrap()).into_shared();
        let locale = Rc::new(LocaleService::new(settings.clone()));
        let mut engine = TimerEngine::new(
            settings.clone(),
            locale.clone(),
            IntervalDriver::every_second(ManualClock::new()),
        );
        engine.adjust(5);
        engine.begin_label_edit();
        engine.commit_label_edit("Essay");
        locale.set_locale("en").unwrap();
    }

    let settings = SettingsStore::load(KvStore::open_at(&path).unwrap()).into_shared();
    {
        let store = settings.borrow();
        let loaded = store.settings();
        assert_eq!(loaded.work_time, 30);
        assert_eq!(loaded.work_label, "Essay");
        assert_eq!(loaded.language, "en");
        assert_eq!(loaded.time_format, TimeFormat::H12);
    }

    let locale = Rc::new(LocaleService::new(settings.clone()));
    let engine = TimerEngine::new(settings, locale, IntervalDriver::every_second(ManualClock::new()));
    assert_eq!(engine.state().total_secs, 30 * 60);
    assert_eq!(engine.view().start_caption, "Start");
}

#[test]
fn stored_record_is_camel_case_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flipclock.db");

    let mut store = SettingsStore::load(KvStore::open_at(&path).unwrap());
    store.update(SettingKey::BreakTime, json!(10)).unwrap();
    drop(store);

    let raw = KvStore::open_at(&path).unwrap().get(STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["breakTime"], 10);
    assert_eq!(value["workTime"], 25);
    assert_eq!(value["timeFormat"], "24h");
    assert_eq!(value["soundEnabled"], true);
}

#[test]
fn corrupt_record_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flipclock.db");
    KvStore::open_at(&path)
        .unwrap()
        .set(STORAGE_KEY, "{not json")
        .unwrap();

    let store = SettingsStore::load(KvStore::open_at(&path).unwrap());
    assert_eq!(store.settings().work_time, 25);
    assert_eq!(store.settings().language, "ko");
}

#[test]
fn out_of_range_record_is_clamped_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flipclock.db");
    KvStore::open_at(&path)
        .unwrap()
        .set(STORAGE_KEY, r#"{"workTime": 600, "breakTime": 0}"#)
        .unwrap();

    let store = SettingsStore::load(KvStore::open_at(&path).unwrap());
    assert_eq!(store.settings().work_time, 120);
    assert_eq!(store.settings().break_time, 1);
    assert!(store.settings().sound_enabled);
}
