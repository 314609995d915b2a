//! Translated strings and date formatting.
//!
//! The active locale is the `language` setting, so every component reading
//! settings agrees on it. Lookups fall back from the active locale to the
//! primary locale and finally to the key itself.

mod catalog;

pub use catalog::Locale;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::ConfigError;
use crate::events::LocaleChanged;
use crate::notify::{Notifier, Subscription};
use crate::storage::{SettingKey, SharedSettings, TimeFormat};

pub struct LocaleService {
    settings: SharedSettings,
    changes: Notifier<LocaleChanged>,
}

impl LocaleService {
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            settings,
            changes: Notifier::new(),
        }
    }

    /// Language code as stored, even when no catalog exists for it.
    pub fn code(&self) -> String {
        self.settings.borrow().settings().language.clone()
    }

    /// Catalog for the active language, if one ships.
    pub fn active(&self) -> Option<Locale> {
        Locale::from_code(&self.code())
    }

    /// Active catalog, or the primary one for unknown languages.
    pub fn effective(&self) -> Locale {
        self.active().unwrap_or(Locale::PRIMARY)
    }

    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        self.active()
            .and_then(|locale| locale.lookup(key))
            .or_else(|| Locale::PRIMARY.lookup(key))
            .unwrap_or(key)
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        self.effective().format_date(date)
    }

    /// Customary clock format of the active language; 24h when unknown.
    pub fn default_time_format(&self) -> TimeFormat {
        self.active()
            .map(|locale| locale.default_time_format())
            .unwrap_or(TimeFormat::H24)
    }

    /// Switch language, reset the clock format to the language's default and
    /// broadcast [`LocaleChanged`].
    pub fn set_locale(&self, code: &str) -> Result<LocaleChanged, ConfigError> {
        if Locale::from_code(code).is_none() {
            tracing::warn!(locale = code, "no catalog for locale, falling back to primary strings");
        }

        {
            let mut settings = self.settings.borrow_mut();
            settings.update(SettingKey::Language, Value::from(code))?;
        }
        let format = self.default_time_format();
        self.settings
            .borrow_mut()
            .update(SettingKey::TimeFormat, Value::from(format.as_str()))?;

        let change = LocaleChanged {
            locale: code.to_string(),
        };
        tracing::debug!(locale = code, "locale changed");
        self.changes.publish(&change);
        Ok(change)
    }

    pub fn subscribe(&self) -> Subscription<LocaleChanged> {
        self.changes.subscribe()
    }
}
