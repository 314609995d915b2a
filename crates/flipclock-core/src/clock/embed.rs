//! Options of the embeddable clock, read from a URL query string such as
//! `?theme=1&ampm=1&showdate=0&showseconds=1&size=large`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::storage::TimeFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub theme: Theme,
    pub time_format: TimeFormat,
    pub show_date: bool,
    pub show_seconds: bool,
    pub size: WidgetSize,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            time_format: TimeFormat::H24,
            show_date: true,
            show_seconds: true,
            size: WidgetSize::Medium,
        }
    }
}

impl EmbedOptions {
    /// Parse a bare query string; a leading `?` is ignored. Unknown keys and
    /// values leave the defaults in place.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut options = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            options.apply(&key, &value);
        }
        options
    }

    /// Parse the query of a full embed URL.
    pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url)?;
        let mut options = Self::default();
        for (key, value) in url.query_pairs() {
            options.apply(&key, &value);
        }
        Ok(options)
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "theme" => {
                self.theme = if value == "1" { Theme::Dark } else { Theme::Light };
            }
            "ampm" => {
                self.time_format = if value == "1" {
                    TimeFormat::H12
                } else {
                    TimeFormat::H24
                };
            }
            "showdate" => self.show_date = value != "0",
            "showseconds" => self.show_seconds = value != "0",
            "size" => {
                self.size = match value {
                    "small" => WidgetSize::Small,
                    "large" => WidgetSize::Large,
                    _ => WidgetSize::Medium,
                };
            }
            _ => {}
        }
    }
}
