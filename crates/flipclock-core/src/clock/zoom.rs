use super::face::{ClockFace, DigitGroup};
use crate::locale::Locale;

/// Overlay that enlarges one digit pair of the clock.
#[derive(Debug, Default)]
pub struct ClockZoom {
    target: Option<DigitGroup>,
    digits: (u8, u8),
}

impl ClockZoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, group: DigitGroup, face: &ClockFace) {
        self.target = Some(group);
        self.digits = face.pair(group);
    }

    /// Copy the current pair from `face` while open.
    pub fn refresh(&mut self, face: &ClockFace) {
        if let Some(group) = self.target {
            self.digits = face.pair(group);
        }
    }

    pub fn hide(&mut self) {
        self.target = None;
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<DigitGroup> {
        self.target
    }

    pub fn digits(&self) -> (u8, u8) {
        self.digits
    }

    /// Caption under the enlarged pair, for the given language code.
    pub fn label(&self, language: &str) -> Option<&'static str> {
        let group = self.target?;
        let locale = Locale::from_code(language).unwrap_or(Locale::En);
        Some(match (locale, group) {
            (Locale::Ko, DigitGroup::Hour) => "시",
            (Locale::Ko, DigitGroup::Minute) => "분",
            (Locale::Ko, DigitGroup::Second) => "초",
            (Locale::En, DigitGroup::Hour) => "HOUR",
            (Locale::En, DigitGroup::Minute) => "MIN",
            (Locale::En, DigitGroup::Second) => "SEC",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TimeFormat;
    use chrono::NaiveTime;

    fn face(h: u32, m: u32, s: u32) -> ClockFace {
        ClockFace::at(&NaiveTime::from_hms_opt(h, m, s).unwrap(), TimeFormat::H24)
    }

    #[test]
    fn show_refresh_hide() {
        let mut zoom = ClockZoom::new();
        assert!(!zoom.is_open());
        assert_eq!(zoom.label("ko"), None);

        zoom.show(DigitGroup::Second, &face(9, 41, 7));
        assert!(zoom.is_open());
        assert_eq!(zoom.digits(), (0, 7));

        zoom.refresh(&face(9, 41, 8));
        assert_eq!(zoom.digits(), (0, 8));

        zoom.hide();
        zoom.refresh(&face(9, 41, 9));
        assert_eq!(zoom.digits(), (0, 8));
    }

    #[test]
    fn label_falls_back_to_english() {
        let mut zoom = ClockZoom::new();
        zoom.show(DigitGroup::Hour, &face(9, 0, 0));
        assert_eq!(zoom.label("ko"), Some("시"));
        assert_eq!(zoom.label("en"), Some("HOUR"));
        assert_eq!(zoom.label("de"), Some("HOUR"));
    }
}
