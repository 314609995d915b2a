use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::storage::TimeFormat;

/// Position of a single flip card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitSlot {
    Hour1,
    Hour2,
    Min1,
    Min2,
    Sec1,
    Sec2,
}

impl DigitSlot {
    pub const ALL: [DigitSlot; 6] = [
        DigitSlot::Hour1,
        DigitSlot::Hour2,
        DigitSlot::Min1,
        DigitSlot::Min2,
        DigitSlot::Sec1,
        DigitSlot::Sec2,
    ];

    fn index(&self) -> usize {
        match self {
            DigitSlot::Hour1 => 0,
            DigitSlot::Hour2 => 1,
            DigitSlot::Min1 => 2,
            DigitSlot::Min2 => 3,
            DigitSlot::Sec1 => 4,
            DigitSlot::Sec2 => 5,
        }
    }
}

/// A pair of cards showing one time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitGroup {
    Hour,
    Minute,
    Second,
}

impl DigitGroup {
    pub fn slots(&self) -> (DigitSlot, DigitSlot) {
        match self {
            DigitGroup::Hour => (DigitSlot::Hour1, DigitSlot::Hour2),
            DigitGroup::Minute => (DigitSlot::Min1, DigitSlot::Min2),
            DigitGroup::Second => (DigitSlot::Sec1, DigitSlot::Sec2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

/// The six digits of a time of day, plus AM/PM in 12-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFace {
    digits: [u8; 6],
    meridiem: Option<Meridiem>,
}

impl ClockFace {
    pub fn at<T: Timelike>(time: &T, format: TimeFormat) -> Self {
        let mut hour = time.hour();
        let meridiem = match format {
            TimeFormat::H24 => None,
            TimeFormat::H12 => {
                let m = if hour >= 12 { Meridiem::Pm } else { Meridiem::Am };
                hour %= 12;
                if hour == 0 {
                    hour = 12;
                }
                Some(m)
            }
        };
        let (minute, second) = (time.minute(), time.second());
        Self {
            digits: [
                (hour / 10) as u8,
                (hour % 10) as u8,
                (minute / 10) as u8,
                (minute % 10) as u8,
                (second / 10) as u8,
                (second % 10) as u8,
            ],
            meridiem,
        }
    }

    pub fn digit(&self, slot: DigitSlot) -> u8 {
        self.digits[slot.index()]
    }

    pub fn pair(&self, group: DigitGroup) -> (u8, u8) {
        let (a, b) = group.slots();
        (self.digit(a), self.digit(b))
    }

    pub fn meridiem(&self) -> Option<Meridiem> {
        self.meridiem
    }

    /// `HH:MM:SS` (or `HH:MM`), followed by the meridiem when present.
    pub fn render(&self, show_seconds: bool) -> String {
        let d = &self.digits;
        let mut out = format!("{}{}:{}{}", d[0], d[1], d[2], d[3]);
        if show_seconds {
            out.push_str(&format!(":{}{}", d[4], d[5]));
        }
        if let Some(m) = self.meridiem {
            out.push(' ');
            out.push_str(m.as_str());
        }
        out
    }
}

/// Tracks the last shown face so only changed cards flip.
#[derive(Debug, Default)]
pub struct FlipClock {
    last: Option<ClockFace>,
}

impl FlipClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `face`, returning the slots whose card must flip.
    pub fn update(&mut self, face: ClockFace) -> Vec<DigitSlot> {
        let flipped = DigitSlot::ALL
            .into_iter()
            .filter(|slot| {
                self.last
                    .map_or(true, |last| last.digit(*slot) != face.digit(*slot))
            })
            .collect();
        self.last = Some(face);
        flipped
    }

    pub fn current(&self) -> Option<&ClockFace> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn twenty_four_hour_face() {
        let face = ClockFace::at(&t(21, 5, 9), TimeFormat::H24);
        assert_eq!(face.render(true), "21:05:09");
        assert_eq!(face.meridiem(), None);
        assert_eq!(face.pair(DigitGroup::Minute), (0, 5));
    }

    #[test]
    fn twelve_hour_face_wraps_hours() {
        assert_eq!(ClockFace::at(&t(0, 0, 0), TimeFormat::H12).render(true), "12:00:00 AM");
        assert_eq!(ClockFace::at(&t(12, 30, 0), TimeFormat::H12).render(false), "12:30 PM");
        assert_eq!(ClockFace::at(&t(13, 1, 2), TimeFormat::H12).render(true), "01:01:02 PM");
        assert_eq!(ClockFace::at(&t(11, 59, 59), TimeFormat::H12).render(true), "11:59:59 AM");
    }

    #[test]
    fn first_update_flips_everything() {
        let mut clock = FlipClock::new();
        let flipped = clock.update(ClockFace::at(&t(10, 0, 0), TimeFormat::H24));
        assert_eq!(flipped, DigitSlot::ALL.to_vec());
    }

    #[test]
    fn only_changed_digits_flip() {
        let mut clock = FlipClock::new();
        clock.update(ClockFace::at(&t(10, 59, 59), TimeFormat::H24));

        let flipped = clock.update(ClockFace::at(&t(11, 0, 0), TimeFormat::H24));
        assert_eq!(
            flipped,
            vec![
                DigitSlot::Hour2,
                DigitSlot::Min1,
                DigitSlot::Min2,
                DigitSlot::Sec1,
                DigitSlot::Sec2
            ]
        );

        let flipped = clock.update(ClockFace::at(&t(11, 0, 1), TimeFormat::H24));
        assert_eq!(flipped, vec![DigitSlot::Sec2]);

        assert!(clock.update(ClockFace::at(&t(11, 0, 1), TimeFormat::H24)).is_empty());
    }
}
