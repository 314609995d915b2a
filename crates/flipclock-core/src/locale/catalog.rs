//! Built-in string tables.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::storage::TimeFormat;

/// Locales with a shipped catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Ko,
    En,
}

impl Locale {
    /// Locale every lookup falls back to.
    pub const PRIMARY: Locale = Locale::Ko;

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ko" => Some(Locale::Ko),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }

    /// Customary clock format of the locale.
    pub fn default_time_format(&self) -> TimeFormat {
        match self {
            Locale::Ko => TimeFormat::H24,
            Locale::En => TimeFormat::H12,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        match self {
            Locale::Ko => ko(key),
            Locale::En => en(key),
        }
    }

    pub fn weekday_name(&self, day: Weekday) -> &'static str {
        let idx = day.num_days_from_sunday() as usize;
        match self {
            Locale::Ko => ["일요일", "월요일", "화요일", "수요일", "목요일", "금요일", "토요일"][idx],
            Locale::En => [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ][idx],
        }
    }

    /// Long-form date, e.g. `2026년 10월 19일 월요일` or `Monday, October 19, 2026`.
    pub fn format_date(&self, date: NaiveDate) -> String {
        let day = self.weekday_name(date.weekday());
        match self {
            Locale::Ko => format!(
                "{}년 {}월 {}일 {}",
                date.year(),
                date.month(),
                date.day(),
                day
            ),
            Locale::En => format!(
                "{}, {} {}, {}",
                day,
                MONTHS_EN[date.month0() as usize],
                date.day(),
                date.year()
            ),
        }
    }
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn ko(key: &str) -> Option<&'static str> {
    Some(match key {
        "work" => "작업",
        "break" => "휴식",
        "start" => "시작",
        "pause" => "일시정지",
        "reset" => "리셋",
        "continue" => "계속",
        "settings" => "설정",
        "timeFormat" => "시간 형식",
        "hour12" => "12시간",
        "hour24" => "24시간",
        "workTime" => "작업 시간 (분)",
        "breakTime" => "휴식 시간 (분)",
        "sound" => "알림음",
        "language" => "언어",
        "close" => "닫기",
        "openSettings" => "설정 열기",
        "clock" => "시계",
        "timer" => "타이머",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    Some(match key {
        "work" => "Work",
        "break" => "Break",
        "start" => "Start",
        "pause" => "Pause",
        "reset" => "Reset",
        "continue" => "Continue",
        "settings" => "Settings",
        "timeFormat" => "Time Format",
        "hour12" => "12 Hour",
        "hour24" => "24 Hour",
        "workTime" => "Work Time (min)",
        "breakTime" => "Break Time (min)",
        "sound" => "Sound",
        "language" => "Language",
        "close" => "Close",
        "openSettings" => "Open Settings",
        "clock" => "Clock",
        "timer" => "Timer",
        _ => return None,
    })
}
