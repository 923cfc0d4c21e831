//! Clock, weekday and week-key arithmetic.
//!
//! Everything the planner needs about time is day-of-week plus minute-of-day.
//! There is no timezone handling; "current week" uses the local date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minute-of-day, serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Build from a possibly out-of-range minute count, clamping into the day.
    pub fn saturating_from(minutes: i32) -> Self {
        Self(minutes.clamp(0, i32::from(MINUTES_PER_DAY) - 1) as u16)
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Parse a `HH:MM` string. Single-digit hours (`9:30`) are accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let (h, m) = text.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        let hour: u16 = h.parse().ok()?;
        let minute: u16 = m.parse().ok()?;
        Self::from_hm(hour, minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::InvalidClockTime(s.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Day of the planner week, 0 = Monday ... 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MON: DayOfWeek = DayOfWeek(0);
    pub const TUE: DayOfWeek = DayOfWeek(1);
    pub const WED: DayOfWeek = DayOfWeek(2);
    pub const THU: DayOfWeek = DayOfWeek(3);
    pub const FRI: DayOfWeek = DayOfWeek(4);
    pub const SAT: DayOfWeek = DayOfWeek(5);
    pub const SUN: DayOfWeek = DayOfWeek(6);

    pub const ALL: [DayOfWeek; 7] = [
        Self::MON,
        Self::TUE,
        Self::WED,
        Self::THU,
        Self::FRI,
        Self::SAT,
        Self::SUN,
    ];

    pub fn new(index: u8) -> Option<Self> {
        (index < 7).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_monday() as u8)
    }

    pub fn to_weekday(self) -> Weekday {
        match self.0 {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_weekday())
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ValidationError::InvalidDay(value))
    }
}

/// Accepts a day index (`0` = Monday) or a weekday name such as `tue`.
impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<u8>() {
            return Self::try_from(index);
        }
        s.parse::<Weekday>()
            .map(Self::from_weekday)
            .map_err(|_| ValidationError::InvalidValue {
                field: "day".to_string(),
                message: format!("'{s}' is neither 0..=6 nor a weekday name"),
            })
    }
}

impl From<DayOfWeek> for u8 {
    fn from(value: DayOfWeek) -> Self {
        value.0
    }
}

/// ISO week identifier, `YYYY-Www`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
        Some(Self { year, week })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Week containing today's local date.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn week(self) -> u32 {
        self.week
    }

    /// Monday of this week.
    pub fn week_start(self) -> NaiveDate {
        // Construction guarantees the ISO week exists.
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon).unwrap_or_default()
    }

    pub fn date_of(self, day: DayOfWeek) -> NaiveDate {
        add_days(self.week_start(), i64::from(day.index()))
    }

    pub fn next(self) -> Self {
        Self::from_date(add_days(self.week_start(), 7))
    }

    pub fn previous(self) -> Self {
        Self::from_date(add_days(self.week_start(), -7))
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidWeekKey(s.to_string());
        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;
        Self::new(year, week).ok_or_else(invalid)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(value: WeekKey) -> Self {
        value.to_string()
    }
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Whole days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Round `minutes` up to the next multiple of `snap`.
pub fn snap_up(minutes: i32, snap: i32) -> i32 {
    if snap <= 1 {
        return minutes;
    }
    let rem = minutes.rem_euclid(snap);
    if rem == 0 {
        minutes
    } else {
        minutes + snap - rem
    }
}

/// Round `minutes` down to the previous multiple of `snap`.
pub fn snap_down(minutes: i32, snap: i32) -> i32 {
    if snap <= 1 {
        return minutes;
    }
    minutes - minutes.rem_euclid(snap)
}
