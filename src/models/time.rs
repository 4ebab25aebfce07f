//! Calendar and slot time model.
//!
//! The tournament calendar is a date range plus per-day-type operating
//! windows. Bookable time is discretized into fixed-duration slot ticks:
//! one tick per match duration from the day's open time, truncated so no
//! tick would run past closing time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minute-of-day time representation (0 = midnight, 1439 = 23:59).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    /// Create from a raw minute-of-day value. Values past the end of the
    /// day are clamped to 23:59.
    pub fn new(minutes: u16) -> Self {
        Self(minutes.min(Self::MINUTES_PER_DAY - 1))
    }

    /// Create from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Self {
        Self::new(hour * 60 + minute)
    }

    /// Raw minute-of-day value.
    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Advance by `minutes`, returning `None` past the end of the day.
    pub fn checked_add(&self, minutes: u16) -> Option<Self> {
        let total = self.0 as u32 + minutes as u32;
        if total >= Self::MINUTES_PER_DAY as u32 {
            None
        } else {
            Some(Self(total as u16))
        }
    }

    /// Parse from `"HH:MM"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid time of day '{}': expected HH:MM", s))?;
        let hour: u16 = h
            .parse()
            .map_err(|_| format!("Invalid hour in '{}'", s))?;
        let minute: u16 = m
            .parse()
            .map_err(|_| format!("Invalid minute in '{}'", s))?;
        if hour >= 24 || minute >= 60 {
            return Err(format!("Time of day '{}' out of range", s));
        }
        Ok(Self::from_hm(hour, minute))
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A bookable slot start: a date plus a start time. Ordering is
/// chronological, which the allocator relies on when scanning candidates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SlotTime {
    pub date: NaiveDate,
    pub start: TimeOfDay,
}

impl SlotTime {
    pub fn new(date: NaiveDate, start: TimeOfDay) -> Self {
        Self { date, start }
    }

    /// Day of week for the slot's date.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    fn as_datetime(&self) -> NaiveDateTime {
        self.date
            .and_hms_opt(self.start.hour() as u32, self.start.minute() as u32, 0)
            .unwrap_or_else(|| self.date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
    }

    /// Absolute distance between two slot starts, in minutes.
    pub fn minutes_between(&self, other: &SlotTime) -> i64 {
        let delta: Duration = self.as_datetime() - other.as_datetime();
        delta.num_minutes().abs()
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.start)
    }
}

/// Open/close window for a playing day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub open: TimeOfDay,
    pub close: TimeOfDay,
}

impl DayWindow {
    pub fn new(open: TimeOfDay, close: TimeOfDay) -> Option<Self> {
        if open < close {
            Some(Self { open, close })
        } else {
            None
        }
    }
}

/// Operating hours for the tournament: one window per day type
/// (weekday/weekend) plus optional specific-date overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub weekday: DayWindow,
    pub weekend: DayWindow,
    /// Specific dates that deviate from their day type (e.g. a holiday).
    #[serde(default)]
    pub overrides: HashMap<NaiveDate, DayWindow>,
}

impl OperatingHours {
    pub fn new(weekday: DayWindow, weekend: DayWindow) -> Self {
        Self {
            weekday,
            weekend,
            overrides: HashMap::new(),
        }
    }

    /// Resolve the open window for a date: specific-day override first,
    /// then the date's day type.
    pub fn window_for(&self, date: NaiveDate) -> DayWindow {
        if let Some(window) = self.overrides.get(&date) {
            return *window;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.weekend,
            _ => self.weekday,
        }
    }
}

/// Inclusive date range for the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Iterate every date in the range, inclusive on both ends.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Enumerate every slot tick in the tournament calendar, chronologically.
///
/// For each date in the range the day's window is resolved and one slot is
/// emitted per `slot_minutes` tick from open time, truncated so that no
/// slot would end after closing time.
pub fn enumerate_slots(
    dates: &DateRange,
    hours: &OperatingHours,
    slot_minutes: u16,
) -> Vec<SlotTime> {
    let mut slots = Vec::new();
    if slot_minutes == 0 {
        return slots;
    }

    for date in dates.days() {
        let window = hours.window_for(date);
        let mut tick = window.open;
        loop {
            let end = match tick.checked_add(slot_minutes) {
                Some(end) => end,
                None => break,
            };
            if end > window.close {
                break;
            }
            slots.push(SlotTime::new(date, tick));
            tick = end;
        }
    }

    slots
}
