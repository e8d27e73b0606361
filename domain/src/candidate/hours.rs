//! Business hours
//!
//! Hours are optional at every level. An item without hours, or a weekday
//! without an entry, is treated as open; only an explicit entry can make an
//! item count as closed.

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Opening and closing time for a single weekday, as `HH:MM` in the item's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
    /// Explicitly closed all day
    #[serde(default)]
    pub closed: bool,
}

impl DayHours {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            closed: false,
        }
    }

    pub fn closed() -> Self {
        Self {
            open: String::new(),
            close: String::new(),
            closed: true,
        }
    }

    /// Open interval in minutes after local midnight.
    ///
    /// A close time earlier than the open time belongs to the next day and is
    /// shifted by 24 hours. Equal open and close times mean open around the
    /// clock. Returns `None` if either time cannot be parsed.
    pub fn interval_minutes(&self) -> Option<(u32, u32)> {
        let open = parse_minutes(&self.open)?;
        let close = parse_minutes(&self.close)?;

        let close = if close <= open {
            close + MINUTES_PER_DAY
        } else {
            close
        };
        Some((open, close))
    }
}

/// Per-weekday hours. A missing day means "no information" and is treated as open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyHours {
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
    pub sunday: Option<DayHours>,
}

impl WeeklyHours {
    /// Same hours every day of the week.
    pub fn every_day(hours: DayHours) -> Self {
        Self {
            monday: Some(hours.clone()),
            tuesday: Some(hours.clone()),
            wednesday: Some(hours.clone()),
            thursday: Some(hours.clone()),
            friday: Some(hours.clone()),
            saturday: Some(hours.clone()),
            sunday: Some(hours),
        }
    }

    pub fn for_weekday(&self, day: Weekday) -> Option<&DayHours> {
        match day {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    pub fn set(&mut self, day: Weekday, hours: DayHours) {
        let slot = match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = Some(hours);
    }
}

/// Weekly hours together with the IANA timezone they are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub timezone: String,
    #[serde(default)]
    pub week: WeeklyHours,
}

impl BusinessHours {
    pub fn new(timezone: impl Into<String>, week: WeeklyHours) -> Self {
        Self {
            timezone: timezone.into(),
            week,
        }
    }

    /// The parsed timezone, or `None` if the name is not a known IANA zone.
    pub fn tz(&self) -> Option<Tz> {
        self.timezone.parse().ok()
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`) into minutes after midnight.
pub fn parse_minutes(value: &str) -> Option<u32> {
    use chrono::Timelike;

    let value = value.trim();
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()?;
    Some(time.hour() * 60 + time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("00:00"), Some(0));
        assert_eq!(parse_minutes("09:30"), Some(570));
        assert_eq!(parse_minutes(" 22:00 "), Some(1320));
        assert_eq!(parse_minutes("23:59:00"), Some(1439));
        assert_eq!(parse_minutes("25:00"), None);
        assert_eq!(parse_minutes("noon"), None);
    }

    #[test]
    fn test_interval_regular_day() {
        assert_eq!(DayHours::new("11:00", "22:00").interval_minutes(), Some((660, 1320)));
    }

    #[test]
    fn test_interval_crossing_midnight() {
        // 22:00 - 02:00 closes at 26:00 relative to the opening day
        assert_eq!(DayHours::new("22:00", "02:00").interval_minutes(), Some((1320, 1560)));
    }

    #[test]
    fn test_interval_around_the_clock() {
        assert_eq!(DayHours::new("00:00", "00:00").interval_minutes(), Some((0, 1440)));
    }

    #[test]
    fn test_interval_unparseable() {
        assert_eq!(DayHours::new("9am", "5pm").interval_minutes(), None);
    }

    #[test]
    fn test_weekly_lookup() {
        let mut week = WeeklyHours::default();
        week.set(Weekday::Fri, DayHours::new("10:00", "23:00"));

        assert!(week.for_weekday(Weekday::Fri).is_some());
        assert!(week.for_weekday(Weekday::Mon).is_none());
        assert!(WeeklyHours::every_day(DayHours::closed())
            .for_weekday(Weekday::Sun)
            .is_some_and(|d| d.closed));
    }

    #[test]
    fn test_timezone_parsing() {
        assert!(BusinessHours::new("Europe/Berlin", WeeklyHours::default()).tz().is_some());
        assert!(BusinessHours::new("Mars/Olympus", WeeklyHours::default()).tz().is_none());
    }

    #[test]
    fn test_deserialize_partial_week() {
        let hours: BusinessHours = serde_json::from_str(
            r#"{"timezone": "UTC", "week": {"monday": {"open": "09:00", "close": "17:00"}}}"#,
        )
        .unwrap();
        assert!(hours.week.monday.is_some());
        assert!(hours.week.tuesday.is_none());
    }
}
