//! Opening-hours evaluation
//!
//! Both the requested window and the item's hours are compared in the item's
//! own timezone. Anything that cannot be evaluated (no hours, unknown zone,
//! unparseable times, no entry for the day) counts as open.

use crate::candidate::BusinessHours;
use crate::candidate::hours::{DayHours, parse_minutes};
use crate::filter::criterion::OpenRequirement;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Whether an item stays open for the whole requested window starting at `now`.
pub fn satisfies_requirement(
    hours: Option<&BusinessHours>,
    requirement: &OpenRequirement,
    requester_tz: Tz,
    now: DateTime<Utc>,
) -> bool {
    let Some(hours) = hours else {
        return true;
    };
    let Some(item_tz) = hours.tz() else {
        return true;
    };
    let Some(window) = required_window_minutes(requirement, requester_tz, now) else {
        return true;
    };

    let local = now.with_timezone(&item_tz);
    let start = local.hour() * 60 + local.minute();

    let today = match hours.week.for_weekday(local.weekday()) {
        None => return true,
        Some(day) => day,
    };
    if covers_window(today, start, window, true) {
        return true;
    }

    // Hours that opened yesterday may still run past midnight.
    hours
        .week
        .for_weekday(local.weekday().pred())
        .is_some_and(|yesterday| covers_window(yesterday, start + MINUTES_PER_DAY, window, false))
}

/// Length of the requested window in minutes, or `None` if it cannot be computed.
fn required_window_minutes(
    requirement: &OpenRequirement,
    requester_tz: Tz,
    now: DateTime<Utc>,
) -> Option<i64> {
    match requirement {
        OpenRequirement::OpenFor { minutes } => Some(i64::from(*minutes)),
        OpenRequirement::OpenUntil { time, timezone } => {
            let tz = match timezone {
                Some(name) => name.parse::<Tz>().ok()?,
                None => requester_tz,
            };
            let minutes = parse_minutes(time)?;
            let target_time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;

            let local_now = now.with_timezone(&tz);
            let mut target = tz
                .from_local_datetime(&local_now.date_naive().and_time(target_time))
                .earliest()?;
            if target < local_now {
                target = target + Duration::days(1);
            }
            Some((target.with_timezone(&Utc) - now).num_minutes())
        }
    }
}

/// Check a window against one day's hours.
///
/// With `wrap_early_start`, a start before opening time on a midnight-crossing
/// day is read as belonging to the tail end of that day's hours. An
/// around-the-clock day covers any window up to 24 hours.
fn covers_window(day: &DayHours, start: u32, window: i64, wrap_early_start: bool) -> bool {
    if day.closed {
        return false;
    }
    let Some((open, close)) = day.interval_minutes() else {
        return wrap_early_start;
    };
    if close - open == MINUTES_PER_DAY {
        return window <= i64::from(MINUTES_PER_DAY);
    }

    let mut start = start;
    if wrap_early_start && start < open && close > MINUTES_PER_DAY {
        start += MINUTES_PER_DAY;
    }
    let end = i64::from(start) + window;
    open <= start && end <= i64::from(close)
}
