use chrono::NaiveDate;

use super::{NextDateError, Rule, add_years, format_date, parse_date};

/// Rule strings that get special treatment; other spellings of the same rule
/// roll forward like any other rule.
const DAILY_RULE: &str = "d 1";
const YEARLY_RULE: &str = "y";

/// Decides the date stored for a task being created or updated.
///
/// A non-empty `repeat` must parse even when the date needs no adjustment.
/// Dates today or later are kept as given. Past dates become today for one-off
/// tasks and for the exact rule `d 1`, and roll forward with the rule
/// otherwise; with the exact rule `y`, a next anniversary that already passed
/// this year moves one year further.
///
/// # Arguments
///
/// * `now` - Today's date.
/// * `date` - The requested date in `YYYYMMDD` form, or empty for today.
/// * `repeat` - The task's repeat rule, or empty for a one-off task.
pub fn normalize_date(now: NaiveDate, date: &str, repeat: &str) -> Result<String, NextDateError> {
    let rule = if repeat.is_empty() {
        None
    } else {
        Some(repeat.parse::<Rule>()?)
    };

    if date.is_empty() {
        return format_date(now);
    }
    let requested = parse_date(date)?;
    if requested >= now {
        return Ok(date.to_string());
    }

    let Some(rule) = rule else {
        return format_date(now);
    };
    let candidate = rule.next_after(now, requested)?;
    match repeat {
        DAILY_RULE => format_date(now),
        YEARLY_RULE if candidate < now => format_date(add_years(candidate, 1)?),
        _ => format_date(candidate),
    }
}
