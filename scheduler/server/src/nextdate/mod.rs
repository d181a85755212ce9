//! Recurrence engine for scheduled tasks.
//!
//! This module computes the next occurrence of a recurring task from its last
//! scheduled date, a reference "now" and a repeat rule string. It includes:
//! - The repeat rule grammar (`y`, `d N`, `w D,...`, `m D,... [M,...]`)
//! - [`next_date`], which rolls a date forward according to a rule
//! - [`normalize_date`], which settles the date stored for a created or updated task
//!
//! The engine and the normalization policy are pure: no I/O, no logging, no
//! shared state. Callers own the clock and pass "now" as a calendar date. The
//! HTTP calculator endpoint lives in [`api`].

use chrono::{Datelike, NaiveDate};

pub mod api;
mod normalize;
mod rule;

pub use normalize::normalize_date;
pub use rule::{MAX_DAY_INTERVAL, Rule};

/// Storage and wire format of task dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Errors produced while parsing dates or repeat rules, or computing the next date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NextDateError {
    /// The date is not an eight digit `YYYYMMDD` calendar date.
    #[error("Malformed date {0:?}, expected YYYYMMDD")]
    MalformedInput(String),
    /// The rule kind is known but its arguments are out of domain.
    #[error("Invalid repeat rule: {0}")]
    InvalidRule(String),
    /// The rule kind token is not one of `y`, `d`, `w`, `m`.
    #[error("Unsupported repeat rule {0:?}")]
    UnsupportedRule(String),
    /// A rule was required but none was given.
    #[error("Repeat rule is empty")]
    EmptyRule,
}

/// Parses a `YYYYMMDD` string into a calendar date.
///
/// Exactly eight ASCII digits are accepted; anything else, including dates that
/// do not exist such as `20230229`, is [`NextDateError::MalformedInput`].
pub fn parse_date(value: &str) -> Result<NaiveDate, NextDateError> {
    if value.len() != 8 || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(NextDateError::MalformedInput(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| NextDateError::MalformedInput(value.to_string()))
}

/// Formats a calendar date as `YYYYMMDD`.
///
/// Years past 9999 do not fit the format and are rejected so that every
/// returned string parses back with [`parse_date`].
pub fn format_date(date: NaiveDate) -> Result<String, NextDateError> {
    if !(0..=9999).contains(&date.year()) {
        return Err(NextDateError::InvalidRule(format!(
            "next date {date} does not fit YYYYMMDD"
        )));
    }
    Ok(date.format(DATE_FORMAT).to_string())
}

/// Computes the next occurrence of a task last scheduled on `last_date`.
///
/// # Arguments
///
/// * `now` - The reference date, already truncated to the calendar day.
/// * `last_date` - The task's current date in `YYYYMMDD` form.
/// * `repeat` - The repeat rule; must not be empty.
///
/// # Returns
///
/// The next date in `YYYYMMDD` form, or the classified error.
pub fn next_date(now: NaiveDate, last_date: &str, repeat: &str) -> Result<String, NextDateError> {
    let last = parse_date(last_date)?;
    let rule: Rule = repeat.parse()?;
    format_date(rule.next_after(now, last)?)
}

/// Adds whole years the way a calendar does: Feb 29 moved into a common year
/// rolls over to Mar 1.
pub(crate) fn add_years(date: NaiveDate, years: i32) -> Result<NaiveDate, NextDateError> {
    let year = date.year().checked_add(years).ok_or_else(out_of_range)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or_else(out_of_range)
}

pub(crate) fn out_of_range() -> NextDateError {
    NextDateError::InvalidRule("date arithmetic left the supported calendar range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, Weekday};
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[rstest]
    #[case("20240126", "20240125", "d 1", "20240127")]
    #[case("20240126", "20240113", "d 7", "20240127")]
    #[case("20240126", "20240120", "d 20", "20240209")]
    #[case("20240126", "20240202", "d 30", "20240303")]
    #[case("20240126", "20231106", "d 400", "20241210")]
    #[case("20240126", "20240126", "d 1", "20240127")]
    #[case("20240126", "20240229", "y", "20250301")]
    #[case("20240126", "20231113", "y", "20241113")]
    #[case("20240126", "20200101", "y", "20240101")]
    #[case("20240126", "20270605", "y", "20280605")]
    #[case("20240126", "20240125", "w 1,2,3", "20240129")]
    #[case("20240126", "20240126", "w 5", "20240126")]
    #[case("20240126", "20240126", "w 7", "20240128")]
    #[case("20240126", "20230126", "m 1,31", "20240131")]
    #[case("20240126", "20240125", "m -1", "20240131")]
    #[case("20240126", "20240125", "m -2", "20240130")]
    #[case("20240126", "20240125", "m 3 1,3,6", "20240303")]
    #[case("20240126", "20240126", "m 26", "20240126")]
    #[case("20240126", "20240201", "m -1,18", "20240218")]
    #[case("20240126", "20240125", "m -1 2", "20240229")]
    #[case("20240126", "20240125", "m 10,17 12,8,1", "20240810")]
    #[case("20240126", "20240125", "m 29 2", "20240229")]
    #[case("20250301", "20250101", "m 29 2", "20280229")]
    fn computes_next_date(
        #[case] now: &str,
        #[case] last: &str,
        #[case] repeat: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(next_date(date(now), last, repeat).unwrap(), expected);
    }

    #[rstest]
    #[case("2024012", "d 1")]
    #[case("2024-01-26", "d 1")]
    #[case("20240230", "d 1")]
    #[case("", "y")]
    #[case("+2024012", "y")]
    fn rejects_malformed_last_date(#[case] last: &str, #[case] repeat: &str) {
        assert!(matches!(
            next_date(date("20240126"), last, repeat),
            Err(NextDateError::MalformedInput(_))
        ));
    }

    #[test]
    fn rejects_empty_rule_after_checking_the_date() {
        let now = date("20240126");
        assert_eq!(next_date(now, "20240126", ""), Err(NextDateError::EmptyRule));
        assert!(matches!(
            next_date(now, "bogus", ""),
            Err(NextDateError::MalformedInput(_))
        ));
    }

    #[rstest]
    #[case("d 0")]
    #[case("d 401")]
    #[case("d -1")]
    #[case("d x")]
    #[case("d")]
    #[case("m -3")]
    #[case("m 31 2")]
    fn rejects_invalid_rules(#[case] repeat: &str) {
        assert!(matches!(
            next_date(date("20240126"), "20240126", repeat),
            Err(NextDateError::InvalidRule(_))
        ));
    }

    #[test]
    fn rejects_unsupported_rule_kind() {
        assert_eq!(
            next_date(date("20240126"), "20240126", "k 34"),
            Err(NextDateError::UnsupportedRule("k".to_string()))
        );
    }

    #[test]
    fn yearly_rule_reapplied_moves_forward_a_year() {
        let now = date("20240126");
        let first = next_date(now, "20100615", "y").unwrap();
        let second = next_date(now, &first, "y").unwrap();
        assert_eq!(first, "20240615");
        assert_eq!(second, "20250615");
    }

    #[test]
    fn adds_years_across_leap_days() {
        assert_eq!(add_years(date("20240229"), 1).unwrap(), date("20250301"));
        assert_eq!(add_years(date("20240229"), 4).unwrap(), date("20280229"));
        assert_eq!(add_years(date("20230315"), 1).unwrap(), date("20240315"));
    }

    #[test]
    fn refuses_dates_past_year_9999() {
        assert!(matches!(
            next_date(date("99991231"), "99991231", "d 2"),
            Err(NextDateError::InvalidRule(_))
        ));
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2060, 1u32..=12, 1u32..=28)
            .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    proptest! {
        #[test]
        fn every_n_days_lands_after_now_on_a_multiple(
            now in any_date(),
            last in any_date(),
            interval in 1u32..=400,
        ) {
            let last_date = format_date(last).unwrap();
            let next = next_date(now, &last_date, &format!("d {interval}")).unwrap();
            let next = parse_date(&next).unwrap();
            prop_assert!(next > now);
            let distance = next.signed_duration_since(last).num_days();
            prop_assert!(distance > 0);
            prop_assert_eq!(distance % i64::from(interval), 0);
            let previous = next.checked_sub_days(Days::new(u64::from(interval))).unwrap();
            prop_assert!(previous <= now.max(last));
        }

        #[test]
        fn weekly_rule_returns_earliest_matching_weekday(now in any_date(), last in any_date()) {
            let last_date = format_date(last).unwrap();
            let next = parse_date(&next_date(now, &last_date, "w 1,7").unwrap()).unwrap();
            prop_assert!(matches!(next.weekday(), Weekday::Mon | Weekday::Sun));
            prop_assert!(next >= now);
            let mut day = now.max(last);
            while day < next {
                prop_assert!(!matches!(day.weekday(), Weekday::Mon | Weekday::Sun));
                day = day.succ_opt().unwrap();
            }
        }

        #[test]
        fn last_day_rule_returns_a_month_end(now in any_date(), last in any_date()) {
            let last_date = format_date(last).unwrap();
            let next = parse_date(&next_date(now, &last_date, "m -1").unwrap()).unwrap();
            prop_assert!(next >= now);
            prop_assert_eq!(next.succ_opt().unwrap().day(), 1);
        }

        #[test]
        fn minus_three_is_always_rejected(now in any_date(), last in any_date()) {
            let result = next_date(now, &format_date(last).unwrap(), "m -3");
            prop_assert!(matches!(result, Err(NextDateError::InvalidRule(_))));
        }

        #[test]
        fn yearly_result_reaches_the_current_year(now in any_date(), last in any_date()) {
            let first = next_date(now, &format_date(last).unwrap(), "y").unwrap();
            let first_date = parse_date(&first).unwrap();
            prop_assert!(first_date.year() >= now.year());
            let second = parse_date(&next_date(now, &first, "y").unwrap()).unwrap();
            prop_assert!(second.year() > first_date.year());
        }
    }
}
