use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use super::{NextDateError, add_years, out_of_range};

/// Largest interval accepted by the `d N` rule.
pub const MAX_DAY_INTERVAL: u32 = 400;

/// Upper bound on day-by-day scans. Eight years covers Feb 29 across a
/// skipped century leap year.
const MAX_SCAN_DAYS: u32 = 366 * 8;

/// A parsed repeat rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `y`: same day every year.
    Yearly,
    /// `d N`: every N days.
    EveryNDays(u32),
    /// `w D1,D2,...`: on ISO weekdays, 1 is Monday and 7 is Sunday.
    WeeklyOn(BTreeSet<u32>),
    /// `m D1,D2,... [M1,M2,...]`: on days of the month, negative days count
    /// back from the month end, optionally restricted to some months.
    MonthlyOn {
        days: BTreeSet<i32>,
        months: BTreeSet<u32>,
    },
}

impl FromStr for Rule {
    type Err = NextDateError;

    fn from_str(repeat: &str) -> Result<Self, Self::Err> {
        let mut tokens = repeat.split_whitespace();
        let Some(kind) = tokens.next() else {
            return Err(NextDateError::EmptyRule);
        };

        match kind {
            "y" => Ok(Rule::Yearly),
            "d" => {
                let interval = required_argument(tokens.next(), "d", "a number of days")?;
                let interval: i64 = interval.parse().map_err(|_| {
                    invalid(format!("{interval:?} is not a number of days"))
                })?;
                if !(1..=i64::from(MAX_DAY_INTERVAL)).contains(&interval) {
                    return Err(invalid(format!(
                        "day interval {interval} is outside 1..={MAX_DAY_INTERVAL}"
                    )));
                }
                Ok(Rule::EveryNDays(interval as u32))
            }
            "w" => {
                let weekdays = required_argument(tokens.next(), "w", "a list of weekdays")?;
                let weekdays = parse_list(weekdays, "weekday", |day| (1..=7).contains(&day))?;
                Ok(Rule::WeeklyOn(
                    weekdays.into_iter().map(|day| day as u32).collect(),
                ))
            }
            "m" => {
                let days = required_argument(tokens.next(), "m", "a list of days")?;
                let days = parse_list(days, "day of month", |day| {
                    day != 0 && day != -3 && (-31..=31).contains(&day)
                })?;
                let months = match tokens.next() {
                    Some(months) => parse_list(months, "month", |month| (1..=12).contains(&month))?
                        .into_iter()
                        .map(|month| month as u32)
                        .collect(),
                    None => BTreeSet::new(),
                };
                Ok(Rule::MonthlyOn { days, months })
            }
            other => Err(NextDateError::UnsupportedRule(other.to_string())),
        }
    }
}

impl Rule {
    /// Finds the next occurrence after `last` relative to `now`.
    ///
    /// `y` keeps adding a year until the year reaches `now`'s year. `d N` stops
    /// strictly after `now`. `w` and `m` return the first matching day on or
    /// after both `last` and `now`.
    pub fn next_after(&self, now: NaiveDate, last: NaiveDate) -> Result<NaiveDate, NextDateError> {
        match self {
            Rule::Yearly => {
                let mut next = add_years(last, 1)?;
                while next.year() < now.year() {
                    next = add_years(next, 1)?;
                }
                Ok(next)
            }
            Rule::EveryNDays(interval) => {
                let interval = u64::from(*interval);
                let steps = if last > now {
                    1
                } else {
                    now.signed_duration_since(last).num_days() as u64 / interval + 1
                };
                last.checked_add_days(Days::new(steps * interval))
                    .ok_or_else(out_of_range)
            }
            Rule::WeeklyOn(weekdays) => scan(last.max(now), |candidate| {
                weekdays.contains(&candidate.weekday().number_from_monday())
            }),
            Rule::MonthlyOn { days, months } => scan(last.max(now), |candidate| {
                (months.is_empty() || months.contains(&candidate.month()))
                    && days
                        .iter()
                        .any(|&day| resolve_day(candidate, day) == Some(candidate.day()))
            }),
        }
    }
}

/// Walks forward one day at a time from `start` (inclusive) until `matches`.
fn scan(start: NaiveDate, matches: impl Fn(NaiveDate) -> bool) -> Result<NaiveDate, NextDateError> {
    let mut candidate = start;
    for _ in 0..=MAX_SCAN_DAYS {
        if matches(candidate) {
            return Ok(candidate);
        }
        candidate = candidate.succ_opt().ok_or_else(out_of_range)?;
    }
    Err(invalid(format!(
        "no matching date within {MAX_SCAN_DAYS} days of {start}"
    )))
}

/// Resolves a rule day against the month of `date`; `-1` is the last day.
fn resolve_day(date: NaiveDate, day: i32) -> Option<u32> {
    if day > 0 {
        return Some(day as u32);
    }
    let target = days_in_month(date) as i32 + day + 1;
    (target >= 1).then_some(target as u32)
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first_of_next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    first_of_next_month
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

fn required_argument<'a>(
    argument: Option<&'a str>,
    kind: &str,
    what: &str,
) -> Result<&'a str, NextDateError> {
    argument.ok_or_else(|| invalid(format!("rule {kind:?} needs {what}")))
}

fn parse_list(
    list: &str,
    what: &str,
    is_valid: impl Fn(i32) -> bool,
) -> Result<BTreeSet<i32>, NextDateError> {
    list.split(',')
        .map(|item| {
            let value: i32 = item
                .parse()
                .map_err(|_| invalid(format!("{item:?} is not a valid {what}")))?;
            if is_valid(value) {
                Ok(value)
            } else {
                Err(invalid(format!("{value} is not a valid {what}")))
            }
        })
        .collect()
}

fn invalid(reason: String) -> NextDateError {
    NextDateError::InvalidRule(reason)
}
