//! Weekly recurrence expansion and calendar helpers.
//!
//! Weekdays are numbered 0 (Sunday) through 6 (Saturday). Expansion anchors
//! week zero to the first matching weekday on or after the start date, so a
//! lesson configured mid-week never produces dates before its start.

use crate::error::CoreError;
use chrono::{Datelike, Duration, NaiveDate};

/// Validates that every weekday lies in 0 (Sunday) through 6 (Saturday).
///
/// An empty set is valid: it means the lesson has no recurrence configured
/// yet and expands to nothing.
pub fn validate_weekdays(weekdays: &[i64]) -> Result<(), CoreError> {
    for &day in weekdays {
        if !(0..=6).contains(&day) {
            return Err(CoreError::InvalidInput(format!(
                "weekday {} is out of range 0-6",
                day
            )));
        }
    }
    Ok(())
}

/// Expands a weekly pattern into concrete dates.
///
/// For each weekday in the caller-supplied order, for each week in
/// `[0, week_count)`, the candidate date is
/// `start_date + ((weekday - start_date.weekday + 7) mod 7) + week * 7` days.
/// Iteration is weekday-then-week, so each weekday's own subsequence is
/// strictly increasing in 7-day steps. Weekday range is validated by callers.
pub fn expand_weekly(start_date: NaiveDate, weekdays: &[i64], week_count: u32) -> Vec<NaiveDate> {
    let start_weekday = start_date.weekday().num_days_from_sunday() as i64;
    let mut dates = Vec::with_capacity(weekdays.len() * week_count as usize);

    for &weekday in weekdays {
        let offset = (weekday - start_weekday).rem_euclid(7);
        for week in 0..week_count as i64 {
            dates.push(start_date + Duration::days(offset + week * 7));
        }
    }

    dates
}

/// Monday-to-Sunday window containing `anchor`.
pub fn week_bounds(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}
