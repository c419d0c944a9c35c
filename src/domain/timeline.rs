//! Timeline arithmetic for the 8-week journey.
//!
//! Everything here is a pure function of `(start_date, now)`: the host picks
//! the refresh cadence and passes `now` in (usually via a [`Clock`]); calling
//! twice with the same inputs yields the same outputs.
//!
//! The journey spans exactly 56 days anchored at the start date. Week `w`
//! runs from `start + (w-1)*7d` through `start + (w-1)*7d + 6d`; comparisons
//! use full date-times, so a week turns `Past` the instant `now` crosses its
//! end.
//!
//! [`Clock`]: crate::domain::clock::Clock

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Number of weeks in a journey.
pub const JOURNEY_WEEKS: u8 = 8;
/// Total journey length in days.
pub const JOURNEY_DAYS: i64 = JOURNEY_WEEKS as i64 * 7;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;
const JOURNEY_MS: i64 = JOURNEY_DAYS * MS_PER_DAY;

/// Classification of a week relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStatus {
    Upcoming,
    Current,
    Past,
}

/// First and last day of a week, as date-times offset from the start date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekDateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Whole-journey temporal state derived from `(start_date, now)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    /// Current week number, clamped to 1..=8.
    pub current_week: u8,
    /// Elapsed share of the 56-day span, 0.0..=100.0.
    pub progress_percent: f64,
    /// Whole days left until the journey end, never negative.
    pub days_remaining: i64,
}

/// Derive the whole-journey snapshot. With no start date the journey has
/// not begun: week 1, zero progress, the full 56 days remaining.
pub fn snapshot(start_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimelineSnapshot {
    let start = match start_date {
        Some(start) => start,
        None => {
            return TimelineSnapshot {
                current_week: 1,
                progress_percent: 0.0,
                days_remaining: JOURNEY_DAYS,
            }
        }
    };

    let elapsed_ms = (now - start).num_milliseconds();

    let progress_percent = (elapsed_ms as f64 / JOURNEY_MS as f64 * 100.0).clamp(0.0, 100.0);

    let current_week = (elapsed_ms.div_euclid(MS_PER_WEEK) + 1).clamp(1, JOURNEY_WEEKS as i64) as u8;

    let remaining_ms = JOURNEY_MS - elapsed_ms;
    let days_remaining = if remaining_ms <= 0 {
        0
    } else {
        // Ceiling division: a partial day still counts as a day remaining.
        (remaining_ms + MS_PER_DAY - 1) / MS_PER_DAY
    };

    TimelineSnapshot {
        current_week,
        progress_percent,
        days_remaining,
    }
}

/// The first and last day of week `w` (1-based) for a given start date.
pub fn week_date_range(start_date: DateTime<Utc>, week: u8) -> WeekDateRange {
    let week_start = start_date + Duration::days((week as i64 - 1) * 7);
    WeekDateRange {
        start: week_start,
        end: week_start + Duration::days(6),
    }
}

/// Temporal status of week `w`. With no start date every week is upcoming.
/// At `now == start_date` week 1 is already current.
pub fn week_status(start_date: Option<DateTime<Utc>>, now: DateTime<Utc>, week: u8) -> WeekStatus {
    let start = match start_date {
        Some(start) => start,
        None => return WeekStatus::Upcoming,
    };

    let range = week_date_range(start, week);
    if now < range.start {
        WeekStatus::Upcoming
    } else if now > range.end {
        WeekStatus::Past
    } else {
        WeekStatus::Current
    }
}

/// The instant the journey ends: `start_date + 56 days`.
pub fn journey_end(start_date: DateTime<Utc>) -> DateTime<Utc> {
    start_date + Duration::days(JOURNEY_DAYS)
}
