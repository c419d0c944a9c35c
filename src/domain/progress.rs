//! Progress aggregation: goal counts combined with timeline state.
//!
//! Nothing here is cached; every call recomputes from the goal sequence and
//! the `(start_date, now)` pair it was built with, so the source of truth is
//! always the goal store plus the timeline inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::goal::Goal;
use crate::domain::timeline::{self, TimelineSnapshot, WeekDateRange, WeekStatus};

/// Statistics for a single week of the journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week: u8,
    pub total: usize,
    pub completed: usize,
    /// Completed share of the week's goals, rounded percent; 0 with no goals.
    pub completion_rate: u8,
    pub status: WeekStatus,
    /// First and last day of the week; `None` until a start date is set.
    pub date_range: Option<WeekDateRange>,
}

/// Whole-journey statistics for the active account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallProgress {
    pub timeline: TimelineSnapshot,
    pub total_goals: usize,
    pub completed_goals: usize,
    /// Completed share of all goals, rounded percent; 0 with no goals.
    pub completion_rate: u8,
}

/// One-shot view over a goal sequence and the timeline inputs.
pub struct ProgressAggregator<'a> {
    goals: &'a [Goal],
    start_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl<'a> ProgressAggregator<'a> {
    pub fn new(goals: &'a [Goal], start_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            goals,
            start_date,
            now,
        }
    }

    fn matching(&self, week: Option<u8>) -> impl Iterator<Item = &Goal> {
        self.goals
            .iter()
            .filter(move |g| week.map_or(true, |w| g.week == w))
    }

    /// Number of goals, in one week or across the whole journey.
    pub fn total_goals(&self, week: Option<u8>) -> usize {
        self.matching(week).count()
    }

    /// Number of completed goals, in one week or across the whole journey.
    pub fn completed_goals(&self, week: Option<u8>) -> usize {
        self.matching(week).filter(|g| g.completed).count()
    }

    /// Rounded completion percentage; 0 when there are no goals at all.
    pub fn completion_rate(&self, week: Option<u8>) -> u8 {
        let total = self.total_goals(week);
        if total == 0 {
            return 0;
        }
        let completed = self.completed_goals(week);
        (completed as f64 / total as f64 * 100.0).round() as u8
    }

    /// Counts, temporal status and date range for one week.
    pub fn week_summary(&self, week: u8) -> WeekSummary {
        WeekSummary {
            week,
            total: self.total_goals(Some(week)),
            completed: self.completed_goals(Some(week)),
            completion_rate: self.completion_rate(Some(week)),
            status: timeline::week_status(self.start_date, self.now, week),
            date_range: self
                .start_date
                .map(|start| timeline::week_date_range(start, week)),
        }
    }

    /// Whole-journey statistics.
    pub fn overall(&self) -> OverallProgress {
        OverallProgress {
            timeline: timeline::snapshot(self.start_date, self.now),
            total_goals: self.total_goals(None),
            completed_goals: self.completed_goals(None),
            completion_rate: self.completion_rate(None),
        }
    }
}
