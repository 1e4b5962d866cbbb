use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Streaks only look back this far.
pub const STREAK_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub sessions: u32,
    pub total_seconds: u64,
}

/// Completed-session counters keyed by local calendar day.
///
/// Accumulate-only: entries are never corrected, only added to, until an
/// explicit [`reset`](FocusStats::reset) wipes the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusStats {
    days: BTreeMap<NaiveDate, DayStats>,
}

impl FocusStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session(&mut self, day: NaiveDate, focus_seconds: u64) {
        let entry = self.days.entry(day).or_default();
        entry.sessions += 1;
        entry.total_seconds += focus_seconds;
    }

    pub fn reset(&mut self) {
        self.days.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: NaiveDate) -> Option<DayStats> {
        self.days.get(&day).copied()
    }

    pub fn total_sessions(&self) -> u64 {
        self.days.values().map(|d| u64::from(d.sessions)).sum()
    }

    pub fn total_seconds(&self) -> u64 {
        self.days.values().map(|d| d.total_seconds).sum()
    }

    /// Consecutive days with at least one session, walking backward from
    /// `today` and stopping at the first gap.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = today;
        for _ in 0..STREAK_WINDOW_DAYS {
            if !self.has_sessions(day) {
                break;
            }
            streak += 1;
            day = day - Duration::days(1);
        }
        streak
    }

    /// Longest run of consecutive active days inside the lookback window.
    pub fn best_streak(&self, today: NaiveDate) -> u32 {
        let mut best = 0;
        let mut run = 0;
        for offset in (0..STREAK_WINDOW_DAYS).rev() {
            let day = today - Duration::days(i64::from(offset));
            if self.has_sessions(day) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    fn has_sessions(&self, day: NaiveDate) -> bool {
        self.days.get(&day).is_some_and(|d| d.sessions > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn recording_accumulates_per_day() {
        let mut stats = FocusStats::new();
        stats.record_session(day("2026-08-05"), 1500);
        stats.record_session(day("2026-08-05"), 600);
        stats.record_session(day("2026-08-04"), 1500);

        let today = stats.day(day("2026-08-05")).unwrap();
        assert_eq!(today.sessions, 2);
        assert_eq!(today.total_seconds, 2100);
        assert_eq!(stats.total_sessions(), 3);
        assert_eq!(stats.total_seconds(), 3600);
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = FocusStats::new();
        stats.record_session(day("2026-08-05"), 1500);
        stats.reset();
        assert!(stats.is_empty());
        assert_eq!(stats.total_sessions(), 0);
    }

    #[test]
    fn streak_counts_back_from_today_until_a_gap() {
        let mut stats = FocusStats::new();
        let today = day("2026-08-05");
        stats.record_session(today, 1500);
        stats.record_session(day("2026-08-04"), 1500);
        stats.record_session(day("2026-08-03"), 1500);
        // gap on 2026-08-02
        stats.record_session(day("2026-08-01"), 1500);

        assert_eq!(stats.current_streak(today), 3);
    }

    #[test]
    fn streak_is_zero_when_today_is_empty() {
        let mut stats = FocusStats::new();
        let today = day("2026-08-05");
        stats.record_session(day("2026-08-04"), 1500);
        assert_eq!(stats.current_streak(today), 0);
    }

    #[test]
    fn best_streak_finds_an_older_run() {
        let mut stats = FocusStats::new();
        let today = day("2026-08-05");
        stats.record_session(today, 1500);
        // five-day run well before the current one-day streak
        for date in ["2026-07-20", "2026-07-21", "2026-07-22", "2026-07-23", "2026-07-24"] {
            stats.record_session(day(date), 1500);
        }

        assert_eq!(stats.current_streak(today), 1);
        assert_eq!(stats.best_streak(today), 5);
    }

    #[test]
    fn best_streak_ignores_days_outside_the_window() {
        let mut stats = FocusStats::new();
        let today = day("2026-08-05");
        for date in ["2026-06-01", "2026-06-02", "2026-06-03"] {
            stats.record_session(day(date), 1500);
        }
        assert_eq!(stats.best_streak(today), 0);
    }

    #[test]
    fn day_with_zero_sessions_breaks_the_streak() {
        let mut stats = FocusStats::new();
        let today = day("2026-08-05");
        stats.record_session(today, 1500);
        stats.days.insert(day("2026-08-04"), DayStats::default());
        stats.record_session(day("2026-08-03"), 1500);

        assert_eq!(stats.current_streak(today), 1);
    }
}
