//! When health reports are due.
//!
//! All times are UTC. A daily report goes out at midnight, a weekly one on
//! Mondays at 07:00 and a monthly one on the first day of the month at 07:00.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use std::fmt;

/// Report period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportCadence {
    Daily,
    Weekly,
    Monthly,
}

impl ReportCadence {
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Length of the window covered by the report, in days.
    #[must_use]
    pub const fn lookback_days(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }

    /// Start of the window of a report ending at `to`.
    #[must_use]
    pub fn window_start(self, to: DateTime<Utc>) -> DateTime<Utc> {
        to - Duration::days(self.lookback_days())
    }

    /// Whether this report is due during the minute containing `t`.
    #[must_use]
    pub fn is_due(self, t: DateTime<Utc>) -> bool {
        if t.minute() != 0 {
            return false;
        }
        match self {
            Self::Daily => t.hour() == 0,
            Self::Weekly => t.hour() == 7 && t.weekday() == Weekday::Mon,
            Self::Monthly => t.hour() == 7 && t.day() == 1,
        }
    }
}

impl fmt::Display for ReportCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        })
    }
}

/// Reports due during the minute containing `t`. Weekly and monthly
/// reports can be due together.
#[must_use]
pub fn due_cadences(t: DateTime<Utc>) -> Vec<ReportCadence> {
    ReportCadence::ALL
        .into_iter()
        .filter(|cadence| cadence.is_due(t))
        .collect()
}

/// Longest gap, in minutes, that a late poll still catches up on.
const MAX_CATCH_UP_MINUTES: i64 = 24 * 60;

/// Fires each due report once per minute, however often it is polled.
///
/// Every whole minute since the previous poll is checked, so a late or
/// infrequent poll still sends the reports that fell due in between.
#[derive(Debug, Default)]
pub struct ReportScheduler {
    last_minute: Option<DateTime<Utc>>,
}

impl ReportScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_minute: None }
    }

    /// Reports to send now, each with the end of its window.
    ///
    /// The first poll only looks at the current minute. Later polls look at
    /// every minute after the previous poll, up to a day back.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<(ReportCadence, DateTime<Utc>)> {
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        let first = match self.last_minute {
            Some(last) if last >= minute => return Vec::new(),
            Some(last) => (last + Duration::minutes(1))
                .max(minute - Duration::minutes(MAX_CATCH_UP_MINUTES)),
            None => minute,
        };
        self.last_minute = Some(minute);

        let mut due = Vec::new();
        let mut t = first;
        while t <= minute {
            due.extend(due_cadences(t).into_iter().map(|cadence| (cadence, t)));
            t += Duration::minutes(1);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_daily_at_midnight() {
        // 2024-05-08 is a Wednesday
        assert_eq!(due_cadences(at(2024, 5, 8, 0, 0)), vec![ReportCadence::Daily]);
        assert!(due_cadences(at(2024, 5, 8, 0, 1)).is_empty());
        assert!(due_cadences(at(2024, 5, 8, 7, 0)).is_empty());
    }

    #[test]
    fn test_weekly_on_monday_morning() {
        // 2024-05-06 is a Monday
        assert_eq!(due_cadences(at(2024, 5, 6, 7, 0)), vec![ReportCadence::Weekly]);
        assert!(due_cadences(at(2024, 5, 7, 7, 0)).is_empty());
    }

    #[test]
    fn test_monthly_on_first_day() {
        // 2024-05-01 is a Wednesday
        assert_eq!(due_cadences(at(2024, 5, 1, 7, 0)), vec![ReportCadence::Monthly]);
        assert_eq!(due_cadences(at(2024, 5, 1, 0, 0)), vec![ReportCadence::Daily]);
    }

    #[test]
    fn test_weekly_and_monthly_together() {
        // 2024-04-01 is a Monday
        assert_eq!(
            due_cadences(at(2024, 4, 1, 7, 0)),
            vec![ReportCadence::Weekly, ReportCadence::Monthly]
        );
    }

    #[test]
    fn test_window_start() {
        let to = at(2024, 5, 8, 0, 0);
        assert_eq!(ReportCadence::Daily.window_start(to), at(2024, 5, 7, 0, 0));
        assert_eq!(ReportCadence::Weekly.window_start(to), at(2024, 5, 1, 0, 0));
        assert_eq!(ReportCadence::Monthly.window_start(to), at(2024, 4, 8, 0, 0));
    }

    #[test]
    fn test_scheduler_fires_once_per_minute() {
        let mut scheduler = ReportScheduler::new();
        let midnight = at(2024, 5, 8, 0, 0);

        let fired = scheduler.poll(midnight + Duration::seconds(5));
        assert_eq!(fired, vec![(ReportCadence::Daily, midnight)]);
        assert!(scheduler.poll(midnight + Duration::seconds(25)).is_empty());
        assert!(scheduler.poll(midnight + Duration::seconds(45)).is_empty());
        assert!(scheduler.poll(midnight + Duration::seconds(65)).is_empty());

        // next day fires again
        let next = midnight + Duration::days(1);
        assert_eq!(scheduler.poll(next), vec![(ReportCadence::Daily, next)]);
    }

    #[test]
    fn test_scheduler_catches_up_on_skipped_minute() {
        let mut scheduler = ReportScheduler::new();
        // 2024-05-06 is a Monday; the polls straddle 07:00 without landing in it
        let before = Utc.with_ymd_and_hms(2024, 5, 6, 6, 59, 50).unwrap();
        assert!(scheduler.poll(before).is_empty());

        let fired = scheduler.poll(before + Duration::seconds(75));
        assert_eq!(fired, vec![(ReportCadence::Weekly, at(2024, 5, 6, 7, 0))]);
        assert!(scheduler.poll(before + Duration::seconds(90)).is_empty());
    }

    #[test]
    fn test_scheduler_catch_up_is_bounded() {
        let mut scheduler = ReportScheduler::new();
        assert!(scheduler.poll(at(2024, 5, 6, 7, 30)).is_empty());

        // A poll three days later only replays the last day
        let fired = scheduler.poll(at(2024, 5, 9, 7, 30));
        assert_eq!(fired, vec![(ReportCadence::Daily, at(2024, 5, 9, 0, 0))]);
    }

    #[test]
    fn test_scheduler_ignores_clock_going_back() {
        let mut scheduler = ReportScheduler::new();
        let midnight = at(2024, 5, 8, 0, 0);
        assert_eq!(scheduler.poll(midnight).len(), 1);
        assert!(scheduler.poll(midnight - Duration::minutes(5)).is_empty());
        assert!(scheduler.poll(midnight).is_empty());
    }
}
