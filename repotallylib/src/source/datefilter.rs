//! Creation-date filtering.
//!
//! Two shapes of date constraint exist:
//!
//! - [`DateRange`]: inclusive calendar dates, either end optional. Used by the
//!   pre-analysis filter and by the view engine's active filter.
//! - [`DateWindow`]: the pre-analysis policy. Exactly one of "last N days",
//!   "last year" or an explicit range is active at a time.
//!
//! A record without a parsable `createdAt` never passes an active constraint.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RepotallyError;
use crate::Result;

use super::record::Repository;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| RepotallyError::InvalidDate {
        input: input.to_string(),
    })
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Build from optional `YYYY-MM-DD` strings.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: start.map(parse_date).transpose()?,
            end: end.map(parse_date).transpose()?,
        })
    }

    /// True when neither end is set.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// Whether `repo` passes this range.
    ///
    /// An unbounded range admits everything, including undated records.
    pub fn admits(&self, repo: &Repository) -> bool {
        if self.is_unbounded() {
            return true;
        }
        repo.created_date().is_some_and(|d| self.contains(d))
    }
}

/// The pre-analysis date policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    /// No filtering
    #[default]
    All,
    /// Created within the last N days
    LastDays(u32),
    /// Created within the last 365 days
    LastYear,
    /// Created within an inclusive date range
    Between(DateRange),
}

impl DateWindow {
    /// Pick the active policy from everything the caller supplied.
    ///
    /// Precedence: last-N-days, then last-year, then the explicit range.
    /// `LastDays(0)` counts as not supplied.
    pub fn from_parts(last_days: Option<u32>, last_year: bool, range: DateRange) -> Self {
        match last_days.filter(|d| *d > 0) {
            Some(days) => DateWindow::LastDays(days),
            None if last_year => DateWindow::LastYear,
            None if !range.is_unbounded() => DateWindow::Between(range),
            None => DateWindow::All,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DateWindow::All)
    }

    /// Whether `repo` passes this window, with relative windows anchored at `now`.
    pub fn admits(&self, repo: &Repository, now: DateTime<Utc>) -> bool {
        let days = match self {
            DateWindow::All => return true,
            DateWindow::Between(range) => return repo.created_at.is_some() && range.admits(repo),
            DateWindow::LastDays(days) => i64::from(*days),
            DateWindow::LastYear => 365,
        };
        // A cutoff before the earliest representable instant bounds nothing.
        let cutoff = now.checked_sub_signed(Duration::days(days));
        repo.created_at.is_some_and(|created| {
            cutoff.map_or(true, |cutoff| created.with_timezone(&Utc) >= cutoff)
        })
    }

    /// Human-readable description for progress output and report headers.
    pub fn describe(&self) -> String {
        match self {
            DateWindow::All => "all time".to_string(),
            DateWindow::LastDays(days) => format!("last {} days", days),
            DateWindow::LastYear => "last year".to_string(),
            DateWindow::Between(range) => match (range.start, range.end) {
                (Some(s), Some(e)) => format!("{} to {}", s, e),
                (Some(s), None) => format!("from {}", s),
                (None, Some(e)) => format!("until {}", e),
                (None, None) => "all time".to_string(),
            },
        }
    }
}

/// Return the records admitted by `window`, in corpus order.
pub fn filter_by_date(
    repos: &[Repository],
    window: &DateWindow,
    now: DateTime<Utc>,
) -> Vec<Repository> {
    repos
        .iter()
        .filter(|r| window.admits(r, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::record::parse_timestamp;

    fn repo_created(name: &str, created: Option<&str>) -> Repository {
        let mut repo = Repository::new("octo", name);
        repo.created_at = created.and_then(parse_timestamp);
        repo
    }

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn corpus() -> Vec<Repository> {
        vec![
            repo_created("old", Some("2021-03-01T00:00:00Z")),
            repo_created("jan", Some("2024-01-01T00:00:00Z")),
            repo_created("end-of-jan", Some("2024-01-31T23:59:59Z")),
            repo_created("june", Some("2024-06-20T08:00:00Z")),
            repo_created("undated", None),
        ]
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_date("2024/02/29"),
            Err(RepotallyError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_between_is_inclusive_on_both_ends() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        let result = filter_by_date(&corpus(), &DateWindow::Between(range), now());
        assert_eq!(names(&result), vec!["jan", "end-of-jan"]);
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange::parse(Some("2024-01-15"), None).unwrap();
        let result = filter_by_date(&corpus(), &DateWindow::Between(range), now());
        assert_eq!(names(&result), vec!["end-of-jan", "june"]);
    }

    #[test]
    fn test_last_days() {
        let result = filter_by_date(&corpus(), &DateWindow::LastDays(30), now());
        assert_eq!(names(&result), vec!["june"]);
    }

    #[test]
    fn test_last_year() {
        let result = filter_by_date(&corpus(), &DateWindow::LastYear, now());
        assert_eq!(names(&result), vec!["jan", "end-of-jan", "june"]);
    }

    #[test]
    fn test_undated_never_returned_when_active() {
        let range = DateRange::parse(None, Some("2030-01-01")).unwrap();
        for window in [
            DateWindow::LastDays(10_000),
            DateWindow::LastYear,
            DateWindow::Between(range),
        ] {
            let result = filter_by_date(&corpus(), &window, now());
            assert!(result.iter().all(|r| r.created_at.is_some()));
        }
    }

    #[test]
    fn test_all_returns_everything() {
        let result = filter_by_date(&corpus(), &DateWindow::All, now());
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_result_is_subset_within_bounds() {
        let range = DateRange::parse(Some("2021-01-01"), Some("2024-01-15")).unwrap();
        let input = corpus();
        let result = filter_by_date(&input, &DateWindow::Between(range), now());
        for repo in &result {
            assert!(input.contains(repo));
            assert!(range.contains(repo.created_date().unwrap()));
        }
    }

    #[test]
    fn test_window_precedence() {
        let range = DateRange::parse(Some("2024-01-01"), None).unwrap();
        assert_eq!(
            DateWindow::from_parts(Some(7), true, range),
            DateWindow::LastDays(7)
        );
        assert_eq!(
            DateWindow::from_parts(None, true, range),
            DateWindow::LastYear
        );
        assert_eq!(
            DateWindow::from_parts(Some(0), false, range),
            DateWindow::Between(range)
        );
        assert_eq!(
            DateWindow::from_parts(None, false, DateRange::default()),
            DateWindow::All
        );
    }

    #[test]
    fn test_huge_last_days_keeps_every_dated_record() {
        let window = DateWindow::from_parts(Some(200_000_000), false, DateRange::default());
        let kept = filter_by_date(&corpus(), &window, now());
        assert_eq!(names(&kept), vec!["old", "jan", "end-of-jan", "june"]);
        assert!(window.admits(&corpus()[0], now()));
    }

    #[test]
    fn test_describe() {
        assert_eq!(DateWindow::LastDays(30).describe(), "last 30 days");
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-12-31")).unwrap();
        assert_eq!(
            DateWindow::Between(range).describe(),
            "2024-01-01 to 2024-12-31"
        );
    }
}
