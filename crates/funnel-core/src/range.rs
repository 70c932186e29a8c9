//! Date windows used by filters and period scopes.
//!
//! Two boundary conventions coexist: caller-supplied day filters are
//! inclusive on both ends (`[00:00:00.000, 23:59:59.999]`), while year and
//! month scopes are half-open (`[start, next_period_start)`).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// How the upper bound of a [`DateRange`] is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
  Inclusive,
  Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
  pub upper: UpperBound,
}

impl DateRange {
  /// `[first 00:00:00.000, last 23:59:59.999]`.
  pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
    Self {
      start: first.and_time(NaiveTime::MIN).and_utc(),
      end:   last.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
        - Duration::milliseconds(1),
      upper: UpperBound::Inclusive,
    }
  }

  /// A single calendar day, inclusive.
  pub fn day(day: NaiveDate) -> Self { Self::days(day, day) }

  /// `[start, end)`.
  pub fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end, upper: UpperBound::Exclusive }
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    if at < self.start {
      return false;
    }
    match self.upper {
      UpperBound::Inclusive => at <= self.end,
      UpperBound::Exclusive => at < self.end,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn single_day_covers_whole_day() {
    let r = DateRange::day(date(2024, 2, 29));
    assert!(r.contains(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()));
    assert!(r.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
    assert!(!r.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    assert!(!r.contains(Utc.with_ymd_and_hms(2024, 2, 28, 23, 59, 59).unwrap()));
  }

  #[test]
  fn day_span_is_inclusive_of_last_day() {
    let r = DateRange::days(date(2024, 1, 1), date(2024, 1, 31));
    assert!(r.contains(Utc.with_ymd_and_hms(2024, 1, 31, 18, 0, 0).unwrap()));
    assert_eq!(r.upper, UpperBound::Inclusive);
  }

  #[test]
  fn half_open_excludes_end() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let r = DateRange::half_open(start, end);
    assert!(r.contains(start));
    assert!(!r.contains(end));
  }
}
