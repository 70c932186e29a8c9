//! Period scopes, labels and chronological ordering for chart series.
//!
//! A scope selects both the date window and the bucket granularity:
//!
//! | Scope        | Window (half-open)        | Buckets | Label   |
//! |--------------|---------------------------|---------|---------|
//! | none         | everything                | year    | `2024`  |
//! | year         | `[Jan 1, next Jan 1)`     | month   | `Jan`   |
//! | year + month | `[1st, next month's 1st)` | day     | `05`    |

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::range::DateRange;

/// Years a scope may select. The window of the last one still ends inside a
/// four-digit year, which keeps stored timestamps comparable as text.
pub const SCOPE_YEARS: std::ops::RangeInclusive<i32> = 0..=9998;

/// Month-number → abbreviation, indexed by `month - 1`.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
  "Dec",
];

/// Two-digit month labels as produced by `%m`, in the same order.
const MONTH_NUMBERS: [&str; 12] = [
  "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

/// Map a two-digit month label (`"01"`) to its abbreviation (`"Jan"`).
/// Unknown labels pass through unchanged.
pub fn remap_month_label(label: &str) -> String {
  MONTH_NUMBERS
    .iter()
    .position(|m| *m == label)
    .map(|i| MONTH_ABBREVIATIONS[i].to_owned())
    .unwrap_or_else(|| label.to_owned())
}

/// Chronological position of a month abbreviation.
pub fn month_position(label: &str) -> Option<usize> {
  MONTH_ABBREVIATIONS.iter().position(|m| *m == label)
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The `(selectedYear, selectedMonth)` scope of an overview or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodScope {
  #[default]
  All,
  Year(i32),
  Month { year: i32, month: u32 },
}

/// Bucket size of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
  Year,
  Month,
  Day,
}

impl PeriodScope {
  /// Build a scope from raw strings. An unusable year drops the whole scope;
  /// an unusable month (or a month without a year) drops just the month.
  pub fn from_raw(year: Option<&str>, month: Option<&str>) -> Self {
    let Some(year) = year
      .and_then(|y| y.trim().parse::<i32>().ok())
      .filter(|y| SCOPE_YEARS.contains(y))
    else {
      return Self::All;
    };

    match month
      .and_then(|m| m.trim().parse::<u32>().ok())
      .filter(|m| (1..=12).contains(m))
    {
      Some(month) => Self::Month { year, month },
      None => Self::Year(year),
    }
  }

  pub fn granularity(&self) -> Granularity {
    match self {
      Self::All => Granularity::Year,
      Self::Year(_) => Granularity::Month,
      Self::Month { .. } => Granularity::Day,
    }
  }

  /// Half-open window covered by the scope; `None` means unbounded.
  pub fn window(&self) -> Option<DateRange> {
    let (start, end) = match *self {
      Self::All => return None,
      Self::Year(year) => (
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
      ),
      Self::Month { year, month } => {
        let next = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        (
          NaiveDate::from_ymd_opt(year, month, 1)?,
          NaiveDate::from_ymd_opt(next.0, next.1, 1)?,
        )
      }
    };
    Some(DateRange::half_open(
      start.and_time(NaiveTime::MIN).and_utc(),
      end.and_time(NaiveTime::MIN).and_utc(),
    ))
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.window().is_none_or(|w| w.contains(at))
  }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

impl Granularity {
  /// Bucket label for `at`.
  pub fn label(&self, at: DateTime<Utc>) -> String {
    match self {
      Self::Year => at.format("%Y").to_string(),
      Self::Month => remap_month_label(&at.format("%m").to_string()),
      Self::Day => at.format("%d").to_string(),
    }
  }

  /// Sort key of a label: numeric for years and days, table order for months.
  /// Labels that fail to parse sort last.
  fn rank(&self, label: &str) -> i64 {
    let rank = match self {
      Self::Year | Self::Day => label.parse::<i64>().ok(),
      Self::Month => month_position(label).map(|p| p as i64),
    };
    rank.unwrap_or(i64::MAX)
  }

  /// Sort a series in chronological order of its period labels.
  pub fn sort_series<T>(&self, series: &mut [T], label: impl Fn(&T) -> &str) {
    series.sort_by_key(|item| self.rank(label(item)));
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn scope_from_raw_granularity() {
    assert_eq!(PeriodScope::from_raw(None, None), PeriodScope::All);
    assert_eq!(PeriodScope::from_raw(Some("2024"), None), PeriodScope::Year(2024));
    assert_eq!(
      PeriodScope::from_raw(Some("2024"), Some("3")),
      PeriodScope::Month { year: 2024, month: 3 }
    );
  }

  #[test]
  fn bad_inputs_coarsen_the_scope() {
    assert_eq!(PeriodScope::from_raw(Some("twenty"), Some("3")), PeriodScope::All);
    assert_eq!(PeriodScope::from_raw(None, Some("3")), PeriodScope::All);
    assert_eq!(PeriodScope::from_raw(Some("2024"), Some("13")), PeriodScope::Year(2024));
    assert_eq!(PeriodScope::from_raw(Some("2024"), Some("0")), PeriodScope::Year(2024));
  }

  #[test]
  fn out_of_range_years_select_everything() {
    assert_eq!(PeriodScope::from_raw(Some("9998"), Some("12")), PeriodScope::Month {
      year:  9998,
      month: 12,
    });
    assert_eq!(PeriodScope::from_raw(Some("9999"), None), PeriodScope::All);
    assert_eq!(PeriodScope::from_raw(Some("-1"), Some("3")), PeriodScope::All);
  }

  #[test]
  fn december_window_rolls_into_next_year() {
    let w = PeriodScope::Month { year: 2024, month: 12 }.window().unwrap();
    assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
    assert_eq!(w.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    assert!(!w.contains(w.end));
  }

  #[test]
  fn labels_per_granularity() {
    let at = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
    assert_eq!(Granularity::Year.label(at), "2024");
    assert_eq!(Granularity::Month.label(at), "Jan");
    assert_eq!(Granularity::Day.label(at), "05");
  }

  #[test]
  fn remap_passes_unknown_labels_through() {
    assert_eq!(remap_month_label("12"), "Dec");
    assert_eq!(remap_month_label("13"), "13");
  }

  #[test]
  fn months_sort_chronologically_not_alphabetically() {
    let mut labels = vec!["Dec", "Apr", "Mar", "Jan", "Aug"];
    Granularity::Month.sort_series(&mut labels, |l| *l);
    assert_eq!(labels, vec!["Jan", "Mar", "Apr", "Aug", "Dec"]);
  }

  #[test]
  fn days_sort_numerically() {
    let mut labels = vec!["10", "02", "31", "01"];
    Granularity::Day.sort_series(&mut labels, |l| *l);
    assert_eq!(labels, vec!["01", "02", "10", "31"]);
  }
}
