//! Query-parameter normalisation.
//!
//! Turns a loosely-typed bag of query parameters into typed filters. Nothing
//! here fails: a value that is missing, repeated, or unparseable is treated as
//! if it had not been supplied.
//!
//! | Parameter | Effect |
//! |-----------|--------|
//! | `directorName`, `companyName`, `directorEmail`, `companyCIN`, `directorDIN` | case-insensitive substring clauses, OR-ed together |
//! | `funnelStatus` | `active` / `inactive` equality |
//! | `dateOfIncorporation` | single-day incorporation window (wins over the pair below) |
//! | `startDate` + `endDate` | inclusive incorporation window |
//! | `scheduledStartDate` + `scheduledEndDate` | inclusive window on a touch's scheduled date |
//! | `sentStartDate` + `sentEndDate` | inclusive window on a touch's sent date |
//! | `sortField`, `sortOrder` | see [`SortField`], [`SortOrder`] |
//! | `page`, `limit` | see [`Paging`] |

use std::{cmp::Ordering, collections::HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  range::DateRange,
  record::{FunnelStatus, TouchRow},
};

// ─── Raw parameters ──────────────────────────────────────────────────────────

/// A multi-map of query keys to their raw values.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
  values: HashMap<String, Vec<String>>,
}

impl RawParams {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.values.entry(key.into()).or_default().push(value.into());
  }

  /// The value of `key` if it was supplied exactly once and is non-blank.
  /// Repeated keys behave like a non-string input and yield `None`.
  pub fn string(&self, key: &str) -> Option<&str> {
    match self.values.get(key)?.as_slice() {
      [single] => Some(single.trim()).filter(|s| !s.is_empty()),
      _ => None,
    }
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut params = Self::new();
    for (k, v) in iter {
      params.insert(k, v);
    }
    params
  }
}

// ─── Record-level filter ─────────────────────────────────────────────────────

/// Text fields a search clause can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
  CompanyName,
  CompanyCin,
  DirectorFirstName,
  DirectorLastName,
  /// `"{first} {last}"`.
  DirectorFullName,
  DirectorEmail,
  DirectorDin,
}

/// Case-insensitive substring match of `needle` against `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchClause {
  pub field:  SearchField,
  /// Already lower-cased.
  pub needle: String,
}

/// Company/director-level predicate, evaluated by the store before
/// flattening.
///
/// A record matches when it satisfies at least one of `any_of` (or `any_of`
/// is empty) and every other set field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
  pub any_of:        Vec<SearchClause>,
  pub funnel_status: Option<FunnelStatus>,
  pub incorporated:  Option<DateRange>,
}

impl RecordFilter {
  pub fn from_params(params: &RawParams) -> Self {
    FilterBuilder::default()
      .search(
        &[
          SearchField::DirectorFirstName,
          SearchField::DirectorLastName,
          SearchField::DirectorFullName,
        ],
        params.string("directorName"),
      )
      .search(&[SearchField::CompanyName], params.string("companyName"))
      .search(&[SearchField::DirectorEmail], params.string("directorEmail"))
      .search(&[SearchField::CompanyCin], params.string("companyCIN"))
      .search(&[SearchField::DirectorDin], params.string("directorDIN"))
      .funnel_status(params.string("funnelStatus"))
      .incorporated(
        params.string("dateOfIncorporation"),
        params.string("startDate"),
        params.string("endDate"),
      )
      .build()
  }
}

/// Collects optional predicate contributors and folds them into a
/// [`RecordFilter`] in one step.
#[derive(Debug, Default)]
pub struct FilterBuilder {
  contributions: Vec<Vec<SearchClause>>,
  funnel_status: Option<FunnelStatus>,
  incorporated:  Option<DateRange>,
}

impl FilterBuilder {
  /// Contribute one clause per field for `raw`, if present.
  pub fn search(mut self, fields: &[SearchField], raw: Option<&str>) -> Self {
    if let Some(term) = raw {
      let needle = term.to_lowercase();
      self.contributions.push(
        fields
          .iter()
          .map(|&field| SearchClause { field, needle: needle.clone() })
          .collect(),
      );
    }
    self
  }

  pub fn funnel_status(mut self, raw: Option<&str>) -> Self {
    self.funnel_status = raw.and_then(|s| s.parse().ok());
    self
  }

  /// A valid single day wins; otherwise both ends of the pair must parse.
  pub fn incorporated(
    mut self,
    single: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
  ) -> Self {
    self.incorporated = single
      .and_then(parse_day)
      .map(DateRange::day)
      .or_else(|| day_pair(start, end));
    self
  }

  pub fn build(self) -> RecordFilter {
    RecordFilter {
      any_of:        self.contributions.into_iter().flatten().collect(),
      funnel_status: self.funnel_status,
      incorporated:  self.incorporated,
    }
  }
}

// ─── Touch-level filter ──────────────────────────────────────────────────────

/// Windows applied to flattened rows, one touch at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchFilter {
  pub scheduled: Option<DateRange>,
  pub sent:      Option<DateRange>,
}

impl TouchFilter {
  pub fn from_params(params: &RawParams) -> Self {
    Self {
      scheduled: day_pair(
        params.string("scheduledStartDate"),
        params.string("scheduledEndDate"),
      ),
      sent:      day_pair(params.string("sentStartDate"), params.string("sentEndDate")),
    }
  }

  /// A row without a sent date never matches a sent window.
  pub fn matches(&self, row: &TouchRow) -> bool {
    let scheduled_ok = self.scheduled.is_none_or(|r| r.contains(row.scheduled_date));
    let sent_ok = match (self.sent, row.sent_date) {
      (None, _) => true,
      (Some(r), Some(at)) => r.contains(at),
      (Some(_), None) => false,
    };
    scheduled_ok && sent_ok
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  /// Exactly `asc` or `desc`; anything else is `default`.
  pub fn parse_or(raw: Option<&str>, default: Self) -> Self {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
  }

  pub fn apply(self, ordering: Ordering) -> Ordering {
    match self {
      Self::Asc => ordering,
      Self::Desc => ordering.reverse(),
    }
  }
}

/// Caller-selectable sort keys for flattened rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum SortField {
  ScheduledDate,
  SentDate,
  DateOfIncorporation,
}

impl SortField {
  /// `None` for an absent or unknown field: keep natural store order.
  pub fn parse(raw: Option<&str>) -> Option<Self> { raw?.parse().ok() }

  pub fn key(self, row: &TouchRow) -> Option<DateTime<Utc>> {
    match self {
      Self::ScheduledDate => Some(row.scheduled_date),
      Self::SentDate => row.sent_date,
      Self::DateOfIncorporation => row.date_of_incorporation,
    }
  }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// 1-based page number and page size. No upper bound on `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
  pub page:  u64,
  pub limit: u64,
}

impl Default for Paging {
  fn default() -> Self { Self { page: 1, limit: 10 } }
}

impl Paging {
  pub fn from_params(params: &RawParams) -> Self {
    let positive = |key: &str| {
      params
        .string(key)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
    };
    let default = Self::default();
    Self {
      page:  positive("page").unwrap_or(default.page),
      limit: positive("limit").unwrap_or(default.limit),
    }
  }

  pub fn skip(&self) -> u64 { self.page.saturating_sub(1).saturating_mul(self.limit) }

  pub fn total_pages(&self, count: u64) -> u64 { count.div_ceil(self.limit.max(1)) }

  /// The slice of `items` this page covers.
  pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
    let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
    let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (whose UTC day is used).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc).date_naive())
  })
}

fn day_pair(start: Option<&str>, end: Option<&str>) -> Option<DateRange> {
  Some(DateRange::days(parse_day(start?)?, parse_day(end?)?))
}
