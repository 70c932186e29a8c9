//! The dashboard tracker: one page of flattened touches for a requested
//! category, plus the size of every category.
//!
//! The store is asked to flatten exactly once. Classification and the
//! touch-level windows are applied to that single intermediate, and all five
//! outputs (the page and four counts) are reduced from it, so the counts
//! always reconcile with the page:
//!
//! ```text
//! rows ─ classify ─ touch filter ─┬─ requested category → sort → page
//!                                 ├─ count(upcoming)
//!                                 ├─ count(sent)
//!                                 ├─ count(overdue)
//!                                 └─ count(requested category)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  filter::{Paging, RawParams, RecordFilter, SortField, SortOrder, TouchFilter},
  record::TouchRow,
  status::{Category, classify},
  store::CampaignStore,
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Inputs to [`track_dashboard`].
#[derive(Debug, Clone, Default)]
pub struct TrackRequest {
  pub filter:     RecordFilter,
  pub touches:    TouchFilter,
  pub category:   Category,
  /// `None` keeps natural store order; no default sort is applied.
  pub sort_field: Option<SortField>,
  pub order:      SortOrder,
  pub paging:     Paging,
}

impl TrackRequest {
  pub fn from_params(params: &RawParams) -> Self {
    Self {
      filter:     RecordFilter::from_params(params),
      touches:    TouchFilter::from_params(params),
      category:   Category::parse_lossy(params.string("statusType")),
      sort_field: SortField::parse(params.string("sortField")),
      order:      SortOrder::parse_or(params.string("sortOrder"), SortOrder::Desc),
      paging:     Paging::from_params(params),
    }
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// A flattened row with its derived category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCampaign {
  #[serde(flatten)]
  pub row:         TouchRow,
  pub status_type: Category,
}

/// Row counts per category over the same filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
  pub upcoming: u64,
  pub sent:     u64,
  pub overdue:  u64,
}

impl CategoryCounts {
  pub fn get(&self, category: Category) -> u64 {
    match category {
      Category::Upcoming => self.upcoming,
      Category::Sent => self.sent,
      Category::Overdue => self.overdue,
    }
  }

  pub fn total(&self) -> u64 { self.upcoming + self.sent + self.overdue }
}

/// The dashboard envelope. "Recent" is the dashboard's name for sent touches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerPage {
  pub campaigns:                          Vec<TrackedCampaign>,
  pub total_number_of_upcoming_campaigns: u64,
  pub total_number_of_recent_campaigns:   u64,
  pub total_number_of_overdue_campaigns:  u64,
  pub total_number_of_upcoming_page:      u64,
  pub total_number_of_recent_page:        u64,
  pub total_number_of_overdue_page:       u64,
  pub current_upcoming_campaigns_page:    u64,
  pub current_recent_campaigns_page:      u64,
  pub current_overdue_campaigns_page:     u64,
}

impl TrackerPage {
  pub fn counts(&self) -> CategoryCounts {
    CategoryCounts {
      upcoming: self.total_number_of_upcoming_campaigns,
      sent:     self.total_number_of_recent_campaigns,
      overdue:  self.total_number_of_overdue_campaigns,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Flatten once through the store, then [`facet`].
pub async fn track_dashboard<S: CampaignStore>(
  store: &S,
  request: &TrackRequest,
  now: DateTime<Utc>,
) -> Result<TrackerPage, S::Error> {
  let rows = store.touch_rows(&request.filter, None).await?;
  Ok(facet(rows, request, now))
}

/// Classify, window and reduce already-flattened rows.
pub fn facet(rows: Vec<TouchRow>, request: &TrackRequest, now: DateTime<Utc>) -> TrackerPage {
  let classified: Vec<TrackedCampaign> = rows
    .into_iter()
    .map(|row| {
      let status_type = classify(row.status, row.scheduled_date, now);
      TrackedCampaign { row, status_type }
    })
    .filter(|c| request.touches.matches(&c.row))
    .collect();

  let count = |category: Category| {
    classified.iter().filter(|c| c.status_type == category).count() as u64
  };
  let counts = CategoryCounts {
    upcoming: count(Category::Upcoming),
    sent:     count(Category::Sent),
    overdue:  count(Category::Overdue),
  };
  let requested_total = count(request.category);

  let mut selected: Vec<TrackedCampaign> = classified
    .into_iter()
    .filter(|c| c.status_type == request.category)
    .collect();
  if let Some(field) = request.sort_field {
    // Stable: equal keys keep natural order in either direction.
    selected.sort_by(|a, b| request.order.apply(field.key(&a.row).cmp(&field.key(&b.row))));
  }
  let campaigns = request.paging.slice(selected);

  let pages = |category: Category| {
    let total = if category == request.category {
      requested_total
    } else {
      counts.get(category)
    };
    request.paging.total_pages(total)
  };
  let current = |category: Category| {
    if category == request.category { request.paging.page } else { 1 }
  };

  TrackerPage {
    campaigns,
    total_number_of_upcoming_campaigns: counts.upcoming,
    total_number_of_recent_campaigns: counts.sent,
    total_number_of_overdue_campaigns: counts.overdue,
    total_number_of_upcoming_page: pages(Category::Upcoming),
    total_number_of_recent_page: pages(Category::Sent),
    total_number_of_overdue_page: pages(Category::Overdue),
    current_upcoming_campaigns_page: current(Category::Upcoming),
    current_recent_campaigns_page: current(Category::Sent),
    current_overdue_campaigns_page: current(Category::Overdue),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::record::{FunnelStatus, TouchStatus};

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap() }

  fn row(cin: &str, index: u32, day_offset: i64, sent: bool) -> TouchRow {
    let scheduled = now() + Duration::days(day_offset);
    TouchRow {
      record_id:             Uuid::new_v4(),
      company_cin:           cin.into(),
      company_name:          format!("{cin} Ltd"),
      director_first_name:   "Dev".into(),
      director_last_name:    "Shah".into(),
      director_email:        "dev@example.test".into(),
      director_din:          "0042".into(),
      date_of_incorporation: None,
      funnel_status:         FunnelStatus::Active,
      index,
      scheduled_date:        scheduled,
      status:                if sent { TouchStatus::Sent } else { TouchStatus::Pending },
      sent_date:             sent.then_some(scheduled),
    }
  }

  /// Natural order is deliberately not scheduled-date order.
  fn dataset() -> Vec<TouchRow> {
    vec![
      row("C1", 0, 9, false),
      row("C2", 0, 3, false),
      row("C3", 0, 20, false),
      row("C1", 1, -2, true),
      row("C2", 1, -5, false),
      row("C3", 1, -1, false),
      row("C4", 0, -30, true),
    ]
  }

  fn request(category: Category) -> TrackRequest {
    TrackRequest { category, ..TrackRequest::default() }
  }

  fn cins(page: &TrackerPage) -> Vec<&str> {
    page.campaigns.iter().map(|c| c.row.company_cin.as_str()).collect()
  }

  #[test]
  fn counts_reconcile_with_total_rows() {
    let rows = dataset();
    let total = rows.len() as u64;
    for category in Category::ALL {
      let page = facet(rows.clone(), &request(category), now());
      assert_eq!(page.counts().total(), total);
      assert_eq!(page.counts(), CategoryCounts { upcoming: 3, sent: 2, overdue: 2 });
    }
  }

  #[test]
  fn page_only_holds_requested_category() {
    let page = facet(dataset(), &request(Category::Overdue), now());
    assert!(page.campaigns.iter().all(|c| c.status_type == Category::Overdue));
    assert_eq!(cins(&page), vec!["C2", "C3"]);
  }

  #[test]
  fn no_sort_field_keeps_natural_order() {
    let page = facet(dataset(), &request(Category::Upcoming), now());
    assert_eq!(cins(&page), vec!["C1", "C2", "C3"]);
  }

  #[test]
  fn scheduled_sort_differs_from_natural_order() {
    let mut req = request(Category::Upcoming);
    req.sort_field = Some(SortField::ScheduledDate);
    req.order = SortOrder::Asc;
    let asc = facet(dataset(), &req, now());
    assert_eq!(cins(&asc), vec!["C2", "C1", "C3"]);

    req.order = SortOrder::Desc;
    let desc = facet(dataset(), &req, now());
    assert_eq!(cins(&desc), vec!["C3", "C1", "C2"]);
  }

  #[test]
  fn paging_and_echo_back() {
    let mut req = request(Category::Upcoming);
    req.paging = Paging { page: 2, limit: 2 };
    let page = facet(dataset(), &req, now());
    assert_eq!(cins(&page), vec!["C3"]);
    assert_eq!(page.total_number_of_upcoming_page, 2);
    assert_eq!(page.total_number_of_recent_page, 1);
    assert_eq!(page.total_number_of_overdue_page, 1);
    assert_eq!(page.current_upcoming_campaigns_page, 2);
    assert_eq!(page.current_recent_campaigns_page, 1);
    assert_eq!(page.current_overdue_campaigns_page, 1);
  }

  #[test]
  fn touch_window_applies_before_counting() {
    let mut req = request(Category::Sent);
    let day = (now() - Duration::days(2)).date_naive();
    req.touches.scheduled = Some(crate::range::DateRange::day(day));
    let page = facet(dataset(), &req, now());
    assert_eq!(page.counts(), CategoryCounts { upcoming: 0, sent: 1, overdue: 0 });
    assert_eq!(cins(&page), vec!["C1"]);
  }

  #[test]
  fn empty_input_is_all_zero() {
    let page = facet(Vec::new(), &request(Category::Upcoming), now());
    assert!(page.campaigns.is_empty());
    assert_eq!(page.counts(), CategoryCounts::default());
    assert_eq!(page.total_number_of_upcoming_page, 0);
    assert_eq!(page.current_upcoming_campaigns_page, 1);
  }

  #[test]
  fn same_input_same_output() {
    let req = TrackRequest { sort_field: Some(SortField::ScheduledDate), ..request(Category::Overdue) };
    let rows = dataset();
    let a = facet(rows.clone(), &req, now());
    let b = facet(rows, &req, now());
    assert_eq!(a.campaigns, b.campaigns);
  }

  #[test]
  fn json_envelope_uses_dashboard_names() {
    let page = facet(dataset(), &request(Category::Sent), now());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["totalNumberOfRecentCampaigns"], 2);
    assert_eq!(json["currentRecentCampaignsPage"], 1);
    assert_eq!(json["campaigns"][0]["statusType"], "sent");
    assert_eq!(json["campaigns"][0]["companyCin"], "C1");
  }
}
