//! Overview statistics: entity counts, status totals and a chart series over
//! an optional year / month scope.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{
  filter::{RawParams, RecordFilter},
  period::PeriodScope,
  record::{FunnelStatus, TouchRow, TouchStatus},
  store::CampaignStore,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverviewRequest {
  pub scope: PeriodScope,
}

impl OverviewRequest {
  pub fn from_params(params: &RawParams) -> Self {
    Self {
      scope: PeriodScope::from_raw(
        params.string("selectedYear"),
        params.string("selectedMonth"),
      ),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDatum {
  pub name:  TouchStatus,
  pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
  pub period:  String,
  pub pending: u64,
  pub sent:    u64,
  pub total:   u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
  pub total_companies:         u64,
  pub total_directors:         u64,
  pub active_funnel_companies: u64,
  pub active_funnel_directors: u64,
  pub pending_campaign_count:  u64,
  pub sent_campaign_count:     u64,
  pub campaign_status_data:    Vec<StatusDatum>,
  pub chart_data:              Vec<ChartPoint>,
}

pub async fn overview_stats<S: CampaignStore>(
  store: &S,
  request: &OverviewRequest,
) -> Result<OverviewStats, S::Error> {
  let rows = store
    .touch_rows(&RecordFilter::default(), request.scope.window())
    .await?;
  Ok(summarize(&rows, request.scope))
}

/// Reduce flattened rows to overview statistics. Rows outside `scope` are
/// ignored, so callers may pass an unwindowed set.
pub fn summarize(rows: &[TouchRow], scope: PeriodScope) -> OverviewStats {
  let in_scope: Vec<&TouchRow> =
    rows.iter().filter(|r| scope.contains(r.scheduled_date)).collect();

  let mut companies = HashSet::new();
  let mut directors = HashSet::new();
  let mut active_companies = HashSet::new();
  let mut active_directors = HashSet::new();
  for row in &in_scope {
    companies.insert(row.company_cin.as_str());
    directors.insert(row.record_id);
    if row.funnel_status == FunnelStatus::Active {
      active_companies.insert(row.company_cin.as_str());
      active_directors.insert(row.record_id);
    }
  }

  let granularity = scope.granularity();
  let mut buckets: BTreeMap<String, ChartPoint> = BTreeMap::new();
  let (mut pending, mut sent) = (0, 0);
  for row in &in_scope {
    let period = granularity.label(row.scheduled_date);
    let point = buckets.entry(period.clone()).or_insert_with(|| ChartPoint {
      period,
      pending: 0,
      sent: 0,
      total: 0,
    });
    match row.status {
      TouchStatus::Pending => {
        point.pending += 1;
        pending += 1;
      }
      TouchStatus::Sent => {
        point.sent += 1;
        sent += 1;
      }
    }
    point.total += 1;
  }

  let mut chart_data: Vec<ChartPoint> = buckets.into_values().collect();
  granularity.sort_series(&mut chart_data, |p| p.period.as_str());

  OverviewStats {
    total_companies: companies.len() as u64,
    total_directors: directors.len() as u64,
    active_funnel_companies: active_companies.len() as u64,
    active_funnel_directors: active_directors.len() as u64,
    pending_campaign_count: pending,
    sent_campaign_count: sent,
    campaign_status_data: vec![
      StatusDatum { name: TouchStatus::Pending, value: pending },
      StatusDatum { name: TouchStatus::Sent, value: sent },
    ],
    chart_data,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
  }

  fn row(cin: &str, record_id: Uuid, scheduled: DateTime<Utc>, sent: bool) -> TouchRow {
    TouchRow {
      record_id,
      company_cin: cin.into(),
      company_name: "Acme".into(),
      director_first_name: "Asha".into(),
      director_last_name: "Rao".into(),
      director_email: "asha@acme.test".into(),
      director_din: "0001".into(),
      date_of_incorporation: None,
      funnel_status: FunnelStatus::Active,
      index: 0,
      scheduled_date: scheduled,
      status: if sent { TouchStatus::Sent } else { TouchStatus::Pending },
      sent_date: sent.then_some(scheduled),
    }
  }

  fn periods(stats: &OverviewStats) -> Vec<&str> {
    stats.chart_data.iter().map(|p| p.period.as_str()).collect()
  }

  #[test]
  fn year_scope_uses_month_abbreviations_in_order() {
    let id = Uuid::new_v4();
    let rows = vec![
      row("C1", id, at(2024, 12, 3), false),
      row("C1", id, at(2024, 1, 9), true),
      row("C1", id, at(2024, 4, 1), false),
      row("C1", id, at(2024, 3, 1), false),
      row("C1", id, at(2023, 6, 1), false),
    ];
    let stats = summarize(&rows, PeriodScope::Year(2024));
    assert_eq!(periods(&stats), vec!["Jan", "Mar", "Apr", "Dec"]);
    assert_eq!(stats.pending_campaign_count, 3);
    assert_eq!(stats.sent_campaign_count, 1);
  }

  #[test]
  fn unscoped_series_is_per_year() {
    let id = Uuid::new_v4();
    let rows = vec![
      row("C1", id, at(2025, 2, 1), false),
      row("C1", id, at(2023, 2, 1), true),
      row("C1", id, at(2025, 7, 1), true),
    ];
    let stats = summarize(&rows, PeriodScope::All);
    assert_eq!(periods(&stats), vec!["2023", "2025"]);
    assert_eq!(
      stats.chart_data[1],
      ChartPoint { period: "2025".into(), pending: 1, sent: 1, total: 2 }
    );
  }

  #[test]
  fn month_scope_is_per_day_and_half_open() {
    let id = Uuid::new_v4();
    let rows = vec![
      row("C1", id, at(2024, 2, 10), false),
      row("C1", id, at(2024, 2, 2), false),
      row("C1", id, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), false),
    ];
    let stats = summarize(&rows, PeriodScope::Month { year: 2024, month: 2 });
    assert_eq!(periods(&stats), vec!["02", "10"]);
    assert_eq!(stats.pending_campaign_count, 2);
  }

  #[test]
  fn meta_counts_are_distinct() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let mut inactive = row("C2", c, at(2024, 5, 1), false);
    inactive.funnel_status = FunnelStatus::Inactive;
    let rows = vec![
      row("C1", a, at(2024, 5, 1), false),
      row("C1", a, at(2024, 5, 8), true),
      row("C1", b, at(2024, 5, 1), false),
      inactive,
    ];
    let stats = summarize(&rows, PeriodScope::All);
    assert_eq!(stats.total_companies, 2);
    assert_eq!(stats.total_directors, 3);
    assert_eq!(stats.active_funnel_companies, 1);
    assert_eq!(stats.active_funnel_directors, 2);
  }

  #[test]
  fn empty_input_is_zero_filled() {
    let stats = summarize(&[], PeriodScope::Year(2024));
    assert_eq!(stats.total_companies, 0);
    assert!(stats.chart_data.is_empty());
    assert_eq!(
      stats.campaign_status_data,
      vec![
        StatusDatum { name: TouchStatus::Pending, value: 0 },
        StatusDatum { name: TouchStatus::Sent, value: 0 },
      ]
    );
  }

  #[test]
  fn request_reads_selected_period() {
    let p: RawParams = [("selectedYear", "2024"), ("selectedMonth", "13")].into_iter().collect();
    assert_eq!(OverviewRequest::from_params(&p).scope, PeriodScope::Year(2024));
  }

  #[test]
  fn json_shape() {
    let stats = summarize(&[], PeriodScope::All);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["pendingCampaignCount"], 0);
    assert_eq!(json["campaignStatusData"][1]["name"], "sent");
    assert!(json["chartData"].as_array().unwrap().is_empty());
  }
}
