//! Cross-axis report: the number of distinct companies or directors per
//! period, bucketed on either the incorporation date or the touch schedule.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  filter::{RawParams, RecordFilter},
  period::PeriodScope,
  store::{CampaignStore, RecordQuery},
};

/// Date that decides a row's period.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum XAxis {
  /// The record's `dateOfIncorporation`; one row per record.
  IncorporationDate,
  /// Each touch's `scheduledDate`; one row per touch.
  #[default]
  ScheduleDate,
}

/// Entity counted per period.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum YAxis {
  /// Distinct `companyCin`.
  #[default]
  Company,
  /// Distinct record, i.e. company/director pair.
  Director,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRequest {
  pub scope:  PeriodScope,
  pub x_axis: XAxis,
  pub y_axis: YAxis,
}

impl ReportRequest {
  /// Unknown axis names fall back to the defaults.
  pub fn from_params(params: &RawParams) -> Self {
    Self {
      scope:  PeriodScope::from_raw(
        params.string("selectedYear"),
        params.string("selectedMonth"),
      ),
      x_axis: params
        .string("xAxis")
        .and_then(|s| s.parse().ok())
        .unwrap_or_default(),
      y_axis: params
        .string("yAxis")
        .and_then(|s| s.parse().ok())
        .unwrap_or_default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPoint {
  pub period: String,
  pub value:  u64,
}

pub async fn report<S: CampaignStore>(
  store: &S,
  request: &ReportRequest,
) -> Result<Vec<ReportPoint>, S::Error> {
  let window = request.scope.window();

  let pairs: Vec<(DateTime<Utc>, String)> = match request.x_axis {
    XAxis::ScheduleDate => store
      .touch_rows(&RecordFilter::default(), window)
      .await?
      .into_iter()
      .map(|row| {
        let id = match request.y_axis {
          YAxis::Company => row.company_cin,
          YAxis::Director => row.record_id.to_string(),
        };
        (row.scheduled_date, id)
      })
      .collect(),
    XAxis::IncorporationDate => {
      let query = RecordQuery {
        filter: RecordFilter { incorporated: window, ..RecordFilter::default() },
        ..RecordQuery::all()
      };
      store
        .find_records(&query)
        .await?
        .into_iter()
        .filter_map(|record| {
          let at = record.date_of_incorporation?;
          let id = match request.y_axis {
            YAxis::Company => record.company_cin,
            YAxis::Director => record.record_id.to_string(),
          };
          Some((at, id))
        })
        .collect()
    }
  };

  Ok(pivot(pairs, request.scope))
}

/// Count distinct ids per period label. Pairs outside `scope` are ignored.
pub fn pivot(
  pairs: impl IntoIterator<Item = (DateTime<Utc>, String)>,
  scope: PeriodScope,
) -> Vec<ReportPoint> {
  let granularity = scope.granularity();
  let mut buckets: BTreeMap<String, HashSet<String>> = BTreeMap::new();
  for (at, id) in pairs {
    if scope.contains(at) {
      buckets.entry(granularity.label(at)).or_default().insert(id);
    }
  }

  let mut series: Vec<ReportPoint> = buckets
    .into_iter()
    .map(|(period, ids)| ReportPoint { period, value: ids.len() as u64 })
    .collect();
  granularity.sort_series(&mut series, |p| p.period.as_str());
  series
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 8, 30, 0).unwrap()
  }

  fn point(period: &str, value: u64) -> ReportPoint {
    ReportPoint { period: period.into(), value }
  }

  #[test]
  fn one_company_two_directors_counts_once() {
    let pairs = vec![(at(2024, 3, 4), "C1".to_owned()), (at(2024, 3, 20), "C1".to_owned())];
    assert_eq!(pivot(pairs, PeriodScope::Year(2024)), vec![point("Mar", 1)]);
  }

  #[test]
  fn months_are_remapped_and_ordered() {
    let pairs = vec![
      (at(2024, 12, 1), "C1".to_owned()),
      (at(2024, 4, 1), "C2".to_owned()),
      (at(2024, 3, 1), "C3".to_owned()),
      (at(2024, 1, 1), "C4".to_owned()),
      (at(2024, 1, 2), "C5".to_owned()),
    ];
    assert_eq!(
      pivot(pairs, PeriodScope::Year(2024)),
      vec![point("Jan", 2), point("Mar", 1), point("Apr", 1), point("Dec", 1)]
    );
  }

  #[test]
  fn unscoped_is_per_year_ascending() {
    let pairs = vec![(at(2019, 5, 5), "A".to_owned()), (at(2008, 1, 1), "B".to_owned())];
    assert_eq!(pivot(pairs, PeriodScope::All), vec![point("2008", 1), point("2019", 1)]);
  }

  #[test]
  fn month_scope_drops_out_of_window_pairs() {
    let pairs = vec![
      (at(2024, 7, 31), "A".to_owned()),
      (at(2024, 8, 1), "B".to_owned()),
      (at(2024, 7, 3), "C".to_owned()),
    ];
    assert_eq!(
      pivot(pairs, PeriodScope::Month { year: 2024, month: 7 }),
      vec![point("03", 1), point("31", 1)]
    );
  }

  #[test]
  fn axes_parse_with_fallback() {
    let p: RawParams = [("xAxis", "incorporationDate"), ("yAxis", "board")].into_iter().collect();
    let req = ReportRequest::from_params(&p);
    assert_eq!(req.x_axis, XAxis::IncorporationDate);
    assert_eq!(req.y_axis, YAxis::Company);
    assert_eq!(ReportRequest::from_params(&RawParams::new()), ReportRequest::default());
  }
}
