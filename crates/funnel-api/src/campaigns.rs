//! Handlers for the `/campaigns` family of routes.
//!
//! Query strings are collected as raw key/value pairs rather than a typed
//! struct: a repeated or malformed parameter must be ignored, not rejected
//! with a 400, and [`RawParams`] is where that normalisation lives.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use funnel_core::{
  filter::RawParams,
  listing::{CampaignList, ListRequest, list_campaigns},
  overview::{OverviewRequest, OverviewStats, overview_stats},
  report::{ReportPoint, ReportRequest, report},
  store::CampaignStore,
  tracker::{TrackRequest, TrackerPage, track_dashboard},
};

use crate::error::ApiError;

type RawQuery = Query<Vec<(String, String)>>;

fn raw(Query(pairs): RawQuery) -> RawParams { pairs.into_iter().collect() }

/// `GET /campaigns[?page=..][&limit=..][&sortOrder=..][&<search filters>]`
pub async fn list<S: CampaignStore>(
  State(store): State<Arc<S>>,
  query: RawQuery,
) -> Result<Json<CampaignList>, ApiError> {
  let request = ListRequest::from_params(&raw(query));
  tracing::debug!(page = request.paging.page, limit = request.paging.limit, "list campaigns");

  let list = list_campaigns(store.as_ref(), &request)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(list))
}

/// `GET /campaigns/track[?statusType=..][&sortField=..][&sortOrder=..][&page=..][&limit=..]`
pub async fn track<S: CampaignStore>(
  State(store): State<Arc<S>>,
  query: RawQuery,
) -> Result<Json<TrackerPage>, ApiError> {
  let request = TrackRequest::from_params(&raw(query));
  tracing::debug!(
    category = %request.category,
    sort_field = ?request.sort_field,
    page = request.paging.page,
    "track dashboard"
  );

  let page = track_dashboard(store.as_ref(), &request, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `GET /campaigns/overview[?selectedYear=..][&selectedMonth=..]`
pub async fn overview<S: CampaignStore>(
  State(store): State<Arc<S>>,
  query: RawQuery,
) -> Result<Json<OverviewStats>, ApiError> {
  let request = OverviewRequest::from_params(&raw(query));
  tracing::debug!(scope = ?request.scope, "overview stats");

  let stats = overview_stats(store.as_ref(), &request)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}

/// `GET /campaigns/report[?selectedYear=..][&selectedMonth=..][&xAxis=..][&yAxis=..]`
pub async fn cross_axis<S: CampaignStore>(
  State(store): State<Arc<S>>,
  query: RawQuery,
) -> Result<Json<Vec<ReportPoint>>, ApiError> {
  let request = ReportRequest::from_params(&raw(query));
  tracing::debug!(
    scope = ?request.scope,
    x_axis = %request.x_axis,
    y_axis = %request.y_axis,
    "cross-axis report"
  );

  let series = report(store.as_ref(), &request)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(series))
}
