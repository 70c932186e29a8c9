//! The `CampaignStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `funnel-store-sqlite`).
//! The engines in this crate only ever read; the two write methods exist for
//! the external intake and sending processes.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  filter::{RecordFilter, SortOrder},
  range::DateRange,
  record::{CampaignRecord, CampaignTouch, NewCampaignRecord, TouchRow},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Record columns a [`RecordQuery`] can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSortField {
  CreatedAt,
  DateOfIncorporation,
}

/// Parameters for [`CampaignStore::find_records`].
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
  pub filter: RecordFilter,
  /// `None` keeps natural (insertion) order.
  pub sort:   Option<(RecordSortField, SortOrder)>,
  pub skip:   u64,
  pub limit:  Option<u64>,
}

impl RecordQuery {
  /// Every record, in natural order.
  pub fn all() -> Self { Self::default() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a campaign record store backend.
///
/// "Natural order" means record insertion order, then touch index. All
/// methods return `Send` futures so the trait can be used behind axum.
pub trait CampaignStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes (external processes) ───────────────────────────────────────

  /// Persist a new record. Fails if `company_cin` is taken or the record
  /// violates a touch invariant.
  fn insert_record(
    &self,
    input: NewCampaignRecord,
  ) -> impl Future<Output = Result<CampaignRecord, Self::Error>> + Send + '_;

  /// Move one touch from pending to sent. Fails if it is already sent.
  fn mark_touch_sent(
    &self,
    record_id: Uuid,
    index: u32,
    sent_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<CampaignTouch, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by id. Returns `None` if not found.
  fn get_record(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<CampaignRecord>, Self::Error>> + Send + '_;

  /// Filtered, optionally sorted, skip/limit-paged records.
  fn find_records<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<CampaignRecord>, Self::Error>> + Send + 'a;

  /// Number of records matching `filter`.
  fn count_records<'a>(
    &'a self,
    filter: &'a RecordFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Flatten matching records into one row per touch, in natural order,
  /// keeping only touches whose scheduled date falls in `scheduled`.
  fn touch_rows<'a>(
    &'a self,
    filter: &'a RecordFilter,
    scheduled: Option<DateRange>,
  ) -> impl Future<Output = Result<Vec<TouchRow>, Self::Error>> + Send + 'a;
}
