//! Campaign records (one per company/director pair) and their touches.
//!
//! A record carries an ordered schedule of touches. Touches move from
//! `pending` to `sent` exactly once; nothing in this crate writes them. The
//! read engines work on [`TouchRow`]s, the flattened "record + one touch"
//! shape produced by [`CampaignRecord::rows`] or by a store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Whether a company/director pair is still being targeted.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FunnelStatus {
  #[default]
  Active,
  Inactive,
}

/// Stored delivery state of a touch. Only ever moves `Pending → Sent`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TouchStatus {
  #[default]
  Pending,
  Sent,
}

// ─── Stored shapes ───────────────────────────────────────────────────────────

/// One scheduled outreach event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTouch {
  pub index:          u32,
  pub scheduled_date: DateTime<Utc>,
  pub status:         TouchStatus,
  /// Set exactly when `status` is [`TouchStatus::Sent`].
  pub sent_date:      Option<DateTime<Utc>>,
}

/// A company/director pair and its campaign schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
  pub record_id:             Uuid,
  /// Unique business key (company registration number).
  pub company_cin:           String,
  pub company_name:          String,
  pub director_first_name:   String,
  pub director_last_name:    String,
  pub director_email:        String,
  pub director_din:          String,
  pub date_of_incorporation: Option<DateTime<Utc>>,
  pub funnel_status:         FunnelStatus,
  /// Ordered by `index`, which is the intended send order.
  pub touches:               Vec<CampaignTouch>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

impl CampaignRecord {
  pub fn director_full_name(&self) -> String {
    format!("{} {}", self.director_first_name, self.director_last_name)
  }

  /// Flatten into one row per touch, in touch order.
  pub fn rows(&self) -> impl Iterator<Item = TouchRow> + '_ {
    self.touches.iter().map(move |touch| TouchRow {
      record_id:             self.record_id,
      company_cin:           self.company_cin.clone(),
      company_name:          self.company_name.clone(),
      director_first_name:   self.director_first_name.clone(),
      director_last_name:    self.director_last_name.clone(),
      director_email:        self.director_email.clone(),
      director_din:          self.director_din.clone(),
      date_of_incorporation: self.date_of_incorporation,
      funnel_status:         self.funnel_status,
      index:                 touch.index,
      scheduled_date:        touch.scheduled_date,
      status:                touch.status,
      sent_date:             touch.sent_date,
    })
  }
}

// ─── Flattened row ───────────────────────────────────────────────────────────

/// A record's fields joined with exactly one of its touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchRow {
  pub record_id:             Uuid,
  pub company_cin:           String,
  pub company_name:          String,
  pub director_first_name:   String,
  pub director_last_name:    String,
  pub director_email:        String,
  pub director_din:          String,
  pub date_of_incorporation: Option<DateTime<Utc>>,
  pub funnel_status:         FunnelStatus,
  pub index:                 u32,
  pub scheduled_date:        DateTime<Utc>,
  pub status:                TouchStatus,
  pub sent_date:             Option<DateTime<Utc>>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CampaignStore::insert_record`]. The store assigns
/// `record_id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaignRecord {
  pub company_cin:           String,
  #[serde(default)]
  pub company_name:          String,
  #[serde(default)]
  pub director_first_name:   String,
  #[serde(default)]
  pub director_last_name:    String,
  #[serde(default)]
  pub director_email:        String,
  #[serde(default)]
  pub director_din:          String,
  #[serde(default)]
  pub date_of_incorporation: Option<DateTime<Utc>>,
  #[serde(default)]
  pub funnel_status:         FunnelStatus,
  #[serde(default)]
  pub touches:               Vec<NewTouch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTouch {
  pub index:          u32,
  pub scheduled_date: DateTime<Utc>,
  #[serde(default)]
  pub status:         TouchStatus,
  #[serde(default)]
  pub sent_date:      Option<DateTime<Utc>>,
}

impl NewTouch {
  /// A pending touch due at `scheduled_date`.
  pub fn pending(index: u32, scheduled_date: DateTime<Utc>) -> Self {
    Self { index, scheduled_date, status: TouchStatus::Pending, sent_date: None }
  }

  /// A touch that has already gone out at `sent_date`.
  pub fn sent(
    index: u32,
    scheduled_date: DateTime<Utc>,
    sent_date: DateTime<Utc>,
  ) -> Self {
    Self {
      index,
      scheduled_date,
      status: TouchStatus::Sent,
      sent_date: Some(sent_date),
    }
  }
}

impl NewCampaignRecord {
  /// Check the record-level invariants a store must uphold on insert.
  ///
  /// Uniqueness of `company_cin` across records is left to the store.
  pub fn validate(&self) -> Result<()> {
    if self.company_cin.trim().is_empty() {
      return Err(Error::MissingCompany);
    }

    let mut seen = HashSet::with_capacity(self.touches.len());
    for touch in &self.touches {
      if !seen.insert(touch.index) {
        return Err(Error::DuplicateTouchIndex(touch.index));
      }
      let is_sent = touch.status == TouchStatus::Sent;
      if is_sent != touch.sent_date.is_some() {
        return Err(Error::SentDateMismatch(touch.index));
      }
    }
    Ok(())
  }

  /// Touches in send order.
  pub fn ordered_touches(&self) -> Vec<NewTouch> {
    let mut touches = self.touches.clone();
    touches.sort_by_key(|t| t.index);
    touches
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
