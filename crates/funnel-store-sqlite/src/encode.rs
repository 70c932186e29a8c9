//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with millisecond
//! precision and a `Z` suffix, so lexicographic order in SQL matches
//! chronological order. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use funnel_core::record::{CampaignRecord, CampaignTouch, FunnelStatus, TouchStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Statuses ────────────────────────────────────────────────────────────────

pub fn decode_funnel_status(s: &str) -> Result<FunnelStatus> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "funnel_status",
    value:  s.to_owned(),
  })
}

pub fn decode_touch_status(s: &str) -> Result<TouchStatus> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawRecord`]'s field order.
pub const RECORD_COLUMNS: &str = "r.record_id, r.company_cin, r.company_name, \
   r.director_first_name, r.director_last_name, r.director_email, r.director_din, \
   r.date_of_incorporation, r.funnel_status, r.created_at, r.updated_at";

/// A `campaign_records` row exactly as stored.
pub struct RawRecord {
  pub record_id:             String,
  pub company_cin:           String,
  pub company_name:          String,
  pub director_first_name:   String,
  pub director_last_name:    String,
  pub director_email:        String,
  pub director_din:          String,
  pub date_of_incorporation: Option<String>,
  pub funnel_status:         String,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:             row.get(0)?,
      company_cin:           row.get(1)?,
      company_name:          row.get(2)?,
      director_first_name:   row.get(3)?,
      director_last_name:    row.get(4)?,
      director_email:        row.get(5)?,
      director_din:          row.get(6)?,
      date_of_incorporation: row.get(7)?,
      funnel_status:         row.get(8)?,
      created_at:            row.get(9)?,
      updated_at:            row.get(10)?,
    })
  }

  pub fn into_record(self, touches: Vec<RawTouch>) -> Result<CampaignRecord> {
    Ok(CampaignRecord {
      record_id:             decode_uuid(&self.record_id)?,
      company_cin:           self.company_cin,
      company_name:          self.company_name,
      director_first_name:   self.director_first_name,
      director_last_name:    self.director_last_name,
      director_email:        self.director_email,
      director_din:          self.director_din,
      date_of_incorporation: decode_opt_dt(self.date_of_incorporation)?,
      funnel_status:         decode_funnel_status(&self.funnel_status)?,
      touches:               touches
        .into_iter()
        .map(RawTouch::into_touch)
        .collect::<Result<_>>()?,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// A `campaign_touches` row exactly as stored.
pub struct RawTouch {
  pub index:          i64,
  pub scheduled_date: String,
  pub status:         String,
  pub sent_date:      Option<String>,
}

impl RawTouch {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      index:          row.get(0)?,
      scheduled_date: row.get(1)?,
      status:         row.get(2)?,
      sent_date:      row.get(3)?,
    })
  }

  pub fn into_touch(self) -> Result<CampaignTouch> {
    Ok(CampaignTouch {
      index:          u32::try_from(self.index).map_err(|_| Error::UnknownValue {
        column: "touch_index",
        value:  self.index.to_string(),
      })?,
      scheduled_date: decode_dt(&self.scheduled_date)?,
      status:         decode_touch_status(&self.status)?,
      sent_date:      decode_opt_dt(self.sent_date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(7);
    assert_eq!(encode_dt(a), "2024-01-05T09:00:00.000Z");
    assert_eq!(encode_dt(b), "2024-01-05T09:00:00.007Z");
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn unknown_status_is_an_error() {
    assert!(matches!(
      decode_touch_status("bounced"),
      Err(Error::UnknownValue { column: "status", .. })
    ));
    assert_eq!(decode_funnel_status("inactive").unwrap(), FunnelStatus::Inactive);
  }
}
