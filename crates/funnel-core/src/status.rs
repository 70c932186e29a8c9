//! Derived touch categories.
//!
//! A touch's category is never stored. It is recomputed on every read from
//! the stored status, the scheduled date and the caller's clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::record::TouchStatus;

/// The derived classification of a touch relative to "now".
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  /// Already delivered. The dashboard calls these "recent".
  #[strum(to_string = "sent", serialize = "recent")]
  Sent,
  /// Pending and past its scheduled date.
  Overdue,
  /// Pending and still in the future.
  #[default]
  Upcoming,
}

impl Category {
  pub const ALL: [Category; 3] =
    [Category::Upcoming, Category::Sent, Category::Overdue];

  /// Parse a `statusType` value, falling back to [`Category::Upcoming`].
  pub fn parse_lossy(raw: Option<&str>) -> Self {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
  }
}

/// Classify a touch. Depends on nothing but its three inputs.
pub fn classify(
  status: TouchStatus,
  scheduled_date: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Category {
  match status {
    TouchStatus::Sent => Category::Sent,
    TouchStatus::Pending if scheduled_date > now => Category::Upcoming,
    TouchStatus::Pending => Category::Overdue,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap() }

  #[test]
  fn sent_wins_regardless_of_date() {
    for offset in [-400, -1, 0, 1, 400] {
      let scheduled = now() + Duration::days(offset);
      assert_eq!(classify(TouchStatus::Sent, scheduled, now()), Category::Sent);
    }
  }

  #[test]
  fn pending_future_is_upcoming() {
    let scheduled = now() + Duration::seconds(1);
    assert_eq!(classify(TouchStatus::Pending, scheduled, now()), Category::Upcoming);
  }

  #[test]
  fn pending_at_now_is_overdue() {
    assert_eq!(classify(TouchStatus::Pending, now(), now()), Category::Overdue);
  }

  #[test]
  fn pending_past_is_overdue() {
    let scheduled = now() - Duration::days(3);
    assert_eq!(classify(TouchStatus::Pending, scheduled, now()), Category::Overdue);
  }

  #[test]
  fn classification_is_deterministic() {
    let scheduled = now() - Duration::hours(5);
    let first = classify(TouchStatus::Pending, scheduled, now());
    let second = classify(TouchStatus::Pending, scheduled, now());
    assert_eq!(first, second);
  }

  #[test]
  fn parse_lossy_accepts_aliases_and_defaults() {
    assert_eq!(Category::parse_lossy(Some("recent")), Category::Sent);
    assert_eq!(Category::parse_lossy(Some("Overdue")), Category::Overdue);
    assert_eq!(Category::parse_lossy(Some("archived")), Category::Upcoming);
    assert_eq!(Category::parse_lossy(None), Category::Upcoming);
  }

  #[test]
  fn display_uses_canonical_name() {
    assert_eq!(Category::Sent.to_string(), "sent");
    assert_eq!(serde_json::to_string(&Category::Overdue).unwrap(), "\"overdue\"");
  }
}
