//! Bulk import of campaign records from a JSON file.
//!
//! Stands in for the intake process that normally creates records: the file
//! is an array of `NewCampaignRecord` objects in their camelCase JSON form.

use std::path::Path;

use funnel_core::{record::NewCampaignRecord, store::CampaignStore};

use crate::Result;

/// Outcome of an [`import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub inserted: usize,
  pub skipped:  usize,
}

pub fn parse(json: &str) -> Result<Vec<NewCampaignRecord>> {
  Ok(serde_json::from_str(json)?)
}

pub async fn load(path: impl AsRef<Path>) -> Result<Vec<NewCampaignRecord>> {
  let text = tokio::fs::read_to_string(path).await?;
  parse(&text)
}

/// Insert every record, skipping (and logging) any the store rejects, such as
/// a company that is already present from an earlier run.
pub async fn import<S: CampaignStore>(
  store: &S,
  records: Vec<NewCampaignRecord>,
) -> SeedReport {
  let mut report = SeedReport::default();
  for record in records {
    let cin = record.company_cin.clone();
    match store.insert_record(record).await {
      Ok(_) => report.inserted += 1,
      Err(e) => {
        tracing::warn!(company_cin = %cin, error = %e, "skipping seed record");
        report.skipped += 1;
      }
    }
  }
  tracing::info!(inserted = report.inserted, skipped = report.skipped, "seed import finished");
  report
}

#[cfg(test)]
mod tests {
  use funnel_core::{filter::RecordFilter, record::TouchStatus};
  use funnel_store_sqlite::SqliteStore;

  use super::*;

  const SEED: &str = r#"[
    {
      "companyCin": "U72900KA2015PTC082988",
      "companyName": "Acme Analytics",
      "directorFirstName": "Asha",
      "directorLastName": "Rao",
      "dateOfIncorporation": "2015-06-01T00:00:00Z",
      "touches": [
        { "index": 0, "scheduledDate": "2024-01-02T09:00:00Z", "status": "sent", "sentDate": "2024-01-02T09:05:00Z" },
        { "index": 1, "scheduledDate": "2024-01-09T09:00:00Z" }
      ]
    },
    { "companyCin": "U74999DL2019PTC345678", "funnelStatus": "inactive" },
    { "companyCin": "U72900KA2015PTC082988" }
  ]"#;

  #[test]
  fn parse_applies_defaults() {
    let records = parse(SEED).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].touches[1].status, TouchStatus::Pending);
    assert!(records[1].touches.is_empty());
    assert!(records[1].company_name.is_empty());
  }

  #[test]
  fn parse_rejects_non_array() {
    assert!(matches!(parse(r#"{"companyCin":"X"}"#), Err(crate::Error::Json(_))));
  }

  #[tokio::test]
  async fn import_skips_rejected_records() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let report = import(&store, parse(SEED).unwrap()).await;
    assert_eq!(report, SeedReport { inserted: 2, skipped: 1 });
    assert_eq!(store.count_records(&RecordFilter::default()).await.unwrap(), 2);
  }
}
