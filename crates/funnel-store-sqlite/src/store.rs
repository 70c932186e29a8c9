//! [`SqliteStore`], the SQLite implementation of [`CampaignStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use uuid::Uuid;

use funnel_core::{
  filter::RecordFilter,
  range::DateRange,
  record::{CampaignRecord, CampaignTouch, NewCampaignRecord, TouchRow, TouchStatus},
  store::{CampaignStore, RecordQuery},
};

use crate::{
  Error, Result,
  encode::{RECORD_COLUMNS, RawRecord, RawTouch, encode_dt, encode_uuid},
  query::{self, Clause},
  schema::{SCHEMA, register_functions},
};

const TOUCH_COLUMNS: &str = "touch_index, scheduled_date, status, sent_date";

/// Connection closures can only fail with database errors; domain failures
/// come back as the inner `Err` and are converted after the call.
type Checked<T> = std::result::Result<T, funnel_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Funnel campaign store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a record `SELECT` and attach each record's touches in index order.
  async fn load_records(&self, select: Clause) -> Result<Vec<CampaignRecord>> {
    let raws: Vec<(RawRecord, Vec<RawTouch>)> = self
      .conn
      .call(move |conn| {
        let mut records = conn.prepare(&select.sql)?;
        let mut touches = conn.prepare(&format!(
          "SELECT {TOUCH_COLUMNS} FROM campaign_touches
           WHERE record_id = ?1 ORDER BY touch_index"
        ))?;

        let heads = records
          .query_map(params_from_iter(select.params.iter()), RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(heads.len());
        for head in heads {
          let list = touches
            .query_map([&head.record_id], RawTouch::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          out.push((head, list));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(head, touches)| head.into_record(touches))
      .collect()
  }
}

// ─── CampaignStore impl ──────────────────────────────────────────────────────

impl CampaignStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_record(&self, input: NewCampaignRecord) -> Result<CampaignRecord> {
    input.validate()?;

    let now = Utc::now();
    let touches: Vec<CampaignTouch> = input
      .ordered_touches()
      .into_iter()
      .map(|t| CampaignTouch {
        index:          t.index,
        scheduled_date: t.scheduled_date,
        status:         t.status,
        sent_date:      t.sent_date,
      })
      .collect();
    let record = CampaignRecord {
      record_id:             Uuid::new_v4(),
      company_cin:           input.company_cin.trim().to_owned(),
      company_name:          input.company_name,
      director_first_name:   input.director_first_name,
      director_last_name:    input.director_last_name,
      director_email:        input.director_email,
      director_din:          input.director_din,
      date_of_incorporation: input.date_of_incorporation,
      funnel_status:         input.funnel_status,
      touches,
      created_at:            now,
      updated_at:            now,
    };

    let id_str       = encode_uuid(record.record_id);
    let cin          = record.company_cin.clone();
    let head_params  = (
      record.company_name.clone(),
      record.director_first_name.clone(),
      record.director_last_name.clone(),
      record.director_email.clone(),
      record.director_din.clone(),
      record.date_of_incorporation.map(encode_dt),
      record.funnel_status.as_ref().to_owned(),
      encode_dt(now),
    );
    let touch_params: Vec<(u32, String, String, Option<String>)> = record
      .touches
      .iter()
      .map(|t| {
        (
          t.index,
          encode_dt(t.scheduled_date),
          t.status.as_ref().to_owned(),
          t.sent_date.map(encode_dt),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Checked<()>> {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM campaign_records WHERE company_cin = ?1",
            [&cin],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(funnel_core::Error::DuplicateCompany(cin)));
        }

        let (name, first, last, email, din, incorporated, status, at) = head_params;
        tx.execute(
          "INSERT INTO campaign_records (
             record_id, company_cin, company_name,
             director_first_name, director_last_name, director_email, director_din,
             date_of_incorporation, funnel_status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
          rusqlite::params![
            id_str, cin, name, first, last, email, din, incorporated, status, at,
          ],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO campaign_touches (record_id, touch_index, scheduled_date, status, sent_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (index, scheduled, status, sent) in &touch_params {
            stmt.execute(rusqlite::params![id_str, index, scheduled, status, sent])?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    tracing::debug!(
      record_id = %record.record_id,
      touches = record.touches.len(),
      "inserted campaign record"
    );
    Ok(record)
  }

  async fn mark_touch_sent(
    &self,
    record_id: Uuid,
    index: u32,
    sent_at: DateTime<Utc>,
  ) -> Result<CampaignTouch> {
    let id_str   = encode_uuid(record_id);
    let sent_str = encode_dt(sent_at);
    let now_str  = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Checked<RawTouch>> {
        let tx = conn.transaction()?;

        let current: Option<RawTouch> = tx
          .query_row(
            &format!(
              "SELECT {TOUCH_COLUMNS} FROM campaign_touches
               WHERE record_id = ?1 AND touch_index = ?2"
            ),
            rusqlite::params![id_str, index],
            RawTouch::from_row,
          )
          .optional()?;

        let Some(mut touch) = current else {
          let exists = tx
            .query_row(
              "SELECT 1 FROM campaign_records WHERE record_id = ?1",
              [&id_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          return Ok(Err(if exists {
            funnel_core::Error::TouchNotFound { record_id, index }
          } else {
            funnel_core::Error::RecordNotFound(record_id)
          }));
        };
        if touch.status == TouchStatus::Sent.as_ref() {
          return Ok(Err(funnel_core::Error::AlreadySent { record_id, index }));
        }

        tx.execute(
          "UPDATE campaign_touches SET status = ?3, sent_date = ?4
           WHERE record_id = ?1 AND touch_index = ?2",
          rusqlite::params![id_str, index, TouchStatus::Sent.as_ref(), sent_str],
        )?;
        tx.execute(
          "UPDATE campaign_records SET updated_at = ?2 WHERE record_id = ?1",
          rusqlite::params![id_str, now_str],
        )?;
        tx.commit()?;

        touch.status = TouchStatus::Sent.as_ref().to_owned();
        touch.sent_date = Some(sent_str);
        Ok(Ok(touch))
      })
      .await??;

    tracing::debug!(%record_id, index, "touch marked sent");
    raw.into_touch()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_record(&self, record_id: Uuid) -> Result<Option<CampaignRecord>> {
    let select = Clause {
      sql:    format!("SELECT {RECORD_COLUMNS} FROM campaign_records r WHERE r.record_id = ?"),
      params: vec![Value::Text(encode_uuid(record_id))],
    };
    Ok(self.load_records(select).await?.into_iter().next())
  }

  async fn find_records<'a>(&'a self, query: &'a RecordQuery) -> Result<Vec<CampaignRecord>> {
    tracing::debug!(
      clauses = query.filter.any_of.len(),
      skip = query.skip,
      limit = ?query.limit,
      "finding campaign records"
    );
    self.load_records(query::select_records(query)).await
  }

  async fn count_records<'a>(&'a self, filter: &'a RecordFilter) -> Result<u64> {
    let Clause { sql, params } = query::count_records(filter);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn touch_rows<'a>(
    &'a self,
    filter: &'a RecordFilter,
    scheduled: Option<DateRange>,
  ) -> Result<Vec<TouchRow>> {
    let query = RecordQuery { filter: filter.clone(), ..RecordQuery::all() };
    let records = self.load_records(query::select_records(&query)).await?;

    let rows: Vec<TouchRow> = records
      .iter()
      .flat_map(CampaignRecord::rows)
      .filter(|row| scheduled.is_none_or(|w| w.contains(row.scheduled_date)))
      .collect();

    tracing::debug!(records = records.len(), rows = rows.len(), "flattened touches");
    Ok(rows)
  }
}
