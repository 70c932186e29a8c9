//! SQL schema for the Funnel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

use rusqlite::{Connection, functions::FunctionFlags};

/// SQL name of the Unicode-aware lower-case function.
///
/// SQLite's built-in `lower()` only folds ASCII, while search needles are
/// folded with [`str::to_lowercase`].
pub const FOLD_CASE: &str = "fold_case";

/// Register the scalar functions the store's queries rely on. Functions are
/// per-connection, so this runs before [`SCHEMA`] on every open.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per company/director pair. `seq` is the natural (insertion) order.
CREATE TABLE IF NOT EXISTS campaign_records (
    seq                   INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id             TEXT NOT NULL UNIQUE,
    company_cin           TEXT NOT NULL UNIQUE,
    company_name          TEXT NOT NULL DEFAULT '',
    director_first_name   TEXT NOT NULL DEFAULT '',
    director_last_name    TEXT NOT NULL DEFAULT '',
    director_email        TEXT NOT NULL DEFAULT '',
    director_din          TEXT NOT NULL DEFAULT '',
    date_of_incorporation TEXT,                             -- RFC 3339 UTC, millis
    funnel_status         TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'inactive'
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

-- Touches only ever move from pending to sent; rows are never deleted.
CREATE TABLE IF NOT EXISTS campaign_touches (
    record_id      TEXT NOT NULL REFERENCES campaign_records(record_id),
    touch_index    INTEGER NOT NULL,
    scheduled_date TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'pending',          -- 'pending' | 'sent'
    sent_date      TEXT,
    PRIMARY KEY (record_id, touch_index),
    CHECK ((status = 'sent') = (sent_date IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS records_created_idx       ON campaign_records(created_at);
CREATE INDEX IF NOT EXISTS records_incorporated_idx  ON campaign_records(date_of_incorporation);
CREATE INDEX IF NOT EXISTS touches_scheduled_idx     ON campaign_touches(scheduled_date);

PRAGMA user_version = 1;
";
