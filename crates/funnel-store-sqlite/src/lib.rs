//! SQLite backend for the Funnel campaign store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Record-level filters are pushed down
//! into SQL; flattening into touch rows happens after loading.

mod encode;
mod query;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
