//! Error types for `funnel-core`.
//!
//! Only the write primitives of a store can fail on domain grounds; the read
//! engines recover from malformed input locally and never produce these.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("campaign record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("record {record_id} has no touch at index {index}")]
  TouchNotFound { record_id: Uuid, index: u32 },

  #[error("touch {index} of record {record_id} is already sent")]
  AlreadySent { record_id: Uuid, index: u32 },

  #[error("a campaign record for company {0:?} already exists")]
  DuplicateCompany(String),

  #[error("touch index {0} appears more than once")]
  DuplicateTouchIndex(u32),

  #[error("touch {0}: sent date must be set exactly when the status is sent")]
  SentDateMismatch(u32),

  #[error("company identifier must not be empty")]
  MissingCompany,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
