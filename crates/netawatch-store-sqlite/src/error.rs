//! Error type for `netawatch-store-sqlite`.

use chrono::NaiveDate;
use netawatch_core::{ErrorKind, StoreError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] netawatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value the domain does not know.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("poll not found: {0}")]
  PollNotFound(Uuid),

  #[error("poll {0} is inactive and no longer accepts responses")]
  InactivePoll(Uuid),

  #[error("poll {poll_id} already answered by {user_id} on {date}")]
  DuplicateResponse {
    poll_id: Uuid,
    user_id: Uuid,
    date:    NaiveDate,
  },

  #[error("alert not found: {0}")]
  AlertNotFound(Uuid),

  #[error("alert {0} is already resolved")]
  AlreadyResolved(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::PollNotFound(_) | Error::AlertNotFound(_) => ErrorKind::NotFound,
      Error::InactivePoll(_)
      | Error::DuplicateResponse { .. }
      | Error::AlreadyResolved(_) => ErrorKind::Conflict,
      Error::Database(_)
      | Error::Uuid(_)
      | Error::DateParse(_)
      | Error::Decode(_) => ErrorKind::Backend,
    }
  }
}
