//! Error types for `netawatch-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
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

  #[error("unknown issue category: {0:?}")]
  UnknownCategory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse classification of a store error. The HTTP layer maps kinds to
/// status codes without knowing the concrete backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The referenced record does not exist.
  NotFound,
  /// The request conflicts with current state (duplicate, already closed).
  Conflict,
  /// The request itself is malformed.
  Invalid,
  /// The backend failed; nothing the caller can do about it.
  Backend,
}

/// Implemented by every [`crate::store::CivicStore`] error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::PollNotFound(_) | Error::AlertNotFound(_) => ErrorKind::NotFound,
      Error::InactivePoll(_)
      | Error::DuplicateResponse { .. }
      | Error::AlreadyResolved(_) => ErrorKind::Conflict,
      Error::UnknownCategory(_) => ErrorKind::Invalid,
    }
  }
}
