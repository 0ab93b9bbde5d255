//! Polls and poll responses — the daily yes/no signal.
//!
//! A poll asks whether an area is doing fine in one category ("Was your
//! street cleaned today?"). A `true` response means "no problem observed";
//! `false` answers feed the dirt score of the weekly report card.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::IssueCategory;

/// A daily yes/no question about one issue category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
  pub poll_id:    Uuid,
  pub question:   String,
  pub category:   IssueCategory,
  /// Inactive polls stop accepting responses but are never deleted.
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::create_poll`].
/// `poll_id` and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewPoll {
  pub question: String,
  pub category: IssueCategory,
}

/// A citizen's answer to a poll. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
  pub response_id:   Uuid,
  pub poll_id:       Uuid,
  pub user_id:       Uuid,
  /// Postal code of the respondent's area. Responses without one cannot be
  /// attributed to a ward and are ignored by the scoring run.
  pub pincode:       Option<String>,
  /// `true` = no problem observed.
  pub response:      bool,
  pub created_at:    DateTime<Utc>,
  /// Calendar day of submission. One response per (poll, user, day).
  pub response_date: NaiveDate,
}

/// Input to [`crate::store::CivicStore::record_response`].
/// The id, timestamp, and response date are set by the store.
#[derive(Debug, Clone)]
pub struct NewPollResponse {
  pub poll_id:  Uuid,
  pub user_id:  Uuid,
  pub pincode:  Option<String>,
  pub response: bool,
}

/// A windowed poll response with its poll's category pre-joined, as
/// consumed by the ward aggregator. The join happens in the store, in one
/// query, not per row.
#[derive(Debug, Clone)]
pub struct CategorizedResponse {
  pub pincode:  Option<String>,
  pub category: IssueCategory,
  pub response: bool,
}
