//! The `CivicStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `netawatch-store-sqlite`) and by an in-memory fake in tests. Higher
//! layers (`netawatch-api`, the scoring run) depend on this abstraction,
//! not on any concrete backend.

use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  alert::{Alert, AlertFilter, NewAlert},
  error::StoreError,
  geo::WardLocation,
  poll::{CategorizedResponse, NewPoll, NewPollResponse, Poll, PollResponse},
  score::{WardWeeklyScore, WeekOfYear},
};

/// Abstraction over a NetaWatch storage backend.
///
/// Server-assigned fields (ids, timestamps, counters) are always set by the
/// store; they are never accepted from callers.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CivicStore: Send + Sync {
  type Error: StoreError;

  // ── Polls ─────────────────────────────────────────────────────────────

  /// Create and persist a new daily poll.
  fn create_poll(
    &self,
    input: NewPoll,
  ) -> impl Future<Output = Result<Poll, Self::Error>> + Send + '_;

  /// List polls, optionally restricted to active ones.
  fn list_polls(
    &self,
    only_active: bool,
  ) -> impl Future<Output = Result<Vec<Poll>, Self::Error>> + Send + '_;

  /// Deactivate a poll. Closed polls stop accepting responses but stay
  /// listed for history. Closing twice is harmless.
  fn close_poll(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Poll, Self::Error>> + Send + '_;

  /// Record a citizen's answer to a poll.
  ///
  /// Returns an error if the poll does not exist or is inactive, or if the
  /// same user already answered the same poll on the same calendar day.
  fn record_response(
    &self,
    input: NewPollResponse,
  ) -> impl Future<Output = Result<PollResponse, Self::Error>> + Send + '_;

  // ── Alerts ────────────────────────────────────────────────────────────

  /// Create and persist a new alert with zero upvotes and active status.
  fn create_alert(
    &self,
    input: NewAlert,
  ) -> impl Future<Output = Result<Alert, Self::Error>> + Send + '_;

  /// List alerts matching `filter`, newest first.
  fn list_alerts(
    &self,
    filter: AlertFilter,
  ) -> impl Future<Output = Result<Vec<Alert>, Self::Error>> + Send + '_;

  /// Add one confirmation upvote and return the updated alert.
  fn upvote_alert(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Alert, Self::Error>> + Send + '_;

  /// Mark an alert resolved. Resolving twice is an error.
  fn resolve_alert(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Alert, Self::Error>> + Send + '_;

  // ── Geography ─────────────────────────────────────────────────────────

  /// Insert or replace one pincode mapping.
  fn put_location(
    &self,
    location: WardLocation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve many pincodes in one batched query. Unmapped pincodes are
  /// simply absent from the result; callers decide how to degrade.
  fn locate_pincodes<'a>(
    &'a self,
    pincodes: &'a [String],
  ) -> impl Future<Output = Result<HashMap<String, WardLocation>, Self::Error>> + Send + 'a;

  // ── Scoring reads ─────────────────────────────────────────────────────

  /// All poll responses recorded at or after `cutoff`, with each poll's
  /// category pre-joined in a single query.
  fn poll_responses_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<CategorizedResponse>, Self::Error>> + Send + '_;

  /// All still-active alerts created at or after `cutoff`.
  fn active_alerts_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Alert>, Self::Error>> + Send + '_;

  /// Persisted rank per pincode for one week; empty if that week was never
  /// scored.
  fn ranks_for_week(
    &self,
    week: WeekOfYear,
  ) -> impl Future<Output = Result<HashMap<String, u32>, Self::Error>> + Send + '_;

  /// The leaderboard for one week, rank ascending.
  fn weekly_scores(
    &self,
    week: WeekOfYear,
  ) -> impl Future<Output = Result<Vec<WardWeeklyScore>, Self::Error>> + Send + '_;

  /// One ward's row for one week. Returns `None` if not scored.
  fn score_for_pincode<'a>(
    &'a self,
    pincode: &'a str,
    week: WeekOfYear,
  ) -> impl Future<Output = Result<Option<WardWeeklyScore>, Self::Error>> + Send + 'a;

  // ── Scoring writes ────────────────────────────────────────────────────

  /// Upsert whole rows keyed on (pincode, week_number, year). A second run
  /// for the same week overwrites rather than duplicates.
  fn upsert_weekly_scores<'a>(
    &'a self,
    rows: &'a [WardWeeklyScore],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
