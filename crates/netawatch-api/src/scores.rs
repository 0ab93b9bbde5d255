//! Handlers for `/scores` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/scores/calculate` | Runs the weekly scoring batch |
//! | `GET`  | `/scores` | Leaderboard; optional `week` + `year`, defaults to the current week |
//! | `GET`  | `/scores/:pincode` | One ward's row; 404 if not scored |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use netawatch_core::{
  batch::run_weekly_scoring,
  score::{WardWeeklyScore, WeekOfYear},
  store::CivicStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Week selection ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct WeekParams {
  pub week: Option<u32>,
  pub year: Option<i32>,
}

impl WeekParams {
  /// Both-or-neither: a bare `week` without a `year` is ambiguous.
  fn resolve(self) -> Result<WeekOfYear, ApiError> {
    match (self.week, self.year) {
      (Some(week_number), Some(year)) => Ok(WeekOfYear { week_number, year }),
      (None, None) => Ok(WeekOfYear::of(Utc::now())),
      _ => Err(ApiError::BadRequest(
        "week and year must be given together".to_owned(),
      )),
    }
  }
}

// ─── Calculate ────────────────────────────────────────────────────────────────

/// Wire format of the batch trigger; field names are part of the published
/// contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
  pub success:         bool,
  pub wards_processed: usize,
  pub week_number:     u32,
  pub year:            i32,
}

/// `POST /scores/calculate` — runs the scoring batch for the trailing
/// 7-day window ending now. Any store failure aborts the run and returns
/// 500 with the underlying message.
pub async fn calculate<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<CalculateResponse>, ApiError>
where
  S: CivicStore,
{
  let summary = run_weekly_scoring(store.as_ref(), Utc::now())
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    wards = summary.wards_processed,
    week = summary.week.week_number,
    year = summary.week.year,
    "weekly ward scoring complete"
  );

  Ok(Json(CalculateResponse {
    success:         true,
    wards_processed: summary.wards_processed,
    week_number:     summary.week.week_number,
    year:            summary.week.year,
  }))
}

// ─── Leaderboard ──────────────────────────────────────────────────────────────

/// `GET /scores[?week=28&year=2025]` — rows ordered by rank ascending.
pub async fn leaderboard<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<WeekParams>,
) -> Result<Json<Vec<WardWeeklyScore>>, ApiError>
where
  S: CivicStore,
{
  let week = params.resolve()?;
  let rows = store
    .weekly_scores(week)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /scores/:pincode[?week=28&year=2025]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(pincode): Path<String>,
  Query(params): Query<WeekParams>,
) -> Result<Json<WardWeeklyScore>, ApiError>
where
  S: CivicStore,
{
  let week = params.resolve()?;
  let row = store
    .score_for_pincode(&pincode, week)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no score for pincode {pincode} in week {}/{}",
        week.week_number, week.year
      ))
    })?;
  Ok(Json(row))
}
