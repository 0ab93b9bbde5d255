//! Handlers for `/polls` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/polls` | Optional `?active=false` to include closed polls |
//! | `POST` | `/polls` | Body: [`CreateBody`]; returns 201 + stored poll |
//! | `POST` | `/polls/:id/close` | Deactivates a poll |
//! | `POST` | `/polls/:id/responses` | Body: [`RespondBody`]; 409 on a same-day duplicate |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use netawatch_core::{
  category::IssueCategory,
  poll::{NewPoll, NewPollResponse, Poll, PollResponse},
  store::CivicStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// When `false`, closed polls are included. Defaults to active-only.
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool { true }

/// `GET /polls[?active=false]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Poll>>, ApiError>
where
  S: CivicStore,
{
  let polls = store
    .list_polls(params.active)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(polls))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub question: String,
  pub category: IssueCategory,
}

/// `POST /polls` — body: `{"question":"...","category":"water"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CivicStore,
{
  if body.question.trim().is_empty() {
    return Err(ApiError::BadRequest("question must not be empty".to_owned()));
  }

  let poll = store
    .create_poll(NewPoll {
      question: body.question,
      category: body.category,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(poll)))
}

// ─── Close ────────────────────────────────────────────────────────────────────

/// `POST /polls/:id/close`
pub async fn close<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Poll>, ApiError>
where
  S: CivicStore,
{
  let poll = store.close_poll(id).await.map_err(ApiError::from_store)?;
  Ok(Json(poll))
}

// ─── Respond ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub user_id:  Uuid,
  pub pincode:  Option<String>,
  /// `true` = no problem observed.
  pub response: bool,
}

/// `POST /polls/:id/responses` — returns 201 + the stored response.
/// A second answer from the same user on the same day returns 409.
pub async fn respond<S>(
  State(store): State<Arc<S>>,
  Path(poll_id): Path<Uuid>,
  Json(body): Json<RespondBody>,
) -> Result<(StatusCode, Json<PollResponse>), ApiError>
where
  S: CivicStore,
{
  let response = store
    .record_response(NewPollResponse {
      poll_id,
      user_id:  body.user_id,
      pincode:  body.pincode,
      response: body.response,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(response)))
}
