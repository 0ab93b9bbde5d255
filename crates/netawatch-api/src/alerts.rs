//! Handlers for `/alerts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/alerts` | Optional `pincode`, `status`, `category`, `limit` |
//! | `POST` | `/alerts` | Body: [`CreateBody`]; returns 201 + stored alert |
//! | `POST` | `/alerts/:id/upvote` | Adds one confirmation |
//! | `POST` | `/alerts/:id/resolve` | 409 if already resolved |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use netawatch_core::{
  alert::{Alert, AlertFilter, AlertStatus, NewAlert},
  category::IssueCategory,
  store::CivicStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub pincode:  Option<String>,
  pub status:   Option<AlertStatus>,
  pub category: Option<IssueCategory>,
  pub limit:    Option<usize>,
}

/// `GET /alerts[?pincode=...][&status=active][&category=...][&limit=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Alert>>, ApiError>
where
  S: CivicStore,
{
  let alerts = store
    .list_alerts(AlertFilter {
      pincode:  params.pincode,
      status:   params.status,
      category: params.category,
      limit:    params.limit,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(alerts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub pincode:     Option<String>,
  pub category:    IssueCategory,
  pub title:       String,
  pub description: Option<String>,
}

/// `POST /alerts` — body: `{"pincode":"110001","category":"roads","title":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CivicStore,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".to_owned()));
  }

  let alert = store
    .create_alert(NewAlert {
      pincode:     body.pincode,
      category:    body.category,
      title:       body.title,
      description: body.description,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(alert)))
}

// ─── Upvote ───────────────────────────────────────────────────────────────────

/// `POST /alerts/:id/upvote` — returns the alert with its new count.
pub async fn upvote<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Alert>, ApiError>
where
  S: CivicStore,
{
  let alert = store.upvote_alert(id).await.map_err(ApiError::from_store)?;
  Ok(Json(alert))
}

// ─── Resolve ──────────────────────────────────────────────────────────────────

/// `POST /alerts/:id/resolve`
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Alert>, ApiError>
where
  S: CivicStore,
{
  let alert = store.resolve_alert(id).await.map_err(ApiError::from_store)?;
  Ok(Json(alert))
}
