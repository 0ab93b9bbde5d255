//! JSON REST API for NetaWatch.
//!
//! Exposes an axum [`Router`] backed by any
//! [`netawatch_core::store::CivicStore`]. TLS and transport concerns are the
//! caller's responsibility; CORS is permissive because the browser client is
//! served from a different origin.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", netawatch_api::api_router(store.clone()))
//! ```

pub mod alerts;
pub mod error;
pub mod polls;
pub mod scores;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use netawatch_core::store::CivicStore;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CivicStore + 'static,
{
  Router::new()
    // Polls
    .route("/polls", get(polls::list::<S>).post(polls::create::<S>))
    .route("/polls/{id}/close", post(polls::close::<S>))
    .route("/polls/{id}/responses", post(polls::respond::<S>))
    // Alerts
    .route("/alerts", get(alerts::list::<S>).post(alerts::create::<S>))
    .route("/alerts/{id}/upvote", post(alerts::upvote::<S>))
    .route("/alerts/{id}/resolve", post(alerts::resolve::<S>))
    // Scores
    .route("/scores", get(scores::leaderboard::<S>))
    .route("/scores/calculate", post(scores::calculate::<S>))
    .route("/scores/{pincode}", get(scores::get_one::<S>))
    .with_state(store)
    .layer(CorsLayer::permissive())
}

// ─── Integration tests ────────────────────────────────────────────────────────
