//! Area alerts — citizen-reported issues with confirmation upvotes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::IssueCategory;

/// Whether an alert is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
  Active,
  Resolved,
}

/// A citizen-reported issue in an area. `upvote_count` grows as other
/// citizens confirm the report; only active alerts inside the trailing
/// window feed the scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
  pub alert_id:     Uuid,
  pub pincode:      Option<String>,
  pub category:     IssueCategory,
  pub title:        String,
  pub description:  Option<String>,
  pub status:       AlertStatus,
  pub upvote_count: u32,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::create_alert`].
/// The id, timestamp, counter, and status are set by the store.
#[derive(Debug, Clone)]
pub struct NewAlert {
  pub pincode:     Option<String>,
  pub category:    IssueCategory,
  pub title:       String,
  pub description: Option<String>,
}

/// Parameters for [`crate::store::CivicStore::list_alerts`].
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
  pub pincode:  Option<String>,
  pub status:   Option<AlertStatus>,
  pub category: Option<IssueCategory>,
  pub limit:    Option<usize>,
}
