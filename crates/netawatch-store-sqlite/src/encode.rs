//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`, enums
//! as their lowercase discriminants, UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use netawatch_core::{
  alert::{Alert, AlertStatus},
  category::IssueCategory,
  geo::WardLocation,
  poll::Poll,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── IssueCategory ───────────────────────────────────────────────────────────

pub fn encode_category(c: IssueCategory) -> &'static str {
  match c {
    IssueCategory::Cleanliness => "cleanliness",
    IssueCategory::Water => "water",
    IssueCategory::Roads => "roads",
    IssueCategory::Safety => "safety",
  }
}

pub fn decode_category(s: &str) -> Result<IssueCategory> {
  match s {
    "cleanliness" => Ok(IssueCategory::Cleanliness),
    "water" => Ok(IssueCategory::Water),
    "roads" => Ok(IssueCategory::Roads),
    "safety" => Ok(IssueCategory::Safety),
    other => Err(Error::Decode(format!("unknown issue category: {other:?}"))),
  }
}

// ─── AlertStatus ─────────────────────────────────────────────────────────────

pub fn encode_status(s: AlertStatus) -> &'static str {
  match s {
    AlertStatus::Active => "active",
    AlertStatus::Resolved => "resolved",
  }
}

pub fn decode_status(s: &str) -> Result<AlertStatus> {
  match s {
    "active" => Ok(AlertStatus::Active),
    "resolved" => Ok(AlertStatus::Resolved),
    other => Err(Error::Decode(format!("unknown alert status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `daily_polls` row.
pub struct RawPoll {
  pub poll_id:    String,
  pub question:   String,
  pub category:   String,
  pub active:     bool,
  pub created_at: String,
}

impl RawPoll {
  pub fn into_poll(self) -> Result<Poll> {
    Ok(Poll {
      poll_id:    decode_uuid(&self.poll_id)?,
      question:   self.question,
      category:   decode_category(&self.category)?,
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `area_alerts` row.
pub struct RawAlert {
  pub alert_id:     String,
  pub pincode:      Option<String>,
  pub category:     String,
  pub title:        String,
  pub description:  Option<String>,
  pub status:       String,
  pub upvote_count: u32,
  pub created_at:   String,
}

impl RawAlert {
  pub fn into_alert(self) -> Result<Alert> {
    Ok(Alert {
      alert_id:     decode_uuid(&self.alert_id)?,
      pincode:      self.pincode,
      category:     decode_category(&self.category)?,
      title:        self.title,
      description:  self.description,
      status:       decode_status(&self.status)?,
      upvote_count: self.upvote_count,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `pincode_constituency` row.
pub struct RawLocation {
  pub pincode:      String,
  pub ward:         String,
  pub city:         String,
  pub state:        String,
  pub constituency: Option<String>,
}

impl RawLocation {
  pub fn into_location(self) -> WardLocation {
    WardLocation {
      pincode:      self.pincode,
      ward:         self.ward,
      city:         self.city,
      state:        self.state,
      constituency: self.constituency,
    }
  }
}

