//! Weekly ward score rows and week arithmetic.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::category::IssueCategory;

// ─── Week arithmetic ─────────────────────────────────────────────────────────

/// An ISO week number paired with its ISO week-based year. Both components
/// always come from the same `IsoWeek`, so a row's (week, year) pair stays
/// internally consistent across calendar-year boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekOfYear {
  pub week_number: u32,
  pub year:        i32,
}

impl WeekOfYear {
  /// The week containing `at`.
  pub fn of(at: DateTime<Utc>) -> Self {
    let iso = at.iso_week();
    Self {
      week_number: iso.week(),
      year:        iso.year(),
    }
  }

  /// The week whose persisted ranks seed `prev_rank`: always `week − 1`
  /// within the same year. A week-1 run therefore queries week 0, finds no
  /// rows, and reports every ward unchanged.
  pub fn previous(self) -> Self {
    Self {
      week_number: self.week_number.saturating_sub(1),
      year:        self.year,
    }
  }
}

// ─── Weekly row ──────────────────────────────────────────────────────────────

/// One ward's computed report card for one week.
///
/// Written only by the weekly scoring run, keyed on
/// (pincode, week_number, year). Re-runs replace whole rows, never patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardWeeklyScore {
  pub pincode:             String,
  pub ward:                String,
  pub city:                String,
  pub state:               String,
  pub week_number:         u32,
  pub year:                i32,
  pub cleanliness_score:   u8,
  pub water_score:         u8,
  pub roads_score:         u8,
  pub safety_score:        u8,
  /// round(0.3·cleanliness + 0.3·water + 0.2·roads + 0.2·safety).
  pub overall_score:       u8,
  /// Dense 1-based rank over all wards scored the same week.
  pub rank:                u32,
  /// Last week's rank, or this week's own rank if the ward is new.
  pub prev_rank:           u32,
  /// prev_rank − rank; positive = moved up the table.
  pub rank_change:         i32,
  pub total_responses:     u32,
  pub total_alerts:        u32,
  pub total_confirmations: u32,
}

impl WardWeeklyScore {
  pub fn week(&self) -> WeekOfYear {
    WeekOfYear {
      week_number: self.week_number,
      year:        self.year,
    }
  }

  pub fn category_score(&self, category: IssueCategory) -> u8 {
    match category {
      IssueCategory::Cleanliness => self.cleanliness_score,
      IssueCategory::Water => self.water_score,
      IssueCategory::Roads => self.roads_score,
      IssueCategory::Safety => self.safety_score,
    }
  }
}
