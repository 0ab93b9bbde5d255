//! The fixed issue categories every civic signal attaches to.

use serde::{Deserialize, Serialize};

/// A civic issue category. The weekly scoring run produces one score per
/// category per ward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
  Cleanliness,
  Water,
  Roads,
  Safety,
}

impl IssueCategory {
  /// All categories, in the order their scores appear in a weekly row.
  pub const ALL: [IssueCategory; 4] = [
    IssueCategory::Cleanliness,
    IssueCategory::Water,
    IssueCategory::Roads,
    IssueCategory::Safety,
  ];

  /// Stable position of this category in per-category arrays.
  pub fn index(self) -> usize {
    match self {
      Self::Cleanliness => 0,
      Self::Water => 1,
      Self::Roads => 2,
      Self::Safety => 3,
    }
  }
}
