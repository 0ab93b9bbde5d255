//! Pincode geography — the pincode → ward lookup.

use serde::{Deserialize, Serialize};

/// The human-readable location for a pincode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardLocation {
  pub pincode:      String,
  pub ward:         String,
  pub city:         String,
  pub state:        String,
  /// Assembly constituency, where known.
  pub constituency: Option<String>,
}

impl WardLocation {
  /// Placeholder for a pincode with no mapping. The scoring run degrades to
  /// this instead of failing.
  pub fn unknown(pincode: &str) -> Self {
    Self {
      pincode:      pincode.to_owned(),
      ward:         format!("Ward {pincode}"),
      city:         "Unknown".to_owned(),
      state:        "Unknown".to_owned(),
      constituency: None,
    }
  }
}
