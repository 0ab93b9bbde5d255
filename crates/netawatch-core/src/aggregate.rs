//! Groups windowed poll responses and alerts by pincode.
//!
//! The output feeds the score calculator once per category per ward.

use std::collections::BTreeMap;

use crate::{
  alert::Alert,
  category::IssueCategory,
  poll::CategorizedResponse,
  scoring::CategorySignals,
};

/// Accumulated raw signals for one pincode within the scoring window.
#[derive(Debug, Clone, Default)]
pub struct WardSignals {
  by_category:             [CategorySignals; 4],
  pub total_responses:     u32,
  pub total_alerts:        u32,
  pub total_confirmations: u32,
}

impl WardSignals {
  pub fn category(&self, category: IssueCategory) -> &CategorySignals {
    &self.by_category[category.index()]
  }
}

/// Group responses and alerts by pincode.
///
/// Rows without a pincode cannot be attributed to a ward and are skipped.
/// The `BTreeMap` keeps downstream iteration in pincode order.
pub fn accumulate(
  responses: &[CategorizedResponse],
  alerts: &[Alert],
) -> BTreeMap<String, WardSignals> {
  let mut wards: BTreeMap<String, WardSignals> = BTreeMap::new();

  for response in responses {
    let Some(pincode) = attributable(response.pincode.as_deref()) else {
      continue;
    };
    let ward = wards.entry(pincode.to_owned()).or_default();
    ward.by_category[response.category.index()]
      .responses
      .push(response.response);
    ward.total_responses += 1;
  }

  for alert in alerts {
    let Some(pincode) = attributable(alert.pincode.as_deref()) else {
      continue;
    };
    let ward = wards.entry(pincode.to_owned()).or_default();
    let signals = &mut ward.by_category[alert.category.index()];
    signals.alert_count += 1;
    signals.confirmations += alert.upvote_count;
    ward.total_alerts += 1;
    ward.total_confirmations += alert.upvote_count;
  }

  wards
}

fn attributable(pincode: Option<&str>) -> Option<&str> {
  pincode.filter(|p| !p.trim().is_empty())
}
