//! The category score calculator.
//!
//! Maps the raw signals for one (pincode, category) pair — poll answers,
//! alert counts, confirmation upvotes — to a 0–100 score where 100 means no
//! reported problems. Internally a "dirt score" is computed (higher = worse)
//! and inverted.

/// Weight of the poll bad-answer rate in the dirt score.
const POLL_WEIGHT: f64 = 0.6;

/// Weight of the normalized alert rate.
const ALERT_WEIGHT: f64 = 0.3;

/// Weight of the normalized confirmation rate.
const CONFIRMATION_WEIGHT: f64 = 0.1;

/// Cap on each normalized rate. Keeps a pincode with few responses but many
/// alerts from dominating.
const RATE_CAP: f64 = 100.0;

/// Counts scale to a per-1000-responses rate when responses exist.
const RATE_BASIS: f64 = 1000.0;

/// Multiplier applied to raw counts when there are no responses to
/// normalize against.
const FALLBACK_RATE_MULTIPLIER: f64 = 10.0;

/// Returned when a ward has no signal at all for a category.
pub const NEUTRAL_SCORE: u8 = 50;

// ─── Signals ─────────────────────────────────────────────────────────────────

/// Raw signals for one (pincode, category) pair within the scoring window.
#[derive(Debug, Clone, Default)]
pub struct CategorySignals {
  /// Poll answers; `false` means "problem observed".
  pub responses:     Vec<bool>,
  pub alert_count:   u32,
  /// Sum of upvotes across the category's alerts.
  pub confirmations: u32,
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Compute the 0–100 score for one category.
///
/// `total_responses` is the ward's poll response count across all
/// categories, used as the population proxy when normalizing alert rates.
/// No signal at all returns [`NEUTRAL_SCORE`].
pub fn category_score(signals: &CategorySignals, total_responses: u32) -> u8 {
  if signals.responses.is_empty() && signals.alert_count == 0 {
    return NEUTRAL_SCORE;
  }

  let poll_bad_rate = if signals.responses.is_empty() {
    0.0
  } else {
    let bad = signals.responses.iter().filter(|r| !**r).count();
    bad as f64 / signals.responses.len() as f64 * 100.0
  };

  let alert_rate = normalized_rate(signals.alert_count, total_responses);
  let confirmation_rate = normalized_rate(signals.confirmations, total_responses);

  let dirt = POLL_WEIGHT * poll_bad_rate
    + ALERT_WEIGHT * alert_rate
    + CONFIRMATION_WEIGHT * confirmation_rate;

  (100.0 - dirt).clamp(0.0, 100.0).round() as u8
}

/// Scale a raw count to a per-1000-responses rate, capped at [`RATE_CAP`].
/// Falls back to `count × 10` when there are no responses to divide by.
fn normalized_rate(count: u32, total_responses: u32) -> f64 {
  let rate = if total_responses > 0 {
    count as f64 / total_responses as f64 * RATE_BASIS
  } else {
    count as f64 * FALLBACK_RATE_MULTIPLIER
  };
  rate.min(RATE_CAP)
}

/// Weighted overall score for a ward: cleanliness and water 30% each, roads
/// and safety 20% each, rounded to the nearest integer.
pub fn overall_score(cleanliness: u8, water: u8, roads: u8, safety: u8) -> u8 {
  (0.3 * f64::from(cleanliness)
    + 0.3 * f64::from(water)
    + 0.2 * f64::from(roads)
    + 0.2 * f64::from(safety))
  .round() as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signals(responses: &[bool], alert_count: u32, confirmations: u32) -> CategorySignals {
    CategorySignals {
      responses: responses.to_vec(),
      alert_count,
      confirmations,
    }
  }

  #[test]
  fn no_signal_is_neutral() {
    assert_eq!(category_score(&signals(&[], 0, 0), 0), NEUTRAL_SCORE);
    assert_eq!(category_score(&signals(&[], 0, 0), 500), NEUTRAL_SCORE);
  }

  #[test]
  fn all_clear_responses_score_100() {
    assert_eq!(category_score(&signals(&[true, true], 0, 0), 2), 100);
  }

  #[test]
  fn all_problem_responses_score_at_most_40() {
    // poll_bad_rate = 100, so dirt ≥ 60.
    let score = category_score(&signals(&[false, false, false, false], 0, 0), 4);
    assert_eq!(score, 40);
  }

  #[test]
  fn alerts_without_responses_use_fallback_rate() {
    // 3 alerts × 10 = 30, weighted 0.3 → dirt 9 → score 91.
    assert_eq!(category_score(&signals(&[], 3, 0), 0), 91);
  }

  #[test]
  fn normalized_rates_are_capped() {
    // 50 alerts against 10 responses = 5000 per 1000, capped at 100.
    // dirt = 0.3 × 100 = 30 → score 70.
    assert_eq!(category_score(&signals(&[], 50, 0), 10), 70);
  }

  #[test]
  fn confirmations_weigh_less_than_alerts() {
    let alerts_only = category_score(&signals(&[], 10, 0), 100);
    let confirmations_only = category_score(&signals(&[], 0, 10), 100);
    assert!(confirmations_only > alerts_only);
  }

  #[test]
  fn mixed_signals_combine_weighted() {
    // bad rate 50 → 30; alerts 2/10 → 200, capped 100 → 30; conf 1/10 →
    // 100 → 10. dirt = 70, score 30.
    let score = category_score(&signals(&[true, false], 2, 1), 10);
    assert_eq!(score, 30);
  }

  #[test]
  fn score_is_always_in_range() {
    let cases = [
      (signals(&[], 0, 0), 0),
      (signals([false; 32].as_slice(), 100, 100), 1),
      (signals([true; 32].as_slice(), 0, 0), 32),
      (signals(&[false], 50, 500), 0),
    ];
    for (s, total) in cases {
      let score = category_score(&s, total);
      assert!(score <= 100, "score {score} out of range");
    }
  }

  #[test]
  fn overall_weights_sum_as_specified() {
    assert_eq!(overall_score(100, 100, 100, 100), 100);
    assert_eq!(overall_score(0, 0, 0, 0), 0);
    // 0.3·50 + 0.3·40 + 0.2·50 + 0.2·50 = 47.
    assert_eq!(overall_score(50, 40, 50, 50), 47);
    // 0.3·100 + 0.3·0 + 0.2·100 + 0.2·0 = 50.
    assert_eq!(overall_score(100, 0, 100, 0), 50);
  }
}
