//! Dense ranking of weekly score rows.

use std::collections::HashMap;

use crate::score::WardWeeklyScore;

/// Sort `rows` by overall score descending and assign dense 1-based ranks.
///
/// Ties break by pincode ascending so the ordering is deterministic.
/// `previous` maps pincode to last week's persisted rank; a ward with no
/// prior row is treated as unchanged (`rank_change = 0`).
pub fn assign_ranks(rows: &mut [WardWeeklyScore], previous: &HashMap<String, u32>) {
  rows.sort_by(|a, b| {
    b.overall_score
      .cmp(&a.overall_score)
      .then_with(|| a.pincode.cmp(&b.pincode))
  });

  for (index, row) in rows.iter_mut().enumerate() {
    row.rank = index as u32 + 1;
    row.prev_rank = previous.get(&row.pincode).copied().unwrap_or(row.rank);
    row.rank_change = row.prev_rank as i32 - row.rank as i32;
  }
}
