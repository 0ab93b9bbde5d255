//! The weekly scoring run.
//!
//! Fetches the trailing 7-day window of poll responses and active alerts,
//! aggregates them by pincode, scores each of the four categories, ranks
//! the wards, and upserts one row per ward for the current week.
//!
//! Store read or write failures abort the whole run; partial ward sets are
//! never persisted. Missing pincode mappings are non-fatal and degrade to
//! placeholder locations.

use chrono::{DateTime, Duration, Utc};

use crate::{
  aggregate,
  category::IssueCategory,
  geo::WardLocation,
  rank,
  score::{WardWeeklyScore, WeekOfYear},
  scoring,
  store::CivicStore,
};

/// Days of signal considered by one run.
const WINDOW_DAYS: i64 = 7;

/// Outcome of a completed scoring run.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRunSummary {
  pub wards_processed: usize,
  pub week:            WeekOfYear,
}

/// Run the scoring computation for the trailing window ending at `now` and
/// upsert the results.
///
/// Callers pass `Utc::now()`; tests pass a frozen instant so the window
/// edge and the derived (week, year) are controllable.
pub async fn run_weekly_scoring<S: CivicStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<ScoreRunSummary, S::Error> {
  let week = WeekOfYear::of(now);
  let cutoff = now - Duration::days(WINDOW_DAYS);

  let responses = store.poll_responses_since(cutoff).await?;
  let alerts = store.active_alerts_since(cutoff).await?;
  let wards = aggregate::accumulate(&responses, &alerts);

  let pincodes: Vec<String> = wards.keys().cloned().collect();
  let locations = store.locate_pincodes(&pincodes).await?;

  let mut rows: Vec<WardWeeklyScore> = wards
    .iter()
    .map(|(pincode, signals)| {
      let location = locations
        .get(pincode)
        .cloned()
        .unwrap_or_else(|| WardLocation::unknown(pincode));

      let score_of = |category: IssueCategory| {
        scoring::category_score(signals.category(category), signals.total_responses)
      };
      let cleanliness = score_of(IssueCategory::Cleanliness);
      let water = score_of(IssueCategory::Water);
      let roads = score_of(IssueCategory::Roads);
      let safety = score_of(IssueCategory::Safety);

      WardWeeklyScore {
        pincode:             pincode.clone(),
        ward:                location.ward,
        city:                location.city,
        state:               location.state,
        week_number:         week.week_number,
        year:                week.year,
        cleanliness_score:   cleanliness,
        water_score:         water,
        roads_score:         roads,
        safety_score:        safety,
        overall_score:       scoring::overall_score(cleanliness, water, roads, safety),
        rank:                0,
        prev_rank:           0,
        rank_change:         0,
        total_responses:     signals.total_responses,
        total_alerts:        signals.total_alerts,
        total_confirmations: signals.total_confirmations,
      }
    })
    .collect();

  let previous = store.ranks_for_week(week.previous()).await?;
  rank::assign_ranks(&mut rows, &previous);

  store.upsert_weekly_scores(&rows).await?;

  Ok(ScoreRunSummary {
    wards_processed: rows.len(),
    week,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::Mutex,
  };

  use chrono::TimeZone;
  use thiserror::Error;
  use uuid::Uuid;

  use super::*;
  use crate::{
    alert::{Alert, AlertFilter, AlertStatus, NewAlert},
    error::{ErrorKind, StoreError},
    poll::{CategorizedResponse, NewPoll, NewPollResponse, Poll, PollResponse},
  };

  #[derive(Debug, Error)]
  enum FakeError {
    #[error(transparent)]
    Domain(#[from] crate::Error),

    #[error("injected backend failure")]
    Injected,
  }

  impl StoreError for FakeError {
    fn kind(&self) -> ErrorKind {
      match self {
        FakeError::Domain(e) => e.kind(),
        FakeError::Injected => ErrorKind::Backend,
      }
    }
  }

  /// In-memory `CivicStore` for exercising the run without a database.
  #[derive(Default)]
  struct MemoryStore {
    fail_reads: bool,
    state:      Mutex<State>,
  }

  #[derive(Default)]
  struct State {
    polls:     Vec<Poll>,
    responses: Vec<PollResponse>,
    alerts:    Vec<Alert>,
    locations: HashMap<String, WardLocation>,
    scores:    HashMap<(String, u32, i32), WardWeeklyScore>,
  }

  impl CivicStore for MemoryStore {
    type Error = FakeError;

    async fn create_poll(&self, input: NewPoll) -> Result<Poll, FakeError> {
      let poll = Poll {
        poll_id:    Uuid::new_v4(),
        question:   input.question,
        category:   input.category,
        active:     true,
        created_at: Utc::now(),
      };
      self.state.lock().unwrap().polls.push(poll.clone());
      Ok(poll)
    }

    async fn list_polls(&self, only_active: bool) -> Result<Vec<Poll>, FakeError> {
      let state = self.state.lock().unwrap();
      Ok(
        state
          .polls
          .iter()
          .filter(|p| !only_active || p.active)
          .cloned()
          .collect(),
      )
    }

    async fn close_poll(&self, id: Uuid) -> Result<Poll, FakeError> {
      let mut state = self.state.lock().unwrap();
      let poll = state
        .polls
        .iter_mut()
        .find(|p| p.poll_id == id)
        .ok_or(crate::Error::PollNotFound(id))?;
      poll.active = false;
      Ok(poll.clone())
    }

    async fn record_response(
      &self,
      input: NewPollResponse,
    ) -> Result<PollResponse, FakeError> {
      let now = Utc::now();
      let mut state = self.state.lock().unwrap();

      let poll = state
        .polls
        .iter()
        .find(|p| p.poll_id == input.poll_id)
        .ok_or(crate::Error::PollNotFound(input.poll_id))?;
      if !poll.active {
        return Err(crate::Error::InactivePoll(input.poll_id).into());
      }

      let date = now.date_naive();
      if state.responses.iter().any(|r| {
        r.poll_id == input.poll_id && r.user_id == input.user_id && r.response_date == date
      }) {
        return Err(
          crate::Error::DuplicateResponse {
            poll_id: input.poll_id,
            user_id: input.user_id,
            date,
          }
          .into(),
        );
      }

      let response = PollResponse {
        response_id:   Uuid::new_v4(),
        poll_id:       input.poll_id,
        user_id:       input.user_id,
        pincode:       input.pincode,
        response:      input.response,
        created_at:    now,
        response_date: date,
      };
      state.responses.push(response.clone());
      Ok(response)
    }

    async fn create_alert(&self, input: NewAlert) -> Result<Alert, FakeError> {
      let alert = Alert {
        alert_id:     Uuid::new_v4(),
        pincode:      input.pincode,
        category:     input.category,
        title:        input.title,
        description:  input.description,
        status:       AlertStatus::Active,
        upvote_count: 0,
        created_at:   Utc::now(),
      };
      self.state.lock().unwrap().alerts.push(alert.clone());
      Ok(alert)
    }

    async fn list_alerts(&self, filter: AlertFilter) -> Result<Vec<Alert>, FakeError> {
      let state = self.state.lock().unwrap();
      Ok(
        state
          .alerts
          .iter()
          .filter(|a| filter.pincode.is_none() || a.pincode == filter.pincode)
          .filter(|a| filter.status.is_none_or(|s| a.status == s))
          .filter(|a| filter.category.is_none_or(|c| a.category == c))
          .take(filter.limit.unwrap_or(usize::MAX))
          .cloned()
          .collect(),
      )
    }

    async fn upvote_alert(&self, id: Uuid) -> Result<Alert, FakeError> {
      let mut state = self.state.lock().unwrap();
      let alert = state
        .alerts
        .iter_mut()
        .find(|a| a.alert_id == id)
        .ok_or(crate::Error::AlertNotFound(id))?;
      alert.upvote_count += 1;
      Ok(alert.clone())
    }

    async fn resolve_alert(&self, id: Uuid) -> Result<Alert, FakeError> {
      let mut state = self.state.lock().unwrap();
      let alert = state
        .alerts
        .iter_mut()
        .find(|a| a.alert_id == id)
        .ok_or(crate::Error::AlertNotFound(id))?;
      if alert.status == AlertStatus::Resolved {
        return Err(crate::Error::AlreadyResolved(id).into());
      }
      alert.status = AlertStatus::Resolved;
      Ok(alert.clone())
    }

    async fn put_location(&self, location: WardLocation) -> Result<(), FakeError> {
      self
        .state
        .lock()
        .unwrap()
        .locations
        .insert(location.pincode.clone(), location);
      Ok(())
    }

    async fn locate_pincodes(
      &self,
      pincodes: &[String],
    ) -> Result<HashMap<String, WardLocation>, FakeError> {
      let state = self.state.lock().unwrap();
      Ok(
        pincodes
          .iter()
          .filter_map(|p| state.locations.get(p).map(|l| (p.clone(), l.clone())))
          .collect(),
      )
    }

    async fn poll_responses_since(
      &self,
      cutoff: DateTime<Utc>,
    ) -> Result<Vec<CategorizedResponse>, FakeError> {
      if self.fail_reads {
        return Err(FakeError::Injected);
      }
      let state = self.state.lock().unwrap();
      Ok(
        state
          .responses
          .iter()
          .filter(|r| r.created_at >= cutoff)
          .map(|r| {
            let category = state
              .polls
              .iter()
              .find(|p| p.poll_id == r.poll_id)
              .map(|p| p.category)
              .unwrap_or(IssueCategory::Cleanliness);
            CategorizedResponse {
              pincode: r.pincode.clone(),
              category,
              response: r.response,
            }
          })
          .collect(),
      )
    }

    async fn active_alerts_since(
      &self,
      cutoff: DateTime<Utc>,
    ) -> Result<Vec<Alert>, FakeError> {
      if self.fail_reads {
        return Err(FakeError::Injected);
      }
      let state = self.state.lock().unwrap();
      Ok(
        state
          .alerts
          .iter()
          .filter(|a| a.status == AlertStatus::Active && a.created_at >= cutoff)
          .cloned()
          .collect(),
      )
    }

    async fn ranks_for_week(
      &self,
      week: WeekOfYear,
    ) -> Result<HashMap<String, u32>, FakeError> {
      let state = self.state.lock().unwrap();
      Ok(
        state
          .scores
          .values()
          .filter(|s| s.week() == week)
          .map(|s| (s.pincode.clone(), s.rank))
          .collect(),
      )
    }

    async fn weekly_scores(
      &self,
      week: WeekOfYear,
    ) -> Result<Vec<WardWeeklyScore>, FakeError> {
      let state = self.state.lock().unwrap();
      let mut rows: Vec<WardWeeklyScore> = state
        .scores
        .values()
        .filter(|s| s.week() == week)
        .cloned()
        .collect();
      rows.sort_by_key(|s| s.rank);
      Ok(rows)
    }

    async fn score_for_pincode(
      &self,
      pincode: &str,
      week: WeekOfYear,
    ) -> Result<Option<WardWeeklyScore>, FakeError> {
      let state = self.state.lock().unwrap();
      Ok(
        state
          .scores
          .get(&(pincode.to_owned(), week.week_number, week.year))
          .cloned(),
      )
    }

    async fn upsert_weekly_scores(
      &self,
      rows: &[WardWeeklyScore],
    ) -> Result<(), FakeError> {
      let mut state = self.state.lock().unwrap();
      for row in rows {
        state.scores.insert(
          (row.pincode.clone(), row.week_number, row.year),
          row.clone(),
        );
      }
      Ok(())
    }
  }

  // ── Seeding helpers ─────────────────────────────────────────────────────

  /// Thursday 2025-07-10, ISO week 28 of 2025.
  fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap()
  }

  fn poll_for(store: &MemoryStore, category: IssueCategory) -> Uuid {
    let mut state = store.state.lock().unwrap();
    if let Some(poll) = state.polls.iter().find(|p| p.category == category) {
      return poll.poll_id;
    }
    let poll = Poll {
      poll_id:    Uuid::new_v4(),
      question:   format!("Is {category:?} fine in your area today?"),
      category,
      active:     true,
      created_at: frozen_now() - Duration::days(30),
    };
    let id = poll.poll_id;
    state.polls.push(poll);
    id
  }

  fn seed_response(
    store: &MemoryStore,
    pincode: Option<&str>,
    category: IssueCategory,
    answer: bool,
    at: DateTime<Utc>,
  ) {
    let poll_id = poll_for(store, category);
    let mut state = store.state.lock().unwrap();
    state.responses.push(PollResponse {
      response_id:   Uuid::new_v4(),
      poll_id,
      user_id:       Uuid::new_v4(),
      pincode:       pincode.map(str::to_owned),
      response:      answer,
      created_at:    at,
      response_date: at.date_naive(),
    });
  }

  fn seed_alert(
    store: &MemoryStore,
    pincode: Option<&str>,
    category: IssueCategory,
    upvotes: u32,
    status: AlertStatus,
    at: DateTime<Utc>,
  ) {
    let mut state = store.state.lock().unwrap();
    state.alerts.push(Alert {
      alert_id:     Uuid::new_v4(),
      pincode:      pincode.map(str::to_owned),
      category,
      title:        "reported issue".to_owned(),
      description:  None,
      status,
      upvote_count: upvotes,
      created_at:   at,
    });
  }

  async fn seed_location(store: &MemoryStore, pincode: &str, ward: &str) {
    store
      .put_location(WardLocation {
        pincode:      pincode.to_owned(),
        ward:         ward.to_owned(),
        city:         "Delhi".to_owned(),
        state:        "Delhi".to_owned(),
        constituency: None,
      })
      .await
      .unwrap();
  }

  // ── Scenarios ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn scores_and_ranks_two_wards() {
    let store = MemoryStore::default();
    let now = frozen_now();
    let yesterday = now - Duration::days(1);

    for _ in 0..10 {
      seed_response(&store, Some("110001"), IssueCategory::Water, false, yesterday);
      seed_response(&store, Some("560001"), IssueCategory::Water, true, yesterday);
    }
    seed_location(&store, "110001", "Connaught Place").await;
    seed_location(&store, "560001", "Shivajinagar").await;

    let summary = run_weekly_scoring(&store, now).await.unwrap();
    assert_eq!(summary.wards_processed, 2);
    assert_eq!(summary.week, WeekOfYear { week_number: 28, year: 2025 });

    let rows = store.weekly_scores(summary.week).await.unwrap();
    assert_eq!(rows.len(), 2);

    // All-clear ward leads the table.
    assert_eq!(rows[0].pincode, "560001");
    assert_eq!(rows[0].water_score, 100);
    assert_eq!(rows[0].overall_score, 65);
    assert_eq!(rows[0].rank, 1);

    assert_eq!(rows[1].pincode, "110001");
    assert_eq!(rows[1].water_score, 40);
    assert_eq!(rows[1].overall_score, 47);
    assert_eq!(rows[1].rank, 2);

    // No prior week: both report no movement.
    assert!(rows.iter().all(|r| r.rank_change == 0));
    assert_eq!(rows[0].ward, "Shivajinagar");
  }

  #[tokio::test]
  async fn unmapped_pincode_degrades_to_placeholder() {
    let store = MemoryStore::default();
    let now = frozen_now();
    seed_response(&store, Some("999999"), IssueCategory::Roads, false, now - Duration::days(2));

    run_weekly_scoring(&store, now).await.unwrap();

    let row = store
      .score_for_pincode("999999", WeekOfYear::of(now))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(row.ward, "Ward 999999");
    assert_eq!(row.city, "Unknown");
    assert_eq!(row.state, "Unknown");
  }

  #[tokio::test]
  async fn rows_outside_window_are_ignored() {
    let store = MemoryStore::default();
    let now = frozen_now();
    seed_response(&store, Some("110001"), IssueCategory::Water, false, now - Duration::days(8));
    seed_alert(
      &store,
      Some("110001"),
      IssueCategory::Water,
      5,
      AlertStatus::Active,
      now - Duration::days(9),
    );

    let summary = run_weekly_scoring(&store, now).await.unwrap();
    assert_eq!(summary.wards_processed, 0);
  }

  #[tokio::test]
  async fn resolved_alerts_do_not_count() {
    let store = MemoryStore::default();
    let now = frozen_now();
    let yesterday = now - Duration::days(1);
    seed_response(&store, Some("110001"), IssueCategory::Safety, true, yesterday);
    seed_alert(
      &store,
      Some("110001"),
      IssueCategory::Safety,
      12,
      AlertStatus::Resolved,
      yesterday,
    );

    run_weekly_scoring(&store, now).await.unwrap();

    let row = store
      .score_for_pincode("110001", WeekOfYear::of(now))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(row.safety_score, 100);
    assert_eq!(row.total_alerts, 0);
    assert_eq!(row.total_confirmations, 0);
  }

  #[tokio::test]
  async fn rank_delta_tracks_previous_week() {
    let store = MemoryStore::default();
    let now = frozen_now();
    let week = WeekOfYear::of(now);

    // Last week the eventual winner was ranked 2nd.
    let mut prior = vec![
      WardWeeklyScore {
        pincode:             "110001".to_owned(),
        ward:                "Connaught Place".to_owned(),
        city:                "Delhi".to_owned(),
        state:               "Delhi".to_owned(),
        week_number:         week.previous().week_number,
        year:                week.previous().year,
        cleanliness_score:   80,
        water_score:         80,
        roads_score:         80,
        safety_score:        80,
        overall_score:       80,
        rank:                1,
        prev_rank:           1,
        rank_change:         0,
        total_responses:     5,
        total_alerts:        0,
        total_confirmations: 0,
      },
    ];
    prior.push(WardWeeklyScore {
      pincode: "560001".to_owned(),
      ward: "Shivajinagar".to_owned(),
      overall_score: 60,
      rank: 2,
      prev_rank: 2,
      ..prior[0].clone()
    });
    store.upsert_weekly_scores(&prior).await.unwrap();

    let yesterday = now - Duration::days(1);
    for _ in 0..10 {
      seed_response(&store, Some("110001"), IssueCategory::Water, false, yesterday);
      seed_response(&store, Some("560001"), IssueCategory::Water, true, yesterday);
    }

    run_weekly_scoring(&store, now).await.unwrap();

    let rows = store.weekly_scores(week).await.unwrap();
    let winner = rows.iter().find(|r| r.pincode == "560001").unwrap();
    assert_eq!(winner.rank, 1);
    assert_eq!(winner.prev_rank, 2);
    assert_eq!(winner.rank_change, 1);

    let faller = rows.iter().find(|r| r.pincode == "110001").unwrap();
    assert_eq!(faller.rank, 2);
    assert_eq!(faller.rank_change, -1);
  }

  #[tokio::test]
  async fn rerun_is_idempotent() {
    let store = MemoryStore::default();
    let now = frozen_now();
    let yesterday = now - Duration::days(1);
    for _ in 0..4 {
      seed_response(&store, Some("110001"), IssueCategory::Cleanliness, false, yesterday);
    }
    seed_alert(
      &store,
      Some("110001"),
      IssueCategory::Cleanliness,
      3,
      AlertStatus::Active,
      yesterday,
    );

    let week = WeekOfYear::of(now);
    run_weekly_scoring(&store, now).await.unwrap();
    let first = store.weekly_scores(week).await.unwrap();

    run_weekly_scoring(&store, now).await.unwrap();
    let second = store.weekly_scores(week).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.len(), 1);
  }

  #[tokio::test]
  async fn read_failure_aborts_before_any_write() {
    let store = MemoryStore {
      fail_reads: true,
      ..Default::default()
    };
    let now = frozen_now();

    let err = run_weekly_scoring(&store, now).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);

    let rows = store.weekly_scores(WeekOfYear::of(now)).await.unwrap();
    assert!(rows.is_empty());
  }
}
