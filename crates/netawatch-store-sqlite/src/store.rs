//! [`SqliteStore`] — the SQLite implementation of [`CivicStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use netawatch_core::{
  alert::{Alert, AlertFilter, AlertStatus, NewAlert},
  geo::WardLocation,
  poll::{CategorizedResponse, NewPoll, NewPollResponse, Poll, PollResponse},
  score::{WardWeeklyScore, WeekOfYear},
  store::CivicStore,
};

use crate::{
  encode::{
    RawAlert, RawLocation, RawPoll, decode_category, encode_category, encode_date, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A NetaWatch store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Look up a poll's `active` flag. `None` means the poll does not exist.
  async fn poll_active(&self, poll_id: Uuid) -> Result<Option<bool>> {
    let id_str = encode_uuid(poll_id);
    let active = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT active FROM daily_polls WHERE poll_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(active)
  }
}

/// Read one alert row inside a connection closure.
fn fetch_alert(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawAlert>> {
  conn
    .query_row(
      "SELECT alert_id, pincode, category, title, description, status, upvote_count, created_at
       FROM area_alerts WHERE alert_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawAlert {
          alert_id:     row.get(0)?,
          pincode:      row.get(1)?,
          category:     row.get(2)?,
          title:        row.get(3)?,
          description:  row.get(4)?,
          status:       row.get(5)?,
          upvote_count: row.get(6)?,
          created_at:   row.get(7)?,
        })
      },
    )
    .optional()
}

// ─── CivicStore impl ─────────────────────────────────────────────────────────

impl CivicStore for SqliteStore {
  type Error = Error;

  // ── Polls ─────────────────────────────────────────────────────────────────

  async fn create_poll(&self, input: NewPoll) -> Result<Poll> {
    let poll = Poll {
      poll_id:    Uuid::new_v4(),
      question:   input.question,
      category:   input.category,
      active:     true,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(poll.poll_id);
    let question     = poll.question.clone();
    let category_str = encode_category(poll.category).to_owned();
    let at_str       = encode_dt(poll.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO daily_polls (poll_id, question, category, active, created_at)
           VALUES (?1, ?2, ?3, 1, ?4)",
          rusqlite::params![id_str, question, category_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(poll)
  }

  async fn list_polls(&self, only_active: bool) -> Result<Vec<Poll>> {
    let raws: Vec<RawPoll> = self
      .conn
      .call(move |conn| {
        let sql = if only_active {
          "SELECT poll_id, question, category, active, created_at
           FROM daily_polls WHERE active = 1 ORDER BY created_at DESC"
        } else {
          "SELECT poll_id, question, category, active, created_at
           FROM daily_polls ORDER BY created_at DESC"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPoll {
              poll_id:    row.get(0)?,
              question:   row.get(1)?,
              category:   row.get(2)?,
              active:     row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPoll::into_poll).collect()
  }

  async fn close_poll(&self, id: Uuid) -> Result<Poll> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPoll> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE daily_polls SET active = 0 WHERE poll_id = ?1",
          rusqlite::params![id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT poll_id, question, category, active, created_at
               FROM daily_polls WHERE poll_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPoll {
                  poll_id:    row.get(0)?,
                  question:   row.get(1)?,
                  category:   row.get(2)?,
                  active:     row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::PollNotFound(id))?.into_poll()
  }

  async fn record_response(&self, input: NewPollResponse) -> Result<PollResponse> {
    match self.poll_active(input.poll_id).await? {
      None => return Err(Error::PollNotFound(input.poll_id)),
      Some(false) => return Err(Error::InactivePoll(input.poll_id)),
      Some(true) => {}
    }

    let now = Utc::now();
    let response = PollResponse {
      response_id:   Uuid::new_v4(),
      poll_id:       input.poll_id,
      user_id:       input.user_id,
      pincode:       input.pincode,
      response:      input.response,
      created_at:    now,
      response_date: now.date_naive(),
    };

    let poll_id_str = encode_uuid(response.poll_id);
    let user_id_str = encode_uuid(response.user_id);
    let date_str    = encode_date(response.response_date);

    let already: bool = {
      let (poll_id_str, user_id_str, date_str) =
        (poll_id_str.clone(), user_id_str.clone(), date_str.clone());
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM poll_responses
                 WHERE poll_id = ?1 AND user_id = ?2 AND response_date = ?3",
                rusqlite::params![poll_id_str, user_id_str, date_str],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?
    };
    if already {
      return Err(Error::DuplicateResponse {
        poll_id: response.poll_id,
        user_id: response.user_id,
        date:    response.response_date,
      });
    }

    let response_id_str = encode_uuid(response.response_id);
    let pincode         = response.pincode.clone();
    let answer          = response.response;
    let at_str          = encode_dt(response.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO poll_responses (
             response_id, poll_id, user_id, pincode, response, created_at, response_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            response_id_str,
            poll_id_str,
            user_id_str,
            pincode,
            answer,
            at_str,
            date_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(response)
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  async fn create_alert(&self, input: NewAlert) -> Result<Alert> {
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

    let id_str       = encode_uuid(alert.alert_id);
    let pincode      = alert.pincode.clone();
    let category_str = encode_category(alert.category).to_owned();
    let title        = alert.title.clone();
    let description  = alert.description.clone();
    let status_str   = encode_status(alert.status).to_owned();
    let at_str       = encode_dt(alert.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO area_alerts (
             alert_id, pincode, category, title, description, status, upvote_count, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
          rusqlite::params![id_str, pincode, category_str, title, description, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(alert)
  }

  async fn list_alerts(&self, filter: AlertFilter) -> Result<Vec<Alert>> {
    let pincode      = filter.pincode.clone();
    let status_str   = filter.status.map(encode_status).map(str::to_owned);
    let category_str = filter.category.map(encode_category).map(str::to_owned);
    let limit_val    = filter.limit.unwrap_or(100) as i64;

    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; placeholder positions are fixed.
        let mut conds: Vec<&'static str> = vec![];
        if pincode.is_some() {
          conds.push("pincode = ?1");
        }
        if status_str.is_some() {
          conds.push("status = ?2");
        }
        if category_str.is_some() {
          conds.push("category = ?3");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT alert_id, pincode, category, title, description, status, upvote_count, created_at
           FROM area_alerts
           {where_clause}
           ORDER BY created_at DESC
           LIMIT ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              pincode.as_deref(),
              status_str.as_deref(),
              category_str.as_deref(),
              limit_val,
            ],
            |row| {
              Ok(RawAlert {
                alert_id:     row.get(0)?,
                pincode:      row.get(1)?,
                category:     row.get(2)?,
                title:        row.get(3)?,
                description:  row.get(4)?,
                status:       row.get(5)?,
                upvote_count: row.get(6)?,
                created_at:   row.get(7)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_alert).collect()
  }

  async fn upvote_alert(&self, id: Uuid) -> Result<Alert> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAlert> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE area_alerts SET upvote_count = upvote_count + 1 WHERE alert_id = ?1",
          rusqlite::params![id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_alert(conn, &id_str)?)
      })
      .await?;

    raw.ok_or(Error::AlertNotFound(id))?.into_alert()
  }

  async fn resolve_alert(&self, id: Uuid) -> Result<Alert> {
    let id_str = encode_uuid(id);

    let status: Option<String> = {
      let id_str = id_str.clone();
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT status FROM area_alerts WHERE alert_id = ?1",
                rusqlite::params![id_str],
                |row| row.get(0),
              )
              .optional()?,
          )
        })
        .await?
    };

    match status.as_deref() {
      None => return Err(Error::AlertNotFound(id)),
      Some("resolved") => return Err(Error::AlreadyResolved(id)),
      Some(_) => {}
    }

    let raw: Option<RawAlert> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE area_alerts SET status = 'resolved' WHERE alert_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(fetch_alert(conn, &id_str)?)
      })
      .await?;

    raw.ok_or(Error::AlertNotFound(id))?.into_alert()
  }

  // ── Geography ─────────────────────────────────────────────────────────────

  async fn put_location(&self, location: WardLocation) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pincode_constituency (pincode, ward, city, state, constituency)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (pincode) DO UPDATE SET
             ward         = excluded.ward,
             city         = excluded.city,
             state        = excluded.state,
             constituency = excluded.constituency",
          rusqlite::params![
            location.pincode,
            location.ward,
            location.city,
            location.state,
            location.constituency,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn locate_pincodes(
    &self,
    pincodes: &[String],
  ) -> Result<HashMap<String, WardLocation>> {
    if pincodes.is_empty() {
      return Ok(HashMap::new());
    }

    let keys = pincodes.to_vec();
    let raws: Vec<RawLocation> = self
      .conn
      .call(move |conn| {
        // One query for the whole batch; no per-pincode fan-out.
        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
          "SELECT pincode, ward, city, state, constituency
           FROM pincode_constituency WHERE pincode IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(keys.iter()), |row| {
            Ok(RawLocation {
              pincode:      row.get(0)?,
              ward:         row.get(1)?,
              city:         row.get(2)?,
              state:        row.get(3)?,
              constituency: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(|raw| (raw.pincode.clone(), raw.into_location()))
        .collect(),
    )
  }

  // ── Scoring reads ─────────────────────────────────────────────────────────

  async fn poll_responses_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<CategorizedResponse>> {
    let cutoff_str = encode_dt(cutoff);

    let raws: Vec<(Option<String>, String, bool)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.pincode, p.category, r.response
           FROM poll_responses r
           JOIN daily_polls p ON p.poll_id = r.poll_id
           WHERE r.created_at >= ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cutoff_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(pincode, category, response)| {
        Ok(CategorizedResponse {
          pincode,
          category: decode_category(&category)?,
          response,
        })
      })
      .collect()
  }

  async fn active_alerts_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Alert>> {
    let cutoff_str = encode_dt(cutoff);

    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT alert_id, pincode, category, title, description, status, upvote_count, created_at
           FROM area_alerts
           WHERE created_at >= ?1 AND status = 'active'",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cutoff_str], |row| {
            Ok(RawAlert {
              alert_id:     row.get(0)?,
              pincode:      row.get(1)?,
              category:     row.get(2)?,
              title:        row.get(3)?,
              description:  row.get(4)?,
              status:       row.get(5)?,
              upvote_count: row.get(6)?,
              created_at:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_alert).collect()
  }

  async fn ranks_for_week(&self, week: WeekOfYear) -> Result<HashMap<String, u32>> {
    let ranks = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT pincode, rank FROM ward_weekly_scores
           WHERE week_number = ?1 AND year = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![week.week_number, week.year], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
          })?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ranks)
  }

  async fn weekly_scores(&self, week: WeekOfYear) -> Result<Vec<WardWeeklyScore>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT_SCORE_ROW}
           WHERE week_number = ?1 AND year = ?2
           ORDER BY rank ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![week.week_number, week.year], score_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn score_for_pincode(
    &self,
    pincode: &str,
    week: WeekOfYear,
  ) -> Result<Option<WardWeeklyScore>> {
    let pincode = pincode.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "{SELECT_SCORE_ROW}
                 WHERE pincode = ?1 AND week_number = ?2 AND year = ?3"
              ),
              rusqlite::params![pincode, week.week_number, week.year],
              score_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  // ── Scoring writes ────────────────────────────────────────────────────────

  async fn upsert_weekly_scores(&self, rows: &[WardWeeklyScore]) -> Result<()> {
    let rows = rows.to_vec();
    self
      .conn
      .call(move |conn| {
        // All rows of a run land in one transaction.
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO ward_weekly_scores (
               pincode, week_number, year, ward, city, state,
               cleanliness_score, water_score, roads_score, safety_score,
               overall_score, rank, prev_rank, rank_change,
               total_responses, total_alerts, total_confirmations
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT (pincode, week_number, year) DO UPDATE SET
               ward                = excluded.ward,
               city                = excluded.city,
               state               = excluded.state,
               cleanliness_score   = excluded.cleanliness_score,
               water_score         = excluded.water_score,
               roads_score         = excluded.roads_score,
               safety_score        = excluded.safety_score,
               overall_score       = excluded.overall_score,
               rank                = excluded.rank,
               prev_rank           = excluded.prev_rank,
               rank_change         = excluded.rank_change,
               total_responses     = excluded.total_responses,
               total_alerts        = excluded.total_alerts,
               total_confirmations = excluded.total_confirmations",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.pincode,
              row.week_number,
              row.year,
              row.ward,
              row.city,
              row.state,
              row.cleanliness_score,
              row.water_score,
              row.roads_score,
              row.safety_score,
              row.overall_score,
              row.rank,
              row.prev_rank,
              row.rank_change,
              row.total_responses,
              row.total_alerts,
              row.total_confirmations,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Score-row mapping ───────────────────────────────────────────────────────

const SELECT_SCORE_ROW: &str = "SELECT
   pincode, ward, city, state, week_number, year,
   cleanliness_score, water_score, roads_score, safety_score, overall_score,
   rank, prev_rank, rank_change,
   total_responses, total_alerts, total_confirmations
 FROM ward_weekly_scores";

fn score_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WardWeeklyScore> {
  Ok(WardWeeklyScore {
    pincode:             row.get(0)?,
    ward:                row.get(1)?,
    city:                row.get(2)?,
    state:               row.get(3)?,
    week_number:         row.get(4)?,
    year:                row.get(5)?,
    cleanliness_score:   row.get(6)?,
    water_score:         row.get(7)?,
    roads_score:         row.get(8)?,
    safety_score:        row.get(9)?,
    overall_score:       row.get(10)?,
    rank:                row.get(11)?,
    prev_rank:           row.get(12)?,
    rank_change:         row.get(13)?,
    total_responses:     row.get(14)?,
    total_alerts:        row.get(15)?,
    total_confirmations: row.get(16)?,
  })
}
