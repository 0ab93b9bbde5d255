//! SQL schema for the NetaWatch SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS daily_polls (
    poll_id     TEXT PRIMARY KEY,
    question    TEXT NOT NULL,
    category    TEXT NOT NULL,   -- 'cleanliness' | 'water' | 'roads' | 'safety'
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Responses are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS poll_responses (
    response_id   TEXT PRIMARY KEY,
    poll_id       TEXT NOT NULL REFERENCES daily_polls(poll_id),
    user_id       TEXT NOT NULL,
    pincode       TEXT,            -- NULL when the respondent has no area set
    response      INTEGER NOT NULL,
    created_at    TEXT NOT NULL,
    response_date TEXT NOT NULL,   -- YYYY-MM-DD; one answer per poll/user/day
    UNIQUE (poll_id, user_id, response_date)
);

CREATE TABLE IF NOT EXISTS area_alerts (
    alert_id     TEXT PRIMARY KEY,
    pincode      TEXT,
    category     TEXT NOT NULL,
    title        TEXT NOT NULL,
    description  TEXT,
    status       TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'resolved'
    upvote_count INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pincode_constituency (
    pincode      TEXT PRIMARY KEY,
    ward         TEXT NOT NULL,
    city         TEXT NOT NULL,
    state        TEXT NOT NULL,
    constituency TEXT
);

-- One row per ward per week; whole rows are replaced by the scoring run.
CREATE TABLE IF NOT EXISTS ward_weekly_scores (
    pincode             TEXT NOT NULL,
    week_number         INTEGER NOT NULL,
    year                INTEGER NOT NULL,
    ward                TEXT NOT NULL,
    city                TEXT NOT NULL,
    state               TEXT NOT NULL,
    cleanliness_score   INTEGER NOT NULL,
    water_score         INTEGER NOT NULL,
    roads_score         INTEGER NOT NULL,
    safety_score        INTEGER NOT NULL,
    overall_score       INTEGER NOT NULL,
    rank                INTEGER NOT NULL,
    prev_rank           INTEGER NOT NULL,
    rank_change         INTEGER NOT NULL,
    total_responses     INTEGER NOT NULL,
    total_alerts        INTEGER NOT NULL,
    total_confirmations INTEGER NOT NULL,
    PRIMARY KEY (pincode, week_number, year)
);

CREATE INDEX IF NOT EXISTS responses_created_idx ON poll_responses(created_at);
CREATE INDEX IF NOT EXISTS responses_poll_idx    ON poll_responses(poll_id);
CREATE INDEX IF NOT EXISTS alerts_created_idx    ON area_alerts(created_at, status);
CREATE INDEX IF NOT EXISTS alerts_pincode_idx    ON area_alerts(pincode);
CREATE INDEX IF NOT EXISTS scores_week_idx       ON ward_weekly_scores(week_number, year);

PRAGMA user_version = 1;
";
