// src/db.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Practice-text difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Difficulty> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Whether an attempt used a random pool paragraph or the shared daily one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Daily,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "normal" => Some(Mode::Normal),
            "daily" => Some(Mode::Daily),
            _ => None,
        }
    }
}

/// One recorded attempt. Immutable after creation except for deletion.
#[derive(Debug, Clone, Serialize)]
pub struct Score {
    pub id: i64,
    pub name: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    pub mode: Mode,
    /// RFC 3339 UTC timestamp of insertion.
    pub date: String,
}

/// A single point of a user's trend line.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPoint {
    pub wpm: f64,
    pub accuracy: f64,
    pub date: String,
}

/// Leaderboard size cap.
pub const TOP_LIMIT: usize = 10;

/// Embedded SQLite store. Every operation is a single statement; the only
/// cross-request coordination in the whole system is the uniqueness
/// constraint on `daily_challenges.day`.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path`, creating parent directories
    /// and running the schema as needed.
    pub fn open(path: &Path) -> Result<Store> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Store { conn })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Store { conn })
    }

    /// Default location under the XDG data dir:
    ///   $XDG_DATA_HOME/velotype/velotype.db
    /// falling back to the current directory.
    pub fn default_path() -> PathBuf {
        let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.push("velotype");
        dir.push("velotype.db");
        dir
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT    NOT NULL,
                wpm         REAL    NOT NULL,
                accuracy    REAL    NOT NULL,
                difficulty  TEXT    NOT NULL,
                mode        TEXT    NOT NULL,
                recorded_at TEXT    NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_challenges (
                day       TEXT PRIMARY KEY,
                paragraph TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                email         TEXT    NOT NULL UNIQUE,
                password_hash TEXT    NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Insert a validated attempt, returning its assigned id. The timestamp
    /// is taken here, at insertion.
    pub fn insert_score(
        &self,
        name: &str,
        wpm: f64,
        accuracy: f64,
        difficulty: Difficulty,
        mode: Mode,
    ) -> Result<i64> {
        let recorded_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO scores (name, wpm, accuracy, difficulty, mode, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, wpm, accuracy, difficulty.as_str(), mode.as_str(), recorded_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 1-based rank: one plus the number of strictly faster attempts in the
    /// same difficulty tier. Equal speeds share a rank.
    pub fn rank_of(&self, difficulty: Difficulty, wpm: f64) -> Result<i64> {
        let faster: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM scores WHERE difficulty = ?1 AND wpm > ?2",
            params![difficulty.as_str(), wpm],
            |row| row.get(0),
        )?;
        Ok(faster + 1)
    }

    /// Top attempts by speed, at most [`TOP_LIMIT`], optionally filtered by
    /// difficulty. Ties keep insertion order.
    pub fn top_scores(&self, difficulty: Option<Difficulty>) -> Result<Vec<Score>> {
        let mut out = Vec::new();
        match difficulty {
            Some(d) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, wpm, accuracy, difficulty, mode, recorded_at
                     FROM scores WHERE difficulty = ?1
                     ORDER BY wpm DESC, id LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![d.as_str(), TOP_LIMIT as i64], score_from_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, wpm, accuracy, difficulty, mode, recorded_at
                     FROM scores ORDER BY wpm DESC, id LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![TOP_LIMIT as i64], score_from_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Every attempt by `name`, across all difficulties and modes, oldest
    /// first.
    pub fn history(&self, name: &str) -> Result<Vec<ProgressPoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT wpm, accuracy, recorded_at FROM scores
             WHERE name = ?1 ORDER BY recorded_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![name], |row| {
            Ok(ProgressPoint {
                wpm: row.get(0)?,
                accuracy: row.get(1)?,
                date: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// All attempts, newest first.
    pub fn all_scores(&self) -> Result<Vec<Score>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, wpm, accuracy, difficulty, mode, recorded_at
             FROM scores ORDER BY recorded_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], score_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Delete one attempt. A miss is a success no-op.
    pub fn delete_score(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM scores WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every attempt. An already-empty table is a success no-op.
    pub fn delete_all_scores(&self) -> Result<()> {
        self.conn.execute("DELETE FROM scores", [])?;
        Ok(())
    }

    /// Paragraph for `day`, creating it from `candidate` on first request.
    ///
    /// Insert-on-conflict closes the concurrent-first-request race: a loser
    /// whose insert hits the uniqueness constraint on `day` falls through to
    /// the re-select and returns the winner's row instead of an error.
    pub fn daily_get_or_create(&self, day: NaiveDate, candidate: &str) -> Result<String> {
        let day = day.to_string();
        if let Some(paragraph) = self.daily_for(&day)? {
            return Ok(paragraph);
        }
        self.conn.execute(
            "INSERT INTO daily_challenges (day, paragraph) VALUES (?1, ?2)
             ON CONFLICT(day) DO NOTHING",
            params![day, candidate],
        )?;
        self.daily_for(&day)?
            .ok_or(AppError::Store(rusqlite::Error::QueryReturnedNoRows))
    }

    fn daily_for(&self, day: &str) -> Result<Option<String>> {
        let paragraph = self
            .conn
            .query_row(
                "SELECT paragraph FROM daily_challenges WHERE day = ?1",
                params![day],
                |row| row.get(0),
            )
            .optional()?;
        Ok(paragraph)
    }

    /// Create an account row. A duplicate email is rejected by the unique
    /// constraint and surfaced as a validation error, leaving no mutation.
    pub fn insert_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        let inserted = self.conn.execute(
            "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
            params![email, password_hash],
        );
        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AppError::validation("email already in use"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_user(&self, email: &str) -> Result<Option<(i64, String)>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(user)
    }
}

fn score_from_row(row: &Row) -> rusqlite::Result<Score> {
    let difficulty: String = row.get(4)?;
    let mode: String = row.get(5)?;
    Ok(Score {
        id: row.get(0)?,
        name: row.get(1)?,
        wpm: row.get(2)?,
        accuracy: row.get(3)?,
        // inserts only ever write the canonical strings
        difficulty: Difficulty::parse(&difficulty).unwrap_or(Difficulty::Easy),
        mode: Mode::parse(&mode).unwrap_or(Mode::Normal),
        date: row.get(6)?,
    })
}
