// src/service.rs

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{self, SigninThrottle};
use crate::db::{Difficulty, Mode, ProgressPoint, Score, Store};
use crate::error::{AppError, Result};
use crate::paragraphs;

/// Incoming attempt, straight off the wire. Everything is optional so that
/// a half-filled body reaches validation instead of being rejected by the
/// deserializer with a different shape of error.
#[derive(Debug, Default, Deserialize)]
pub struct NewScore {
    pub name: Option<String>,
    pub wpm: Option<f64>,
    pub accuracy: Option<f64>,
    pub difficulty: Option<Difficulty>,
    pub mode: Option<Mode>,
}

/// What the recorder hands back: the stored id and the attempt's 1-based
/// rank within its difficulty tier at insertion time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Recorded {
    pub id: i64,
    pub rank: i64,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    #[serde(rename = "needsConfirmation", skip_serializing_if = "Option::is_none")]
    pub needs_confirmation: Option<bool>,
}

/// Shared application core, used identically by the HTTP front end and the
/// terminal client. The store sits behind a mutex; every operation is one
/// short synchronous statement and nothing holds the lock across a wait.
pub struct Service {
    store: Mutex<Store>,
    throttle: SigninThrottle,
}

impl Service {
    pub fn new(store: Store) -> Self {
        Service {
            store: Mutex::new(store),
            throttle: SigninThrottle::new(),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Validate and persist an attempt, then compute its rank.
    ///
    /// No write happens on a validation failure. The insert and the rank
    /// count are two separate statements; a faster attempt landing between
    /// them can make the reported rank stale, which is acceptable for a
    /// display-only value.
    pub fn record(&self, attempt: NewScore) -> Result<Recorded> {
        let name = match attempt.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Err(AppError::validation("missing required fields")),
        };
        let (wpm, accuracy) = match (attempt.wpm, attempt.accuracy) {
            (Some(w), Some(a)) => (w, a),
            _ => return Err(AppError::validation("missing required fields")),
        };
        let (difficulty, mode) = match (attempt.difficulty, attempt.mode) {
            (Some(d), Some(m)) => (d, m),
            _ => return Err(AppError::validation("missing required fields")),
        };
        if !wpm.is_finite() || wpm < 0.0 {
            return Err(AppError::validation("wpm must be a non-negative number"));
        }
        if !accuracy.is_finite() || !(0.0..=100.0).contains(&accuracy) {
            return Err(AppError::validation("accuracy must be between 0 and 100"));
        }

        let store = self.store();
        let id = store.insert_score(&name, wpm, accuracy, difficulty, mode)?;
        let rank = store.rank_of(difficulty, wpm)?;
        Ok(Recorded { id, rank })
    }

    /// Top attempts by speed; `None` (or the "all" sentinel, resolved by the
    /// caller) means no difficulty filter.
    pub fn leaderboard(&self, difficulty: Option<Difficulty>) -> Result<Vec<Score>> {
        self.store().top_scores(difficulty)
    }

    /// Full attempt history for one subject, oldest first.
    pub fn progress(&self, name: &str) -> Result<Vec<ProgressPoint>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name required"));
        }
        self.store().history(name)
    }

    /// The shared paragraph for `day`, created lazily on first request.
    pub fn daily_paragraph(&self, day: NaiveDate) -> Result<String> {
        self.store()
            .daily_get_or_create(day, paragraphs::daily_candidate())
    }

    pub fn admin_list(&self) -> Result<Vec<Score>> {
        self.store().all_scores()
    }

    pub fn admin_delete(&self, id: i64) -> Result<()> {
        self.store().delete_score(id)
    }

    pub fn admin_reset(&self) -> Result<()> {
        self.store().delete_all_scores()
    }

    /// Create a local account. The local variant has no confirmation-email
    /// step, so `needsConfirmation` is always reported false.
    pub fn signup(&self, creds: Credentials) -> Result<UserInfo> {
        let (email, password) = required_credentials(creds)?;
        let hash = auth::hash_password(&password);
        let id = self.store().insert_user(&email, &hash)?;
        Ok(UserInfo {
            id,
            email,
            needs_confirmation: Some(false),
        })
    }

    pub fn signin(&self, creds: Credentials) -> Result<UserInfo> {
        let (email, password) = required_credentials(creds)?;
        self.throttle.check(&email)?;
        let found = self.store().find_user(&email)?;
        match found {
            Some((id, hash)) if auth::verify_password(&password, &hash) => {
                self.throttle.clear(&email);
                Ok(UserInfo {
                    id,
                    email,
                    needs_confirmation: None,
                })
            }
            _ => {
                self.throttle.record_failure(&email);
                Err(AppError::auth("invalid email or password"))
            }
        }
    }
}

fn required_credentials(creds: Credentials) -> Result<(String, String)> {
    let email = creds.email.unwrap_or_default().trim().to_lowercase();
    let password = creds.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("email and password required"));
    }
    Ok((email, password))
}
