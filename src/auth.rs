// src/auth.rs
//
// Local account handling: salted hash-and-compare, no session or token
// model. The stored format is "salt$hex(sha256(salt || password))".

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

const SALT_BYTES: usize = 16;

/// Failed-signin window before an email gets throttled.
const THROTTLE_WINDOW: Duration = Duration::from_secs(60);
const THROTTLE_MAX_FAILURES: u32 = 5;

/// Hash a password under a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = to_hex(&salt);
    let digest = digest_with_salt(&salt, password);
    format!("{salt}${digest}")
}

/// Constant-format compare of a password against a stored "salt$hash".
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, hash)) = stored.split_once('$') else {
        return false;
    };
    digest_with_salt(salt, password) == hash
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// In-memory failure counter per email. After five failed signins inside a
/// one-minute window, further attempts for that email are answered with the
/// rate-limit error until the window expires.
#[derive(Default)]
pub struct SigninThrottle {
    attempts: Mutex<HashMap<String, (u32, Instant)>>,
}

impl SigninThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with `RateLimited` if the email is currently throttled.
    pub fn check(&self, email: &str) -> Result<()> {
        let mut attempts = lock(&self.attempts);
        if let Some((count, since)) = attempts.get(email) {
            if since.elapsed() >= THROTTLE_WINDOW {
                attempts.remove(email);
            } else if *count >= THROTTLE_MAX_FAILURES {
                return Err(AppError::RateLimited);
            }
        }
        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let mut attempts = lock(&self.attempts);
        let entry = attempts
            .entry(email.to_string())
            .or_insert((0, Instant::now()));
        if entry.1.elapsed() >= THROTTLE_WINDOW {
            *entry = (0, Instant::now());
        }
        entry.0 += 1;
    }

    pub fn clear(&self, email: &str) {
        lock(&self.attempts).remove(email);
    }
}

fn lock<'a, T>(m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw"), hash_password("pw"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("pw", "no-dollar-sign"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn throttle_kicks_in_after_repeated_failures() {
        let t = SigninThrottle::new();
        for _ in 0..5 {
            assert!(t.check("a@b.c").is_ok());
            t.record_failure("a@b.c");
        }
        assert!(matches!(t.check("a@b.c"), Err(AppError::RateLimited)));
        // other emails unaffected
        assert!(t.check("z@b.c").is_ok());
        // a successful signin clears the slate
        t.clear("a@b.c");
        assert!(t.check("a@b.c").is_ok());
    }
}
