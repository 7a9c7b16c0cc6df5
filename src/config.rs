// src/config.rs

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::db::Store;

/// Server configuration, read once at startup from the environment.
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// When set, admin endpoints require a matching `x-admin-token` header.
    /// When unset, they are open (intended for local use only).
    pub admin_token: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("VELOTYPE_PORT", "3000"),
            db_path: env::var("VELOTYPE_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Store::default_path()),
            admin_token: env::var("VELOTYPE_ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
