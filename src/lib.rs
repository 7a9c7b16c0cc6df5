//! velotype: a typing-speed trainer with a score backend.
//!
//! The library holds everything both front ends share: the typing engine
//! and its WPM/accuracy arithmetic, the paragraph pools, the SQLite store,
//! and the service layer that records attempts, ranks them, and serves the
//! leaderboard, progress, daily-challenge, auth, and admin operations. The
//! binary wires this up either as a terminal client or as an HTTP server.

pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod paragraphs;
pub mod server;
pub mod service;
pub mod tui;
pub mod wpm;
