//! Scorekeeper library modules.
//!
//! Round-robin fixtures, two-party score confirmation, points and standings
//! for a small tournament, organised as a domain core with in-memory and
//! PostgreSQL adapters.

pub mod config;
pub mod domain;
pub mod outbound;
