//! Driving port for loading the demo roster and schedule.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Request to seed demo data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDemoRequest {
    /// Wipe every account, session, match and confirmation first.
    pub force: bool,
}

/// Outcome of a seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDemoResponse {
    /// `false` when accounts already existed and nothing was written.
    pub seeded: bool,
    /// Player-role accounts after the call.
    pub players: usize,
    /// Matches after the call.
    pub matches: usize,
}

/// Driving port for demo seeding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DemoSeedCommand: Send + Sync {
    /// Register the demo roster and generate its fixtures when empty.
    async fn seed_demo(&self, request: SeedDemoRequest) -> Result<SeedDemoResponse, Error>;
}
