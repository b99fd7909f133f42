//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven repository ports backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types; the consensus rule itself runs in the domain, inside the
//!   adapter's transaction.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures map onto each port's
//!   error enum.
//!
//! # Example
//!
//! ```rust,no_run
//! use scorekeeper::outbound::persistence::{DbPool, DieselTournamentRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/scorekeeper")).await?;
//! let repository = DieselTournamentRepository::new(pool);
//! # let _ = repository;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_player_repository;
mod diesel_session_repository;
mod diesel_tournament_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_player_repository::DieselPlayerRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_tournament_repository::DieselTournamentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_MAX_SIZE, DbPool, PoolConfig, PoolError};
