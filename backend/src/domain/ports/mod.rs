//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod demo_seed_command;
mod player_repository;
mod session_repository;
mod tournament_command;
mod tournament_query;
mod tournament_repository;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockIdentityProvider};
pub use account_command::{AccountCommand, AuthSession, IdentityProvider};
#[cfg(test)]
pub use demo_seed_command::MockDemoSeedCommand;
pub use demo_seed_command::{DemoSeedCommand, SeedDemoRequest, SeedDemoResponse};
#[cfg(test)]
pub use player_repository::MockPlayerRepository;
pub use player_repository::{
    NewPlayer, PlayerRepository, PlayerRepositoryError, StoredCredentials,
};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionRepository, SessionRepositoryError};
#[cfg(test)]
pub use tournament_command::MockTournamentCommand;
pub use tournament_command::{
    GenerateFixturesRequest, GenerateFixturesResponse, SubmitConfirmationRequest,
    TournamentCommand,
};
#[cfg(test)]
pub use tournament_query::MockTournamentQuery;
pub use tournament_query::TournamentQuery;
#[cfg(test)]
pub use tournament_repository::MockTournamentRepository;
pub use tournament_repository::{
    FixtureInsertOutcome, TournamentRepository, TournamentRepositoryError,
};
