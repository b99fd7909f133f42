//! `scorekeeper` command-line entry point.
//!
//! Wires the domain services to PostgreSQL when a database URL is
//! configured, or to a freshly seeded in-memory store otherwise, runs one
//! subcommand and prints its result as pretty JSON on stdout.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use scorekeeper::config::ScorekeeperSettings;
use scorekeeper::domain::ports::{
    AccountCommand, DemoSeedCommand, GenerateFixturesRequest, IdentityProvider, PlayerRepository,
    SeedDemoRequest, SessionRepository, SubmitConfirmationRequest, TournamentCommand,
    TournamentQuery, TournamentRepository,
};
use scorekeeper::domain::{
    AccountService, DemoSeedService, Error, LoginCredentials, MatchId, PasswordHasher, PlayerId,
    Principal, Registration, Role, SessionToken, TournamentService,
};
use scorekeeper::outbound::memory::MemoryStore;
use scorekeeper::outbound::persistence::{
    DbPool, DieselPlayerRepository, DieselSessionRepository, DieselTournamentRepository,
    PoolConfig, run_pending_migrations,
};

/// `scorekeeper` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "scorekeeper",
    about = "Score confirmation and standings for a round-robin tournament",
    version
)]
struct CliArgs {
    /// Database connection URL. Overrides `SCOREKEEPER_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    /// Operation to run.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations (PostgreSQL only).
    Migrate,
    /// Create the demo roster and schedule.
    Seed {
        /// Clear every account, session, match and confirmation first.
        #[arg(long)]
        force: bool,
    },
    /// Generate the round-robin schedule if none exists.
    GenerateFixtures {
        /// Participant ids in schedule order; all players when omitted.
        #[arg(long = "player", value_name = "id")]
        player_ids: Vec<i64>,
    },
    /// Register an account and open a session.
    Register {
        /// Unique login handle.
        #[arg(long)]
        handle: String,
        /// Name shown in listings.
        #[arg(long = "display-name")]
        display_name: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// `player` (default) or `viewer`.
        #[arg(long)]
        role: Option<Role>,
    },
    /// Open a session for an existing account.
    Login {
        /// Login handle, matched case-insensitively.
        #[arg(long)]
        handle: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Close a session.
    Logout {
        /// Session token to revoke.
        #[arg(long)]
        token: String,
    },
    /// Show the account behind a session.
    Whoami {
        /// Session token to resolve.
        #[arg(long)]
        token: String,
    },
    /// Report the score of one of your matches.
    Confirm {
        /// Session token of the reporting player.
        #[arg(long)]
        token: String,
        /// Match being reported.
        #[arg(long = "match", value_name = "id")]
        match_id: i64,
        /// Score of the match's first listed player.
        #[arg(long, allow_negative_numbers = true)]
        score1: i64,
        /// Score of the match's second listed player.
        #[arg(long, allow_negative_numbers = true)]
        score2: i64,
    },
    /// List every round and its matches.
    Rounds {
        /// Session token; adds the caller's own reports when present.
        #[arg(long)]
        token: Option<String>,
    },
    /// Cumulative standings, optionally up to a round.
    Standings {
        /// Last round to include; all rounds when omitted.
        #[arg(long)]
        round: Option<u32>,
    },
    /// Points earned per player in each round.
    RoundPoints,
    /// Standings after each round.
    StandingsByRound,
    /// Current round, rounds and standings in one payload.
    Live {
        /// Session token; adds the caller's own reports when present.
        #[arg(long)]
        token: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    // Subcommand arguments are clap's; settings come from env and files only.
    let settings = ScorekeeperSettings::load_from_iter([OsString::from("scorekeeper")])
        .map_err(|err| eyre!("failed to load scorekeeper settings: {err}"))?;
    init_tracing(settings.json_logs);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main(args, settings))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let outcome = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(e) = outcome {
        warn!(error = %e, "tracing init failed");
    }
}

async fn async_main(args: CliArgs, settings: ScorekeeperSettings) -> Result<()> {
    let database_url = args
        .database_url
        .clone()
        .or_else(|| settings.database_url().map(str::to_owned));
    let hasher = PasswordHasher::new(settings.password_iterations());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    match database_url {
        Some(url) => {
            if matches!(args.command, Command::Migrate) {
                return migrate(url).await;
            }
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
                .await
                .wrap_err("failed to create database pool")?;
            let stores = Stores {
                tournament: Arc::new(DieselTournamentRepository::new(pool.clone())),
                players: Arc::new(DieselPlayerRepository::new(pool.clone())),
                sessions: Arc::new(DieselSessionRepository::new(pool)),
            };
            run(args.command, stores, hasher, clock).await
        }
        None => {
            if matches!(args.command, Command::Migrate) {
                return Err(eyre!(
                    "migrate needs a database; pass --database-url or set SCOREKEEPER_DATABASE_URL"
                ));
            }
            let store = Arc::new(MemoryStore::new());
            let stores = Stores {
                tournament: Arc::clone(&store),
                players: Arc::clone(&store),
                sessions: store,
            };
            if !matches!(args.command, Command::Seed { .. }) {
                info!("no database configured; using a seeded in-memory store");
                DemoSeedService::new(
                    Arc::clone(&stores.players),
                    Arc::clone(&stores.tournament),
                    hasher,
                )
                .seed_demo(SeedDemoRequest::default())
                .await?;
            }
            run(args.command, stores, hasher, clock).await
        }
    }
}

async fn migrate(url: String) -> Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task failed")??;
    info!(applied, "migrations complete");
    print_json(&serde_json::json!({ "applied": applied }))
}

struct Stores<T, P, S> {
    tournament: Arc<T>,
    players: Arc<P>,
    sessions: Arc<S>,
}

async fn run<T, P, S>(
    command: Command,
    stores: Stores<T, P, S>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
) -> Result<()>
where
    T: TournamentRepository + 'static,
    P: PlayerRepository + 'static,
    S: SessionRepository + 'static,
{
    let Stores {
        tournament,
        players,
        sessions,
    } = stores;
    let tournament_service = TournamentService::new(Arc::clone(&tournament), Arc::clone(&clock));
    let accounts = AccountService::new(Arc::clone(&players), sessions, hasher, clock);

    match command {
        Command::Migrate => Err(eyre!("migrate is handled before services are built")),
        Command::Seed { force } => {
            let seeder = DemoSeedService::new(players, tournament, hasher);
            print_json(&seeder.seed_demo(SeedDemoRequest { force }).await?)
        }
        Command::GenerateFixtures { player_ids } => {
            let player_ids = if player_ids.is_empty() {
                None
            } else {
                Some(parse_player_ids(&player_ids)?)
            };
            let response = tournament_service
                .generate_fixtures(GenerateFixturesRequest { player_ids })
                .await?;
            print_json(&response)
        }
        Command::Register {
            handle,
            display_name,
            password,
            role,
        } => {
            let registration = Registration::try_from_parts(&handle, &display_name, &password, role)
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            print_json(&accounts.register(&registration).await?)
        }
        Command::Login { handle, password } => {
            let credentials = LoginCredentials::try_from_parts(&handle, &password)
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            print_json(&accounts.login(&credentials).await?)
        }
        Command::Logout { token } => {
            accounts.logout(&SessionToken::from_raw(token)).await?;
            print_json(&serde_json::json!({ "ok": true }))
        }
        Command::Whoami { token } => {
            print_json(&accounts.current_user(&SessionToken::from_raw(token)).await?)
        }
        Command::Confirm {
            token,
            match_id,
            score1,
            score2,
        } => {
            let principal = require_principal(&accounts, &token).await?;
            let view = tournament_service
                .submit_confirmation(SubmitConfirmationRequest {
                    match_id: MatchId::new(match_id),
                    principal,
                    score1,
                    score2,
                })
                .await?;
            print_json(&view)
        }
        Command::Rounds { token } => {
            let viewer = optional_principal(&accounts, token).await?;
            print_json(&tournament_service.rounds(viewer).await?)
        }
        Command::Standings { round } => print_json(&tournament_service.standings(round).await?),
        Command::RoundPoints => print_json(&tournament_service.round_points().await?),
        Command::StandingsByRound => print_json(&tournament_service.standings_by_round().await?),
        Command::Live { token } => {
            let viewer = optional_principal(&accounts, token).await?;
            print_json(&tournament_service.live_snapshot(viewer).await?)
        }
    }
}

fn parse_player_ids(raw: &[i64]) -> Result<Vec<PlayerId>, Error> {
    raw.iter()
        .map(|id| PlayerId::new(*id).map_err(|err| Error::invalid_request(err.to_string())))
        .collect()
}

async fn require_principal(
    identity: &impl IdentityProvider,
    token: &str,
) -> Result<Principal, Error> {
    identity
        .resolve_principal(&SessionToken::from_raw(token))
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))
}

async fn optional_principal(
    identity: &impl IdentityProvider,
    token: Option<String>,
) -> Result<Option<Principal>, Error> {
    match token {
        Some(token) => identity.resolve_principal(&SessionToken::from_raw(token)).await,
        None => Ok(None),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
