use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, Local};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habit_berserk::api::{self, identity::AuthConfig};
use habit_berserk::storage::SqliteStore;

#[derive(Parser)]
#[command(name = "habit-berserk")]
#[command(about = "Gamified habit tracker: complete quests, level up your character")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Habit Berserk server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Path to the storage database (defaults to the platform data dir)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "habit_berserk=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Re-arm and fire the daily-refresh timer at each local midnight.
///
/// Best effort only: if the process is down when midnight passes, the
/// day-boundary check in `ProgressStore::initialize` catches up on the next
/// request.
async fn run_midnight_refresh(state: api::AppState) {
    loop {
        let now = Local::now();
        let next_midnight = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| dt.and_local_timezone(Local).single());

        let Some(next_midnight) = next_midnight else {
            // DST edge where local midnight is ambiguous; retry in an hour
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            continue;
        };

        let until = (next_midnight - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60));
        tokio::time::sleep(until).await;

        tracing::info!("Day boundary reached, refreshing daily quests");
        state.refresh_all_sessions();
    }
}

async fn serve(port: u16, db: Option<PathBuf>) -> anyhow::Result<()> {
    let storage = match db {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_default()?,
    };
    storage.migrate()?;
    let storage = Arc::new(storage);

    let state = api::AppState::new(storage);
    tokio::spawn(run_midnight_refresh(state.clone()));

    let app = api::create_router_from_state(state, AuthConfig::from_env());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Habit Berserk server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, db }) => {
            tracing::info!("Starting Habit Berserk server on port {}", port);
            serve(port, db).await?;
        }
        None => {
            // Default: start server
            tracing::info!("Starting Habit Berserk server on port 3000");
            serve(3000, None).await?;
        }
    }

    Ok(())
}
