use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use scribble::prelude::*;
use tracing_subscriber::EnvFilter;

/// Multiplayer draw-and-guess game server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "SCRIBBLE_BIND", default_value = "0.0.0.0:5000")]
    bind: String,

    /// JSON file with an array of words; the built-in list is used if unset
    #[arg(short, long, env = "SCRIBBLE_WORDS")]
    words: Option<PathBuf>,

    /// Length of one round in seconds
    #[arg(long, env = "SCRIBBLE_ROUND_SECONDS", default_value_t = 90)]
    round_seconds: u32,

    /// Players needed to start a game
    #[arg(long, env = "SCRIBBLE_MIN_PLAYERS", default_value_t = 2)]
    min_players: usize,

    /// Maximum players per room
    #[arg(long, env = "SCRIBBLE_MAX_PLAYERS", default_value_t = 10)]
    max_players: usize,

    /// Rounds per game, 0 for no limit
    #[arg(long, env = "SCRIBBLE_MAX_ROUNDS", default_value_t = 5)]
    max_rounds: u32,

    /// Seconds a connection may stay silent before it is closed
    #[arg(long, env = "SCRIBBLE_IDLE_TIMEOUT", default_value_t = 300)]
    idle_timeout: u64,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            round_seconds: self.round_seconds,
            min_players: self.min_players,
            max_players: self.max_players,
            max_rounds: self.max_rounds,
            ..GameConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: Args) -> Result<(), ScribbleError> {
    let words = match &args.words {
        Some(path) => WordList::load(path)?,
        None => WordList::builtin(),
    };
    tracing::info!(words = words.len(), "word list ready");

    let server = ScribbleServer::builder()
        .bind(&args.bind)
        .game_config(args.game_config())
        .words(words)
        .idle_timeout(Duration::from_secs(args.idle_timeout))
        .build()
        .await?;

    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "listening");
    }

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
