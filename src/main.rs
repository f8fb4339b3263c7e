use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tictaclive::cli::{Cli, Commands};
use tictaclive::client::rest::RoomApi;
use tictaclive::config::ClientConfig;
use tictaclive::engine;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so its logs go to a file in the data directory.
fn init_file_logging(config: &ClientConfig) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::resolve(&cli.global).context("invalid configuration")?;

    match cli.selected() {
        Commands::Play => {
            init_file_logging(&config)?;
            engine::run(config).await
        }
        Commands::Create => {
            init_stderr_logging();
            let api = RoomApi::new(config.server.clone(), config.request_timeout)?;
            let room = api
                .create_room(&config.player_id)
                .await
                .context("failed to create room")?;

            println!("Room code: {}", room.code);
            if let Some(host) = &room.host {
                println!("Host:      {host}");
            }
            for player in &room.players {
                println!("Player:    {player}");
            }
            Ok(())
        }
        Commands::Whoami => {
            init_stderr_logging();
            println!("{}", config.player_id);
            Ok(())
        }
    }
}
