use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_PROFILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER};
use crate::core::reconnect::DEFAULT_MAX_RETRIES;

#[derive(Parser, Debug)]
#[command(name = "tictaclive")]
#[command(about = "Real-time two-player tic-tac-toe in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the game server's HTTP API
    #[arg(long, env = "TICTAC_SERVER", default_value = DEFAULT_SERVER, global = true)]
    pub server: String,

    /// Base URL for room sockets (defaults to --server with a ws/wss scheme)
    #[arg(long, env = "TICTAC_WS_SERVER", global = true)]
    pub ws_server: Option<String>,

    /// Identity profile; each profile keeps its own player id
    #[arg(short, long, env = "TICTAC_PROFILE", default_value = DEFAULT_PROFILE, global = true)]
    pub profile: String,

    /// Use this player id instead of the stored one
    #[arg(long, global = true)]
    pub player_id: Option<String>,

    /// Where player ids and the log file live
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, global = true)]
    pub max_retries: u32,

    /// Timeout for REST requests, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub request_timeout_secs: u64,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive client (default)
    Play,
    /// Create a room and print its code
    Create,
    /// Print this profile's player id
    Whoami,
}

impl Cli {
    pub fn selected(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Play)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_play() {
        let cli = Cli::try_parse_from(["tictaclive"]).unwrap();
        assert_eq!(cli.selected(), Commands::Play);
        assert_eq!(cli.global.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(cli.global.profile, "default");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tictaclive",
            "create",
            "--server",
            "http://localhost:8000",
            "--max-retries",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.selected(), Commands::Create);
        assert_eq!(cli.global.server, "http://localhost:8000");
        assert_eq!(cli.global.max_retries, 2);
    }
}
