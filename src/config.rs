//! Resolved client configuration.
//!
//! `clap` fills [`GlobalArgs`](crate::cli::GlobalArgs) from flags and
//! environment; [`ClientConfig::resolve`] turns that into checked URLs, a data
//! directory and a player id.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::cli::GlobalArgs;
use crate::client::rest::with_trailing_slash;
use crate::core::identity::{self, PlayerId};
use crate::core::reconnect::BackoffPolicy;
use crate::core::room::RoomCode;
use crate::error::{ClientError, Result};

pub const DEFAULT_SERVER: &str = "https://tictactoe.nik-server.in";
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const LOG_FILE: &str = "tictaclive.log";

const SOCKET_PATH: &str = "ws/tictactoe";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    pub ws_server: Url,
    pub data_dir: PathBuf,
    pub player_id: PlayerId,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let server = Url::parse(&args.server)?;
        check_scheme(&server, &["http", "https"])?;

        let ws_server = match &args.ws_server {
            Some(raw) => Url::parse(raw)?,
            None => derive_ws_base(&server)?,
        };
        check_scheme(&ws_server, &["ws", "wss"])?;

        let data_dir = match &args.data_dir {
            Some(dir) => dir.clone(),
            None => identity::data_dir()?,
        };

        let player_id = match args.player_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => PlayerId::from(id),
            _ => identity::load_or_create(&data_dir, &args.profile)?,
        };

        if args.request_timeout_secs == 0 {
            return Err(ClientError::Config("request timeout must be at least one second".into()));
        }

        let config = Self {
            server,
            ws_server,
            data_dir,
            player_id,
            max_retries: args.max_retries,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        };
        debug!(?config, "configuration resolved");
        Ok(config)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::default().with_max_retries(self.max_retries)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// `{ws_server}/ws/tictactoe/{code}/?player_id={id}`
    pub fn room_socket_url(&self, code: &RoomCode) -> Result<Url> {
        let mut url = with_trailing_slash(&self.ws_server).join(&format!("{SOCKET_PATH}/{code}/"))?;
        url.query_pairs_mut()
            .clear()
            .append_pair("player_id", self.player_id.as_str());
        Ok(url)
    }
}

/// `http` becomes `ws` and `https` becomes `wss`; host, port and path carry over.
pub fn derive_ws_base(server: &Url) -> Result<Url> {
    let scheme = match server.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(ClientError::Config(format!(
                "cannot derive a websocket url from scheme {other:?}"
            )))
        }
    };
    let mut url = server.clone();
    url.set_scheme(scheme)
        .map_err(|()| ClientError::Config(format!("cannot switch {server} to {scheme}")))?;
    Ok(url)
}

fn check_scheme(url: &Url, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&url.scheme()) {
        Ok(())
    } else {
        Err(ClientError::Config(format!(
            "{url} must use one of: {}",
            allowed.join(", ")
        )))
    }
}
