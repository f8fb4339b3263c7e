//! REST side of the server: room creation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::core::identity::PlayerId;
use crate::core::room::{Room, RoomCode};
use crate::error::{ClientError, Result};

const CREATE_ROOM_PATH: &str = "api/create-room/";

#[derive(Debug, Serialize)]
struct CreateRoomRequest<'a> {
    player_id: &'a PlayerId,
}

#[derive(Debug, Deserialize)]
struct CreateRoomResponse {
    code: String,
    #[serde(default)]
    host_id: Option<String>,
    #[serde(default)]
    players: Option<Vec<String>>,
}

/// Client for the room REST endpoint.
#[derive(Debug, Clone)]
pub struct RoomApi {
    http: reqwest::Client,
    base_url: Url,
}

impl RoomApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(with_trailing_slash(&self.base_url).join(path)?)
    }

    /// Creates a room hosted by `player`.
    pub async fn create_room(&self, player: &PlayerId) -> Result<Room> {
        let url = self.endpoint(CREATE_ROOM_PATH)?;
        debug!(%url, "creating room");

        let response = self
            .http
            .post(url)
            .json(&CreateRoomRequest { player_id: player })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Failed to create room").to_string()
            } else {
                body
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreateRoomResponse = response.json().await?;
        let code = RoomCode::parse(&body.code)
            .map_err(|e| ClientError::Config(format!("server sent room code {:?}: {e}", body.code)))?;
        info!(%code, "room created");

        Ok(Room {
            code,
            host: body.host_id.filter(|h| !h.is_empty()).map(PlayerId::from),
            players: body.players.unwrap_or_default().into_iter().map(PlayerId::from).collect(),
        })
    }
}

/// `Url::join` drops the last path segment unless it ends in `/`.
pub(crate) fn with_trailing_slash(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
