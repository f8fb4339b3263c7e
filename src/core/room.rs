use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::PlayerId;

/// Longest code accepted from the keyboard. Server codes are six characters.
pub const MAX_CODE_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRoomCode {
    #[error("enter a room code")]
    Empty,
    #[error("room codes are letters and digits only")]
    Charset,
    #[error("room code is too long")]
    TooLong,
}

/// Short alphanumeric identifier of a room. Safe to embed in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn parse(input: &str) -> Result<Self, InvalidRoomCode> {
        let code = input.trim();
        if code.is_empty() {
            return Err(InvalidRoomCode::Empty);
        }
        if code.len() > MAX_CODE_LEN {
            return Err(InvalidRoomCode::TooLong);
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidRoomCode::Charset);
        }
        Ok(RoomCode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membership of the room the client is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    pub host: Option<PlayerId>,
    pub players: Vec<PlayerId>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            host: None,
            players: Vec::new(),
        }
    }

    pub fn is_host(&self, player: &PlayerId) -> bool {
        self.host.as_ref() == Some(player)
    }
}
