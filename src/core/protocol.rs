//! Wire messages exchanged with the game server over the room socket.
//!
//! Outbound messages are tagged by `action`. Inbound messages are not
//! uniformly tagged: errors and history payloads arrive as bare objects, the
//! rest carry a `type` field. [`decode`] folds all of them into [`ServerEvent`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::core::game::{Board, GameState, Mark, Outcome};
use crate::core::history::GameSummary;
use crate::core::identity::PlayerId;

/// Sentinel the server sends instead of an empty history list.
const NO_HISTORY: &str = "No previous games";

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Re-attach to whatever game the room has in progress.
    ResumeGame { player_id: PlayerId },
    /// Host starts (or restarts) a game.
    StartGame,
    MakeMove { player_id: PlayerId, index: usize },
    RequestHistory,
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Server → client events after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Server-side rejection or failure, shown to the user.
    Error(String),
    /// Full replacement of the room's game history.
    History(Vec<GameSummary>),
    RoomUpdate {
        players: Vec<PlayerId>,
        host: Option<PlayerId>,
    },
    GameStarted(GameState),
    GameUpdate(GameState),
    /// Snapshot sent in answer to `resume_game`.
    Resumed(GameState),
    NoGameToResume,
    /// Well-formed message of a kind this client does not handle.
    Unrecognized(String),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message is not a JSON object")]
    NotAnObject,
    #[error("message has no type tag")]
    MissingType,
    #[error("board must be nine cells of \"\", \"X\" or \"O\"")]
    Board,
    #[error("unknown mark {0:?}")]
    Mark(String),
    #[error("unknown outcome {0:?}")]
    Outcome(String),
    #[error("history must be a list or \"No previous games\"")]
    History,
}

#[derive(Debug, Deserialize)]
struct WireGame {
    #[serde(default)]
    x_player: Option<String>,
    #[serde(default)]
    o_player: Option<String>,
    #[serde(default)]
    board: Option<Vec<String>>,
    #[serde(default)]
    turn: Option<String>,
    #[serde(default)]
    finished: Option<bool>,
    #[serde(default)]
    winner: Option<String>,
}

impl WireGame {
    fn into_state(self) -> Result<GameState, ProtocolError> {
        let board = match self.board {
            Some(cells) => Board::from_cells(cells.as_slice()).ok_or(ProtocolError::Board)?,
            None => Board::new(),
        };
        let turn = match self.turn.as_deref() {
            None | Some("") => Mark::X,
            Some(raw) => Mark::parse(raw).ok_or_else(|| ProtocolError::Mark(raw.to_string()))?,
        };
        let outcome = self.winner.as_deref().filter(|w| !w.is_empty()).map(parse_outcome).transpose()?;
        Ok(GameState {
            board,
            x_player: non_empty(self.x_player),
            o_player: non_empty(self.o_player),
            turn,
            finished: self.finished.unwrap_or(false),
            outcome,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireSummary {
    x_player: String,
    o_player: String,
    winner: String,
}

#[derive(Debug, Deserialize)]
struct WireRoom {
    #[serde(default)]
    players: Option<Vec<String>>,
    #[serde(default)]
    host: Option<String>,
}

fn non_empty(id: Option<String>) -> Option<PlayerId> {
    id.filter(|s| !s.is_empty()).map(PlayerId::from)
}

fn parse_outcome(raw: &str) -> Result<Outcome, ProtocolError> {
    Outcome::parse(raw).ok_or_else(|| ProtocolError::Outcome(raw.to_string()))
}

fn decode_history(value: Value) -> Result<Vec<GameSummary>, ProtocolError> {
    match value {
        Value::String(s) if s == NO_HISTORY => Ok(Vec::new()),
        Value::Array(entries) => Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match decode_summary(entry) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable history entry");
                    None
                }
            })
            .collect()),
        _ => Err(ProtocolError::History),
    }
}

fn decode_summary(entry: Value) -> Result<GameSummary, ProtocolError> {
    let wire: WireSummary = serde_json::from_value(entry)?;
    Ok(GameSummary {
        x_player: PlayerId::from(wire.x_player),
        o_player: PlayerId::from(wire.o_player),
        outcome: parse_outcome(&wire.winner)?,
    })
}

/// Decodes one inbound text frame.
pub fn decode(text: &str) -> Result<ServerEvent, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut obj) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    // A null or empty error field is not an error.
    match obj.remove("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if s.is_empty() => {}
        Some(Value::String(s)) => return Ok(ServerEvent::Error(s)),
        Some(other) => return Ok(ServerEvent::Error(other.to_string())),
    }

    match obj.remove("history") {
        None | Some(Value::Null) => {}
        Some(history) => return decode_history(history).map(ServerEvent::History),
    }

    let kind = match obj.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(ProtocolError::MissingType),
    };
    let body = Value::Object(obj);

    let event = match kind.as_str() {
        "room_update" => {
            let room: WireRoom = serde_json::from_value(body)?;
            ServerEvent::RoomUpdate {
                players: room.players.unwrap_or_default().into_iter().map(PlayerId::from).collect(),
                host: non_empty(room.host),
            }
        }
        "game_started" => {
            let mut state = serde_json::from_value::<WireGame>(body)?.into_state()?;
            state.finished = false;
            state.outcome = None;
            ServerEvent::GameStarted(state)
        }
        "game_update" => ServerEvent::GameUpdate(serde_json::from_value::<WireGame>(body)?.into_state()?),
        "resume_game" => ServerEvent::Resumed(serde_json::from_value::<WireGame>(body)?.into_state()?),
        "no_game_to_resume" => ServerEvent::NoGameToResume,
        _ => ServerEvent::Unrecognized(kind),
    };
    Ok(event)
}
