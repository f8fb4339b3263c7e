//! Failures of the room client: reaching the server, talking to a room,
//! and setting up the local profile.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The room server could not be reached or the request timed out.
    #[error("could not reach the game server: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad server address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A request body could not be encoded or a reply body decoded.
    #[error("unreadable server payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The server refused a room request.
    #[error("server refused the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The room socket failed to open or broke mid-game.
    #[error("room connection failed: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// Reading or writing the profile's player id or the log file.
    #[error("local storage: {0}")]
    Io(#[from] std::io::Error),

    /// The room session task has already stopped.
    #[error("room session has ended")]
    SessionClosed,

    #[error("configuration: {0}")]
    Config(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocket(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
