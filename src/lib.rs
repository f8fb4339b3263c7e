pub mod core {
	pub mod game;
	pub mod history;
	pub mod identity;
	pub mod protocol;
	pub mod reconnect;
	pub mod room;
	pub mod state;
}

pub mod client {
	pub mod rest;
	pub mod transport;
	pub mod websocket_client;
}

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod views;

// Re-export for convenience
pub use crate::client::websocket_client::{RoomSession, SessionEvent};
pub use crate::config::ClientConfig;
pub use crate::core::state::AppState;
pub use crate::error::{ClientError, Result};
