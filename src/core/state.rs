//! The client's single state container.
//!
//! Every mutation goes through here: server events, session lifecycle events
//! and local navigation. Outbound requests are built here too, so the guards
//! that decide whether a request may be sent live next to the state they read.

use tracing::debug;

use crate::client::websocket_client::SessionEvent;
use crate::core::game::{GameState, MoveRejected};
use crate::core::history::{GameSummary, Tally};
use crate::core::identity::PlayerId;
use crate::core::protocol::{ClientMessage, ServerEvent};
use crate::core::reconnect::DEFAULT_MAX_RETRIES;
use crate::core::room::{Room, RoomCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Lobby,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub player_id: PlayerId,
    pub view: View,
    pub room: Option<Room>,
    pub game: GameState,
    pub history: Vec<GameSummary>,
    pub connection: ConnectionStatus,
    pub retries: u32,
    pub max_retries: u32,
    /// Set once the session has stopped retrying; cleared on the next open.
    pub gave_up: bool,
    /// User-facing message shown over the current view until dismissed.
    pub alert: Option<String>,
    pub join_input: String,
}

impl AppState {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            view: View::Home,
            room: None,
            game: GameState::default(),
            history: Vec::new(),
            connection: ConnectionStatus::Disconnected,
            retries: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            gave_up: false,
            alert: None,
            join_input: String::new(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    // -- server events -------------------------------------------------------

    pub fn apply_server(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Error(message) => self.alert = Some(message),
            ServerEvent::History(games) => self.history = games,
            ServerEvent::RoomUpdate { players, host } => {
                if let Some(room) = self.room.as_mut() {
                    room.players = players;
                    room.host = host;
                }
            }
            ServerEvent::GameStarted(game) => {
                self.game = GameState {
                    finished: false,
                    outcome: None,
                    ..game
                };
                self.view = View::Game;
            }
            ServerEvent::GameUpdate(game) => self.game = game,
            ServerEvent::Resumed(game) => {
                self.game = game;
                self.view = View::Game;
            }
            ServerEvent::NoGameToResume => {}
            ServerEvent::Unrecognized(kind) => debug!(%kind, "ignoring server message"),
        }
    }

    pub fn apply_session(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connecting { .. } => self.connection = ConnectionStatus::Connecting,
            SessionEvent::Connected => {
                self.connection = ConnectionStatus::Connected;
                self.retries = 0;
                self.gave_up = false;
            }
            SessionEvent::Message(event) => self.apply_server(event),
            SessionEvent::Disconnected { .. } => self.connection = ConnectionStatus::Disconnected,
            SessionEvent::RetryScheduled { attempt, .. } => self.retries = attempt,
            SessionEvent::GaveUp => {
                self.connection = ConnectionStatus::Disconnected;
                self.gave_up = true;
                self.alert = Some("Lost connection to the room. Press r to reconnect.".into());
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    /// Enters the lobby of `room`. Game state from any previous room is discarded.
    pub fn enter_room(&mut self, room: Room) {
        self.reset_room_state();
        self.room = Some(room);
        self.view = View::Lobby;
        self.connection = ConnectionStatus::Connecting;
    }

    /// Join by code typed on the home screen.
    pub fn join_code(&self) -> Result<RoomCode, crate::core::room::InvalidRoomCode> {
        RoomCode::parse(&self.join_input)
    }

    pub fn leave_room(&mut self) {
        self.reset_room_state();
        self.view = View::Home;
        self.connection = ConnectionStatus::Disconnected;
    }

    fn reset_room_state(&mut self) {
        self.room = None;
        self.game = GameState::default();
        self.history.clear();
        self.retries = 0;
        self.gave_up = false;
    }

    pub fn show_lobby(&mut self) {
        if self.room.is_some() {
            self.view = View::Lobby;
        }
    }

    pub fn show_game(&mut self) {
        if self.room.is_some() && self.game.is_active() {
            self.view = View::Game;
        }
    }

    /// Marks a manual reconnect after the session gave up.
    pub fn begin_reconnect(&mut self) {
        self.retries = 0;
        self.gave_up = false;
        self.connection = ConnectionStatus::Connecting;
    }

    // -- outbound requests ---------------------------------------------------

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }

    pub fn is_host(&self) -> bool {
        self.room.as_ref().is_some_and(|r| r.is_host(&self.player_id))
    }

    pub fn player_count(&self) -> usize {
        self.room.as_ref().map_or(0, |r| r.players.len())
    }

    /// Host may start once a second player is in and the socket is up.
    pub fn can_start(&self) -> bool {
        self.is_host() && self.player_count() >= 2 && self.is_connected()
    }

    pub fn can_restart(&self) -> bool {
        self.is_host() && self.game.finished && self.is_connected()
    }

    pub fn can_play(&self) -> bool {
        self.is_connected() && self.game.can_play(&self.player_id)
    }

    pub fn start_request(&self) -> Option<ClientMessage> {
        self.can_start().then_some(ClientMessage::StartGame)
    }

    pub fn restart_request(&self) -> Option<ClientMessage> {
        self.can_restart().then_some(ClientMessage::StartGame)
    }

    pub fn history_request(&self) -> Option<ClientMessage> {
        self.is_connected().then_some(ClientMessage::RequestHistory)
    }

    pub fn move_request(&self, index: usize) -> Result<ClientMessage, MoveRejected> {
        if !self.is_connected() {
            return Err(MoveRejected::NotConnected);
        }
        self.game.check_move(&self.player_id, index)?;
        Ok(ClientMessage::MakeMove {
            player_id: self.player_id.clone(),
            index,
        })
    }

    // -- derived display state -----------------------------------------------

    pub fn turn_label(&self) -> &'static str {
        if self.game.is_my_turn(&self.player_id) {
            "Your turn"
        } else {
            "Opponent's turn"
        }
    }

    pub fn tally(&self) -> Tally {
        Tally::for_player(&self.history, &self.player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::{Board, Mark, Outcome};

    fn me() -> PlayerId {
        PlayerId::from("me")
    }

    fn in_lobby() -> AppState {
        let mut state = AppState::new(me());
        let mut room = Room::new(RoomCode::parse("ABC123").unwrap());
        room.host = Some(me());
        room.players = vec![me()];
        state.enter_room(room);
        state.apply_session(SessionEvent::Connected);
        state
    }

    fn started(x: &str, o: &str) -> GameState {
        GameState {
            x_player: Some(PlayerId::from(x)),
            o_player: Some(PlayerId::from(o)),
            ..GameState::default()
        }
    }

    #[test]
    fn test_start_requires_host_two_players_and_connection() {
        let mut state = in_lobby();
        assert_eq!(state.start_request(), None);

        state.apply_server(ServerEvent::RoomUpdate {
            players: vec![me(), PlayerId::from("them")],
            host: Some(me()),
        });
        assert_eq!(state.start_request(), Some(ClientMessage::StartGame));

        state.apply_session(SessionEvent::Disconnected { reason: None });
        assert_eq!(state.start_request(), None);

        state.apply_session(SessionEvent::Connected);
        state.apply_server(ServerEvent::RoomUpdate {
            players: vec![me(), PlayerId::from("them")],
            host: Some(PlayerId::from("them")),
        });
        assert_eq!(state.start_request(), None);
    }

    #[test]
    fn test_game_started_switches_view_and_clears_result() {
        let mut state = in_lobby();
        let mut game = started("me", "them");
        game.finished = true;
        game.outcome = Some(Outcome::Draw);
        state.apply_server(ServerEvent::GameStarted(game));
        assert_eq!(state.view, View::Game);
        assert!(!state.game.finished);
        assert_eq!(state.game.outcome, None);
    }

    #[test]
    fn test_game_update_keeps_view() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::GameStarted(started("me", "them")));
        state.show_lobby();

        let mut update = started("me", "them");
        update.board = Board::from_cells(&["X", "", "", "", "", "", "", "", ""]).unwrap();
        update.turn = Mark::O;
        state.apply_server(ServerEvent::GameUpdate(update));
        assert_eq!(state.view, View::Lobby);
        assert_eq!(state.game.turn, Mark::O);
        assert_eq!(state.turn_label(), "Opponent's turn");

        state.show_game();
        assert_eq!(state.view, View::Game);
    }

    #[test]
    fn test_resume_switches_to_game() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::NoGameToResume);
        assert_eq!(state.view, View::Lobby);

        state.apply_server(ServerEvent::Resumed(started("them", "me")));
        assert_eq!(state.view, View::Game);
        assert_eq!(state.game.seat_of(&me()), Some(Mark::O));
    }

    #[test]
    fn test_error_only_sets_alert() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::GameStarted(started("me", "them")));
        let before = state.game.clone();
        state.apply_server(ServerEvent::Error("Room is full".into()));
        assert_eq!(state.alert.as_deref(), Some("Room is full"));
        assert_eq!(state.game, before);
        assert_eq!(state.view, View::Game);
    }

    #[test]
    fn test_move_request_guards() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::GameStarted(started("me", "them")));
        assert_eq!(
            state.move_request(4),
            Ok(ClientMessage::MakeMove { player_id: me(), index: 4 })
        );

        let mut update = started("me", "them");
        update.board = Board::from_cells(&["", "", "", "", "X", "", "", "", ""]).unwrap();
        state.apply_server(ServerEvent::GameUpdate(update));
        assert_eq!(state.move_request(4), Err(MoveRejected::Occupied(4)));

        state.apply_session(SessionEvent::Disconnected { reason: None });
        assert_eq!(state.move_request(0), Err(MoveRejected::NotConnected));
    }

    #[test]
    fn test_restart_only_for_host_after_finish() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::GameStarted(started("me", "them")));
        assert_eq!(state.restart_request(), None);

        let mut done = started("me", "them");
        done.finished = true;
        done.outcome = Some(Outcome::Winner(Mark::X));
        state.apply_server(ServerEvent::GameUpdate(done));
        assert_eq!(state.restart_request(), Some(ClientMessage::StartGame));
    }

    #[test]
    fn test_retry_counter_tracks_session() {
        let mut state = in_lobby();
        state.apply_session(SessionEvent::Disconnected { reason: Some("reset".into()) });
        state.apply_session(SessionEvent::RetryScheduled {
            attempt: 3,
            delay: std::time::Duration::from_secs(4),
        });
        assert_eq!(state.retries, 3);
        assert_eq!(state.connection, ConnectionStatus::Disconnected);

        state.apply_session(SessionEvent::Connecting { attempt: 3 });
        assert_eq!(state.connection, ConnectionStatus::Connecting);

        state.apply_session(SessionEvent::Connected);
        assert_eq!(state.retries, 0);
    }

    #[test]
    fn test_gave_up_alerts_and_allows_manual_reconnect() {
        let mut state = in_lobby();
        state.apply_session(SessionEvent::GaveUp);
        assert!(state.gave_up);
        assert!(state.alert.is_some());

        state.begin_reconnect();
        assert!(!state.gave_up);
        assert_eq!(state.connection, ConnectionStatus::Connecting);
    }

    #[test]
    fn test_leave_resets_everything() {
        let mut state = in_lobby();
        state.apply_server(ServerEvent::GameStarted(started("me", "them")));
        state.apply_server(ServerEvent::History(vec![GameSummary {
            x_player: me(),
            o_player: PlayerId::from("them"),
            outcome: Outcome::Draw,
        }]));
        state.leave_room();

        assert_eq!(state.view, View::Home);
        assert!(state.room.is_none());
        assert!(state.history.is_empty());
        assert_eq!(state.game, GameState::default());
        assert_eq!(state.connection, ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_room_update_without_room_is_ignored() {
        let mut state = AppState::new(me());
        state.apply_server(ServerEvent::RoomUpdate {
            players: vec![me()],
            host: Some(me()),
        });
        assert!(state.room.is_none());
    }
}
