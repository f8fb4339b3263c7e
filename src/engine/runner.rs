use std::io;
use std::time::Duration;

use crossterm::clipboard::CopyToClipboard;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::rest::RoomApi;
use crate::client::transport::WsConnector;
use crate::client::websocket_client::{RoomSession, SessionConfig, SessionEvent};
use crate::config::ClientConfig;
use crate::core::protocol::ClientMessage;
use crate::core::room::{Room, MAX_CODE_LEN};
use crate::core::state::AppState;
use crate::engine::keymap::{map_key, Intent};
use crate::error::Result;
use crate::views::{self, UiState};

const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// One pass of the event loop.
enum Step {
    Input(Option<io::Result<Event>>),
    Session(Option<SessionEvent>),
    RoomCreated(Result<Room>),
    Render,
}

pub struct Engine {
    config: ClientConfig,
    api: RoomApi,
    state: AppState,
    ui: UiState,
    session: Option<RoomSession>,
    created_tx: mpsc::UnboundedSender<Result<Room>>,
    created_rx: mpsc::UnboundedReceiver<Result<Room>>,
    creating: bool,
    should_quit: bool,
}

impl Engine {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = RoomApi::new(config.server.clone(), config.request_timeout)?;
        let state = AppState::new(config.player_id.clone()).with_max_retries(config.max_retries);
        let (created_tx, created_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            api,
            state,
            ui: UiState::default(),
            session: None,
            created_tx,
            created_rx,
            creating: false,
            should_quit: false,
        })
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        let mut input = EventStream::new();
        let mut render_timer = tokio::time::interval(RENDER_INTERVAL);

        info!(player_id = %self.state.player_id, "client started");

        while !self.should_quit {
            let step = tokio::select! {
                event = input.next() => Step::Input(event),
                event = next_session_event(&mut self.session) => Step::Session(event),
                Some(created) = self.created_rx.recv() => Step::RoomCreated(created),
                _ = render_timer.tick() => Step::Render,
            };

            match step {
                Step::Input(None) => break,
                Step::Input(Some(event)) => {
                    if let Event::Key(key) = event? {
                        if key.kind == KeyEventKind::Press {
                            self.handle_key(key).await;
                        }
                    }
                }
                Step::Session(Some(event)) => {
                    debug!(?event, "session event");
                    self.state.apply_session(event);
                }
                Step::Session(None) => {
                    debug!("room session ended");
                    self.session = None;
                }
                Step::RoomCreated(result) => self.room_created(result).await,
                Step::Render => {
                    terminal.draw(|f| views::render(f, &self.state, &self.ui))?;
                }
            }
        }

        self.close_session().await;
        info!("client stopped");
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let intent = map_key(key, &self.state, &self.ui);
        if intent != Intent::None {
            debug!(?intent, "key");
            self.handle_intent(intent).await;
        }
    }

    pub(crate) async fn handle_intent(&mut self, intent: Intent) {
        if !matches!(intent, Intent::DismissAlert) {
            self.ui.notice = None;
        }

        match intent {
            Intent::None => {}
            Intent::Quit => self.should_quit = true,
            Intent::DismissAlert => self.state.alert = None,
            Intent::ToggleFocus => self.ui.home_focus = self.ui.home_focus.toggle(),
            Intent::TypeCode(c) => {
                if self.state.join_input.len() < MAX_CODE_LEN {
                    self.state.join_input.push(c);
                }
            }
            Intent::EraseCode => {
                self.state.join_input.pop();
            }
            Intent::CreateRoom => self.create_room(),
            Intent::JoinRoom => match self.state.join_code() {
                Ok(code) => self.open_room(Room::new(code)).await,
                Err(e) => self.ui.notice = Some(e.to_string()),
            },
            Intent::StartGame => {
                let request = self.state.start_request();
                self.send_or_notice(request, "Only the host can start, once two players are connected");
            }
            Intent::RestartGame => {
                let request = self.state.restart_request();
                self.send_or_notice(request, "Only the host can start a new game once this one is over");
            }
            Intent::RequestHistory => {
                let request = self.state.history_request();
                self.send_or_notice(request, "Not connected to the room");
            }
            Intent::Cursor(index) => self.ui.cursor = index,
            Intent::PlayCell(index) => {
                self.ui.cursor = index;
                match self.state.move_request(index) {
                    Ok(message) => self.send(message),
                    Err(rejected) => self.ui.notice = Some(rejected.to_string()),
                }
            }
            Intent::ShowLobby => self.state.show_lobby(),
            Intent::ShowGame => self.state.show_game(),
            Intent::CopyCode => self.copy_code(),
            Intent::Reconnect => self.reconnect().await,
            Intent::Leave => {
                self.close_session().await;
                if let Some(room) = &self.state.room {
                    info!(code = %room.code, "left room");
                }
                self.state.leave_room();
                self.ui = UiState::default();
            }
        }
    }

    fn create_room(&mut self) {
        if self.creating {
            return;
        }
        self.creating = true;
        self.ui.notice = Some("Creating room...".into());

        let api = self.api.clone();
        let player = self.state.player_id.clone();
        let tx = self.created_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(api.create_room(&player).await);
        });
    }

    /// Completion of a create request. A room joined by code in the meantime wins.
    async fn room_created(&mut self, result: Result<Room>) {
        self.creating = false;
        match result {
            Ok(room) if self.state.room.is_some() => {
                info!(code = %room.code, "already in a room, ignoring created room");
            }
            Ok(room) => self.open_room(room).await,
            Err(e) => {
                warn!(error = %e, "room creation failed");
                self.ui.notice = None;
                self.state.alert = Some(format!("Failed to create room: {e}"));
            }
        }
    }

    async fn open_room(&mut self, room: Room) {
        self.close_session().await;

        let url = match self.config.room_socket_url(&room.code) {
            Ok(url) => url,
            Err(e) => {
                self.state.alert = Some(e.to_string());
                return;
            }
        };

        info!(code = %room.code, "entering room");
        self.state.join_input.clear();
        self.state.enter_room(room);
        self.ui = UiState::default();
        self.start_session(url);
    }

    fn start_session(&mut self, url: url::Url) {
        let config = SessionConfig::new(url, self.state.player_id.clone())
            .with_policy(self.config.backoff_policy());
        self.session = Some(RoomSession::start(WsConnector, config));
    }

    async fn reconnect(&mut self) {
        let Some(code) = self.state.room.as_ref().map(|r| r.code.clone()) else {
            return;
        };
        if !self.state.gave_up && self.session.is_some() {
            self.ui.notice = Some("Already connected or retrying".into());
            return;
        }

        self.close_session().await;
        match self.config.room_socket_url(&code) {
            Ok(url) => {
                info!(%code, "manual reconnect");
                self.state.begin_reconnect();
                self.start_session(url);
            }
            Err(e) => self.state.alert = Some(e.to_string()),
        }
    }

    async fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }

    fn send(&mut self, message: ClientMessage) {
        let Some(session) = &self.session else {
            self.ui.notice = Some("Not connected to the room".into());
            return;
        };
        if let Err(e) = session.send(message) {
            warn!(error = %e, "could not queue message");
            self.ui.notice = Some(e.to_string());
        }
    }

    fn send_or_notice(&mut self, request: Option<ClientMessage>, notice: &str) {
        match request {
            Some(message) => self.send(message),
            None => self.ui.notice = Some(notice.to_string()),
        }
    }

    fn copy_code(&mut self) {
        let Some(room) = &self.state.room else {
            return;
        };
        let code = room.code.to_string();
        match crossterm::execute!(io::stdout(), CopyToClipboard::to_clipboard_from(code.clone())) {
            Ok(()) => self.ui.notice = Some(format!("Copied {code} to the clipboard")),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.ui.notice = Some(format!("Room code: {code}"));
            }
        }
    }
}

async fn next_session_event(session: &mut Option<RoomSession>) -> Option<SessionEvent> {
    match session {
        Some(session) => session.next_event().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    use crate::cli::GlobalArgs;
    use crate::config::{DEFAULT_PROFILE, DEFAULT_REQUEST_TIMEOUT_SECS};
    use crate::core::identity::PlayerId;
    use crate::core::room::RoomCode;
    use crate::core::state::View;
    use crate::error::ClientError;
    use crate::views::HomeFocus;

    fn engine(dir: &tempfile::TempDir) -> Engine {
        let args = GlobalArgs {
            // Nothing listens here; sessions just retry in the background.
            server: "http://127.0.0.1:9".into(),
            ws_server: None,
            profile: DEFAULT_PROFILE.into(),
            player_id: Some("me".into()),
            data_dir: Some(dir.path().to_path_buf()),
            max_retries: 0,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        Engine::new(ClientConfig::resolve(&args).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_typing_and_joining() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);

        engine.handle_intent(Intent::ToggleFocus).await;
        assert_eq!(engine.ui.home_focus, HomeFocus::Join);

        engine.handle_intent(Intent::JoinRoom).await;
        assert_eq!(engine.state.view, View::Home);
        assert!(engine.ui.notice.is_some());

        for c in "AB12".chars() {
            engine.handle_intent(Intent::TypeCode(c)).await;
        }
        engine.handle_intent(Intent::EraseCode).await;
        assert_eq!(engine.state.join_input, "AB1");

        engine.handle_intent(Intent::JoinRoom).await;
        assert_eq!(engine.state.view, View::Lobby);
        assert_eq!(engine.state.room.as_ref().map(|r| r.code.as_str()), Some("AB1"));
        assert!(engine.state.join_input.is_empty());
        assert!(engine.session.is_some());

        engine.handle_intent(Intent::Leave).await;
        assert_eq!(engine.state.view, View::Home);
        assert!(engine.session.is_none());
    }

    #[tokio::test]
    async fn test_join_code_keeps_typed_case() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.handle_intent(Intent::ToggleFocus).await;

        for c in "ab12cd".chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            engine.handle_key(key).await;
        }
        assert_eq!(engine.state.join_input, "ab12cd");

        engine.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).await;
        assert_eq!(engine.state.room.as_ref().map(|r| r.code.as_str()), Some("ab12cd"));
        engine.close_session().await;
    }

    #[tokio::test]
    async fn test_failed_create_raises_alert() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.creating = true;

        engine
            .room_created(Err(ClientError::Api {
                status: 503,
                message: "maintenance".into(),
            }))
            .await;

        assert!(!engine.creating);
        assert_eq!(engine.state.view, View::Home);
        assert!(engine.session.is_none());
        let alert = engine.state.alert.clone().unwrap();
        assert!(alert.starts_with("Failed to create room"));
        assert!(alert.contains("maintenance"));
    }

    #[tokio::test]
    async fn test_created_room_opens_lobby() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.creating = true;

        let mut room = Room::new(RoomCode::parse("NEW123").unwrap());
        room.host = Some(PlayerId::from("me"));
        engine.room_created(Ok(room)).await;

        assert!(!engine.creating);
        assert_eq!(engine.state.view, View::Lobby);
        assert!(engine.state.is_host());
        assert!(engine.session.is_some());
        engine.close_session().await;
    }

    #[tokio::test]
    async fn test_late_created_room_does_not_replace_joined_room() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.creating = true;
        engine.open_room(Room::new(RoomCode::parse("JOINED").unwrap())).await;

        engine.room_created(Ok(Room::new(RoomCode::parse("LATE1").unwrap()))).await;

        assert!(!engine.creating);
        assert_eq!(engine.state.room.as_ref().map(|r| r.code.as_str()), Some("JOINED"));
        engine.close_session().await;
    }

    #[tokio::test]
    async fn test_code_input_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        for _ in 0..MAX_CODE_LEN + 4 {
            engine.handle_intent(Intent::TypeCode('A')).await;
        }
        assert_eq!(engine.state.join_input.len(), MAX_CODE_LEN);
    }

    #[tokio::test]
    async fn test_requests_need_a_connection() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.open_room(Room::new(RoomCode::parse("ROOM42").unwrap())).await;

        engine.handle_intent(Intent::StartGame).await;
        assert!(engine.ui.notice.is_some());

        engine.handle_intent(Intent::PlayCell(3)).await;
        assert_eq!(engine.ui.cursor, 3);
        assert_eq!(engine.ui.notice.as_deref(), Some("not connected to the room"));

        engine.handle_intent(Intent::Quit).await;
        assert!(engine.should_quit);
        engine.close_session().await;
    }

    #[tokio::test]
    async fn test_dismiss_alert_keeps_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        engine.ui.notice = Some("hello".into());
        engine.state.alert = Some("boom".into());
        engine.handle_intent(Intent::DismissAlert).await;
        assert!(engine.state.alert.is_none());
        assert_eq!(engine.ui.notice.as_deref(), Some("hello"));
    }
}
