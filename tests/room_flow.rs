use tictaclive::client::websocket_client::SessionEvent;
use tictaclive::core::game::{Mark, MoveRejected, Outcome};
use tictaclive::core::identity::PlayerId;
use tictaclive::core::protocol::{decode, ClientMessage};
use tictaclive::core::room::{Room, RoomCode};
use tictaclive::core::state::{AppState, ConnectionStatus, View};

fn frame(state: &mut AppState, text: &str) {
    let event = decode(text).expect("frame should decode");
    state.apply_session(SessionEvent::Message(event));
}

fn game_update(board: [&str; 9], turn: &str, finished: bool, winner: Option<&str>) -> String {
    serde_json::json!({
        "type": "game_update",
        "x_player": "host",
        "o_player": "guest",
        "board": board,
        "turn": turn,
        "finished": finished,
        "winner": winner,
    })
    .to_string()
}

#[test]
fn test_host_plays_a_full_room_session() {
    let host = PlayerId::from("host");
    let mut state = AppState::new(host.clone());

    // Room created over REST, socket opens.
    let mut room = Room::new(RoomCode::parse("ABC123").unwrap());
    room.host = Some(host.clone());
    room.players = vec![host.clone()];
    state.enter_room(room);
    assert_eq!(state.view, View::Lobby);
    assert_eq!(state.connection, ConnectionStatus::Connecting);

    state.apply_session(SessionEvent::Connected);
    frame(&mut state, r#"{"type":"no_game_to_resume"}"#);
    assert_eq!(state.view, View::Lobby);
    assert_eq!(state.start_request(), None);

    frame(&mut state, r#"{"type":"room_update","players":["host","guest"],"host":"host"}"#);
    assert_eq!(state.player_count(), 2);
    assert_eq!(state.start_request(), Some(ClientMessage::StartGame));

    frame(
        &mut state,
        r#"{"type":"game_started","x_player":"host","o_player":"guest","board":["","","","","","","","",""],"turn":"X"}"#,
    );
    assert_eq!(state.view, View::Game);
    assert_eq!(state.game.seat_of(&host), Some(Mark::X));
    assert_eq!(state.turn_label(), "Your turn");
    assert_eq!(
        state.move_request(4),
        Ok(ClientMessage::MakeMove { player_id: host.clone(), index: 4 })
    );

    frame(&mut state, &game_update(["", "", "", "", "X", "", "", "", ""], "O", false, None));
    assert_eq!(state.turn_label(), "Opponent's turn");
    assert_eq!(state.move_request(0), Err(MoveRejected::NotYourTurn));
    assert_eq!(state.move_request(4), Err(MoveRejected::Occupied(4)));

    frame(&mut state, r#"{"error":"Not your turn"}"#);
    assert_eq!(state.alert.as_deref(), Some("Not your turn"));
    assert_eq!(state.view, View::Game);
    state.alert = None;

    frame(
        &mut state,
        &game_update(["X", "O", "", "O", "X", "", "", "", "X"], "O", true, Some("X")),
    );
    assert!(state.game.finished);
    assert_eq!(state.game.outcome, Some(Outcome::Winner(Mark::X)));
    assert_eq!(state.game.highlighted_line(), Some([0, 4, 8]));
    assert_eq!(state.restart_request(), Some(ClientMessage::StartGame));

    assert_eq!(state.history_request(), Some(ClientMessage::RequestHistory));
    frame(
        &mut state,
        r#"{"history":[{"x_player":"host","o_player":"guest","winner":"X"},{"x_player":"guest","o_player":"host","winner":"Draw"},{"x_player":"guest","o_player":"host","winner":"X"}]}"#,
    );
    let tally = state.tally();
    assert_eq!((tally.wins, tally.draws, tally.losses), (1, 1, 1));
    assert_eq!(tally.total(), state.history.len());

    // Restart clears the previous result.
    frame(
        &mut state,
        r#"{"type":"game_started","x_player":"guest","o_player":"host","finished":true,"winner":"X"}"#,
    );
    assert!(!state.game.finished);
    assert_eq!(state.game.outcome, None);
    assert_eq!(state.game.seat_of(&host), Some(Mark::O));

    state.leave_room();
    assert_eq!(state.view, View::Home);
    assert!(state.room.is_none());
    assert!(state.history.is_empty());
    assert_eq!(state.connection, ConnectionStatus::Disconnected);
}

#[test]
fn test_guest_resumes_after_reconnect() {
    let guest = PlayerId::from("guest");
    let mut state = AppState::new(guest.clone()).with_max_retries(3);
    state.join_input = " XYZ9 ".into();
    let code = state.join_code().unwrap();
    state.enter_room(Room::new(code));
    state.apply_session(SessionEvent::Connected);

    frame(
        &mut state,
        r#"{"type":"game_started","x_player":"host","o_player":"guest","board":["","","","","","","","",""],"turn":"X"}"#,
    );
    state.show_lobby();

    state.apply_session(SessionEvent::Disconnected { reason: Some("reset".into()) });
    for attempt in 1..=3 {
        state.apply_session(SessionEvent::RetryScheduled {
            attempt,
            delay: std::time::Duration::from_secs(1),
        });
        state.apply_session(SessionEvent::Connecting { attempt });
        state.apply_session(SessionEvent::Disconnected { reason: None });
    }
    state.apply_session(SessionEvent::GaveUp);
    assert!(state.gave_up);
    assert_eq!(state.retries, 3);
    assert!(state.alert.is_some());

    state.alert = None;
    state.begin_reconnect();
    state.apply_session(SessionEvent::Connected);
    assert_eq!(state.retries, 0);

    frame(
        &mut state,
        &serde_json::json!({
            "type": "resume_game",
            "x_player": "host",
            "o_player": "guest",
            "board": ["X", "", "", "", "", "", "", "", ""],
            "turn": "O",
            "finished": false,
        })
        .to_string(),
    );
    assert_eq!(state.view, View::Game);
    assert!(state.can_play());
    assert_eq!(state.turn_label(), "Your turn");
}
