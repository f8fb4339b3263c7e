use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{connection_pill, key_help, pill, UiState};
use crate::core::identity::PlayerId;
use crate::core::state::AppState;

fn describe(id: &PlayerId, me: &PlayerId) -> String {
    if id == me {
        format!("{id} (you)")
    } else {
        id.to_string()
    }
}

pub(super) fn render(frame: &mut Frame, state: &AppState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Pills
            Constraint::Length(3), // Start
            Constraint::Length(2), // Notice
            Constraint::Min(0),
            Constraint::Length(1), // You are
            Constraint::Length(1), // Keys
        ])
        .split(frame.area());

    let code = state
        .room
        .as_ref()
        .map(|r| r.code.to_string())
        .unwrap_or_default();

    let header = Paragraph::new(Line::from(vec![
        Span::raw("Room code  "),
        Span::styled(code, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" BATTLE LOBBY "));
    frame.render_widget(header, chunks[0]);

    let host = state
        .room
        .as_ref()
        .and_then(|r| r.host.as_ref())
        .map_or_else(|| "Waiting...".to_string(), |h| describe(h, &state.player_id));
    let players = state
        .room
        .as_ref()
        .filter(|r| !r.players.is_empty())
        .map_or_else(
            || "Searching...".to_string(),
            |r| {
                r.players
                    .iter()
                    .map(|p| describe(p, &state.player_id))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        );

    let mut status = vec![
        pill(format!("Host: {host}"), Color::Magenta),
        Span::raw(" "),
        connection_pill(state.connection, false),
    ];
    if state.retries > 0 {
        status.push(Span::raw(" "));
        status.push(pill(format!("Retry {}/{}", state.retries, state.max_retries), Color::Yellow));
    }
    let pills = Paragraph::new(vec![
        Line::from(status),
        Line::from(""),
        Line::from(pill(format!("Players: {players}"), Color::Blue)),
    ])
    .wrap(Wrap { trim: false });
    frame.render_widget(pills, chunks[1]);

    let start = if state.is_host() {
        if state.can_start() {
            Line::from(Span::styled(
                "[s] Start battle!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                "Start battle (needs two players and a live connection)",
                Style::default().fg(Color::DarkGray),
            ))
        }
    } else {
        Line::from(Span::styled("Waiting for host...", Style::default().fg(Color::DarkGray)))
    };
    frame.render_widget(
        Paragraph::new(start)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP)),
        chunks[2],
    );

    if let Some(notice) = &ui.notice {
        frame.render_widget(
            Paragraph::new(notice.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow)),
            chunks[3],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("You are "),
            Span::styled(state.player_id.to_string(), Style::default().fg(Color::Cyan)),
        ]))
        .alignment(Alignment::Center),
        chunks[5],
    );

    let mut keys = vec![("s", "Start"), ("c", "Copy code")];
    if state.game.is_active() {
        keys.push(("g", "Game"));
    }
    if state.gave_up {
        keys.push(("r", "Reconnect"));
    }
    keys.push(("l", "Leave"));
    frame.render_widget(Paragraph::new(key_help(&keys)).alignment(Alignment::Center), chunks[6]);
}

#[cfg(test)]
mod tests {
    use crate::client::websocket_client::SessionEvent;
    use crate::core::identity::PlayerId;
    use crate::core::protocol::ServerEvent;
    use crate::core::room::{Room, RoomCode};
    use crate::core::state::AppState;
    use crate::views::test_support::screen;
    use crate::views::UiState;

    fn lobby(host: &str) -> AppState {
        let mut state = AppState::new(PlayerId::from("me"));
        state.enter_room(Room::new(RoomCode::parse("QWE123").unwrap()));
        state.apply_server(ServerEvent::RoomUpdate {
            players: vec![PlayerId::from("me"), PlayerId::from("them")],
            host: Some(PlayerId::from(host)),
        });
        state
    }

    #[test]
    fn test_lobby_lists_room_members() {
        let mut state = lobby("me");
        state.apply_session(SessionEvent::Connected);
        let text = screen(&state, &UiState::default());
        assert!(text.contains("QWE123"));
        assert!(text.contains("Host: me (you)"));
        assert!(text.contains("Players: me (you), them"));
        assert!(text.contains("Connected"));
        assert!(text.contains("[s] Start battle!"));
    }

    #[test]
    fn test_guest_waits_for_host() {
        let state = lobby("them");
        let text = screen(&state, &UiState::default());
        assert!(text.contains("Waiting for host..."));
        assert!(text.contains("Connecting..."));
    }

    #[test]
    fn test_retry_pill_shows_progress() {
        let mut state = lobby("me");
        state.apply_session(SessionEvent::Disconnected { reason: None });
        state.apply_session(SessionEvent::RetryScheduled {
            attempt: 2,
            delay: std::time::Duration::from_secs(2),
        });
        let text = screen(&state, &UiState::default());
        assert!(text.contains("Retry 2/5"));
        assert!(text.contains("Disconnected"));
        assert!(!text.contains("[s] Start battle!"));
    }
}
