//! Ratatui views. Rendering is a pure function of the app state and the
//! local UI state (focus, cursor); nothing here talks to the network.

mod game;
mod home;
mod lobby;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::core::state::{AppState, ConnectionStatus, View};

/// Which panel of the home screen has the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeFocus {
    #[default]
    Create,
    Join,
}

impl HomeFocus {
    pub fn toggle(self) -> Self {
        match self {
            HomeFocus::Create => HomeFocus::Join,
            HomeFocus::Join => HomeFocus::Create,
        }
    }
}

/// Purely local presentation state.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub home_focus: HomeFocus,
    /// Board cell under the cursor, 0-8.
    pub cursor: usize,
    /// One-line feedback for rejected local actions.
    pub notice: Option<String>,
}

pub fn render(frame: &mut Frame, state: &AppState, ui: &UiState) {
    match state.view {
        View::Home => home::render(frame, state, ui),
        View::Lobby => lobby::render(frame, state, ui),
        View::Game => game::render(frame, state, ui),
    }

    if let Some(alert) = &state.alert {
        render_alert(frame, alert);
    }
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 50, 7);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from("press any key").style(Style::default().fg(Color::DarkGray)),
        ])
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ALERT ")
                .border_style(Style::default().fg(Color::Red)),
        ),
        area,
    );
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub(crate) fn pill<'a>(text: impl Into<String>, color: Color) -> Span<'a> {
    Span::styled(format!(" {} ", text.into()), Style::default().fg(Color::Black).bg(color))
}

pub(crate) fn connection_pill<'a>(status: ConnectionStatus, live: bool) -> Span<'a> {
    match (status, live) {
        (ConnectionStatus::Connected, false) => pill("● Connected", Color::Green),
        (ConnectionStatus::Connected, true) => pill("● Live", Color::Green),
        (ConnectionStatus::Connecting, _) => pill("● Connecting...", Color::Yellow),
        (ConnectionStatus::Disconnected, false) => pill("● Disconnected", Color::Red),
        (ConnectionStatus::Disconnected, true) => pill("● Offline", Color::Red),
    }
}

pub(crate) fn key_help<'a>(keys: &[(&'a str, &'a str)]) -> Line<'a> {
    let mut spans = Vec::new();
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("[{key}]"), Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(format!(" {action}")));
    }
    Line::from(spans)
}
