use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::{key_help, HomeFocus, UiState};
use crate::core::state::AppState;

pub(super) fn render(frame: &mut Frame, state: &AppState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Length(7), // Panels
            Constraint::Length(2), // Notice
            Constraint::Min(0),
            Constraint::Length(1), // Player id
            Constraint::Length(1), // Keys
        ])
        .split(frame.area());

    let title = Paragraph::new(vec![
        Line::from("T I C   T A C   T O E").style(
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Line::from("Real-time battles").style(Style::default().fg(Color::Gray)),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let focused = |focus: HomeFocus| {
        if ui.home_focus == focus {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let create = Paragraph::new(vec![
        Line::from("Start a new room and invite a friend."),
        Line::from(""),
        Line::from(if ui.home_focus == HomeFocus::Create {
            "> Create room <"
        } else {
            "  Create room  "
        }),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" CREATE ROOM ")
            .border_style(focused(HomeFocus::Create)),
    );
    frame.render_widget(create, panels[0]);

    let input = if state.join_input.is_empty() && ui.home_focus != HomeFocus::Join {
        Span::styled("Enter 6-digit code", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!("{}_", state.join_input),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };
    let join = Paragraph::new(vec![
        Line::from("Enter a room code to join."),
        Line::from(""),
        Line::from(vec![Span::raw("Code: "), input]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" JOIN ROOM ")
            .border_style(focused(HomeFocus::Join)),
    );
    frame.render_widget(join, panels[1]);

    if let Some(notice) = &ui.notice {
        frame.render_widget(
            Paragraph::new(notice.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow)),
            chunks[2],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Player ID: "),
            Span::styled(state.player_id.to_string(), Style::default().fg(Color::Cyan)),
        ]))
        .alignment(Alignment::Center),
        chunks[4],
    );
    frame.render_widget(
        Paragraph::new(key_help(&[("Tab", "Switch"), ("Enter", "Confirm"), ("Esc", "Quit")]))
            .alignment(Alignment::Center),
        chunks[5],
    );
}
