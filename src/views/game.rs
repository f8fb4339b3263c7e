use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{connection_pill, key_help, pill, UiState};
use crate::core::game::{Mark, Outcome, CELLS};
use crate::core::history::GameSummary;
use crate::core::identity::PlayerId;
use crate::core::state::AppState;

const CELL_WIDTH: usize = 7;

pub(super) fn render(frame: &mut Frame, state: &AppState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Seats
            Constraint::Min(12),   // Board + history
            Constraint::Length(2), // Result / notice
            Constraint::Length(1), // Keys
        ])
        .split(frame.area());

    render_header(frame, state, chunks[0]);
    render_seats(frame, state, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_board(frame, state, ui, body[0]);
    render_history(frame, state, body[1]);

    render_result(frame, state, ui, chunks[3]);

    let mut keys = vec![("hjkl", "Move"), ("Enter/1-9", "Play")];
    if state.can_restart() {
        keys.push(("n", "New game"));
    }
    keys.extend([("H", "History"), ("b", "Lobby"), ("c", "Copy")]);
    if state.gave_up {
        keys.push(("r", "Reconnect"));
    }
    keys.push(("x", "Leave"));
    frame.render_widget(Paragraph::new(key_help(&keys)).alignment(Alignment::Center), chunks[4]);
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let code = state
        .room
        .as_ref()
        .map(|r| r.code.to_string())
        .unwrap_or_default();

    let turn_style = if state.game.is_my_turn(&state.player_id) {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let turn = if state.game.finished {
        Span::styled("Game over", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(state.turn_label(), turn_style)
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Battle Arena #{code}"),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        turn,
        Span::raw("   "),
        connection_pill(state.connection, true),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn seat_label(state: &AppState, mark: Mark) -> String {
    let who = match state.game.player_for(mark) {
        Some(p) if *p == state.player_id => "You",
        Some(_) => "Opponent",
        None => "Waiting...",
    };
    format!("{mark}: {who}")
}

fn render_seats(frame: &mut Frame, state: &AppState, area: Rect) {
    let color = |mark: Mark| {
        if state.game.turn == mark && !state.game.finished {
            Color::Cyan
        } else {
            Color::DarkGray
        }
    };
    let seats = Paragraph::new(Line::from(vec![
        pill(seat_label(state, Mark::X), color(Mark::X)),
        Span::raw("  vs  "),
        pill(seat_label(state, Mark::O), color(Mark::O)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(seats, area);
}

fn render_board(frame: &mut Frame, state: &AppState, ui: &UiState, area: Rect) {
    let playable = state.can_play();
    let highlight = state.game.highlighted_line();

    let mut lines = vec![Line::from("")];
    for row in 0..3 {
        let mut spans = Vec::new();
        for col in 0..3 {
            let index = row * 3 + col;
            if col > 0 {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            }

            let (symbol, mut style) = match state.game.board.get(index) {
                Some(Mark::X) => ("X", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Some(Mark::O) => ("O", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
                None => ("", Style::default().fg(Color::DarkGray)),
            };
            let text = if symbol.is_empty() {
                format!("{:^width$}", index + 1, width = CELL_WIDTH)
            } else {
                format!("{symbol:^width$}", width = CELL_WIDTH)
            };

            if highlight.is_some_and(|line| line.contains(&index)) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
            if !playable {
                style = style.add_modifier(Modifier::DIM);
            }
            if index == ui.cursor.min(CELLS - 1) && !state.game.finished {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
        if row < 2 {
            let rule = "─".repeat(CELL_WIDTH);
            lines.push(Line::from(Span::styled(
                format!("{rule}┼{rule}┼{rule}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let board = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" BOARD "));
    frame.render_widget(board, area);
}

fn summary_line(index: usize, game: &GameSummary, state: &AppState) -> String {
    let who = |seat: &PlayerId| -> &'static str {
        if *seat == state.player_id {
            "You"
        } else {
            "Opponent"
        }
    };
    let result = match game.outcome {
        Outcome::Draw => "Draw".to_string(),
        Outcome::Winner(mark) => format!("{mark} won"),
    };
    format!(
        "Game #{}  X: {} vs O: {}  {result}",
        index + 1,
        who(&game.x_player),
        who(&game.o_player)
    )
}

fn render_history(frame: &mut Frame, state: &AppState, area: Rect) {
    let tally = state.tally();
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let totals = Paragraph::new(Line::from(vec![
        Span::styled(format!("Wins: {}", tally.wins), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(format!("Draws: {}", tally.draws), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!("Losses: {}", tally.losses), Style::default().fg(Color::Red)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" HISTORY "));
    frame.render_widget(totals, split[0]);

    let items: Vec<ListItem> = if state.history.is_empty() {
        vec![ListItem::new(Span::styled(
            "No games yet. Press H to refresh.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state
            .history
            .iter()
            .enumerate()
            .rev()
            .map(|(i, game)| ListItem::new(summary_line(i, game, state)))
            .collect()
    };
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL)),
        split[1],
    );
}

fn render_result(frame: &mut Frame, state: &AppState, ui: &UiState, area: Rect) {
    let mut lines = Vec::new();
    if state.game.finished {
        let banner = match state.game.outcome {
            Some(Outcome::Draw) => "Draw!".to_string(),
            Some(Outcome::Winner(mark)) if state.game.seat_of(&state.player_id) == Some(mark) => {
                format!("{mark} wins. Victory!")
            }
            Some(Outcome::Winner(mark)) => format!("{mark} wins"),
            None => "Game over".to_string(),
        };
        lines.push(Line::from(Span::styled(
            banner,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(if state.is_host() {
            "Press n to start a new game"
        } else {
            "Waiting for the host to start a new game..."
        }));
    } else if let Some(notice) = &ui.notice {
        lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Yellow))));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
