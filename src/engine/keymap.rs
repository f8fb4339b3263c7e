//! Key bindings. Maps a key press in the current view to an [`Intent`];
//! the runner carries the intent out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::game::CELLS;
use crate::core::state::{AppState, View};
use crate::views::{HomeFocus, UiState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    None,
    Quit,
    DismissAlert,
    ToggleFocus,
    TypeCode(char),
    EraseCode,
    CreateRoom,
    JoinRoom,
    StartGame,
    RestartGame,
    RequestHistory,
    /// Move the board cursor to this cell.
    Cursor(usize),
    PlayCell(usize),
    ShowLobby,
    ShowGame,
    CopyCode,
    Reconnect,
    Leave,
}

pub fn map_key(key: KeyEvent, state: &AppState, ui: &UiState) -> Intent {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return Intent::Quit;
    }
    if state.alert.is_some() {
        return Intent::DismissAlert;
    }

    match state.view {
        View::Home => home_key(key, ui),
        View::Lobby => lobby_key(key),
        View::Game => game_key(key, ui),
    }
}

fn home_key(key: KeyEvent, ui: &UiState) -> Intent {
    match key.code {
        KeyCode::Esc => Intent::Quit,
        KeyCode::Tab | KeyCode::BackTab => Intent::ToggleFocus,
        KeyCode::Enter => match ui.home_focus {
            HomeFocus::Create => Intent::CreateRoom,
            HomeFocus::Join => Intent::JoinRoom,
        },
        KeyCode::Backspace if ui.home_focus == HomeFocus::Join => Intent::EraseCode,
        KeyCode::Char(c) if ui.home_focus == HomeFocus::Join && c.is_ascii_alphanumeric() => Intent::TypeCode(c),
        _ => Intent::None,
    }
}

fn lobby_key(key: KeyEvent) -> Intent {
    match key.code {
        KeyCode::Char('s') => Intent::StartGame,
        KeyCode::Char('c') => Intent::CopyCode,
        KeyCode::Char('g') => Intent::ShowGame,
        KeyCode::Char('r') => Intent::Reconnect,
        KeyCode::Char('l') | KeyCode::Esc => Intent::Leave,
        _ => Intent::None,
    }
}

fn game_key(key: KeyEvent, ui: &UiState) -> Intent {
    let cursor = ui.cursor.min(CELLS - 1);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Intent::Cursor(step(cursor, 0, -1)),
        KeyCode::Down | KeyCode::Char('j') => Intent::Cursor(step(cursor, 0, 1)),
        KeyCode::Left | KeyCode::Char('h') => Intent::Cursor(step(cursor, -1, 0)),
        KeyCode::Right | KeyCode::Char('l') => Intent::Cursor(step(cursor, 1, 0)),
        KeyCode::Char(c @ '1'..='9') => Intent::PlayCell(c as usize - '1' as usize),
        KeyCode::Enter | KeyCode::Char(' ') => Intent::PlayCell(cursor),
        KeyCode::Char('n') => Intent::RestartGame,
        KeyCode::Char('H') => Intent::RequestHistory,
        KeyCode::Char('b') => Intent::ShowLobby,
        KeyCode::Char('c') => Intent::CopyCode,
        KeyCode::Char('r') => Intent::Reconnect,
        KeyCode::Char('x') | KeyCode::Esc => Intent::Leave,
        _ => Intent::None,
    }
}

/// Moves within the 3x3 grid, stopping at the edges.
fn step(cursor: usize, dx: isize, dy: isize) -> usize {
    let col = (cursor % 3) as isize + dx;
    let row = (cursor / 3) as isize + dy;
    (row.clamp(0, 2) * 3 + col.clamp(0, 2)) as usize
}
