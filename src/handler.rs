use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Help => handle_help_key(app, key),
        AppMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.toggle_help(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_help(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_help(false),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.collapse_selected(),
        KeyCode::Char('.') => app.toggle_hidden(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.clear_status(),
        _ => {}
    }
}

/// Handle a mouse event.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode == AppMode::Help {
        match mouse.kind {
            MouseEventKind::ScrollDown => app.scroll_help(true),
            MouseEventKind::ScrollUp => app.scroll_help(false),
            _ => {}
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        MouseEventKind::Down(MouseButton::Left) => app.select_row_at(mouse.column, mouse.row),
        _ => {}
    }
}
