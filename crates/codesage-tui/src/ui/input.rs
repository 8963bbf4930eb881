//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use codesage_core::guard::{GuardDecision, Route};

use crate::app::{
    can_add_email_char, can_add_password_char, can_add_username_char, App, AppState, AuthFocus,
    Focus, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle confirmations
    if matches!(
        app.state,
        AppState::ConfirmingQuit | AppState::ConfirmingClearAll | AppState::ConfirmingDeleteHistory
    ) {
        return handle_confirm_input(app, key);
    }

    if app.route == Route::Auth {
        return handle_auth_input(app, key);
    }

    // Nothing to do on a protected view until the session is verified
    if app.guard_decision() == GuardDecision::Wait {
        return false;
    }

    if app.route == Route::CodeReviewer && app.focus == Focus::Editor {
        handle_editor_input(app, key);
        return false;
    }

    handle_command_input(app, key);
    false
}

fn handle_confirm_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let confirmed = app.state;
            app.state = AppState::Normal;
            match confirmed {
                AppState::ConfirmingQuit => {
                    app.state = AppState::Quitting;
                    return true;
                }
                AppState::ConfirmingClearAll => app.clear_all(),
                AppState::ConfirmingDeleteHistory => app.delete_history(),
                _ => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        _ => {}
    }
    false
}

fn handle_auth_input(app: &mut App, key: KeyEvent) -> bool {
    // Ignore edits while a request is in flight
    if app.stores.session.loading() {
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        app.toggle_auth_mode();
        return false;
    }

    let mode = app.auth_mode;
    match key.code {
        KeyCode::Esc => {
            // Quit if on the auth screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.auth_focus = app.auth_focus.next(mode);
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.auth_focus = app.auth_focus.prev(mode);
        }
        KeyCode::Enter => match app.auth_focus {
            AuthFocus::Button => app.submit_auth(),
            focus => app.auth_focus = focus.next(mode),
        },
        KeyCode::Backspace => match app.auth_focus {
            AuthFocus::Username => {
                app.auth_username.pop();
            }
            AuthFocus::Email => {
                app.auth_email.pop();
            }
            AuthFocus::Password => {
                app.auth_password.pop();
            }
            AuthFocus::Button => {}
        },
        KeyCode::Char(c) => match app.auth_focus {
            AuthFocus::Username => {
                if can_add_username_char(app.auth_username.chars().count(), c) {
                    app.auth_username.push(c);
                }
            }
            AuthFocus::Email => {
                if can_add_email_char(app.auth_email.chars().count(), c) {
                    app.auth_email.push(c);
                }
            }
            AuthFocus::Password => {
                if can_add_password_char(app.auth_password.chars().count(), c) {
                    app.auth_password.push(c);
                }
            }
            AuthFocus::Button => {}
        },
        _ => {}
    }
    false
}

fn handle_editor_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => {
                if !app.is_busy() {
                    app.focus = Focus::Review;
                    app.submit_review();
                }
            }
            KeyCode::Char('l') => app.cycle_language(true),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.sync_code();
            app.focus = Focus::Review;
        }
        KeyCode::Enter => app.editor.insert('\n'),
        KeyCode::Tab => app.editor.insert_tab(),
        KeyCode::Backspace => {
            app.editor.backspace();
        }
        KeyCode::Left => app.editor.move_left(),
        KeyCode::Right => app.editor.move_right(),
        KeyCode::Up => app.editor.move_up(),
        KeyCode::Down => app.editor.move_down(),
        KeyCode::Home => app.editor.move_home(),
        KeyCode::End => app.editor.move_end(),
        KeyCode::Char(c) => app.editor.insert(c),
        _ => {}
    }
}

fn handle_command_input(app: &mut App, key: KeyEvent) {
    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Char('1') => {
            app.navigate(Route::CodeReviewer);
            return;
        }
        KeyCode::Char('2') | KeyCode::Char('h') => {
            app.navigate(Route::History);
            return;
        }
        KeyCode::Char('o') => {
            app.logout();
            return;
        }
        KeyCode::Char('X') => {
            app.state = AppState::ConfirmingClearAll;
            return;
        }
        _ => {}
    }

    match app.route {
        Route::CodeReviewer => handle_reviewer_keys(app, key),
        Route::History => handle_history_keys(app, key),
        Route::Auth => {}
    }
}

fn handle_reviewer_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Char('i') | KeyCode::Enter => {
            app.status_message = None;
            app.focus = Focus::Editor;
        }
        KeyCode::Char('s') => {
            if !app.is_busy() {
                app.submit_review();
            }
        }
        KeyCode::Char('l') => app.cycle_language(true),
        KeyCode::Char('L') => app.cycle_language(false),
        KeyCode::Char('f') => app.revealer.finish(),
        KeyCode::Char('c') => app.clear_current(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.review_scroll = app.review_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.review_scroll = app.review_scroll.saturating_add(1);
        }
        KeyCode::PageUp => {
            app.review_scroll = app.review_scroll.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.review_scroll = app.review_scroll.saturating_add(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => app.review_scroll = 0,
        _ => {}
    }
}

fn handle_history_keys(app: &mut App, key: KeyEvent) {
    let count = app.stores.review.history().len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if app.history_selection > 0 {
                app.history_selection -= 1;
                app.history_scroll = 0;
                app.history_code_expanded = false;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.history_selection + 1 < count {
                app.history_selection += 1;
                app.history_scroll = 0;
                app.history_code_expanded = false;
            }
        }
        KeyCode::PageUp => {
            app.history_scroll = app.history_scroll.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.history_scroll = app.history_scroll.saturating_add(PAGE_SCROLL_SIZE);
        }
        KeyCode::Enter => app.history_code_expanded = !app.history_code_expanded,
        KeyCode::Char('r') => {
            if !app.is_busy() {
                app.fetch_history();
            }
        }
        KeyCode::Char('D') => app.state = AppState::ConfirmingDeleteHistory,
        _ => {}
    }
}
