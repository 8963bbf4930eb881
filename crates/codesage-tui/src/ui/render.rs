use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use codesage_core::guard::{GuardDecision, Route, VERIFYING_MESSAGE};

use crate::app::{App, AppState, AuthFocus, AuthMode, Focus};

use super::styles;
use super::tabs::{history, reviewer};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match (app.route, app.guard_decision()) {
        (Route::Auth, _) => render_auth_overlay(frame, app),
        (_, GuardDecision::Wait) => render_verifying_overlay(frame),
        _ => {}
    }

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::ConfirmingQuit => render_confirm_overlay(frame, "Are you sure you want to quit?", "quit"),
        AppState::ConfirmingClearAll => {
            render_confirm_overlay(frame, "Clear code, review and history?", "clear")
        }
        AppState::ConfirmingDeleteHistory => {
            render_confirm_overlay(frame, "Delete your saved code history?", "delete")
        }
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  CodeSage";
    let user = app
        .stores
        .session
        .user()
        .map(|u| format!("{}  ", u.display_name()))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + user.chars().count() + help_hint.len() + 4),
        )),
        Span::styled(user, styles::success_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[1] Reviewer", app.route == Route::CodeReviewer),
        ("[2] History", app.route == Route::History),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    // Language selector on the right of the reviewer tab
    if app.route == Route::CodeReviewer {
        let language = format!("Language: {} [l]", app.stores.review.language().display_name());
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + language.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(language, styles::highlight_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.route {
        Route::CodeReviewer | Route::Auth => reviewer::render(frame, app, area),
        Route::History => history::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match (app.route, app.focus) {
        (Route::Auth, _) => "[Tab] next field | [Ctrl+R] login/register",
        (Route::CodeReviewer, Focus::Editor) => "[Ctrl+S] review | [Esc] commands",
        (Route::CodeReviewer, Focus::Review) => "[s]ubmit | [e]dit | [c]lear | [o] logout | [q]uit",
        (Route::History, _) => "[r]efresh | [D]elete | [Enter] expand | [q]uit",
    };

    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None => session_summary(app),
    };
    let right_text = format!(" {} ", shortcuts);

    let expiring = app.stores.session.data().is_some_and(|d| d.expires_soon());
    let left_style = if app.stores.review.error().is_some() || expiring {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Session expiry and history age, shown when there is no status message
fn session_summary(app: &App) -> String {
    match app.stores.session.data() {
        Some(data) if app.stores.session.is_authenticated() => format!(
            " Session expires in {} min | History updated {} ",
            data.minutes_until_expiry(),
            app.stores.review.history_age()
        ),
        _ => " Not signed in ".to_string(),
    }
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(54, 29, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  CodeSage", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("  1 / 2       ", "Reviewer / history"),
        key("  ↑/↓         ", "Scroll review or select entry"),
        key("  PgUp/PgDn   ", "Scroll a page"),
        key("  Esc         ", "Leave the editor"),
        Line::from(""),
        Line::from(Span::styled(" Reviewer", styles::highlight_style())),
        key("  e           ", "Edit code"),
        key("  Ctrl+S / s  ", "Submit for review"),
        key("  l / L       ", "Next / previous language"),
        key("  f           ", "Show the whole review now"),
        key("  c           ", "Clear code and review"),
        key("  X           ", "Clear all local review data"),
        Line::from(""),
        Line::from(Span::styled(" History", styles::highlight_style())),
        key("  Enter       ", "Expand / collapse code"),
        key("  r           ", "Refresh from server"),
        key("  D           ", "Delete history on server"),
        Line::from(""),
        Line::from(Span::styled(" Session", styles::highlight_style())),
        key("  o           ", "Log out"),
        key("  q           ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("        Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn auth_field<'a>(label: &'static str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Show the trailing part of long input so the cursor end stays visible
fn field_tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width)).collect()
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let session = &app.stores.session;
    let registering = app.auth_mode == AuthMode::Register;
    let mut height = if registering { 13 } else { 12 };
    if session.error().is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];

    // Mode tabs
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Login", styles::tab_style(!registering)),
        Span::styled(" | ", styles::muted_style()),
        Span::styled("Register", styles::tab_style(registering)),
        Span::styled("   [Ctrl+R] switch", styles::muted_style()),
    ]));
    lines.push(Line::from(""));

    if registering {
        lines.push(auth_field(
            "Username: ",
            field_tail(&app.auth_username, 24),
            app.auth_focus == AuthFocus::Username,
        ));
    }
    lines.push(auth_field(
        "Email:    ",
        field_tail(&app.auth_email, 24),
        app.auth_focus == AuthFocus::Email,
    ));
    let masked = "*".repeat(app.auth_password.chars().count().min(24));
    lines.push(auth_field("Password: ", masked, app.auth_focus == AuthFocus::Password));

    lines.push(Line::from(""));
    let button_focused = app.auth_focus == AuthFocus::Button;
    let label = if session.loading() {
        format!("  {}...  ", app.auth_mode.title())
    } else if button_focused {
        format!(" ▶ {} ◀ ", app.auth_mode.title())
    } else {
        format!("   {}   ", app.auth_mode.title())
    };
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(error) = session.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let remember = if app.config.remember_credentials {
        "password saved to keychain"
    } else {
        "password not saved"
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("   {}", remember), styles::muted_style())));

    let block = Block::default()
        .title(format!(" {} ", app.auth_mode.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_verifying_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", VERIFYING_MESSAGE), styles::highlight_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(50, 10, outer), Rect::new(25, 15, 50, 10));

        let small = Rect::new(0, 0, 20, 5);
        let r = centered_rect_fixed(50, 10, small);
        assert_eq!((r.width, r.height), (20, 5));
    }

    #[test]
    fn test_field_tail() {
        assert_eq!(field_tail("short", 24), "short");
        assert_eq!(field_tail("abcdef", 3), "def");
    }
}
