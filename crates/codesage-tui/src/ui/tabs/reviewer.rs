use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::markdown::review_lines;
use crate::ui::styles;

/// Render the reviewer - code editor on the left, review on the right
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_editor(frame, app, chunks[0]);
    render_review(frame, app, chunks[1]);
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Editor;
    let (cursor_row, cursor_col) = app.editor.cursor_position();

    let mut lines: Vec<Line> = Vec::new();
    if app.editor.is_empty() && !focused {
        lines.push(Line::from(Span::styled(
            "Press [e] and paste or type your code here...",
            styles::muted_style(),
        )));
    } else {
        for (row, text) in app.editor.text().split('\n').enumerate() {
            let number = Span::styled(format!("{:>3} ", row + 1), styles::muted_style());
            if focused && row == cursor_row {
                let before: String = text.chars().take(cursor_col).collect();
                let at: String = text.chars().nth(cursor_col).map(String::from).unwrap_or_else(|| " ".into());
                let after: String = text.chars().skip(cursor_col + 1).collect();
                lines.push(Line::from(vec![
                    number,
                    Span::raw(before),
                    Span::styled(at, styles::cursor_style()),
                    Span::raw(after),
                ]));
            } else {
                lines.push(Line::from(vec![number, Span::raw(text.to_string())]));
            }
        }
    }

    // Keep the cursor row inside the pane
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = cursor_row.saturating_sub(visible.saturating_sub(1)) as u16;

    let title = format!(" Code ({}) ", app.stores.review.language().display_name());
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Review;
    let reveal = app.revealer.frame();

    let lines = if !reveal.displayed().is_empty() {
        review_lines(reveal.displayed())
    } else if app.stores.review.loading() {
        vec![Line::from(Span::styled("Reviewing your code...", styles::highlight_style()))]
    } else if let Some(error) = app.stores.review.error() {
        vec![Line::from(Span::styled(error.to_string(), styles::error_style()))]
    } else {
        vec![Line::from(Span::styled(
            "Submit code to see the review here.",
            styles::muted_style(),
        ))]
    };

    let title = if reveal.is_streaming() {
        " Review (streaming, [f] to finish) ".to_string()
    } else {
        " Review ".to_string()
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.review_scroll, 0));
    frame.render_widget(paragraph, area);
}
