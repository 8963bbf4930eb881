use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use codesage_core::utils::{format_timestamp, truncate_code, truncate_string, format::HISTORY_CODE_LINES};

use crate::app::App;
use crate::ui::markdown::review_lines;
use crate::ui::styles;

/// Render the history tab - entry table with the selected entry beside it
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_entry_table(frame, app, chunks[0]);
    render_entry_detail(frame, app, chunks[1]);
}

fn render_entry_table(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.stores.review.history();

    let header = Row::new(vec![Cell::from("When"), Cell::from("Language"), Cell::from("Code")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == app.history_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let first_line = entry.input_code.lines().next().unwrap_or("").trim();
            Row::new(vec![
                Cell::from(format_timestamp(&entry.timestamp)),
                Cell::from(entry.language.display_name().to_string()),
                Cell::from(truncate_string(first_line, 30)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(19),
        Constraint::Length(11),
        Constraint::Fill(1),
    ];

    let title = if app.stores.review.loading() {
        " History (loading...) ".to_string()
    } else {
        format!(" History ({}) - updated {} ", history.len(), app.stores.review.history_age())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !history.is_empty() {
        state.select(Some(app.history_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_entry_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(entry) = app.stores.review.history().get(app.history_selection) else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No reviews yet. Submit code from the reviewer to start your history.",
            styles::muted_style(),
        )))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("snippet.{}", entry.language.file_extension()), styles::title_style()),
            Span::styled(
                format!(
                    "  {}  {} lines  {}",
                    entry.language.display_name(),
                    entry.line_count(),
                    format_timestamp(&entry.timestamp)
                ),
                styles::muted_style(),
            ),
        ]),
        Line::from(""),
    ];

    let code = if app.history_code_expanded {
        entry.input_code.clone()
    } else {
        truncate_code(&entry.input_code, HISTORY_CODE_LINES)
    };
    lines.extend(code.split('\n').map(|l| {
        Line::from(vec![
            Span::styled("│ ", styles::muted_style()),
            Span::styled(l.to_string(), styles::code_style()),
        ])
    }));
    if entry.line_count() > HISTORY_CODE_LINES {
        let hint = if app.history_code_expanded {
            "[Enter] show less"
        } else {
            "[Enter] show all code"
        };
        lines.push(Line::from(Span::styled(hint, styles::muted_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Review", styles::highlight_style())));
    lines.extend(review_lines(&entry.reviewed_result));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.history_scroll, 0));
    frame.render_widget(paragraph, area);
}
