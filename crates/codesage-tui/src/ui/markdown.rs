//! Line-level styling of review text for the terminal.
//!
//! The HTML formatter is for browsers; here the same fenced blocks are found
//! with `split_code_blocks` and prose is styled line by line: headers, list
//! bullets, rules, plus `**bold**` and `` `code` `` spans within a line.

use codesage_core::format::{split_code_blocks, Segment};
use ratatui::text::{Line, Span};

use super::styles;

pub fn review_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for segment in split_code_blocks(text) {
        match segment {
            Segment::Text(prose) => {
                lines.extend(prose.split('\n').map(prose_line));
            }
            Segment::Code { language, code } => {
                lines.push(Line::from(Span::styled(
                    format!(" {} ", language.to_uppercase()),
                    styles::code_header_style(),
                )));
                lines.extend(code.lines().map(|l| {
                    Line::from(vec![
                        Span::styled("│ ", styles::muted_style()),
                        Span::styled(l.to_string(), styles::code_style()),
                    ])
                }));
            }
        }
    }
    lines
}

fn prose_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();

    if let Some(rest) = line.strip_prefix("### ") {
        return Line::from(Span::styled(rest.to_string(), styles::h5_style()));
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return Line::from(Span::styled(rest.to_string(), styles::h4_style()));
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return Line::from(Span::styled(rest.to_string(), styles::h3_style()));
    }
    if trimmed == "---" {
        return Line::from(Span::styled("─".repeat(40), styles::muted_style()));
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            let mut spans = vec![Span::styled("  • ", styles::bullet_style())];
            spans.extend(inline_spans(rest));
            return Line::from(spans);
        }
    }

    if let Some((number, rest)) = ordered_item(trimmed) {
        let mut spans = vec![Span::styled(format!("  {}. ", number), styles::number_style())];
        spans.extend(inline_spans(rest));
        return Line::from(spans);
    }

    Line::from(inline_spans(line))
}

/// `12. text` → ("12", "text")
fn ordered_item(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(". ")?;
    Some((&line[..digits], rest))
}

/// Split a line on `**` and backtick markers. Unclosed markers are shown
/// as typed, which is also what a half-revealed line looks like.
fn inline_spans(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let bold = rest.find("**");
        let code = rest.find('`');
        let (start, marker, style) = match (bold, code) {
            (Some(b), Some(c)) if c < b => (c, "`", styles::inline_code_style()),
            (Some(b), _) => (b, "**", styles::bold_style()),
            (None, Some(c)) => (c, "`", styles::inline_code_style()),
            (None, None) => break,
        };

        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else { break };

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(after[..end].to_string(), style));
        rest = &after[end + marker.len()..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }
    spans
}
