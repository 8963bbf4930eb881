use chrono::{DateTime, Local, Utc};

/// Lines of submitted code shown on a collapsed history card
pub const HISTORY_CODE_LINES: usize = 15;

/// Truncate a string to a maximum number of characters, adding an ellipsis
/// if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Keep the first `max_lines` lines of `code`, marking the cut with a
/// trailing `...` line.
pub fn truncate_code(code: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    if lines.len() <= max_lines {
        return code.to_string();
    }
    format!("{}\n...", lines[..max_lines].join("\n"))
}

/// Local date and time for a history timestamp
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%b %d, %Y %H:%M")
        .to_string()
}
