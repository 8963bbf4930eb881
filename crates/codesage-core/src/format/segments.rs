use super::markdown::{CODE_FENCE, DEFAULT_FENCE_LANGUAGE};

/// A piece of review text, either prose or a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code { language: String, code: String },
}

/// Split review text around fenced code blocks, in order.
///
/// Fences are recognised exactly as the HTML formatter recognises them, so a
/// terminal rendering shows the same blocks. Code is trimmed; prose between
/// blocks is kept verbatim and empty prose segments are dropped.
pub fn split_code_blocks(text: &str) -> Vec<Segment> {
    let text = text.replace("\r\n", "\n");
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in CODE_FENCE.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(text[last..whole.start()].to_string()));
        }
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or(DEFAULT_FENCE_LANGUAGE)
            .to_string();
        segments.push(Segment::Code {
            language,
            code: caps[2].trim().to_string(),
        });
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}
