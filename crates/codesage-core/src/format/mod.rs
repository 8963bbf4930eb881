//! Rendering of AI review text.
//!
//! Reviews arrive as a constrained markdown subset. This module turns them
//! into HTML fragments through a fixed sequence of regex substitutions:
//!
//! - `markdown::to_html`: the full review view, with styled code blocks and
//!   a copy affordance
//! - `markdown::to_compact_html`: the denser history-card rendering
//! - `sanitize`: input escaping, the output tag/attribute allow-list, and
//!   recovery of copy payloads
//! - `segments`: splitting text around fenced code for non-HTML renderers
//!
//! The substitution order is fixed and deliberately naive. Nested or
//! overlapping markers (bold inside list items, `#` comments inside fenced
//! code) come out however the ordered regexes leave them.

pub mod markdown;
pub mod sanitize;
pub mod segments;

pub use markdown::{to_compact_html, to_html};
pub use sanitize::{copy_payload, escape_html, sanitize};
pub use segments::{split_code_blocks, Segment};

/// Tags the formatters may emit.
pub const ALLOWED_TAGS: &[&str] = &[
    "h3", "h4", "h5", "div", "span", "button", "pre", "code", "strong", "em", "ul", "li", "hr",
    "p", "br",
];

/// Attributes the formatters may emit, on any allowed tag.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["class", "data-code", "data-index"];
