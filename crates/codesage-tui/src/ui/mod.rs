//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, status bar and overlays
//! - `input`: Keyboard event handling
//! - `markdown`: Review text styled for the terminal
//! - `styles`: Color schemes and text styling
//! - `tabs`: Reviewer and history views

pub mod input;
pub mod markdown;
pub mod render;
pub mod styles;
pub mod tabs;
