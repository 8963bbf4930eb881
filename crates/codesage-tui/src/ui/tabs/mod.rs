pub mod history;
pub mod reviewer;
