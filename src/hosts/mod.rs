//! Concrete output surfaces for announcements and the status indicator.

pub mod json_lines;
pub mod terminal;

pub use json_lines::JsonLinesHost;
pub use terminal::TerminalStatusLine;
