//! Presentation layer handling terminal UI and user input.
//!
//! Renders the form, the upload panel and the signature pad with ratatui,
//! and maps keyboard and mouse input onto the application state.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
