//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Patient form
//! - Prediction result

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
