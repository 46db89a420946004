//! UI layer: the single form window.

pub mod app;

pub use app::{RecuRapidApp, StartupConfig};
