//! UI Widgets for toot

mod spectrum;
mod status_bar;

pub use spectrum::{BinLabel, SpectrumWidget};
pub use status_bar::StatusBarWidget;
