//! Terminal UI for toot - widgets and themes
//!
//! Renders binned spectrum levels as horizontal CRT-style bars.

mod theme;
pub mod widgets;

pub use theme::{Theme, CRT_AMBER, CRT_GREEN, CYBERPUNK};
pub use widgets::{BinLabel, SpectrumWidget, StatusBarWidget};
