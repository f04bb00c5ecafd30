//! Streaming spectrum analysis for toot
//!
//! Turns a live sample stream into a windowed power spectrum and condenses
//! it into a handful of display bins:
//! - SlidingSampleBuffer: bounded window of the most recent samples
//! - SpectralAnalyzer: Hamming window, FFT and power normalization
//! - Binner: triangle-weighted grouping over a frequency range

mod binner;
mod buffer;
mod config;
mod pitch;
mod source;
mod spectrum;

pub use binner::Binner;
pub use buffer::SlidingSampleBuffer;
pub use config::{AnalyzerConfig, BinnerConfig, ConfigError};
pub use pitch::{bar_level, display_level, dominant_frequency, DISPLAY_FULL_SCALE};
pub use source::{Frame, SampleSource, VecSource};
pub use spectrum::{
    hamming_window, power_spectrum, SharedAnalyzer, SpectralAnalyzer, Spectrum, SpectrumSample,
    SINGLE_SAMPLE_WINDOW,
};
