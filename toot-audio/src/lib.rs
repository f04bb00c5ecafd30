//! Audio input for toot
//!
//! Device-side collaborator of the analysis core:
//! - AudioHost: exclusive guard over the platform audio host
//! - Microphone: cpal input capture exposed as a `SampleSource`
//! - CancellationToken: unblocks pending reads on shutdown

mod cancel;
mod error;
mod host;
mod microphone;

pub use cancel::CancellationToken;
pub use error::AudioError;
pub use host::{AudioHost, InputDevice};
pub use microphone::{Format, Microphone, MicrophoneSource};
