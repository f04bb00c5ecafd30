//! Audio input errors

use thiserror::Error;

/// Errors that can occur while opening or running an input device
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio host is already in use")]
    HostInUse,
    #[error("Input stream already started")]
    AlreadyStarted,
    #[error("No default input device found")]
    NoInputDevice,
    #[error("Could not find input device {0}")]
    DeviceNotFound(String),
    #[error("Failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("Failed to get input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("Failed to create input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("Failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("Unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}
