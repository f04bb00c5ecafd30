//! Process-wide audio host lifecycle
//!
//! Only one [`AudioHost`] can be alive at a time. Acquiring it stands in for
//! initializing the audio subsystem and dropping it for tearing it down.

use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, warn};

use crate::error::AudioError;

static HOST_IN_USE: AtomicBool = AtomicBool::new(false);

/// An input-capable device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub name: String,
    /// Device offers more than one input channel
    pub stereo: bool,
}

/// Exclusive guard over the platform audio host
pub struct AudioHost {
    host: cpal::Host,
}

impl AudioHost {
    /// Acquire the default platform host.
    ///
    /// Fails with [`AudioError::HostInUse`] while another guard is alive.
    pub fn acquire() -> Result<Self, AudioError> {
        claim()?;
        debug!("Acquired audio host");
        Ok(Self {
            host: cpal::default_host(),
        })
    }

    pub(crate) fn host(&self) -> &cpal::Host {
        &self.host
    }

    /// List devices with at least one input channel
    pub fn input_devices(&self) -> Result<Vec<InputDevice>, AudioError> {
        let mut devices = Vec::new();

        for device in self.host.input_devices()? {
            let name = match device.name() {
                Ok(name) => name,
                Err(e) => {
                    warn!("Skipping device without a name: {}", e);
                    continue;
                }
            };

            let max_channels = device
                .supported_input_configs()
                .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                .unwrap_or(0);
            if max_channels == 0 {
                continue;
            }

            devices.push(InputDevice {
                name,
                stereo: max_channels > 1,
            });
        }

        Ok(devices)
    }
}

impl Drop for AudioHost {
    fn drop(&mut self) {
        release();
        debug!("Released audio host");
    }
}

fn claim() -> Result<(), AudioError> {
    HOST_IN_USE
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
        .map_err(|_| AudioError::HostInUse)
}

fn release() {
    HOST_IN_USE.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exercises the guard flag without touching a real audio backend
    #[test]
    fn test_claim_is_exclusive() {
        claim().unwrap();
        assert!(matches!(claim(), Err(AudioError::HostInUse)));
        release();
        claim().unwrap();
        release();
    }
}
