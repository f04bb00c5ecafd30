//! Live microphone capture as a pull-based sample source
//!
//! The cpal callback runs on the audio thread and forwards mono chunks over a
//! bounded channel. [`MicrophoneSource`] turns that push stream back into
//! blocking pulls that wake immediately on cancellation.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use toot_analysis::{Frame, SampleSource};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::error::AudioError;
use crate::host::AudioHost;

/// Chunks queued between the audio callback and the reader
const CHANNEL_CAPACITY: usize = 64;

/// Stream format delivered to the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channels captured from the device (only the first is forwarded)
    pub channels: u16,
}

/// An opened input device.
///
/// Borrows the [`AudioHost`] it was opened from, so the host cannot be
/// released while the device is open:
///
/// ```compile_fail
/// use toot_audio::{AudioHost, Microphone};
///
/// fn reopen() -> Result<(), toot_audio::AudioError> {
///     let host = AudioHost::acquire()?;
///     let microphone = Microphone::open_default(&host)?;
///     drop(host);
///     println!("{}", microphone.device_name());
///     Ok(())
/// }
/// ```
pub struct Microphone<'h> {
    device: cpal::Device,
    name: String,
    sample_format: SampleFormat,
    config: StreamConfig,
    stream: Option<cpal::Stream>,
    token: Option<CancellationToken>,
    dropped: Arc<AtomicUsize>,
    _host: PhantomData<&'h AudioHost>,
}

impl<'h> Microphone<'h> {
    /// Open the default input device
    pub fn open_default(host: &'h AudioHost) -> Result<Self, AudioError> {
        Self::open(host, "")
    }

    /// Open the input device whose name contains `name`.
    ///
    /// An empty name selects the default input device. When several devices
    /// match, the last one listed wins.
    pub fn open(host: &'h AudioHost, name: &str) -> Result<Self, AudioError> {
        let device = if name.is_empty() {
            host.host()
                .default_input_device()
                .ok_or(AudioError::NoInputDevice)?
        } else {
            find_device(host, name)?
        };

        let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        info!(
            device = %name,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "Opened input device"
        );

        Ok(Self {
            device,
            name,
            sample_format,
            config,
            stream: None,
            token: None,
            dropped: Arc::new(AtomicUsize::new(0)),
            _host: PhantomData,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        Format {
            sample_rate: self.config.sample_rate.0,
            channels: self.config.channels,
        }
    }

    /// Request a different capture rate; applies to the next [`start`](Self::start)
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.config.sample_rate = cpal::SampleRate(sample_rate);
    }

    /// Samples discarded because the reader fell behind
    pub fn dropped_samples(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_started(&self) -> bool {
        self.stream.is_some()
    }

    /// Start capturing and return the reading end.
    ///
    /// Cancelling `token` (or calling [`close`](Self::close)) unblocks any
    /// pending read on the returned source.
    pub fn start(&mut self, token: CancellationToken) -> Result<MicrophoneSource, AudioError> {
        if self.stream.is_some() {
            return Err(AudioError::AlreadyStarted);
        }

        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(tx)?,
            SampleFormat::I16 => self.build_stream::<i16>(tx)?,
            SampleFormat::U16 => self.build_stream::<u16>(tx)?,
            SampleFormat::I32 => self.build_stream::<i32>(tx)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        debug!(device = %self.name, "Input stream started");
        self.stream = Some(stream);
        self.token = Some(token.clone());

        Ok(MicrophoneSource::new(rx, token))
    }

    fn build_stream<T>(&self, tx: Sender<Vec<f32>>) -> Result<cpal::Stream, AudioError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.config.channels.max(1) as usize;
        let dropped = Arc::clone(&self.dropped);

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let chunk: Vec<f32> = data
                    .chunks(channels)
                    .map(|frame| frame[0].to_sample::<f32>())
                    .collect();
                let len = chunk.len();
                // Never block the audio thread; drop the chunk if the reader lags
                if let Err(TrySendError::Full(_)) = tx.try_send(chunk) {
                    dropped.fetch_add(len, Ordering::Relaxed);
                }
            },
            |err| {
                warn!("Input stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }

    /// Stop capturing; safe to call more than once
    pub fn close(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause input stream: {}", e);
            }
            drop(stream);
            debug!(
                device = %self.name,
                dropped = self.dropped_samples(),
                "Input stream closed"
            );
        }
    }
}

impl Drop for Microphone<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

fn find_device(host: &AudioHost, name: &str) -> Result<cpal::Device, AudioError> {
    let mut found = None;

    for device in host.host().input_devices()? {
        let Ok(device_name) = device.name() else {
            continue;
        };
        let has_input = device
            .supported_input_configs()
            .map(|mut configs| configs.any(|c| c.channels() > 0))
            .unwrap_or(false);

        if has_input && device_name.contains(name) {
            found = Some(device);
        }
    }

    found.ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))
}

/// Reading end of a started [`Microphone`]
pub struct MicrophoneSource {
    rx: Receiver<Vec<f32>>,
    token: CancellationToken,
    pending: Vec<f32>,
    position: usize,
}

impl MicrophoneSource {
    fn new(rx: Receiver<Vec<f32>>, token: CancellationToken) -> Self {
        Self {
            rx,
            token,
            pending: Vec::new(),
            position: 0,
        }
    }

    /// Block until the next non-empty chunk arrives.
    ///
    /// Returns false on cancellation or when the stream has gone away.
    fn refill(&mut self) -> bool {
        loop {
            if self.token.is_cancelled() {
                return false;
            }

            let next = select! {
                recv(self.rx) -> chunk => chunk.ok(),
                recv(self.token.done()) -> _ => None,
            };

            match next {
                Some(chunk) if chunk.is_empty() => continue,
                Some(chunk) => {
                    self.pending = chunk;
                    self.position = 0;
                    return true;
                }
                None => {
                    debug!(cancelled = self.token.is_cancelled(), "Microphone source ended");
                    return false;
                }
            }
        }
    }
}

impl SampleSource for MicrophoneSource {
    fn read(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        for frame in frames.iter_mut() {
            if self.position == self.pending.len() && !self.refill() {
                return (0, false);
            }
            let sample = self.pending[self.position];
            self.position += 1;
            *frame = [sample, sample];
        }
        (frames.len(), true)
    }
}
