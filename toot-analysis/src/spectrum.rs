//! FFT power spectrum over a sliding window of live samples

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rustfft::{num_complex::Complex, Fft, FftPlanner, Length};
use tracing::{debug, trace};

use crate::buffer::SlidingSampleBuffer;
use crate::config::{AnalyzerConfig, ConfigError};
use crate::source::{Frame, SampleSource};

/// Hamming coefficient used for a single-sample window, where the cosine
/// term would divide by zero
pub const SINGLE_SAMPLE_WINDOW: f32 = 0.54 - 0.46;

/// Power at one frequency
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpectrumSample {
    /// Frequency in Hz
    pub frequency: f32,
    /// Normalized power (|X[k]|^2 / L^2)
    pub power: f32,
}

/// Power spectrum ordered by ascending frequency.
///
/// Covers the full transform length, bins past Nyquist included. An empty
/// spectrum means there was not enough data yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    samples: Vec<SpectrumSample>,
}

impl Spectrum {
    pub fn new(samples: Vec<SpectrumSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[SpectrumSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpectrumSample> {
        self.samples.iter()
    }

    /// Frequency axis
    pub fn frequencies(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.frequency).collect()
    }

    /// Power values in frequency order
    pub fn powers(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.power).collect()
    }
}

impl<'a> IntoIterator for &'a Spectrum {
    type Item = &'a SpectrumSample;
    type IntoIter = std::slice::Iter<'a, SpectrumSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Hamming window coefficients for a window of `len` samples
pub fn hamming_window(len: usize) -> Vec<f32> {
    match len {
        0 => Vec::new(),
        1 => vec![SINGLE_SAMPLE_WINDOW],
        _ => {
            let denominator = (len - 1) as f32;
            (0..len)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / denominator).cos())
                .collect()
        }
    }
}

/// Window, transform and normalize `samples` in one shot.
///
/// The transform length equals `samples.len()`; no zero padding is applied.
pub fn power_spectrum(samples: &[f32], sample_rate: u32) -> Spectrum {
    if samples.is_empty() {
        return Spectrum::default();
    }
    let fft = FftPlanner::new().plan_fft_forward(samples.len());
    compute(samples, sample_rate, &*fft)
}

/// `fft` must be planned for `samples.len()`
fn compute(samples: &[f32], sample_rate: u32, fft: &dyn Fft<f32>) -> Spectrum {
    let len = samples.len();
    if len == 0 {
        return Spectrum::default();
    }

    let window = hamming_window(len);
    let mut fft_buffer: Vec<Complex<f32>> = samples
        .iter()
        .zip(&window)
        .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
        .collect();

    fft.process(&mut fft_buffer);

    let scale = (len as f32) * (len as f32);
    let bin_width = sample_rate as f32 / len as f32;

    let samples = fft_buffer
        .iter()
        .enumerate()
        .map(|(k, c)| SpectrumSample {
            frequency: k as f32 * bin_width,
            power: c.norm_sqr() / scale,
        })
        .collect();

    Spectrum::new(samples)
}

/// Streaming spectrum analyzer.
///
/// Pulls frames from an upstream [`SampleSource`] into a bounded sliding
/// window and computes the power spectrum of that window on demand. All
/// methods take `&self`, so one analyzer can be shared through an `Arc`
/// between a producer thread calling [`stream_chunk`](Self::stream_chunk)
/// and a consumer polling [`compute_spectrum`](Self::compute_spectrum).
pub struct SpectralAnalyzer<S> {
    sample_rate: u32,
    source: Mutex<S>,
    buffer: SlidingSampleBuffer,
    exhausted: AtomicBool,
    /// Last plan used; the transform length changes while the window fills
    fft: Mutex<Option<Arc<dyn Fft<f32>>>>,
}

impl<S: SampleSource> SpectralAnalyzer<S> {
    /// Create an analyzer reading from `source`
    pub fn new(source: S, config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "Created spectral analyzer"
        );

        Ok(Self {
            sample_rate: config.sample_rate,
            source: Mutex::new(source),
            buffer: SlidingSampleBuffer::new(config.buffer_size),
            exhausted: AtomicBool::new(false),
            fft: Mutex::new(None),
        })
    }

    /// Pull one chunk from the source into the sliding window.
    ///
    /// Returns the number of frames accepted and whether the source may
    /// produce more. Once the source reports the end of the stream nothing
    /// more is ingested and every later call returns `(0, false)`.
    pub fn stream_chunk(&self, frames: &mut [Frame]) -> (usize, bool) {
        if self.is_exhausted() {
            return (0, false);
        }

        // The source lock is held across a possibly blocking read; the
        // buffer has its own lock so spectrum reads are not held up.
        let (count, more) = self.source.lock().read(frames);
        if !more {
            debug!("Sample source exhausted");
            self.exhausted.store(true, Ordering::Release);
            return (0, false);
        }

        let count = count.min(frames.len());
        self.buffer.ingest_frames(&frames[..count]);
        trace!(count, "Ingested chunk");
        (count, true)
    }

    /// True once the source has reported the end of the stream
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    /// Power spectrum of the current window.
    ///
    /// Empty when no samples have been ingested yet.
    pub fn compute_spectrum(&self) -> Spectrum {
        let snapshot = self.buffer.snapshot();
        if snapshot.is_empty() {
            return Spectrum::default();
        }

        let fft = self.plan(snapshot.len());
        compute(&snapshot, self.sample_rate, &*fft)
    }

    fn plan(&self, len: usize) -> Arc<dyn Fft<f32>> {
        let mut cached = self.fft.lock();
        match cached.as_ref() {
            Some(fft) if fft.len() == len => Arc::clone(fft),
            _ => {
                trace!(len, "Planning FFT");
                let fft = FftPlanner::new().plan_fft_forward(len);
                *cached = Some(Arc::clone(&fft));
                fft
            }
        }
    }

    /// Snapshot of the buffered samples, oldest first
    pub fn buffer(&self) -> Vec<f32> {
        self.buffer.snapshot()
    }

    /// Number of samples currently in the window
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sliding window capacity in samples
    pub fn buffer_size(&self) -> usize {
        self.buffer.capacity()
    }

    /// Lock the upstream source.
    ///
    /// [`stream_chunk`](Self::stream_chunk) waits while the guard is held.
    pub fn source(&self) -> MutexGuard<'_, S> {
        self.source.lock()
    }

    /// Give the source back, dropping the buffered samples
    pub fn into_source(self) -> S {
        self.source.into_inner()
    }
}

/// Shared analyzer handle for producer/consumer threads
pub type SharedAnalyzer<S> = Arc<SpectralAnalyzer<S>>;
