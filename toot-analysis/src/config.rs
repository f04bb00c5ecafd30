//! Construction parameters for the analyzer and binner
//!
//! Every field is required; there are no hidden defaults in the core.

use thiserror::Error;

/// Invalid construction parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("Bin count must be at least 1")]
    InvalidBinCount,
    #[error("Frequency bounds must be numbers (got {lower}..{upper})")]
    InvalidBounds { lower: f32, upper: f32 },
}

/// Parameters for a [`SpectralAnalyzer`](crate::SpectralAnalyzer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Sliding window capacity in samples
    pub buffer_size: usize,
}

impl AnalyzerConfig {
    pub fn new(sample_rate: u32, buffer_size: usize) -> Result<Self, ConfigError> {
        let config = Self {
            sample_rate,
            buffer_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }
}

/// Parameters for a [`Binner`](crate::Binner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinnerConfig {
    /// Exclusive lower frequency bound in Hz
    pub lower_bound: f32,
    /// Inclusive upper frequency bound in Hz
    pub upper_bound: f32,
    /// Number of output bins
    pub bins: usize,
}

impl BinnerConfig {
    pub fn new(lower_bound: f32, upper_bound: f32, bins: usize) -> Result<Self, ConfigError> {
        let config = Self {
            lower_bound,
            upper_bound,
            bins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable parameters.
    ///
    /// Bounds that are inverted or beyond Nyquist are accepted; they just
    /// select fewer (or zero) spectrum entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bins == 0 {
            return Err(ConfigError::InvalidBinCount);
        }
        if self.lower_bound.is_nan() || self.upper_bound.is_nan() {
            return Err(ConfigError::InvalidBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert_eq!(AnalyzerConfig::new(0, 16), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn test_zero_capacity_allowed() {
        let config = AnalyzerConfig::new(44100, 0).unwrap();
        assert_eq!(config.buffer_size, 0);
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert_eq!(
            BinnerConfig::new(100.0, 4000.0, 0),
            Err(ConfigError::InvalidBinCount)
        );
    }

    #[test]
    fn test_inverted_bounds_allowed() {
        assert!(BinnerConfig::new(4000.0, 100.0, 12).is_ok());
    }

    #[test]
    fn test_nan_bounds_rejected() {
        assert!(matches!(
            BinnerConfig::new(f32::NAN, 100.0, 4),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }
}
