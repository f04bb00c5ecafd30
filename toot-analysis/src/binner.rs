//! Condense a power spectrum into a few display bins
//!
//! Groups grow with the bin index using triangle-number weights, which gives
//! low frequencies more resolution without true log spacing.

use tracing::trace;

use crate::config::{BinnerConfig, ConfigError};
use crate::spectrum::{Spectrum, SpectrumSample};

/// Sums spectrum power over a frequency range into a fixed number of bins
#[derive(Debug, Clone)]
pub struct Binner {
    lower_bound: f32,
    upper_bound: f32,
    bins: usize,
}

impl Binner {
    /// Bin frequencies in `(lower_bound, upper_bound]` into `bins` groups
    pub fn new(lower_bound: f32, upper_bound: f32, bins: usize) -> Result<Self, ConfigError> {
        Self::from_config(BinnerConfig::new(lower_bound, upper_bound, bins)?)
    }

    pub fn from_config(config: BinnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lower_bound: config.lower_bound,
            upper_bound: config.upper_bound,
            bins: config.bins,
        })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.lower_bound, self.upper_bound)
    }

    /// Entries with `lower_bound < frequency <= upper_bound`.
    ///
    /// Relies on the spectrum being sorted by frequency.
    pub fn restrict<'a>(&self, spectrum: &'a Spectrum) -> &'a [SpectrumSample] {
        let samples = spectrum.as_slice();
        let start = samples.partition_point(|s| s.frequency <= self.lower_bound);
        let samples = &samples[start..];
        let end = samples.partition_point(|s| s.frequency <= self.upper_bound);
        &samples[..end]
    }

    /// Number of spectrum entries each bin sums for `len` in-range entries.
    ///
    /// Bin `i` takes `floor(len * (i + 1) / T)` entries with
    /// `T = bins * (bins + 1) / 2`; the last bin also takes whatever the
    /// truncation left over, so the sizes always add up to `len`.
    pub fn group_sizes(&self, len: usize) -> Vec<usize> {
        let triangle = self.bins * (self.bins + 1) / 2;
        let mut sizes = Vec::with_capacity(self.bins);
        let mut taken = 0;

        for i in 0..self.bins - 1 {
            let size = len * (i + 1) / triangle;
            sizes.push(size);
            taken += size;
        }
        sizes.push(len - taken);

        sizes
    }

    /// First and last frequency covered by each bin, `None` for empty groups
    pub fn group_ranges(&self, spectrum: &Spectrum) -> Vec<Option<(f32, f32)>> {
        let in_range = self.restrict(spectrum);
        let mut offset = 0;

        self.group_sizes(in_range.len())
            .into_iter()
            .map(|size| {
                let group = &in_range[offset..offset + size];
                offset += size;
                Some((group.first()?.frequency, group.last()?.frequency))
            })
            .collect()
    }

    /// Sum the power of each group; always returns `bins` values
    pub fn bin(&self, spectrum: &Spectrum) -> Vec<f32> {
        let in_range = self.restrict(spectrum);
        let mut result = vec![0.0; self.bins];
        if in_range.is_empty() {
            return result;
        }

        let mut offset = 0;
        for (value, size) in result.iter_mut().zip(self.group_sizes(in_range.len())) {
            *value = in_range[offset..offset + size]
                .iter()
                .map(|s| s.power)
                .sum();
            offset += size;
        }

        trace!(entries = in_range.len(), bins = self.bins, "Binned spectrum");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spectrum with entries at 0, step, 2*step, ... and the given powers
    fn spectrum(step: f32, powers: &[f32]) -> Spectrum {
        Spectrum::new(
            powers
                .iter()
                .enumerate()
                .map(|(k, &power)| SpectrumSample {
                    frequency: k as f32 * step,
                    power,
                })
                .collect(),
        )
    }

    #[test]
    fn test_group_sizes_three_bins() {
        let binner = Binner::new(0.0, 1000.0, 3).unwrap();
        let sizes = binner.group_sizes(12);
        assert_eq!(sizes, vec![2, 4, 6]);

        let cumulative: Vec<usize> = sizes
            .iter()
            .scan(0, |acc, &s| {
                *acc += s;
                Some(*acc)
            })
            .collect();
        assert_eq!(cumulative, vec![2, 6, 12]);
    }

    #[test]
    fn test_group_sizes_remainder_goes_last() {
        let binner = Binner::new(0.0, 1000.0, 4).unwrap();
        // T = 10: floor(7/10), floor(14/10), floor(21/10), then the rest
        assert_eq!(binner.group_sizes(7), vec![0, 1, 2, 4]);
        assert_eq!(binner.group_sizes(0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_single_bin_takes_everything() {
        let binner = Binner::new(0.0, 1000.0, 1).unwrap();
        let s = spectrum(100.0, &[1.0, 2.0, 3.0, 4.0]);
        // 0 Hz is excluded by the exclusive lower bound
        assert_eq!(binner.bin(&s), vec![9.0]);
    }

    #[test]
    fn test_bounds_lower_exclusive_upper_inclusive() {
        let binner = Binner::new(100.0, 300.0, 1).unwrap();
        let s = spectrum(100.0, &[1.0, 10.0, 100.0, 1000.0, 10000.0]);

        let freqs: Vec<f32> = binner.restrict(&s).iter().map(|e| e.frequency).collect();
        assert_eq!(freqs, vec![200.0, 300.0]);
        assert_eq!(binner.bin(&s), vec![1100.0]);
    }

    #[test]
    fn test_always_returns_bin_count() {
        let binner = Binner::new(0.0, 1000.0, 5).unwrap();
        assert_eq!(binner.bin(&Spectrum::default()), vec![0.0; 5]);
        assert_eq!(binner.bin(&spectrum(100.0, &[1.0])), vec![0.0; 5]);
        assert_eq!(binner.bin(&spectrum(100.0, &[1.0, 1.0])).len(), 5);
    }

    #[test]
    fn test_out_of_range_bounds() {
        let s = spectrum(1000.0, &[1.0; 8]);

        // Above every frequency in the spectrum
        let above = Binner::new(9000.0, 20000.0, 3).unwrap();
        assert_eq!(above.bin(&s), vec![0.0; 3]);

        // Inverted
        let inverted = Binner::new(5000.0, 1000.0, 3).unwrap();
        assert!(inverted.restrict(&s).is_empty());
        assert_eq!(inverted.bin(&s), vec![0.0; 3]);

        // Upper past the end of the spectrum just clamps
        let wide = Binner::new(0.0, 1.0e9, 2).unwrap();
        assert_eq!(wide.restrict(&s).len(), 7);
    }

    #[test]
    fn test_uniform_power_is_conserved() {
        for bins in 1..=8 {
            for n in 0..40 {
                let binner = Binner::new(0.0, 1.0e6, bins).unwrap();
                // Leading 0 Hz entry falls outside the exclusive lower bound
                let s = spectrum(10.0, &vec![1.0; n + 1]);
                let total: f32 = binner.bin(&s).iter().sum();
                assert_eq!(total, n as f32, "bins={} n={}", bins, n);
            }
        }
    }

    #[test]
    fn test_group_ranges() {
        let binner = Binner::new(0.0, 120.0, 3).unwrap();
        let s = spectrum(10.0, &[0.0; 13]);
        assert_eq!(
            binner.group_ranges(&s),
            vec![Some((10.0, 20.0)), Some((30.0, 60.0)), Some((70.0, 120.0))]
        );

        let sparse = spectrum(10.0, &[0.0; 3]);
        assert_eq!(binner.group_ranges(&sparse), vec![None, None, Some((10.0, 20.0))]);
    }

    #[test]
    fn test_concentrated_power() {
        // 12 in-range entries at 10..120 Hz, groups {2, 4, 6}
        let mut powers = vec![0.0; 13];
        powers[4] = 5.0; // 40 Hz, third entry, second group
        let s = spectrum(10.0, &powers);

        let binner = Binner::new(0.0, 120.0, 3).unwrap();
        assert_eq!(binner.bin(&s), vec![0.0, 5.0, 0.0]);
    }
}
