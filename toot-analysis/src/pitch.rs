//! Pitch estimate and display scaling helpers

use crate::spectrum::Spectrum;

/// Frequency of the strongest entry in `(lower, upper]`.
///
/// A crude F0 estimate; `None` when nothing falls in the range.
pub fn dominant_frequency(spectrum: &Spectrum, lower: f32, upper: f32) -> Option<f32> {
    spectrum
        .iter()
        .filter(|s| s.frequency > lower && s.frequency <= upper)
        .max_by(|a, b| a.power.total_cmp(&b.power))
        .map(|s| s.frequency)
}

/// Log scaling that makes small power values visible on a bar display.
///
/// Normalized power stays within 0..=1, so the result stays within
/// `0..=DISPLAY_FULL_SCALE` (about 30).
#[inline]
pub fn display_level(power: f32) -> f32 {
    (1.0 + power * 1000.0).log10() * 10.0
}

/// [`display_level`] of full power
pub const DISPLAY_FULL_SCALE: f32 = 30.004_34;

/// [`display_level`] mapped onto 0.0 - 1.0 for bar widgets
#[inline]
pub fn bar_level(power: f32) -> f32 {
    (display_level(power) / DISPLAY_FULL_SCALE).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::power_spectrum;
    use std::f32::consts::PI;

    #[test]
    fn test_dominant_frequency_of_tone() {
        let sample_rate = 8000;
        let samples: Vec<f32> = (0..400)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        let spectrum = power_spectrum(&samples, sample_rate);

        let f0 = dominant_frequency(&spectrum, 50.0, 4000.0).unwrap();
        // 20 Hz bins
        assert!((f0 - 440.0).abs() <= 20.0, "estimated {}", f0);
    }

    #[test]
    fn test_dominant_frequency_empty_range() {
        let spectrum = power_spectrum(&[1.0; 8], 8000);
        assert_eq!(dominant_frequency(&spectrum, 8000.0, 9000.0), None);
        assert_eq!(dominant_frequency(&Spectrum::default(), 0.0, 100.0), None);
    }

    #[test]
    fn test_display_level() {
        assert_eq!(display_level(0.0), 0.0);
        assert!((display_level(0.009) - 10.0).abs() < 1e-3);
        assert!(display_level(0.1) > display_level(0.01));
        assert!((display_level(1.0) - DISPLAY_FULL_SCALE).abs() < 1e-3);
    }

    #[test]
    fn test_bar_level_spreads_over_unit_range() {
        assert_eq!(bar_level(0.0), 0.0);
        assert!((bar_level(1.0) - 1.0).abs() < 1e-4);
        // Quiet and loud bins must not both draw full bars
        let quiet = bar_level(0.001);
        let loud = bar_level(0.1);
        assert!(quiet > 0.0 && quiet < 0.2, "quiet {}", quiet);
        assert!(loud > quiet && loud < 1.0, "loud {}", loud);
        assert_eq!(bar_level(5.0), 1.0);
    }
}
