//! Simple configuration persistence for toot
//!
//! Stores capture and display settings as `key=value` lines.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

/// Longest analysis window accepted from the config file
pub const MAX_BUFFER_SECONDS: f32 = 10.0;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Substring of the input device name; empty selects the default device
    pub device: String,
    /// Analysis window length as a fraction of a second
    pub buffer_seconds: f32,
    /// Exclusive lower bound of the displayed range in Hz
    pub lower_hz: f32,
    /// Inclusive upper bound of the displayed range in Hz
    pub upper_hz: f32,
    /// Number of display bins
    pub bins: usize,
    /// Spectrum polling interval in milliseconds
    pub poll_ms: u64,
    /// Frames pulled from the device per read
    pub chunk_frames: usize,
    /// Theme name
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: String::new(),
            buffer_seconds: 0.25,
            lower_hz: 100.0,
            upper_hz: 4000.0,
            bins: 12,
            poll_ms: 50,
            chunk_frames: 128,
            theme: "phosphor-green".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.serialize())
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toot")
            .join("config.txt")
    }

    /// Buffer capacity in samples for a device running at `sample_rate`.
    ///
    /// `buffer_seconds` is clamped to `0..=MAX_BUFFER_SECONDS`; NaN counts as zero.
    pub fn buffer_size(&self, sample_rate: u32) -> usize {
        let seconds = if self.buffer_seconds.is_nan() {
            0.0
        } else {
            self.buffer_seconds.clamp(0.0, MAX_BUFFER_SECONDS)
        };
        (sample_rate as f32 * seconds) as usize
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "device" => config.device = value.to_string(),
                "theme" => config.theme = value.to_string(),
                "buffer_seconds" => {
                    parse_checked(key, value, &mut config.buffer_seconds, |s: &f32| {
                        s.is_finite() && (0.0..=MAX_BUFFER_SECONDS).contains(s)
                    })
                }
                "lower_hz" => parse_into(key, value, &mut config.lower_hz),
                "upper_hz" => parse_into(key, value, &mut config.upper_hz),
                "bins" => parse_into(key, value, &mut config.bins),
                "poll_ms" => parse_into(key, value, &mut config.poll_ms),
                "chunk_frames" => parse_into(key, value, &mut config.chunk_frames),
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let lines = [
            "# toot configuration".to_string(),
            format!("device={}", self.device),
            format!("buffer_seconds={}", self.buffer_seconds),
            format!("lower_hz={}", self.lower_hz),
            format!("upper_hz={}", self.upper_hz),
            format!("bins={}", self.bins),
            format!("poll_ms={}", self.poll_ms),
            format!("chunk_frames={}", self.chunk_frames),
            format!("theme={}", self.theme),
        ];
        lines.join("\n")
    }
}

/// Keep the current value when `value` does not parse
fn parse_into<T: FromStr>(key: &str, value: &str, target: &mut T) {
    parse_checked(key, value, target, |_| true);
}

/// Keep the current value when `value` does not parse or fails `accept`
fn parse_checked<T: FromStr>(
    key: &str,
    value: &str,
    target: &mut T,
    accept: impl Fn(&T) -> bool,
) {
    match value.parse() {
        Ok(parsed) if accept(&parsed) => *target = parsed,
        _ => warn!("Ignoring invalid value {:?} for {}", value, key.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse(""), Config::default());
    }

    #[test]
    fn test_parse_values() {
        let config = Config::parse("device=USB\nbins=8\nlower_hz = 50\nupper_hz=8000.5\npoll_ms=20");
        assert_eq!(config.device, "USB");
        assert_eq!(config.bins, 8);
        assert_eq!(config.lower_hz, 50.0);
        assert_eq!(config.upper_hz, 8000.5);
        assert_eq!(config.poll_ms, 20);
        assert_eq!(config.chunk_frames, 128);
    }

    #[test]
    fn test_parse_with_comments_and_junk() {
        let content = "# Comment\nbins=lots\nnot a pair\ncolor=blue\ntheme=amber";
        let config = Config::parse(content);
        assert_eq!(config.bins, 12);
        assert_eq!(config.theme, "amber");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            device: "Built-in Microphone".to_string(),
            buffer_seconds: 0.5,
            bins: 16,
            ..Config::default()
        };
        assert_eq!(Config::parse(&config.serialize()), config);
    }

    #[test]
    fn test_buffer_size() {
        let config = Config::default();
        assert_eq!(config.buffer_size(48000), 12000);

        let negative = Config {
            buffer_seconds: -1.0,
            ..Config::default()
        };
        assert_eq!(negative.buffer_size(48000), 0);
    }

    #[test]
    fn test_parse_rejects_unbounded_buffer_seconds() {
        for value in ["inf", "-inf", "NaN", "1e30", "-0.5"] {
            let config = Config::parse(&format!("buffer_seconds={}", value));
            assert_eq!(config.buffer_seconds, 0.25, "accepted {}", value);
        }
        assert_eq!(Config::parse("buffer_seconds=2.5").buffer_seconds, 2.5);
    }

    #[test]
    fn test_buffer_size_is_bounded() {
        for seconds in [f32::INFINITY, f32::MAX, f32::NAN] {
            let config = Config {
                buffer_seconds: seconds,
                ..Config::default()
            };
            let size = config.buffer_size(48000);
            assert!(size <= 480_000, "{} seconds gave {} samples", seconds, size);
        }
    }
}
