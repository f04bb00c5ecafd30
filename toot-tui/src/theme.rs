//! CRT-style themes for toot

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text)
    pub fg: Color,
    /// Dimmed foreground (borders, hints)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (titles)
    pub highlight: Color,
    /// Accent color (mid bins, values)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error color
    pub danger: Color,
    /// Lowest frequency bins
    pub low: Color,
    /// Highest frequency bins
    pub high: Color,
}

impl Theme {
    /// Look a theme up by name, ignoring case
    pub fn by_name(name: &str) -> Option<Theme> {
        [CRT_GREEN, CRT_AMBER, CYBERPUNK]
            .into_iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for a value readout
    pub fn value(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get style for error text
    pub fn error(&self) -> Style {
        Style::default().fg(self.danger)
    }

    /// Get style for a bar by its bin index
    pub fn bar_style(&self, bin: usize, total_bins: usize) -> Style {
        // Color gradient: bass (warm) -> treble (cool)
        let ratio = bin as f32 / total_bins.max(1) as f32;
        let color = if ratio < 0.33 {
            self.low
        } else if ratio < 0.66 {
            self.accent
        } else {
            self.high
        };
        Style::default().fg(color)
    }

    /// Get style for the bar tip based on level (0.0 - 1.0)
    pub fn level_style(&self, level: f32) -> Style {
        let color = if level > 0.9 {
            self.danger
        } else if level > 0.75 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }
}

/// Classic phosphor green CRT theme
pub const CRT_GREEN: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),        // #33ff33 - phosphor green
    fg_dim: Color::Rgb(25, 128, 25),    // dimmed green
    bg: Color::Rgb(0, 10, 0),           // near black with green tint
    highlight: Color::Rgb(180, 255, 180), // bright green
    accent: Color::Rgb(100, 255, 100),  // medium green
    warning: Color::Rgb(255, 255, 100), // yellow-green
    danger: Color::Rgb(255, 100, 100),  // red warning
    low: Color::Rgb(100, 255, 150),     // green-cyan
    high: Color::Rgb(150, 255, 100),    // yellow-green
};

/// Amber CRT theme (1980s monochrome)
pub const CRT_AMBER: Theme = Theme {
    name: "amber",
    fg: Color::Rgb(255, 176, 0),        // #ffb000 - amber
    fg_dim: Color::Rgb(128, 88, 0),     // dimmed amber
    bg: Color::Rgb(10, 5, 0),           // near black with amber tint
    highlight: Color::Rgb(255, 220, 128), // bright amber
    accent: Color::Rgb(255, 200, 64),   // medium amber
    warning: Color::Rgb(255, 255, 100), // yellow
    danger: Color::Rgb(255, 100, 100),  // red warning
    low: Color::Rgb(255, 180, 50),      // orange-amber
    high: Color::Rgb(255, 220, 100),    // yellow-amber
};

/// Cyberpunk neon theme
pub const CYBERPUNK: Theme = Theme {
    name: "cyberpunk",
    fg: Color::Rgb(0, 255, 255),        // cyan
    fg_dim: Color::Rgb(0, 128, 128),    // dim cyan
    bg: Color::Rgb(5, 0, 10),           // dark purple-black
    highlight: Color::Rgb(255, 0, 255), // magenta
    accent: Color::Rgb(0, 255, 128),    // neon green
    warning: Color::Rgb(255, 255, 0),   // yellow
    danger: Color::Rgb(255, 50, 50),    // red
    low: Color::Rgb(255, 100, 255),     // pink
    high: Color::Rgb(100, 255, 255),    // light cyan
};

impl Default for Theme {
    fn default() -> Self {
        CRT_GREEN
    }
}
