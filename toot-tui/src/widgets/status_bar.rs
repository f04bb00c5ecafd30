//! Status bar widget - device, window fill, pitch estimate

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Widget for the single status line under the spectrum
pub struct StatusBarWidget<'a> {
    device: &'a str,
    sample_rate: u32,
    buffered: usize,
    capacity: usize,
    pitch: Option<f32>,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(device: &'a str, sample_rate: u32, theme: &'a Theme) -> Self {
        Self {
            device,
            sample_rate,
            buffered: 0,
            capacity: 0,
            pitch: None,
            error: None,
            theme,
        }
    }

    /// Samples currently in the analysis window out of its capacity
    pub fn window(mut self, buffered: usize, capacity: usize) -> Self {
        self.buffered = buffered;
        self.capacity = capacity;
        self
    }

    pub fn pitch(mut self, pitch: Option<f32>) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    fn fill_percent(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        ((self.buffered as f64 / self.capacity as f64) * 100.0).round() as u32
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Min(20),    // Device and format
            Constraint::Length(24), // Pitch / window
            Constraint::Length(24), // Help hint
        ])
        .split(area);

        let device = Line::from(vec![
            Span::styled(self.device, self.theme.normal()),
            Span::styled(format!(" @ {} Hz", self.sample_rate), self.theme.dim()),
        ]);
        Paragraph::new(device).render(chunks[0], buf);

        let readout = if let Some(error) = self.error {
            Line::from(Span::styled(error, self.theme.error()))
        } else {
            let pitch = match self.pitch {
                Some(f) => format!("F0 {:>6.1} Hz", f),
                None => "F0      - Hz".to_string(),
            };
            Line::from(vec![
                Span::styled(pitch, self.theme.value()),
                Span::styled(format!("  {:>3}%", self.fill_percent()), self.theme.dim()),
            ])
        };
        Paragraph::new(readout).render(chunks[1], buf);

        let help = Line::from(Span::styled("Press any key to quit", self.theme.dim()));
        Paragraph::new(help).render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_percent() {
        let theme = Theme::default();
        let status = StatusBarWidget::new("mic", 48000, &theme).window(6000, 12000);
        assert_eq!(status.fill_percent(), 50);

        let empty = StatusBarWidget::new("mic", 48000, &theme).window(0, 0);
        assert_eq!(empty.fill_percent(), 0);
    }
}
