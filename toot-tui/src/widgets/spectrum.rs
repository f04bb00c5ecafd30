//! Spectrum widget - one horizontal bar per display bin

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::theme::Theme;

/// Characters for horizontal bar rendering (8 levels per cell)
const BAR_CHARS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// Width reserved for the frequency label column
const LABEL_WIDTH: u16 = 13;

/// Frequency span of one bin, formatted for the label column
pub struct BinLabel;

impl BinLabel {
    pub fn format(range: Option<(f32, f32)>) -> String {
        match range {
            Some((low, high)) => format!("{:>5.0}-{:<5.0}Hz", low, high),
            None => format!("{:>11}", "-"),
        }
    }
}

/// Widget for displaying binned spectrum levels
pub struct SpectrumWidget<'a> {
    levels: &'a [f32],
    labels: Option<&'a [String]>,
    theme: &'a Theme,
}

impl<'a> SpectrumWidget<'a> {
    /// `levels` are drawn clamped to 0.0 - 1.0
    pub fn new(levels: &'a [f32], theme: &'a Theme) -> Self {
        Self {
            levels,
            labels: None,
            theme,
        }
    }

    pub fn labels(mut self, labels: &'a [String]) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Bar of `width` cells filled to `level`, in eighths of a cell
    fn render_bar(level: f32, width: u16) -> String {
        let total_levels = (level.clamp(0.0, 1.0) * 8.0 * width as f32) as usize;
        let full_blocks = total_levels / 8;
        let partial = total_levels % 8;

        let mut bar = String::with_capacity(width as usize * 3);
        for cell in 0..width as usize {
            let c = if cell < full_blocks {
                '█'
            } else if cell == full_blocks && partial > 0 {
                BAR_CHARS[partial]
            } else {
                ' '
            };
            bar.push(c);
        }
        bar
    }
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" SPECTRUM ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width < 4 {
            return;
        }

        let label_width = if self.labels.is_some() && inner.width > LABEL_WIDTH * 2 {
            LABEL_WIDTH
        } else {
            0
        };
        let bar_width = inner.width - label_width;
        let total = self.levels.len();

        // Lowest bin on top, like reading a frequency axis downwards
        for (bin, &level) in self.levels.iter().enumerate().take(inner.height as usize) {
            let y = inner.y + bin as u16;

            if label_width > 0 {
                if let Some(label) = self.labels.and_then(|labels| labels.get(bin)) {
                    buf.set_stringn(inner.x, y, label, label_width as usize, self.theme.dim());
                }
            }

            let bar = Self::render_bar(level, bar_width);
            buf.set_string(inner.x + label_width, y, bar, self.theme.bar_style(bin, total));

            // Tip of the bar colored by level
            let filled = (level.clamp(0.0, 1.0) * bar_width as f32) as u16;
            if filled > 0 {
                let x = inner.x + label_width + filled.min(bar_width) - 1;
                buf[(x, y)].set_style(self.theme.level_style(level));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_levels() {
        assert_eq!(SpectrumWidget::render_bar(0.0, 4), "    ");
        assert_eq!(SpectrumWidget::render_bar(1.0, 4), "████");
        assert_eq!(SpectrumWidget::render_bar(0.5, 4), "██  ");
        // 0.3 * 32 = 9.6 eighths -> one full cell and one eighth
        assert_eq!(SpectrumWidget::render_bar(0.3, 4), "█▏  ");
    }

    #[test]
    fn test_render_bar_clamps() {
        assert_eq!(SpectrumWidget::render_bar(7.5, 3), "███");
        assert_eq!(SpectrumWidget::render_bar(-1.0, 3), "   ");
    }

    #[test]
    fn test_label_format() {
        assert_eq!(BinLabel::format(Some((100.0, 250.0))), "  100-250  Hz");
        assert_eq!(BinLabel::format(None).trim(), "-");
    }

    #[test]
    fn test_render_into_buffer() {
        let theme = Theme::default();
        let levels = [1.0, 0.0];
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);

        SpectrumWidget::new(&levels, &theme).render(area, &mut buf);

        // Inside the border: first row full, second row empty
        assert_eq!(buf[(1, 1)].symbol(), "█");
        assert_eq!(buf[(10, 1)].symbol(), "█");
        assert_eq!(buf[(1, 2)].symbol(), " ");
    }
}
