use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Bar for the last check's accuracy; empty until the first check.
pub struct AccuracyBar<'a> {
    pub label: String,
    pub accuracy: Option<u8>,
    pub theme: &'a Theme,
}

impl<'a> AccuracyBar<'a> {
    pub fn new(label: &str, accuracy: Option<u8>, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            accuracy: accuracy.map(|a| a.min(100)),
            theme,
        }
    }
}

impl Widget for AccuracyBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let percent = self.accuracy.unwrap_or(0);
        let filled_width = (u32::from(percent) * u32::from(inner.width) / 100) as u16;
        let fill = if percent == 100 {
            colors.success()
        } else {
            colors.accent()
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.header_bg())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = match self.accuracy {
            Some(a) => format!("{a}%"),
            None => "-".to_string(),
        };
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
