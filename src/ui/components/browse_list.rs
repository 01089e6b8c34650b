use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct BrowseItem {
    pub label: String,
    pub detail: String,
    pub favorite: bool,
    pub completed: bool,
}

impl BrowseItem {
    pub fn group(label: &str) -> Self {
        Self {
            label: label.to_string(),
            detail: String::new(),
            favorite: false,
            completed: false,
        }
    }
}

/// The drill-down list: group labels, or verses with their markers.
pub struct BrowseList<'a> {
    pub title: String,
    pub items: Vec<BrowseItem>,
    pub selected: usize,
    pub empty_message: &'a str,
    pub theme: &'a Theme,
}

/// First visible row so that `selected` stays on screen.
fn scroll_offset(selected: usize, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    selected.saturating_sub(rows - 1)
}

impl Widget for &BrowseList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                self.empty_message,
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let rows = inner.height as usize;
        let offset = scroll_offset(self.selected, rows);
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let label_style = Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });

                let mut spans = vec![Span::styled(
                    format!(" {indicator} {}", item.label),
                    label_style,
                )];
                if !item.detail.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", item.detail),
                        Style::default().fg(colors.text_pending()),
                    ));
                }
                if item.favorite {
                    spans.push(Span::styled(" \u{2605}", Style::default().fg(colors.favorite())));
                }
                if item.completed {
                    spans.push(Span::styled(" \u{2713}", Style::default().fg(colors.completed())));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
