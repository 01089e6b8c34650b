use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::catalog::NodePath;
use crate::engine::Selection;
use crate::ui::theme::Theme;

/// Checkbox tree of the training scope.
pub struct ScopeTree<'a> {
    rows: &'a [NodePath],
    selection: &'a Selection,
    selected: usize,
    title: String,
    theme: &'a Theme,
}

impl<'a> ScopeTree<'a> {
    pub fn new(
        rows: &'a [NodePath],
        selection: &'a Selection,
        selected: usize,
        title: String,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            selection,
            selected,
            title,
            theme,
        }
    }
}

fn row_text(path: &NodePath, checked: bool) -> String {
    let indent = "  ".repeat(path.depth().saturating_sub(1));
    let mark = if checked { "[x]" } else { "[ ]" };
    format!("{indent}{mark} {}", path.label().unwrap_or_default())
}

impl Widget for ScopeTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = inner.height as usize;
        let offset = self.selected.saturating_sub(rows.saturating_sub(1));
        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .map(|(i, path)| {
                let checked = self.selection.is_selected(path);
                let mut style = Style::default().fg(if checked {
                    colors.text_correct()
                } else {
                    colors.fg()
                });
                if i == self.selected {
                    style = style.bg(colors.accent_dim()).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(row_text(path, checked), style))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_indent_by_depth() {
        let path = NodePath::from_labels(["A", "S1", "X"]);
        assert_eq!(row_text(&path, true), "    [x] X");
        assert_eq!(row_text(&NodePath::from_labels(["A"]), false), "[ ] A");
    }
}
