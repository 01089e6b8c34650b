use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::App;
use crate::catalog::Language;
use crate::store::ProgressKind;
use crate::ui::theme::Theme;

/// Side panel with saved progress, the training scope and round counters.
pub struct ProgressSidebar<'a> {
    app: &'a App,
    theme: &'a Theme,
}

impl<'a> ProgressSidebar<'a> {
    pub fn new(app: &'a App, theme: &'a Theme) -> Self {
        Self { app, theme }
    }
}

struct Labels {
    title: &'static str,
    memorized: &'static str,
    favorites: &'static str,
    scope: &'static str,
    peeks: &'static str,
    checks: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Korean => Labels {
            title: "진행 상황",
            memorized: "암송완료",
            favorites: "즐겨찾기",
            scope: "범위",
            peeks: "힌트",
            checks: "확인",
        },
        Language::English => Labels {
            title: "Progress",
            memorized: "Memorized",
            favorites: "Favorites",
            scope: "Scope",
            peeks: "Peeks",
            checks: "Checks",
        },
    }
}

impl Widget for ProgressSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let text = labels(self.app.language);
        let total = self.app.catalog.len();

        let label_style = Style::default().fg(colors.text_pending());
        let value_style = Style::default()
            .fg(colors.fg())
            .add_modifier(Modifier::BOLD);

        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {label}: "), label_style),
                Span::styled(value, value_style),
            ])
        };

        let completed = self.app.progress.ids(ProgressKind::Completed).len();
        let favorites = self.app.progress.ids(ProgressKind::Favorites).len();
        let mut lines = vec![
            row(text.memorized, format!("{completed}/{total}")),
            row(text.favorites, favorites.to_string()),
            row(text.scope, self.app.scope_summary()),
        ];

        if let Some(ref session) = self.app.session {
            lines.push(Line::from(""));
            lines.push(row(text.peeks, session.peek_count().to_string()));
            lines.push(row(text.checks, session.check_count().to_string()));
        }

        let block = Block::bordered()
            .title(format!(" {} ", text.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
