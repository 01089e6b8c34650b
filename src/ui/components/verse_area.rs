use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::catalog::{Catalog, Language};
use crate::session::GameSession;
use crate::ui::theme::{Theme, ThemeColors};

/// The practice panel: reference, hidden or peeked text, and the attempt.
pub struct VerseArea<'a> {
    session: &'a GameSession,
    catalog: &'a Catalog,
    language: Language,
    now: Instant,
    theme: &'a Theme,
}

impl<'a> VerseArea<'a> {
    pub fn new(
        session: &'a GameSession,
        catalog: &'a Catalog,
        language: Language,
        now: Instant,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            catalog,
            language,
            now,
            theme,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum WordState {
    Unchecked,
    Correct,
    Wrong,
}

/// Split the attempt into words tagged with their last check result.
/// Words past the end of the reference count as wrong.
fn tag_words<'s>(input: &'s str, marks: Option<&[bool]>) -> Vec<(&'s str, WordState)> {
    input
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            let state = match marks {
                None => WordState::Unchecked,
                Some(marks) if marks.get(i).copied().unwrap_or(false) => WordState::Correct,
                Some(_) => WordState::Wrong,
            };
            (word, state)
        })
        .collect()
}

/// Hide every non-space character of `text`.
fn mask(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' { ' ' } else { '_' })
        .collect()
}

fn word_style(state: &WordState, colors: &ThemeColors) -> Style {
    match state {
        WordState::Unchecked => Style::default().fg(colors.fg()),
        WordState::Correct => Style::default().fg(colors.text_correct()),
        WordState::Wrong => Style::default()
            .fg(colors.text_incorrect())
            .add_modifier(Modifier::UNDERLINED),
    }
}

impl Widget for VerseArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let verse = self.session.verse();
        let (index, total) = self.catalog.position_in_group(verse);

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    verse.reference(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {index}/{total}"),
                    Style::default().fg(colors.text_pending()),
                ),
            ]),
            Line::from(Span::styled(
                verse.breadcrumb(),
                Style::default().fg(colors.text_pending()),
            )),
            Line::from(""),
        ];

        let text = verse.text(self.language);
        if self.session.is_revealed(self.now) {
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(colors.text_reveal()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                mask(text),
                Style::default().fg(colors.accent_dim()),
            )));
        }
        lines.push(Line::from(""));

        let marks = self
            .session
            .accuracy()
            .map(|_| self.session.word_marks(self.language));
        let mut spans = vec![Span::styled("> ", Style::default().fg(colors.accent()))];
        for (i, (word, state)) in tag_words(self.session.input(), marks.as_deref())
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(word, word_style(&state, colors)));
        }
        spans.push(Span::styled(
            "\u{2588}",
            Style::default().fg(colors.text_pending()),
        ));
        lines.push(Line::from(spans));

        let border = if self.session.is_completed() {
            colors.completed()
        } else {
            colors.border_focused()
        };
        let block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
