use std::time::{Duration, Instant};

use thiserror::Error;

use crate::catalog::{Language, Verse, VerseId};
use crate::engine::scoring;
use crate::session::peek::PeekReveal;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no verses match the current scope")]
    EmptyPool,
    #[error("no practice session is active")]
    NoActiveSession,
    #[error("unknown verse {0}")]
    UnknownVerse(VerseId),
}

/// One practice round on a single verse. Dropping it returns to idle.
#[derive(Clone, Debug)]
pub struct GameSession {
    verse: Verse,
    input: String,
    accuracy: Option<u8>,
    peek_count: u32,
    check_count: u32,
    completed: bool,
    reveal: PeekReveal,
}

impl GameSession {
    pub fn new(verse: Verse, peek_window: Duration) -> Self {
        Self {
            verse,
            input: String::new(),
            accuracy: None,
            peek_count: 0,
            check_count: 0,
            completed: false,
            reveal: PeekReveal::new(peek_window),
        }
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn accuracy(&self) -> Option<u8> {
        self.accuracy
    }

    pub fn peek_count(&self) -> u32 {
        self.peek_count
    }

    pub fn check_count(&self) -> u32 {
        self.check_count
    }

    /// Set once a check scores 100. Does not touch saved progress.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn peek(&mut self, now: Instant) {
        self.peek_count += 1;
        self.reveal.arm(now);
    }

    pub fn is_revealed(&self, now: Instant) -> bool {
        self.reveal.is_visible(now)
    }

    pub fn expire_reveal(&mut self, now: Instant) -> bool {
        self.reveal.expire(now)
    }

    /// Score the current input against the verse text in `language`.
    pub fn check(&mut self, language: Language) -> u8 {
        let accuracy = scoring::score_verse(&self.verse, &self.input, language);
        self.accuracy = Some(accuracy);
        self.check_count += 1;
        if accuracy == 100 {
            self.completed = true;
        }
        accuracy
    }

    /// Per-word match flags of the current input, for highlighting.
    pub fn word_marks(&self, language: Language) -> Vec<bool> {
        scoring::word_marks(self.verse.text(language), &self.input)
    }
}
