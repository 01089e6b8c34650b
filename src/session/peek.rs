use std::time::{Duration, Instant};

pub const DEFAULT_PEEK_WINDOW: Duration = Duration::from_millis(1500);

/// Temporary reveal of the reference text. Each peek rearms the deadline,
/// replacing the previous one.
#[derive(Clone, Debug)]
pub struct PeekReveal {
    window: Duration,
    until: Option<Instant>,
}

impl PeekReveal {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn arm(&mut self, now: Instant) {
        self.until = Some(now + self.window);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Drop an elapsed deadline. Returns true if the reveal just ended.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for PeekReveal {
    fn default() -> Self {
        Self::new(DEFAULT_PEEK_WINDOW)
    }
}
