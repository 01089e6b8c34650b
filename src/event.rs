use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Tick,
    /// Terminal was resized; the next frame redraws at the new size.
    Redraw,
}

/// Terminal events read on a background thread. A `Tick` is sent whenever
/// `tick_rate` passes without input, which drives the peek deadline.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let app_event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) => AppEvent::Key(key),
                        Ok(Event::Paste(text)) => AppEvent::Paste(text),
                        Ok(Event::Resize(_, _)) => AppEvent::Redraw,
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::warn!("terminal read failed: {e}");
                            return;
                        }
                    },
                    Ok(false) => AppEvent::Tick,
                    Err(e) => {
                        tracing::warn!("terminal poll failed: {e}");
                        return;
                    }
                };
                if tx.send(app_event).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
