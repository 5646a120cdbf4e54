//! Terminal input for the app loop: key presses plus a paced frame signal.
//!
//! Screen views do not come through here. The app waits on the open
//! screen's receiver directly and only draws on `Frame`, so bursts of view
//! changes collapse into one redraw.

use std::time::Duration;

use crossterm::event::{Event as TerminalEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The terminal was resized; the next frame has to be drawn.
    Resize,
    /// Draw now if anything changed.
    Frame,
}

/// Keep key presses and resizes. Releases, repeats, mouse, focus and paste
/// events mean nothing to the screens.
pub fn translate(event: TerminalEvent) -> Option<Event> {
    match event {
        TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        TerminalEvent::Resize(..) => Some(Event::Resize),
        _ => None,
    }
}

/// Background reader of terminal input. Dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn spawn(frame_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_terminal(tx, frame_rate, cancel.clone()));
        Self { rx, cancel }
    }

    /// Next event; `None` once the reader stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_terminal(
    tx: mpsc::UnboundedSender<Event>,
    frame_rate: Duration,
    cancel: CancellationToken,
) {
    let mut input = EventStream::new();
    let mut frames = tokio::time::interval(frame_rate);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = frames.tick() => Event::Frame,
            raw = input.next() => match raw {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input error");
                    continue;
                }
                None => break,
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("terminal reader stopped");
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn presses_and_resizes_are_kept() {
        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(translate(TerminalEvent::Key(press)), Some(Event::Key(press)));
        assert_eq!(translate(TerminalEvent::Resize(120, 40)), Some(Event::Resize));
    }

    #[test]
    fn other_terminal_events_are_dropped() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(translate(TerminalEvent::Key(release)), None);
        assert_eq!(translate(TerminalEvent::FocusGained), None);
        assert_eq!(translate(TerminalEvent::Paste("x".into())), None);
    }
}
