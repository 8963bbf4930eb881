//! Streaming reveal of an already-complete response.
//!
//! The backend returns a review in one piece; the client reveals it one
//! character at a time to read like live generation. Two layers:
//!
//! - `Reveal`: a pure, timer-free cursor over the target text.
//! - `Revealer`: drives a `Reveal` from a tokio task and publishes frames on
//!   a watch channel. Starting a new reveal cancels the previous task before
//!   anything else happens, and every frame is stamped with a generation so
//!   a tick from a superseded task can never land on newer content.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Per-character delay bounds, scaled by text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    /// Characters per millisecond of delay
    pub divisor: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            divisor: 150,
            min_delay_ms: 5,
            max_delay_ms: 20,
        }
    }
}

impl RevealTiming {
    /// `clamp(chars / divisor, min, max)` milliseconds. Longer texts tick
    /// slower per character but the bound keeps them from crawling.
    pub fn delay_for(&self, text: &str) -> Duration {
        let chars = text.chars().count() as u64;
        let scaled = if self.divisor == 0 {
            self.max_delay_ms
        } else {
            chars / self.divisor
        };
        let ms = scaled.min(self.max_delay_ms).max(self.min_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Cursor revealing `target` one character at a time.
#[derive(Debug, Clone)]
pub struct Reveal {
    target: Arc<str>,
    shown: usize,
}

impl Reveal {
    pub fn new(target: impl Into<Arc<str>>) -> Self {
        Self {
            target: target.into(),
            shown: 0,
        }
    }

    /// Reveal the next character. Returns false once nothing is left.
    pub fn step(&mut self) -> bool {
        match self.target[self.shown..].chars().next() {
            Some(c) => {
                self.shown += c.len_utf8();
                true
            }
            None => false,
        }
    }

    pub fn displayed(&self) -> &str {
        &self.target[..self.shown]
    }

    /// Byte length of the revealed prefix (always a char boundary)
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.target.len()
    }
}

/// One published state of the reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    pub generation: u64,
    text: Arc<str>,
    shown: usize,
    pub complete: bool,
}

impl RevealFrame {
    fn empty(generation: u64) -> Self {
        Self {
            generation,
            text: Arc::from(""),
            shown: 0,
            complete: true,
        }
    }

    /// The text to display for this frame
    pub fn displayed(&self) -> &str {
        &self.text[..self.shown]
    }

    /// The full text being revealed
    pub fn target(&self) -> &str {
        &self.text
    }

    pub fn is_streaming(&self) -> bool {
        !self.complete
    }
}

struct RevealTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RevealTask {
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Timer-driven reveal with a cancellable task handle.
///
/// Must be used from within a tokio runtime.
pub struct Revealer {
    timing: RevealTiming,
    frames: watch::Sender<RevealFrame>,
    generation: u64,
    task: Option<RevealTask>,
}

impl Revealer {
    pub fn new(timing: RevealTiming) -> Self {
        let (frames, _) = watch::channel(RevealFrame::empty(0));
        Self {
            timing,
            frames,
            generation: 0,
            task: None,
        }
    }

    /// Current frame
    pub fn frame(&self) -> RevealFrame {
        self.frames.borrow().clone()
    }

    /// Receiver notified on every published frame
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.frames.subscribe()
    }

    pub fn is_streaming(&self) -> bool {
        self.frames.borrow().is_streaming()
    }

    /// Start revealing `text` from empty, cancelling any reveal in flight.
    /// Starting with the text already being revealed is a no-op; starting
    /// with an empty text resets.
    pub fn start(&mut self, text: impl Into<String>) {
        let text: String = text.into();
        if text.is_empty() {
            self.reset();
            return;
        }
        if *self.frames.borrow().target() == *text {
            return;
        }

        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let delay = self.timing.delay_for(&text);
        let text: Arc<str> = Arc::from(text);

        debug!(generation, chars = text.chars().count(), delay_ms = delay.as_millis() as u64, "Starting reveal");
        self.frames.send_replace(RevealFrame {
            generation,
            text: Arc::clone(&text),
            shown: 0,
            complete: false,
        });

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let frames = self.frames.clone();
        let handle = tokio::spawn(async move {
            let mut reveal = Reveal::new(text);
            loop {
                if token.is_cancelled() || !reveal.step() {
                    return;
                }
                let complete = reveal.is_complete();
                let shown = reveal.shown();
                let published = frames.send_if_modified(|frame| {
                    if frame.generation != generation {
                        return false;
                    }
                    frame.shown = shown;
                    frame.complete = complete;
                    true
                });
                if !published || complete {
                    return;
                }
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        });

        self.task = Some(RevealTask { cancel, handle });
    }

    /// Show the rest of the current text at once.
    pub fn finish(&mut self) {
        self.cancel();
        self.frames.send_if_modified(|frame| {
            if frame.complete {
                return false;
            }
            frame.shown = frame.text.len();
            frame.complete = true;
            true
        });
    }

    /// Cancel any reveal and show nothing.
    pub fn reset(&mut self) {
        self.cancel();
        self.generation += 1;
        self.frames.send_replace(RevealFrame::empty(self.generation));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.stop();
        }
    }
}

impl Drop for Revealer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_length_scaled_and_clamped() {
        let timing = RevealTiming::default();
        assert_eq!(timing.delay_for("short"), Duration::from_millis(5));
        assert_eq!(timing.delay_for(&"x".repeat(1500)), Duration::from_millis(10));
        assert_eq!(timing.delay_for(&"x".repeat(100_000)), Duration::from_millis(20));

        let no_divisor = RevealTiming { divisor: 0, ..timing };
        assert_eq!(no_divisor.delay_for("abc"), Duration::from_millis(20));
    }

    #[test]
    fn test_reveal_steps_by_char() {
        let mut reveal = Reveal::new("héllo");
        let mut seen = Vec::new();
        while reveal.step() {
            seen.push(reveal.displayed().to_string());
        }
        assert_eq!(seen, vec!["h", "hé", "hél", "héll", "héllo"]);
        assert!(reveal.is_complete());
        assert!(!reveal.step());
    }

    #[test]
    fn test_reveal_empty_is_complete() {
        let mut reveal = Reveal::new("");
        assert!(reveal.is_complete());
        assert!(!reveal.step());
        assert_eq!(reveal.displayed(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_revealer_reaches_full_text() {
        let mut revealer = Revealer::new(RevealTiming::default());
        let mut rx = revealer.subscribe();
        revealer.start("Looks fine");
        assert!(revealer.is_streaming());

        let frame = rx.wait_for(|f| f.complete).await.unwrap().clone();
        assert_eq!(frame.displayed(), "Looks fine");
        assert!(!revealer.is_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revealer_finish_and_reset() {
        let mut revealer = Revealer::new(RevealTiming::default());
        revealer.start("a long enough review text");
        revealer.finish();
        assert_eq!(revealer.frame().displayed(), "a long enough review text");
        assert!(revealer.frame().complete);

        revealer.reset();
        assert_eq!(revealer.frame().displayed(), "");
        assert!(!revealer.is_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_text_does_not_restart() {
        let mut revealer = Revealer::new(RevealTiming::default());
        revealer.start("abcdef");
        tokio::time::sleep(Duration::from_millis(12)).await;
        let before = revealer.frame();
        assert!(!before.displayed().is_empty());

        revealer.start("abcdef");
        let after = revealer.frame();
        assert_eq!(before.generation, after.generation);
        assert!(after.displayed().len() >= before.displayed().len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_with_new_text_never_mixes() {
        let mut revealer = Revealer::new(RevealTiming::default());
        let mut rx = revealer.subscribe();
        revealer.start("AAAAAAAA");
        tokio::time::sleep(Duration::from_millis(12)).await;
        let partial = revealer.frame();
        assert!(!partial.displayed().is_empty());
        assert!(!partial.complete);

        revealer.start("BBBBBBBBBB");
        let restart = rx.borrow_and_update().clone();
        assert_eq!(restart.displayed(), "");
        assert!(restart.generation > partial.generation);

        loop {
            rx.changed().await.unwrap();
            let frame = rx.borrow_and_update().clone();
            assert_eq!(frame.generation, restart.generation);
            assert!(frame.displayed().chars().all(|c| c == 'B'));
            if frame.complete {
                break;
            }
        }
        assert_eq!(revealer.frame().displayed(), "BBBBBBBBBB");
    }
}
