//! Manually stepped frame source
//!
//! Time only moves when [`ManualFrameSource::advance`] is called, which makes
//! frame-driven code deterministic. Used by tests and headless runs.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::frame::{FrameCallback, FrameQueue, FrameSource};

struct ManualInner {
    queue: FrameQueue,
    now: Cell<f64>,
    frames: Cell<u64>,
}

/// A frame source driven by explicit calls
///
/// Cloning yields another handle to the same clock and queue.
///
/// # Example
///
/// ```rust
/// use fete_platform::{FrameSource, ManualFrameSource};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let frames = ManualFrameSource::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&fired);
/// frames.request_frame(Box::new(move |_| flag.set(true)));
///
/// frames.advance(16.0);
/// assert!(fired.get());
/// ```
#[derive(Clone)]
pub struct ManualFrameSource {
    inner: Rc<ManualInner>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Start the clock at `now_ms`
    pub fn starting_at(now_ms: f64) -> Self {
        Self {
            inner: Rc::new(ManualInner {
                queue: FrameQueue::new(),
                now: Cell::new(now_ms),
                frames: Cell::new(0),
            }),
        }
    }

    /// Move the clock forward by `dt_ms` and deliver one refresh
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, dt_ms: f64) -> usize {
        let now = self.inner.now.get() + dt_ms;
        self.inner.now.set(now);
        self.inner.frames.set(self.inner.frames.get() + 1);
        self.inner.queue.flush(now)
    }

    /// Deliver `count` refreshes spaced `dt_ms` apart
    pub fn run_frames(&self, count: u64, dt_ms: f64) -> usize {
        (0..count).map(|_| self.advance(dt_ms)).sum()
    }

    /// Callbacks waiting for the next refresh
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// Refreshes delivered so far
    pub fn frame_count(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Type-erased handle for APIs that take `Rc<dyn FrameSource>`
    pub fn shared(&self) -> Rc<dyn FrameSource> {
        Rc::new(self.clone())
    }
}

impl Default for ManualFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualFrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrameSource")
            .field("now", &self.inner.now.get())
            .field("frames", &self.inner.frames.get())
            .field("pending", &self.inner.queue.len())
            .finish()
    }
}

impl FrameSource for ManualFrameSource {
    fn now(&self) -> f64 {
        self.inner.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.inner.queue.push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_moves_clock_and_counts_frames() {
        let frames = ManualFrameSource::starting_at(100.0);
        assert_eq!(frames.now(), 100.0);

        assert_eq!(frames.advance(16.0), 0);
        assert_eq!(frames.now(), 116.0);
        assert_eq!(frames.frame_count(), 1);
    }

    #[test]
    fn test_callback_receives_frame_timestamp() {
        let frames = ManualFrameSource::new();
        let seen = Rc::new(Cell::new(-1.0));
        let sink = Rc::clone(&seen);
        frames.request_frame(Box::new(move |now| sink.set(now)));
        assert_eq!(frames.pending(), 1);

        frames.run_frames(2, 8.0);
        assert_eq!(seen.get(), 8.0);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_clones_share_clock() {
        let frames = ManualFrameSource::new();
        let shared = frames.shared();
        frames.advance(10.0);
        assert_eq!(shared.now(), 10.0);
    }
}
