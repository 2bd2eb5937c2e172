//! Per-refresh frame callbacks
//!
//! [`FrameSource`] is the equivalent of a browser's `requestAnimationFrame`:
//! a callback registered with [`FrameSource::request_frame`] fires once, on
//! the next display refresh, with that refresh's timestamp. Anything that
//! wants to keep animating re-registers from inside its callback.

use std::cell::RefCell;
use std::fmt;

/// One-shot callback receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Source of display refresh callbacks
pub trait FrameSource {
    /// Current time in milliseconds on the same clock as frame timestamps
    fn now(&self) -> f64;

    /// Run `callback` once on the next refresh
    fn request_frame(&self, callback: FrameCallback);
}

/// Pending frame callbacks shared by the frame source implementations
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<Vec<FrameCallback>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push(callback);
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Run every callback queued before this call
    ///
    /// Callbacks registered while the batch runs are kept for the next
    /// flush. Returns the number of callbacks that ran.
    pub fn flush(&self, now: f64) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback(now);
        }
        count
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.len())
            .finish()
    }
}
