//! Frame-rate limited scheduling
//!
//! [`FpsScheduler`] sits on top of a [`FrameSource`] and gates a callback to
//! at most `max_fps` invocations per second. It re-arms itself on every
//! refresh so timing stays locked to the display, and only lets the payload
//! through once more than one interval has elapsed since the last run.
//!
//! ```ignore
//! let scheduler = FpsScheduler::new(frames, 60.0);
//! let stop = scheduler.schedule(move || step_particles());
//! // later
//! stop.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fete_core::Disposer;
use fete_platform::FrameSource;

/// Default cap on callback invocations per second
pub const DEFAULT_MAX_FPS: f64 = 60.0;

/// Callback invoked by the scheduler
pub type TickCallback = Box<dyn FnMut()>;

/// One scheduled callback and its stop flag
///
/// Only the pending frame callback holds this strongly, so a stopped loop
/// is freed as soon as its last in-flight frame observes the flag.
struct ScheduledLoop {
    stopped: Cell<bool>,
    callback: RefCell<TickCallback>,
}

/// Throttles a per-refresh frame source to a maximum rate
pub struct FpsScheduler {
    frames: Rc<dyn FrameSource>,
    interval: f64,
    then: Rc<Cell<f64>>,
}

impl FpsScheduler {
    /// Create a scheduler capped at `max_fps`
    ///
    /// Non-positive or non-finite rates fall back to [`DEFAULT_MAX_FPS`].
    pub fn new(frames: Rc<dyn FrameSource>, max_fps: f64) -> Self {
        let max_fps = if max_fps.is_finite() && max_fps > 0.0 {
            max_fps
        } else {
            tracing::warn!(
                "FpsScheduler: invalid max fps {}, using {}",
                max_fps,
                DEFAULT_MAX_FPS
            );
            DEFAULT_MAX_FPS
        };
        let then = Rc::new(Cell::new(frames.now()));
        Self {
            frames,
            interval: 1000.0 / max_fps,
            then,
        }
    }

    /// Minimum time between callback invocations, in milliseconds
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Start invoking `callback` at most once per interval
    ///
    /// The returned disposer stops the loop. A frame that is already queued
    /// still runs, sees the stop flag and returns without re-arming.
    pub fn schedule<F>(&self, callback: F) -> Disposer
    where
        F: FnMut() + 'static,
    {
        let scheduled = Rc::new(ScheduledLoop {
            stopped: Cell::new(false),
            callback: RefCell::new(Box::new(callback)),
        });
        let handle: Weak<ScheduledLoop> = Rc::downgrade(&scheduled);

        arm(
            Rc::clone(&self.frames),
            Rc::clone(&self.then),
            self.interval,
            scheduled,
        );

        Disposer::new(move || {
            if let Some(scheduled) = handle.upgrade() {
                scheduled.stopped.set(true);
            }
        })
    }
}

fn arm(
    frames: Rc<dyn FrameSource>,
    then: Rc<Cell<f64>>,
    interval: f64,
    scheduled: Rc<ScheduledLoop>,
) {
    let source = Rc::clone(&frames);
    frames.request_frame(Box::new(move |now| {
        tick(source, then, interval, scheduled, now);
    }));
}

fn tick(
    frames: Rc<dyn FrameSource>,
    then: Rc<Cell<f64>>,
    interval: f64,
    scheduled: Rc<ScheduledLoop>,
    now: f64,
) {
    if scheduled.stopped.get() {
        return;
    }

    // Re-arm before running the payload so a slow callback never skips a refresh
    arm(frames, Rc::clone(&then), interval, Rc::clone(&scheduled));

    let elapsed = now - then.get();
    if elapsed > interval {
        // Keep the remainder so the throttle does not drift behind the display
        then.set(now - elapsed % interval);
        let mut callback = scheduled.callback.borrow_mut();
        (*callback)();
    }
}
