//! Real-time display link
//!
//! Delivers frame callbacks at a fixed refresh rate on the calling thread,
//! sleeping between refreshes. This is the headless stand-in for a window's
//! vsync-driven redraw loop.

use std::cell::Cell;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{PlatformError, Result};
use crate::event::ControlFlow;
use crate::frame::{FrameCallback, FrameQueue, FrameSource};

/// Wall-clock frame source
pub struct DisplayLink {
    start: Instant,
    refresh_interval: Duration,
    queue: FrameQueue,
    frames: Cell<u64>,
}

impl DisplayLink {
    /// Create a display link refreshing `refresh_hz` times per second
    pub fn new(refresh_hz: f64) -> Result<Self> {
        if !refresh_hz.is_finite() || refresh_hz <= 0.0 {
            return Err(PlatformError::InvalidRefreshRate(refresh_hz));
        }
        Ok(Self {
            start: Instant::now(),
            refresh_interval: Duration::from_secs_f64(1.0 / refresh_hz),
            queue: FrameQueue::new(),
            frames: Cell::new(0),
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Refreshes delivered so far
    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }

    /// Deliver one refresh immediately; returns the callbacks that ran
    pub fn pump(&self) -> usize {
        self.frames.set(self.frames.get() + 1);
        self.queue.flush(self.now())
    }

    /// Deliver refreshes until `after_frame` returns [`ControlFlow::Exit`]
    ///
    /// `after_frame` runs after every refresh with the number of refreshes
    /// delivered so far. Returns that number once the loop exits.
    pub fn run<F>(&self, mut after_frame: F) -> u64
    where
        F: FnMut(u64) -> ControlFlow,
    {
        tracing::debug!(
            "DisplayLink: running at {:.1} Hz",
            1.0 / self.refresh_interval.as_secs_f64()
        );

        loop {
            let frame_start = Instant::now();
            self.pump();

            if after_frame(self.frame_count()) == ControlFlow::Exit {
                break;
            }

            // Sleep for remaining frame time
            let elapsed = frame_start.elapsed();
            if elapsed < self.refresh_interval {
                thread::sleep(self.refresh_interval - elapsed);
            }
        }

        self.frame_count()
    }
}

impl FrameSource for DisplayLink {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.queue.push(callback);
    }
}

impl fmt::Debug for DisplayLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayLink")
            .field("refresh_interval", &self.refresh_interval)
            .field("frames", &self.frames.get())
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_rejects_invalid_refresh_rates() {
        assert!(matches!(
            DisplayLink::new(0.0),
            Err(PlatformError::InvalidRefreshRate(_))
        ));
        assert!(DisplayLink::new(-60.0).is_err());
        assert!(DisplayLink::new(f64::NAN).is_err());
    }

    #[test]
    fn test_run_stops_on_exit() {
        let link = DisplayLink::new(1000.0).unwrap();
        let frames = link.run(|count| {
            if count >= 3 {
                ControlFlow::Exit
            } else {
                ControlFlow::Continue
            }
        });
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_pump_delivers_pending_callbacks() {
        let link = DisplayLink::new(120.0).unwrap();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        link.request_frame(Box::new(move |now| {
            assert!(now >= 0.0);
            flag.set(true);
        }));

        assert_eq!(link.pump(), 1);
        assert!(fired.get());
    }
}
