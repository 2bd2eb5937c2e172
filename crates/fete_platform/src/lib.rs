//! Fete Platform Abstraction Layer
//!
//! Platform-agnostic frame timing for Fete animations.
//!
//! # Architecture
//!
//! - [`FrameSource`] - one-shot per-refresh callbacks (`requestAnimationFrame`)
//! - [`ManualFrameSource`] - deterministic, explicitly stepped clock
//! - [`DisplayLink`] - wall-clock refresh loop for headless real-time runs
//!
//! # Example
//!
//! ```ignore
//! use fete_platform::*;
//!
//! let link = DisplayLink::new(60.0)?;
//! link.request_frame(Box::new(|now| println!("frame at {now:.1}ms")));
//! link.run(|frame| ControlFlow::exit_if(frame >= 1));
//! ```

mod display;
mod error;
mod event;
mod frame;
mod manual;

// Re-export all public types
pub use display::DisplayLink;
pub use error::{PlatformError, Result};
pub use event::ControlFlow;
pub use frame::{FrameCallback, FrameQueue, FrameSource};
pub use manual::ManualFrameSource;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::display::DisplayLink;
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::ControlFlow;
    pub use crate::frame::{FrameCallback, FrameSource};
    pub use crate::manual::ManualFrameSource;
}
