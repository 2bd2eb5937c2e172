//! Fete Application Framework
//!
//! The welcome page, its confetti screen component and a small app shell
//! that drives them on a simulated or real-time clock.
//!
//! # Example (Headless)
//!
//! ```ignore
//! use fete_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut config = FeteConfig::default();
//!     config.confetti.seed = Some(42);
//!
//!     let mut app = FeteApp::headless(config)?;
//!     let summary = app.run(3600);
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! # Example (Component)
//!
//! ```ignore
//! use fete_app::{ConfettiScreen, ConfettiScreenProps, MountContext};
//!
//! let ctx = MountContext::new(document, frames);
//! let mut screen = ConfettiScreen::new(ConfettiScreenProps {
//!     should_start: true,
//!     amount: Some(120.0),
//!     ..Default::default()
//! });
//! screen.mount(&ctx, parent);
//! // after each refresh
//! screen.sync();
//! ```

mod app;
mod config;
mod context;
mod error;
mod page;
mod screen;

pub use app::{FeteApp, FrameDriver, RunSummary};
pub use config::{ConfettiConfig, DisplayConfig, FeteConfig, ViewportConfig};
pub use context::MountContext;
pub use error::{FeteError, Result};
pub use page::{welcome_confetti, PageSections, WelcomePage, WELCOME_CONFETTI_AMOUNT};
pub use screen::{ConfettiScreen, ConfettiScreenProps};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::app::{FeteApp, RunSummary};
    pub use crate::config::FeteConfig;
    pub use crate::context::MountContext;
    pub use crate::error::{FeteError, Result};
    pub use crate::page::WelcomePage;
    pub use crate::screen::{ConfettiScreen, ConfettiScreenProps};

    // Core types
    pub use fete_core::{Document, ElementId, NodeRef, Rect, Size};
    pub use fete_platform::{FrameSource, ManualFrameSource};
}
