//! Fete application
//!
//! Owns the page document, the refresh source and the mounted welcome page,
//! and drives frames until the confetti burst is over.

use std::fmt;
use std::rc::Rc;

use fete_animation::ConfettiState;
use fete_core::{Document, Size};
use fete_platform::{ControlFlow, DisplayLink, FrameSource, ManualFrameSource};
use serde::Serialize;

use crate::config::FeteConfig;
use crate::context::MountContext;
use crate::error::Result;
use crate::page::WelcomePage;
use crate::screen::ConfettiScreenProps;

/// Where refreshes come from
#[derive(Clone, Debug)]
pub enum FrameDriver {
    /// Simulated clock, stepped as fast as possible
    Manual(ManualFrameSource),
    /// Wall-clock refresh loop
    Display(Rc<DisplayLink>),
}

impl FrameDriver {
    fn source(&self) -> Rc<dyn FrameSource> {
        match self {
            FrameDriver::Manual(frames) => frames.shared(),
            FrameDriver::Display(link) => Rc::clone(link) as Rc<dyn FrameSource>,
        }
    }

    fn now(&self) -> f64 {
        match self {
            FrameDriver::Manual(frames) => frames.now(),
            FrameDriver::Display(link) => link.now(),
        }
    }
}

/// Outcome of [`FeteApp::run`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// Refreshes delivered
    pub frames: u64,
    /// Time covered by those refreshes, simulated or real
    pub elapsed_ms: f64,
    /// Whether the burst ran to completion
    pub completed: bool,
    /// Pieces thrown
    pub pieces: usize,
    /// Scheduled particle updates
    pub updates: u64,
    /// Largest element count seen, the root included
    pub peak_elements: usize,
    /// Element count when the run stopped
    pub remaining_elements: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pieces, {} updates over {} frames ({:.0} ms), {}; peak {} elements, {} remaining",
            self.pieces,
            self.updates,
            self.frames,
            self.elapsed_ms,
            if self.completed { "completed" } else { "not completed" },
            self.peak_elements,
            self.remaining_elements
        )
    }
}

/// The main Fete application
///
/// # Example
///
/// ```ignore
/// use fete_app::prelude::*;
///
/// let mut app = FeteApp::headless(FeteConfig::default())?;
/// let summary = app.run(3600);
/// assert!(summary.completed);
/// ```
pub struct FeteApp {
    config: FeteConfig,
    document: Document,
    driver: FrameDriver,
    page: WelcomePage,
}

impl FeteApp {
    /// Create an app on a simulated clock
    pub fn headless(config: FeteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_driver(
            config,
            FrameDriver::Manual(ManualFrameSource::new()),
        ))
    }

    /// Create an app paced by a real-time display link
    pub fn realtime(config: FeteConfig) -> Result<Self> {
        config.validate()?;
        let link = DisplayLink::new(config.display.refresh_rate)?;
        Ok(Self::with_driver(config, FrameDriver::Display(Rc::new(link))))
    }

    fn with_driver(config: FeteConfig, driver: FrameDriver) -> Self {
        let document = Document::new(Size::new(config.viewport.width, config.viewport.height));
        let ctx = MountContext::new(document.clone(), driver.source());

        let mut page = WelcomePage::new(ConfettiScreenProps {
            target: None,
            should_start: true,
            amount: Some(config.confetti.amount),
            max_fps: config.confetti.max_fps,
            seed: config.confetti.seed,
        });
        page.mount(&ctx);

        tracing::info!(
            "FeteApp: {}x{} viewport, {} Hz, {} pieces",
            config.viewport.width,
            config.viewport.height,
            config.display.refresh_rate,
            config.confetti.amount.floor()
        );

        Self {
            config,
            document,
            driver,
            page,
        }
    }

    pub fn config(&self) -> &FeteConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    pub fn page(&self) -> &WelcomePage {
        &self.page
    }

    /// Whether the burst is over (or never started)
    pub fn is_finished(&self) -> bool {
        self.page.confetti().state() != ConfettiState::Running
    }

    /// Deliver refreshes until the burst is over or `max_frames` ran
    pub fn run(&mut self, max_frames: u64) -> RunSummary {
        let started = self.driver.now();
        let mut peak = self.document.element_count();

        let frames = if max_frames == 0 || self.is_finished() {
            0
        } else {
            match self.driver.clone() {
                FrameDriver::Manual(frames) => {
                    let dt = 1000.0 / self.config.display.refresh_rate;
                    let mut delivered = 0;
                    while delivered < max_frames && !self.is_finished() {
                        frames.advance(dt);
                        delivered += 1;
                        self.page.sync();
                        peak = peak.max(self.document.element_count());
                    }
                    delivered
                }
                FrameDriver::Display(link) => {
                    let page = &mut self.page;
                    let document = &self.document;
                    // The link counts frames over its lifetime
                    let base = link.frame_count();
                    let total = link.run(|frame| {
                        page.sync();
                        peak = peak.max(document.element_count());
                        let finished = page.confetti().state() != ConfettiState::Running;
                        ControlFlow::exit_if(finished || frame - base >= max_frames)
                    });
                    total - base
                }
            }
        };

        let confetti = self.page.confetti();
        let summary = RunSummary {
            frames,
            elapsed_ms: self.driver.now() - started,
            completed: confetti.state() == ConfettiState::Completed,
            pieces: confetti.run().map(|run| run.particle_count()).unwrap_or(0),
            updates: confetti.run().map(|run| run.updates()).unwrap_or(0),
            peak_elements: peak,
            remaining_elements: self.document.element_count(),
        };
        tracing::debug!("FeteApp: {}", summary);
        summary
    }
}

impl fmt::Debug for FeteApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeteApp")
            .field("config", &self.config)
            .field("document", &self.document)
            .field("driver", &self.driver)
            .finish()
    }
}
