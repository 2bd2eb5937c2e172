//! Confetti screen component
//!
//! Renders a full-size overlay (`div#global > div.confetti-screen`) into a
//! parent element and throws confetti into it. Once the burst completes the
//! next [`ConfettiScreen::sync`] removes the overlay; unmounting (or dropping
//! the component) cancels a burst that is still running.

use std::cell::Cell;
use std::rc::Rc;

use fete_animation::{ConfettiOptions, ConfettiRun, ConfettiState, DEFAULT_MAX_FPS};
use fete_core::{DisposeGuard, ElementId, NodeRef};

use crate::context::MountContext;

/// Inputs of a [`ConfettiScreen`]
#[derive(Clone, Debug)]
pub struct ConfettiScreenProps {
    /// Throw from this element's box instead of across the whole screen
    pub target: Option<NodeRef>,
    /// Start the burst as soon as the component mounts
    pub should_start: bool,
    /// Number of pieces; `None` uses the driver default
    pub amount: Option<f32>,
    pub max_fps: f64,
    /// Fixed random seed for reproducible bursts
    pub seed: Option<u64>,
}

impl Default for ConfettiScreenProps {
    fn default() -> Self {
        Self {
            target: None,
            should_start: false,
            amount: None,
            max_fps: DEFAULT_MAX_FPS,
            seed: None,
        }
    }
}

/// A component that owns one confetti overlay and its running burst
#[derive(Debug)]
pub struct ConfettiScreen {
    props: ConfettiScreenProps,
    ctx: Option<MountContext>,
    parent: Option<ElementId>,
    root: Option<ElementId>,
    container: NodeRef,
    completed: Rc<Cell<bool>>,
    run: Option<ConfettiRun>,
    effect: Option<DisposeGuard>,
}

impl ConfettiScreen {
    pub fn new(props: ConfettiScreenProps) -> Self {
        Self {
            props,
            ctx: None,
            parent: None,
            root: None,
            container: NodeRef::new(),
            completed: Rc::new(Cell::new(false)),
            run: None,
            effect: None,
        }
    }

    pub fn props(&self) -> &ConfettiScreenProps {
        &self.props
    }

    /// Render the overlay under `parent` and start the burst if requested
    ///
    /// Remounting first unmounts. Returns the overlay's outer element, or
    /// `None` if `parent` is not alive.
    pub fn mount(&mut self, ctx: &MountContext, parent: ElementId) -> Option<ElementId> {
        self.unmount();
        self.ctx = Some(ctx.clone());
        self.parent = Some(parent);

        if !self.render() {
            tracing::warn!("ConfettiScreen: parent {:?} is not in the document", parent);
            self.ctx = None;
            self.parent = None;
            return None;
        }
        if self.props.should_start {
            self.start();
        }
        self.root
    }

    /// Run the effect, cancelling any burst already in flight
    ///
    /// Re-renders the overlay if a previous burst completed and was synced
    /// away. Returns false if the component is not mounted or nothing could
    /// be launched.
    pub fn start(&mut self) -> bool {
        let Some(ctx) = self.ctx.clone() else {
            tracing::debug!("ConfettiScreen: start before mount");
            return false;
        };
        self.stop();
        if self.root.is_none() && !self.render() {
            return false;
        }
        self.completed.set(false);

        let completed = Rc::clone(&self.completed);
        let mut options = ConfettiOptions::new(ctx.document, ctx.frames, self.container.clone())
            .target(self.props.target.clone())
            .max_fps(self.props.max_fps)
            .on_complete(move || completed.set(true));
        if let Some(amount) = self.props.amount {
            options = options.amount(amount);
        }
        if let Some(seed) = self.props.seed {
            options = options.seed(seed);
        }

        match ConfettiRun::launch(options) {
            Some(run) => {
                self.effect = Some(run.disposer().guard());
                self.run = Some(run);
                true
            }
            None => false,
        }
    }

    /// Apply state changes made by the running burst
    ///
    /// Once the burst has completed the overlay is removed. Returns true if
    /// this call removed it.
    pub fn sync(&mut self) -> bool {
        if !self.completed.get() || self.root.is_none() {
            return false;
        }
        self.remove_rendered();
        tracing::debug!("ConfettiScreen: completed, overlay removed");
        true
    }

    /// Cancel the burst and remove the overlay; safe to call repeatedly
    pub fn unmount(&mut self) {
        self.stop();
        self.remove_rendered();
        self.ctx = None;
        self.parent = None;
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.ctx.is_some()
    }

    /// Whether the overlay is currently in the document
    pub fn is_rendered(&self) -> bool {
        self.root.is_some()
    }

    /// Ref to the inner `div.confetti-screen` that pieces are appended to
    pub fn container(&self) -> &NodeRef {
        &self.container
    }

    /// The most recent burst
    pub fn run(&self) -> Option<&ConfettiRun> {
        self.run.as_ref()
    }

    pub fn state(&self) -> ConfettiState {
        self.run
            .as_ref()
            .map(ConfettiRun::state)
            .unwrap_or_default()
    }

    fn render(&mut self) -> bool {
        let (Some(ctx), Some(parent)) = (&self.ctx, self.parent) else {
            return false;
        };
        let rendered = ctx.document.with_mut(|tree| {
            let bounds = tree.bounding_client_rect(parent)?;

            let global = tree.create_element("div");
            tree.set_attribute(global, "id", "global");
            tree.set_bounds(global, bounds);

            let screen = tree.create_element("div");
            tree.set_attribute(screen, "class", "confetti-screen");
            tree.set_bounds(screen, bounds);

            tree.append_child(global, screen);
            tree.append_child(parent, global);
            Some((global, screen))
        });

        match rendered {
            Some((global, screen)) => {
                self.root = Some(global);
                self.container.set(Some(screen));
                true
            }
            None => false,
        }
    }

    fn stop(&mut self) {
        if let Some(effect) = self.effect.take() {
            effect.dispose();
        }
    }

    fn remove_rendered(&mut self) {
        self.container.set(None);
        if let (Some(root), Some(ctx)) = (self.root.take(), &self.ctx) {
            ctx.document.with_mut(|tree| tree.destroy(root));
        }
    }
}

impl Drop for ConfettiScreen {
    fn drop(&mut self) {
        self.unmount();
    }
}
