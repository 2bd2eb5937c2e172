//! Confetti animation driver
//!
//! Spawns a batch of [`Particle`]s into a container element, steps them at
//! a capped frame rate and tears everything down once every piece has
//! expired or the run is cancelled.
//!
//! Two origin modes exist:
//!
//! - **Screen-wide** (no target): pieces start near the top of the viewport,
//!   spread across the container plus a quarter of the viewport width, and
//!   are pushed back toward the middle at half speed.
//! - **Targeted**: pieces start inside the target's bounding box with
//!   ±10px jitter and fly outward at half speed.
//!
//! # Example
//!
//! ```ignore
//! use fete_animation::{throw_confetti, ConfettiOptions};
//!
//! let dispose = throw_confetti(
//!     ConfettiOptions::new(document, frames, container_ref)
//!         .amount(120.0)
//!         .on_complete(|| tracing::info!("done")),
//! );
//! // Cancel early if the screen goes away
//! dispose.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use fete_core::{Color, Disposer, Document, NodeRef};
use fete_platform::FrameSource;
use smallvec::SmallVec;

use crate::particle::{create_particle, Particle};
use crate::scheduler::{FpsScheduler, DEFAULT_MAX_FPS};

/// Piece colors, assigned round-robin by spawn index
pub const CONFETTI_COLORS: [u32; 5] = [0x8D75E6, 0xFD975D, 0xF486B8, 0x5ABE89, 0xF0A848];

/// Pieces spawned when no amount is given
pub const DEFAULT_AMOUNT: f32 = 60.0;

/// Upper bound on pieces in one run; larger amounts are clamped
pub const MAX_PIECES: usize = 100_000;

/// Share of the viewport width added as horizontal spread in screen-wide mode
const SCREEN_WIDE_SPREAD: f32 = 0.25;

/// Vertical band at the top of the viewport used in screen-wide mode
const SCREEN_WIDE_DROP: f32 = 20.0;

/// Total jitter around the target box in targeted mode
const TARGET_JITTER: f32 = 20.0;

/// Horizontal speed multiplier magnitude
const PUSH: f32 = 0.5;

/// Color of the piece with the given spawn index
pub fn confetti_color(index: usize) -> Color {
    Color::from_hex(CONFETTI_COLORS[index % CONFETTI_COLORS.len()])
}

/// Number of pieces for an optional amount
///
/// Floored; negative or NaN is zero and anything above [`MAX_PIECES`] is
/// clamped to it.
pub fn piece_count(amount: Option<f32>) -> usize {
    // Float-to-int casts saturate: NaN and negatives become 0
    let count = amount.unwrap_or(DEFAULT_AMOUNT).floor() as usize;
    if count > MAX_PIECES {
        tracing::warn!("confetti: amount {} clamped to {}", count, MAX_PIECES);
        return MAX_PIECES;
    }
    count
}

/// Lifecycle of a confetti run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfettiState {
    /// Not started
    #[default]
    Idle,
    /// Pieces are being updated every scheduled frame
    Running,
    /// Every piece expired and the completion callback ran
    Completed,
    /// Disposed before every piece expired
    Cancelled,
}

impl ConfettiState {
    pub fn is_finished(self) -> bool {
        matches!(self, ConfettiState::Completed | ConfettiState::Cancelled)
    }
}

/// Inputs of a confetti run
pub struct ConfettiOptions {
    document: Document,
    frames: Rc<dyn FrameSource>,
    container: NodeRef,
    target: Option<NodeRef>,
    on_complete: Option<Box<dyn FnOnce()>>,
    amount: Option<f32>,
    max_fps: f64,
    rng: fastrand::Rng,
}

impl ConfettiOptions {
    /// Options for a screen-wide run into `container`
    pub fn new(document: Document, frames: Rc<dyn FrameSource>, container: NodeRef) -> Self {
        Self {
            document,
            frames,
            container,
            target: None,
            on_complete: None,
            amount: None,
            max_fps: DEFAULT_MAX_FPS,
            rng: fastrand::Rng::new(),
        }
    }

    /// Originate from `target`'s bounding box instead of the top of the screen
    pub fn target(mut self, target: impl Into<Option<NodeRef>>) -> Self {
        self.target = target.into();
        self
    }

    /// Called once when every piece has expired (never after cancellation)
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Number of pieces, floored; [`DEFAULT_AMOUNT`] when not set
    pub fn amount(mut self, amount: f32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Cap on updates per second
    pub fn max_fps(mut self, max_fps: f64) -> Self {
        self.max_fps = max_fps;
        self
    }

    /// Use a deterministic random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }
}

impl fmt::Debug for ConfettiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfettiOptions")
            .field("container", &self.container)
            .field("target", &self.target)
            .field("amount", &self.amount)
            .field("max_fps", &self.max_fps)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

struct RunState {
    particles: RefCell<Vec<Particle>>,
    disposers: RefCell<SmallVec<[Disposer; 1]>>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
    state: Cell<ConfettiState>,
    updates: Cell<u64>,
}

/// A launched confetti run
///
/// Cloning yields another handle to the same run. The scheduled frame loop
/// keeps the run alive until it finishes, so dropping every handle does not
/// stop the animation; call [`ConfettiRun::dispose`] for that.
#[derive(Clone)]
pub struct ConfettiRun {
    inner: Rc<RunState>,
}

impl ConfettiRun {
    /// Spawn the pieces and start the frame loop
    ///
    /// Returns `None` without side effects when the container is not
    /// mounted, or when a target was requested but is not mounted.
    pub fn launch(options: ConfettiOptions) -> Option<Self> {
        let ConfettiOptions {
            document,
            frames,
            container,
            target,
            on_complete,
            amount,
            max_fps,
            mut rng,
        } = options;

        let Some(container) = container.resolve(&document) else {
            tracing::debug!("confetti: container not mounted, skipping");
            return None;
        };
        let target = match target {
            Some(target) => match target.resolve(&document) {
                Some(id) => Some(id),
                None => {
                    tracing::debug!("confetti: target not mounted, skipping");
                    return None;
                }
            },
            None => None,
        };

        let screen_wide = target.is_none();
        let bounds = document.bounding_client_rect(target.unwrap_or(container))?;
        let viewport = document.viewport();
        let total = piece_count(amount);
        let (left, top, width, height) = (bounds.left(), bounds.top(), bounds.width(), bounds.height());

        let particles: Vec<Particle> = (0..total)
            .map(|i| {
                let spread = if screen_wide {
                    viewport.width * SCREEN_WIDE_SPREAD
                } else {
                    TARGET_JITTER
                };
                let x = left + rng.f32() * width + (rng.f32() - 0.5) * spread;
                let y = if screen_wide {
                    rng.f32() * SCREEN_WIDE_DROP
                } else {
                    top + rng.f32() * height + (rng.f32() - 0.5) * TARGET_JITTER
                };

                let sign = if i % 2 == 0 {
                    if rng.f32() - 0.5 >= 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                } else if x > left + width / 2.0 {
                    1.0
                } else {
                    -1.0
                };
                let multiplier = sign * if screen_wide { -PUSH } else { PUSH };

                create_particle(&document, &mut rng, i, x, y, multiplier, confetti_color(i))
            })
            .collect();

        document.with_mut(|tree| {
            tree.append_children(container, particles.iter().filter_map(Particle::element))
        });

        tracing::debug!(
            "confetti: launched {} pieces ({})",
            total,
            if screen_wide { "screen-wide" } else { "targeted" }
        );

        let run = Self {
            inner: Rc::new(RunState {
                particles: RefCell::new(particles),
                disposers: RefCell::new(SmallVec::new()),
                on_complete: RefCell::new(on_complete),
                state: Cell::new(ConfettiState::Idle),
                updates: Cell::new(0),
            }),
        };

        let scheduler = FpsScheduler::new(frames, max_fps);
        let ticking = run.clone();
        let stop = scheduler.schedule(move || ticking.tick());
        run.inner.disposers.borrow_mut().push(stop);
        run.inner.state.set(ConfettiState::Running);

        Some(run)
    }

    pub fn state(&self) -> ConfettiState {
        self.inner.state.get()
    }

    pub fn particle_count(&self) -> usize {
        self.inner.particles.borrow().len()
    }

    /// Pieces that have not expired yet
    pub fn live_count(&self) -> usize {
        self.inner
            .particles
            .borrow()
            .iter()
            .filter(|p| !p.has_completed())
            .count()
    }

    /// Scheduled frames in which the pieces were stepped
    pub fn updates(&self) -> u64 {
        self.inner.updates.get()
    }

    /// Inspect the pieces in spawn order
    pub fn with_particles<R>(&self, f: impl FnOnce(&[Particle]) -> R) -> R {
        f(&self.inner.particles.borrow())
    }

    /// Stop the frame loop and remove every piece
    ///
    /// A run that is still going becomes [`ConfettiState::Cancelled`] and
    /// its completion callback is dropped unrun. Repeated calls are harmless.
    pub fn dispose(&self) {
        self.run_disposers();
        for particle in self.inner.particles.borrow_mut().iter_mut() {
            particle.dispose();
        }
        if self.state() == ConfettiState::Running {
            self.inner.state.set(ConfettiState::Cancelled);
            tracing::debug!("confetti: cancelled after {} updates", self.updates());
        }
        drop(self.inner.on_complete.borrow_mut().take());
    }

    /// A disposer that cancels this run
    pub fn disposer(&self) -> Disposer {
        let run = self.clone();
        Disposer::new(move || run.dispose())
    }

    fn tick(&self) {
        let finished = self
            .inner
            .particles
            .borrow()
            .iter()
            .all(Particle::has_completed);

        if finished {
            self.complete();
            return;
        }

        for particle in self.inner.particles.borrow_mut().iter_mut() {
            particle.update();
        }
        let updates = self.inner.updates.get() + 1;
        self.inner.updates.set(updates);
        tracing::trace!("confetti: update {}", updates);
    }

    fn complete(&self) {
        if self.state() == ConfettiState::Running {
            self.inner.state.set(ConfettiState::Completed);
            tracing::debug!("confetti: completed after {} updates", self.updates());
        }
        let on_complete = self.inner.on_complete.borrow_mut().take();
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        self.run_disposers();
    }

    fn run_disposers(&self) {
        let disposers = self.inner.disposers.borrow().clone();
        for disposer in &disposers {
            disposer.dispose();
        }
    }
}

impl fmt::Debug for ConfettiRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfettiRun")
            .field("state", &self.state())
            .field("particles", &self.particle_count())
            .field("updates", &self.updates())
            .finish()
    }
}

/// Launch a confetti run and return its cancellation handle
///
/// Unavailable regions make this a silent no-op: nothing is spawned and the
/// returned disposer does nothing.
pub fn throw_confetti(options: ConfettiOptions) -> Disposer {
    ConfettiRun::launch(options)
        .map(|run| run.disposer())
        .unwrap_or_else(Disposer::noop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fete_core::{ElementId, Rect, Size};
    use fete_platform::ManualFrameSource;

    /// Slightly longer than one 60 fps interval, so every refresh updates
    const FRAME_MS: f64 = 17.0;

    struct Page {
        doc: Document,
        frames: ManualFrameSource,
        container: NodeRef,
        container_id: ElementId,
    }

    fn page() -> Page {
        let doc = Document::new(Size::new(1000.0, 800.0));
        let container_id = doc.with_mut(|tree| {
            let div = tree.create_element("div");
            tree.set_bounds(div, Rect::new(0.0, 0.0, 1000.0, 800.0));
            let root = tree.root();
            tree.append_child(root, div);
            div
        });
        Page {
            doc,
            frames: ManualFrameSource::new(),
            container: NodeRef::to(container_id),
            container_id,
        }
    }

    impl Page {
        fn options(&self) -> ConfettiOptions {
            ConfettiOptions::new(self.doc.clone(), self.frames.shared(), self.container.clone())
                .seed(1234)
        }

        fn pieces(&self) -> Vec<ElementId> {
            self.doc
                .with(|tree| tree.children(self.container_id).to_vec())
        }
    }

    fn completion_counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        (count, move || sink.set(sink.get() + 1))
    }

    #[test]
    fn test_piece_count() {
        assert_eq!(piece_count(None), 60);
        assert_eq!(piece_count(Some(2.9)), 2);
        assert_eq!(piece_count(Some(0.0)), 0);
        assert_eq!(piece_count(Some(-3.0)), 0);
        assert_eq!(piece_count(Some(f32::NAN)), 0);
    }

    #[test]
    fn test_piece_count_clamps_huge_amounts() {
        assert_eq!(piece_count(Some(1e30)), MAX_PIECES);
        assert_eq!(piece_count(Some(f32::INFINITY)), MAX_PIECES);
        assert_eq!(piece_count(Some(MAX_PIECES as f32)), MAX_PIECES);
    }

    #[test]
    fn test_palette_is_round_robin() {
        assert_eq!(confetti_color(0), Color::from_hex(0x8D75E6));
        assert_eq!(confetti_color(4), Color::from_hex(0xF0A848));
        assert_eq!(confetti_color(5), confetti_color(0));
    }

    #[test]
    fn test_default_amount() {
        let page = page();
        let run = ConfettiRun::launch(page.options()).unwrap();
        assert_eq!(run.particle_count(), 60);
        assert_eq!(page.pieces().len(), 60);
        assert_eq!(run.state(), ConfettiState::Running);
    }

    #[test]
    fn test_missing_container_is_noop() {
        let page = page();
        let before = page.doc.element_count();
        let options = ConfettiOptions::new(page.doc.clone(), page.frames.shared(), NodeRef::new());

        let dispose = throw_confetti(options);
        assert!(dispose.is_noop());
        dispose.dispose();
        dispose.dispose();

        assert_eq!(page.doc.element_count(), before);
        assert_eq!(page.frames.pending(), 0);
    }

    #[test]
    fn test_missing_target_is_noop() {
        let page = page();
        let before = page.doc.element_count();
        assert!(ConfettiRun::launch(page.options().target(NodeRef::new())).is_none());
        assert_eq!(page.doc.element_count(), before);
        assert_eq!(page.frames.pending(), 0);
    }

    #[test]
    fn test_stale_container_is_noop() {
        let page = page();
        page.doc.with_mut(|tree| tree.destroy(page.container_id));
        assert!(ConfettiRun::launch(page.options()).is_none());
    }

    #[test]
    fn test_screen_wide_run_completes_once() {
        let page = page();
        let (completions, on_complete) = completion_counter();
        let run = ConfettiRun::launch(page.options().amount(2.0).on_complete(on_complete)).unwrap();

        // Appended in index order with round-robin colors
        let pieces = page.pieces();
        assert_eq!(pieces.len(), 2);
        run.with_particles(|particles| {
            assert_eq!(particles[0].element(), Some(pieces[0]));
            assert_eq!(particles[1].element(), Some(pieces[1]));
        });
        let backgrounds: Vec<_> = page.doc.with(|tree| {
            pieces
                .iter()
                .map(|&id| tree.style(id).and_then(|s| s.background))
                .collect()
        });
        assert_eq!(backgrounds, vec![Some(confetti_color(0)), Some(confetti_color(1))]);

        // Screen-wide pieces start in the band at the top of the viewport
        run.with_particles(|particles| {
            for particle in particles {
                assert!((0.0..SCREEN_WIDE_DROP).contains(&particle.origin().y));
            }
        });

        // Life never exceeds 7, so ~700 updates expire every piece and the
        // following frame observes it
        page.frames.run_frames(720, FRAME_MS);
        assert_eq!(run.live_count(), 0);

        assert_eq!(completions.get(), 1);
        assert_eq!(run.state(), ConfettiState::Completed);
        assert!(page.pieces().is_empty());

        page.frames.run_frames(100, FRAME_MS);
        assert_eq!(completions.get(), 1);
        assert_eq!(page.frames.pending(), 0);
    }

    #[test]
    fn test_completion_waits_for_every_piece() {
        let page = page();
        let (completions, on_complete) = completion_counter();
        let run = ConfettiRun::launch(page.options().amount(10.0).on_complete(on_complete)).unwrap();

        let mut frames = 0;
        while run.state() == ConfettiState::Running {
            if run.live_count() > 0 {
                assert_eq!(completions.get(), 0);
            }
            page.frames.advance(FRAME_MS);
            frames += 1;
            assert!(frames <= 800, "run never completed");
        }
        assert_eq!(completions.get(), 1);
        assert_eq!(run.live_count(), 0);
    }

    #[test]
    fn test_targeted_origin_within_jittered_box() {
        let page = page();
        let target = page.doc.with_mut(|tree| {
            let button = tree.create_element("button");
            tree.set_bounds(button, Rect::new(300.0, 200.0, 120.0, 40.0));
            let root = tree.root();
            tree.append_child(root, button);
            button
        });
        let target_box = Rect::new(300.0, 200.0, 120.0, 40.0).outset(10.0, 10.0);

        for seed in 0..20 {
            let run = ConfettiRun::launch(
                page.options()
                    .seed(seed)
                    .target(NodeRef::to(target))
                    .amount(1.0),
            )
            .unwrap();
            let origin = run.with_particles(|p| p[0].origin());
            assert!(target_box.contains(origin), "origin {origin:?} outside {target_box:?}");
            run.dispose();
        }
    }

    #[test]
    fn test_targeted_odd_pieces_push_away_from_center() {
        let page = page();
        let target = page.doc.with_mut(|tree| {
            let button = tree.create_element("button");
            tree.set_bounds(button, Rect::new(300.0, 200.0, 120.0, 40.0));
            button
        });
        let run = ConfettiRun::launch(page.options().target(NodeRef::to(target)).amount(40.0)).unwrap();

        run.with_particles(|particles| {
            for particle in particles.iter().filter(|p| p.index() % 2 == 1) {
                // The first update damps but never flips the horizontal velocity
                let vx = particle.velocity().linear.x;
                if particle.origin().x > 360.0 {
                    assert!(vx >= 0.0);
                } else {
                    assert!(vx <= 0.0);
                }
            }
        });
    }

    #[test]
    fn test_cancel_before_first_frame() {
        let page = page();
        let (completions, on_complete) = completion_counter();
        let run = ConfettiRun::launch(page.options().amount(10.0).on_complete(on_complete)).unwrap();
        assert_eq!(page.pieces().len(), 10);

        let dispose = run.disposer();
        dispose.dispose();

        assert!(page.pieces().is_empty());
        assert_eq!(run.state(), ConfettiState::Cancelled);

        page.frames.run_frames(800, FRAME_MS);
        assert_eq!(run.updates(), 0);
        assert_eq!(completions.get(), 0);
        assert_eq!(page.frames.pending(), 0);

        // Disposing twice degrades gracefully
        dispose.dispose();
        assert_eq!(run.state(), ConfettiState::Cancelled);
    }

    #[test]
    fn test_cancel_mid_run_stops_updates() {
        let page = page();
        let run = ConfettiRun::launch(page.options().amount(5.0)).unwrap();
        page.frames.run_frames(10, FRAME_MS);
        assert_eq!(run.updates(), 10);

        run.dispose();
        page.frames.run_frames(10, FRAME_MS);
        assert_eq!(run.updates(), 10);
        assert_eq!(run.live_count(), 0);
        assert!(page.pieces().is_empty());
    }

    #[test]
    fn test_dispose_after_completion_keeps_completed() {
        let page = page();
        let run = ConfettiRun::launch(page.options().amount(0.0)).unwrap();
        page.frames.advance(FRAME_MS);
        assert_eq!(run.state(), ConfettiState::Completed);

        run.dispose();
        assert_eq!(run.state(), ConfettiState::Completed);
    }

    #[test]
    fn test_run_outlives_dropped_handles() {
        let page = page();
        let (completions, on_complete) = completion_counter();
        drop(throw_confetti(page.options().amount(3.0).on_complete(on_complete)));

        page.frames.run_frames(720, FRAME_MS);
        assert_eq!(completions.get(), 1);
        assert!(page.pieces().is_empty());
    }
}
