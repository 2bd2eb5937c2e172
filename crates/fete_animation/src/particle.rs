//! Individual confetti pieces
//!
//! A particle owns one element in the document and moves it with simple
//! per-frame kinematics: explicit Euler integration with an implicit
//! timestep of one scheduled frame, constant gravity scaled by a random
//! weight, and mild damping on horizontal and rotational velocity.

use fete_core::{Color, Document, ElementId, ElementStyle, Point, Transform3D, Vec3};

/// Added to the vertical velocity every update, scaled by weight
pub const GRAVITY: f32 = 0.1;

/// Life consumed per update
pub const LIFE_STEP: f32 = 0.01;

/// Multiplier applied to horizontal and rotational velocity every update
pub const DAMPING: f32 = 0.995;

/// Remaining life below which the piece fades out linearly
pub const FADE_WINDOW: f32 = 0.1;

/// Linear velocity (px per frame) and rotation rate (degrees per frame)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleVelocity {
    pub linear: Vec3,
    pub rotation: f32,
}

/// A single confetti piece
#[derive(Debug)]
pub struct Particle {
    index: usize,
    origin: Point,
    position: Vec3,
    velocity: ParticleVelocity,
    axis: Vec3,
    angle: f32,
    weight: f32,
    life: f32,
    color: Color,
    document: Document,
    element: Option<ElementId>,
}

/// Create a piece at (`x`, `y`) and place it with one immediate update
///
/// `velocity_x_multiplier` scales and signs the initial horizontal push.
/// The element is created detached; the caller attaches it to a container.
pub fn create_particle(
    document: &Document,
    rng: &mut fastrand::Rng,
    index: usize,
    x: f32,
    y: f32,
    velocity_x_multiplier: f32,
    color: Color,
) -> Particle {
    let weight = rng.f32() - 0.4 + 0.75;
    let velocity = ParticleVelocity {
        linear: Vec3::new(
            rng.f32() * 8.0 * velocity_x_multiplier,
            (rng.f32() - 0.8) * 6.0,
            (rng.f32() - 0.8) * 6.0,
        ),
        rotation: (rng.f32() - 0.5) * 120.0,
    };
    let axis = Vec3::new(rng.f32(), rng.f32(), rng.f32());
    let angle = rng.f32() * 300.0;
    let life = 5.0 + rng.f32() * 2.0;

    let element = document.with_mut(|tree| {
        let element = tree.create_element("b");
        if let Some(style) = tree.style_mut(element) {
            style.background = Some(color);
        }
        element
    });

    let mut particle = Particle {
        index,
        origin: Point::new(x, y),
        position: Vec3::new(x, y, 0.0),
        velocity,
        axis,
        angle,
        weight,
        life,
        color,
        document: document.clone(),
        element: Some(element),
    };
    particle.update();
    particle
}

impl Particle {
    /// Spawn index within the run
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position the piece was spawned at, before its first update
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> ParticleVelocity {
        self.velocity
    }

    /// Fixed rotation axis
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Accumulated rotation in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The element this piece draws into, `None` once disposed
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn has_completed(&self) -> bool {
        self.life <= 0.0
    }

    /// Advance one frame; does nothing once completed
    pub fn update(&mut self) {
        if self.has_completed() {
            return;
        }

        self.position += self.velocity.linear;
        self.angle += self.velocity.rotation;
        let transform = Transform3D::new(self.position, self.axis, self.angle);
        self.write_style(|style| style.transform = Some(transform));

        self.life -= LIFE_STEP;
        if self.has_completed() {
            self.dispose();
        }

        // Gravity and damping still run on the final frame, after disposal
        self.velocity.linear.y += GRAVITY * self.weight;
        self.velocity.linear.x *= DAMPING;
        self.velocity.rotation *= DAMPING;

        if self.life < FADE_WINDOW {
            let opacity = self.life * 10.0;
            self.write_style(|style| style.opacity = Some(opacity));
        }
    }

    /// Expire the piece and remove its element; safe to call repeatedly
    pub fn dispose(&mut self) {
        self.life = 0.0;
        if let Some(element) = self.element.take() {
            self.document.with_mut(|tree| tree.destroy(element));
        }
    }

    fn write_style(&self, f: impl FnOnce(&mut ElementStyle)) {
        let Some(element) = self.element else {
            return;
        };
        self.document.with_mut(|tree| {
            if let Some(style) = tree.style_mut(element) {
                f(style);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fete_core::Size;

    const EPSILON: f32 = 1e-3;

    fn document() -> Document {
        Document::new(Size::new(800.0, 600.0))
    }

    fn spawn(doc: &Document, seed: u64) -> Particle {
        let mut rng = fastrand::Rng::with_seed(seed);
        create_particle(doc, &mut rng, 0, 100.0, 50.0, 0.5, Color::from_hex(0x8D75E6))
    }

    #[test]
    fn test_initial_ranges() {
        let doc = document();
        for seed in 0..50 {
            let particle = spawn(&doc, seed);
            assert!((0.35 - EPSILON..1.35).contains(&particle.weight()));
            // Life starts in [5, 7) and the immediate update consumes one step
            assert!(particle.life() >= 5.0 - LIFE_STEP - EPSILON);
            assert!(particle.life() < 7.0);
            assert!(!particle.has_completed());
            assert_eq!(particle.origin(), Point::new(100.0, 50.0));
            assert_eq!(particle.position().z, particle.velocity().linear.z);
        }
    }

    #[test]
    fn test_creation_styles_element() {
        let doc = document();
        let particle = spawn(&doc, 7);
        let element = particle.element().unwrap();

        let style = doc.with(|tree| tree.style(element).cloned()).unwrap();
        assert_eq!(style.background, Some(Color::from_hex(0x8D75E6)));
        let transform = style.transform.unwrap();
        assert_eq!(transform.translate, particle.position());
        assert_eq!(transform.axis, particle.axis());
        assert_eq!(transform.angle, particle.angle());
        assert_eq!(style.opacity, None);

        // Created detached
        assert_eq!(doc.with(|tree| tree.parent(element)), None);
    }

    #[test]
    fn test_update_integrates_then_applies_gravity_and_damping() {
        let doc = document();
        let mut particle = spawn(&doc, 3);
        let before = particle.position();
        let velocity = particle.velocity();
        let angle = particle.angle();

        particle.update();

        let after = particle.position();
        assert!((after.x - (before.x + velocity.linear.x)).abs() < EPSILON);
        assert!((after.y - (before.y + velocity.linear.y)).abs() < EPSILON);
        assert!((after.z - (before.z + velocity.linear.z)).abs() < EPSILON);
        assert!((particle.angle() - (angle + velocity.rotation)).abs() < EPSILON);

        let next = particle.velocity();
        assert!((next.linear.y - (velocity.linear.y + GRAVITY * particle.weight())).abs() < EPSILON);
        assert!((next.linear.x - velocity.linear.x * DAMPING).abs() < EPSILON);
        assert!((next.rotation - velocity.rotation * DAMPING).abs() < EPSILON);
        assert_eq!(next.linear.z, velocity.linear.z);
    }

    #[test]
    fn test_life_decreases_by_step_per_update() {
        let doc = document();
        let mut particle = spawn(&doc, 11);
        let start = particle.life();

        for _ in 0..100 {
            particle.update();
        }
        assert!((particle.life() - (start - 100.0 * LIFE_STEP)).abs() < EPSILON);
    }

    #[test]
    fn test_fades_then_completes_and_stays_completed() {
        let doc = document();
        let mut particle = spawn(&doc, 5);
        let element = particle.element().unwrap();

        while particle.life() >= FADE_WINDOW + LIFE_STEP {
            particle.update();
        }
        particle.update();
        assert!(particle.life() < FADE_WINDOW);
        let opacity = doc.with(|tree| tree.style(element).and_then(|s| s.opacity));
        let expected = particle.life() * 10.0;
        assert!((opacity.unwrap() - expected).abs() < EPSILON);

        let mut updates = 0;
        while !particle.has_completed() {
            particle.update();
            updates += 1;
            assert!(updates < 20, "particle never completed");
        }

        assert_eq!(particle.life(), 0.0);
        assert_eq!(particle.element(), None);
        assert!(!doc.with(|tree| tree.contains(element)));

        // Further updates are no-ops
        let position = particle.position();
        particle.update();
        assert!(particle.has_completed());
        assert_eq!(particle.position(), position);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let doc = document();
        let container = doc.with_mut(|tree| {
            let div = tree.create_element("div");
            let root = tree.root();
            tree.append_child(root, div);
            div
        });
        let mut particle = spawn(&doc, 9);
        doc.with_mut(|tree| tree.append_child(container, particle.element().unwrap()));
        let count = doc.element_count();

        particle.dispose();
        assert!(particle.has_completed());
        assert_eq!(doc.element_count(), count - 1);
        assert!(doc.with(|tree| tree.children(container).is_empty()));

        particle.dispose();
        assert_eq!(doc.element_count(), count - 1);
        assert_eq!(particle.life(), 0.0);
    }

    #[test]
    fn test_same_seed_same_particle() {
        let doc = document();
        let a = spawn(&doc, 42);
        let b = spawn(&doc, 42);
        assert_eq!(a.velocity(), b.velocity());
        assert_eq!(a.axis(), b.axis());
        assert_eq!(a.life(), b.life());
    }
}
