//! Fete Animation
//!
//! Frame-rate limited scheduling and the confetti particle system.
//!
//! # Features
//!
//! - **FPS Scheduler**: throttles per-refresh callbacks to a maximum rate with drift correction
//! - **Particles**: 3D-transformed pieces with gravity, damping, lifetime and fade-out
//! - **Confetti**: screen-wide or targeted bursts with completion and cancellation

pub mod confetti;
pub mod particle;
pub mod scheduler;

pub use confetti::{
    confetti_color, piece_count, throw_confetti, ConfettiOptions, ConfettiRun, ConfettiState,
    CONFETTI_COLORS, DEFAULT_AMOUNT, MAX_PIECES,
};
pub use particle::{create_particle, Particle, ParticleVelocity};
pub use scheduler::{FpsScheduler, TickCallback, DEFAULT_MAX_FPS};
