//! The tween-engine boundary
//!
//! Motiva orchestrates; an external engine interpolates. The engine is
//! reached through [`TweenEngine`] (creation + curve evaluation) and
//! drives values through [`PrimitiveTween`] (a pure function of local
//! time once configured). Composite timelines built by the
//! orchestration layer implement [`PrimitiveTween`] themselves, so a
//! scheduler never distinguishes a primitive from a sequence.

use crate::ease::Ease;
use crate::property::AnimatedProperty;
use crate::time::{LoopStyle, UpdateChannel};
use crate::value::TweenValue;

/// A fully-resolved tween configuration
///
/// Produced by layering sparse options over defaults; every field is
/// concrete. Engines care about `ease`, `snapping`, `loop_count`,
/// `loop_style` and `speed_based`; `delay`, `channel`, `unscaled` and
/// `id` are scheduler-level and engines may ignore them.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    /// Seconds to wait before the first seek
    pub delay: f32,
    /// Easing curve for the primitive (or the composite playhead)
    pub ease: Ease,
    /// Host update phase that advances this animation
    pub channel: UpdateChannel,
    /// Advance on unscaled frame time, ignoring host time dilation
    pub unscaled: bool,
    /// Round interpolated components to whole numbers when writing
    pub snapping: bool,
    /// Number of iterations; -1 means loop forever
    pub loop_count: i32,
    /// How iterations chain together
    pub loop_style: LoopStyle,
    /// Reinterpret the creation duration as units-per-second; the
    /// engine derives the real duration from the travel distance
    pub speed_based: bool,
    /// Group identifier for id-keyed bulk control
    pub id: Option<String>,
}

impl Default for TweenSpec {
    fn default() -> Self {
        Self {
            delay: 0.0,
            ease: Ease::Linear,
            channel: UpdateChannel::Update,
            unscaled: false,
            snapping: false,
            loop_count: 1,
            loop_style: LoopStyle::Restart,
            speed_based: false,
            id: None,
        }
    }
}

/// One time-driven interpolation (or a composite of them)
///
/// Once [`configure`](Self::configure) has run, the tween is a pure
/// function of local time: the scheduler owns elapsed-time bookkeeping
/// and calls [`seek`](Self::seek) with monotonically increasing values
/// during playback, or arbitrary values on rewind/restart.
pub trait PrimitiveTween: Send {
    /// Apply a resolved configuration. Called once before the first
    /// seek; may be called again if the caller reconfigures a live
    /// animation.
    fn configure(&mut self, spec: &TweenSpec);

    /// Total duration in seconds including loops, after configuration.
    /// `f32::INFINITY` for infinite loops.
    fn duration(&self) -> f32;

    /// Apply the values for local time `t` (seconds since the tween
    /// started playing, delay excluded)
    fn seek(&mut self, t: f32);

    /// Jump to final values (the end of the last iteration; for
    /// infinite loops, the end of the current iteration)
    fn complete(&mut self);

    /// Reset to initial values
    fn rewind(&mut self);
}

/// The external interpolation engine
///
/// Motiva consumes this; it never implements interpolation itself.
pub trait TweenEngine: Send + Sync {
    /// Create a primitive animating `property` from its current value
    /// to `end_value` over `duration` seconds
    ///
    /// Returns `None` when the property's target is already dead —
    /// callers log and degrade rather than erroring.
    fn create(
        &self,
        property: Box<dyn AnimatedProperty>,
        end_value: TweenValue,
        duration: f32,
    ) -> Option<Box<dyn PrimitiveTween>>;

    /// Evaluate a named curve at normalized time `t` in 0.0..=1.0
    ///
    /// Composite timelines use this to warp their playhead, keeping
    /// all curve math on the engine side of the boundary.
    fn ease_value(&self, ease: Ease, t: f32) -> f32;
}
