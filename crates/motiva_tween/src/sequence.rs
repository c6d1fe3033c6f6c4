//! Sequence building
//!
//! A [`SequenceBuilder`] accumulates ordered/parallel steps and builds
//! them into one composite timeline with well-defined start offsets:
//!
//! - an appended step starts once everything placed before it has
//!   finished (the running max end of the timeline)
//! - a joined step starts at the same offset as the step before it
//! - intervals push the timeline end out; callbacks fire at the
//!   timeline point where they were appended
//!
//! `build` consumes the builder, so a built sequence cannot be
//! mutated. The composite implements
//! [`PrimitiveTween`], which is how the scheduler plays it without
//! knowing it from a primitive.

use std::sync::Arc;

use motiva_core::{
    AnimatedProperty, Ease, LoopStyle, PrimitiveTween, TweenEngine, TweenSpec, TweenValue,
    UpdateChannel,
};

use crate::context::{Callback, ContextHandle, SeqEvent};
use crate::handle::TweenHandle;
use crate::options::TweenOptions;

/// Deferred construction of one step's animation
pub type StepFactory = Box<dyn FnOnce() -> Option<Box<dyn PrimitiveTween>> + Send>;

enum Step {
    Tween {
        factory: StepFactory,
        options: TweenOptions,
        join: bool,
    },
    Interval(f32),
    Callback(Callback),
}

/// Accumulates animation steps into a composite timeline
///
/// # Example
///
/// ```ignore
/// let handle = ctx
///     .sequence()
///     .append_tween(fade_prop, 1.0f32, 0.3)
///     .join_tween(scale_prop, Vec3::ONE, 0.5)
///     .append_interval(0.2)
///     .append_callback(|| tracing::debug!("halfway"))
///     .append_tween(slide_prop, 0.0f32, 0.4)
///     .build();
/// ```
pub struct SequenceBuilder {
    ctx: ContextHandle,
    steps: Vec<Step>,
    options: TweenOptions,
}

impl SequenceBuilder {
    pub fn new(ctx: ContextHandle) -> Self {
        Self {
            ctx,
            steps: Vec::new(),
            options: TweenOptions::new(),
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Append a step that starts after everything before it finishes
    pub fn append(
        self,
        factory: impl FnOnce() -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
    ) -> Self {
        self.append_with(factory, TweenOptions::new())
    }

    /// Append a step with per-step options
    pub fn append_with(
        mut self,
        factory: impl FnOnce() -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
        options: TweenOptions,
    ) -> Self {
        self.steps.push(Step::Tween {
            factory: Box::new(factory),
            options,
            join: false,
        });
        self
    }

    /// Append a step that starts at the same offset as the previous
    /// step
    pub fn join(
        self,
        factory: impl FnOnce() -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
    ) -> Self {
        self.join_with(factory, TweenOptions::new())
    }

    /// Join a step with per-step options
    pub fn join_with(
        mut self,
        factory: impl FnOnce() -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
        options: TweenOptions,
    ) -> Self {
        self.steps.push(Step::Tween {
            factory: Box::new(factory),
            options,
            join: true,
        });
        self
    }

    /// Append a tween built through the context's engine
    pub fn append_tween(
        self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
    ) -> Self {
        self.append_tween_with(property, end, duration, TweenOptions::new())
    }

    pub fn append_tween_with(
        self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
        options: TweenOptions,
    ) -> Self {
        let engine = Arc::clone(&self.ctx.engine);
        let end = end.into();
        self.append_with(
            move || engine.create(Box::new(property), end, duration),
            options,
        )
    }

    /// Join a tween built through the context's engine
    pub fn join_tween(
        self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
    ) -> Self {
        self.join_tween_with(property, end, duration, TweenOptions::new())
    }

    pub fn join_tween_with(
        self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
        options: TweenOptions,
    ) -> Self {
        let engine = Arc::clone(&self.ctx.engine);
        let end = end.into();
        self.join_with(
            move || engine.create(Box::new(property), end, duration),
            options,
        )
    }

    /// Append a pure delay
    pub fn append_interval(mut self, secs: f32) -> Self {
        self.steps.push(Step::Interval(secs.max(0.0)));
        self
    }

    /// Append a side-effecting callback at the current timeline point
    pub fn append_callback(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.steps.push(Step::Callback(Box::new(f)));
        self
    }

    // =========================================================================
    // Composite-level options
    // =========================================================================

    /// Replace all composite-level options at once
    pub fn options(mut self, options: TweenOptions) -> Self {
        self.options = options;
        self
    }

    /// Delay before the whole composite starts
    pub fn delay(mut self, secs: f32) -> Self {
        self.options = self.options.delay(secs);
        self
    }

    /// Ease applied to the composite playhead
    pub fn ease(mut self, ease: Ease) -> Self {
        self.options = self.options.ease(ease);
        self
    }

    /// Loop the whole composite
    pub fn loops(mut self, count: i32, style: LoopStyle) -> Self {
        self.options = self.options.loops(count, style);
        self
    }

    /// Group id for id-keyed bulk control
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.options = self.options.id(id);
        self
    }

    /// Host update phase for the composite
    pub fn update_channel(mut self, channel: UpdateChannel) -> Self {
        self.options = self.options.update_channel(channel);
        self
    }

    /// Advance the composite on unscaled frame time
    pub fn unscaled(mut self, unscaled: bool) -> Self {
        self.options = self.options.unscaled(unscaled);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build the composite and register it for playback
    ///
    /// Consuming the builder is what makes a built sequence immutable.
    /// Steps whose factory yields no animation are skipped with a
    /// warning; the rest of the build proceeds. A dead context yields
    /// an inert handle.
    pub fn build(self) -> TweenHandle {
        let Self { ctx, steps, options } = self;
        let Some(inner_arc) = ctx.inner.upgrade() else {
            tracing::warn!("sequence built against a dropped context; returning inert handle");
            return TweenHandle::dead(ctx);
        };
        let defaults = inner_arc.lock().unwrap().defaults.clone();
        drop(inner_arc);

        let mut placed: Vec<(Child, TweenOptions)> = Vec::new();
        let mut events: Vec<SeqEvent> = Vec::new();
        let mut total: f32 = 0.0;
        let mut last_start: f32 = 0.0;
        // Anything beyond a bare run of appended tweens forces a real
        // composite even for a single animation.
        let mut forced = false;

        for step in steps {
            match step {
                Step::Interval(secs) => {
                    total += secs;
                    forced = true;
                }
                Step::Callback(callback) => {
                    events.push(SeqEvent {
                        at: total,
                        callback,
                        fired: false,
                    });
                    forced = true;
                }
                Step::Tween {
                    factory,
                    options: step_options,
                    join,
                } => {
                    if join {
                        forced = true;
                    }
                    let Some(mut tween) = factory() else {
                        tracing::warn!("sequence step produced no animation; skipping");
                        continue;
                    };
                    let spec = step_options.clone().resolve(&defaults);
                    tween.configure(&spec);
                    let duration = tween.duration();
                    let start = if join { last_start } else { total } + spec.delay;
                    let end = if duration.is_finite() {
                        start + duration
                    } else {
                        f32::INFINITY
                    };
                    last_start = start;
                    total = total.max(end);
                    placed.push((
                        Child {
                            start,
                            duration,
                            tween,
                            entered: false,
                        },
                        step_options,
                    ));
                }
            }
        }

        // Single-animation degrade: identical observable semantics,
        // one less indirection per tick.
        if placed.len() == 1 && events.is_empty() && !forced {
            let (child, step_options) = placed.pop().expect("one placed step");
            let spec = step_options.or(&options).resolve(&defaults);
            let mut tween = child.tween;
            tween.configure(&spec);
            return ctx.register(tween, spec, None);
        }

        let mut outer_spec = options.resolve(&defaults);
        if options.ease.is_none() {
            // The global default ease configures tweens, not composite
            // playheads; only an explicit builder ease warps the
            // timeline.
            outer_spec.ease = Ease::Linear;
        }
        let base = total.max(0.0);
        let children = placed.into_iter().map(|(child, _)| child).collect();
        let mut composite = Composite::new(Arc::clone(&ctx.engine), children, base);
        composite.configure(&outer_spec);
        ctx.register_composite(Box::new(composite), outer_spec, None, events, base)
    }
}

impl crate::context::TweenContext {
    /// Start building a composite timeline
    pub fn sequence(&self) -> SequenceBuilder {
        SequenceBuilder::new(self.handle())
    }
}

impl ContextHandle {
    /// Start building a composite timeline
    pub fn sequence(&self) -> SequenceBuilder {
        SequenceBuilder::new(self.clone())
    }
}

// =============================================================================
// Composite timeline
// =============================================================================

pub(crate) struct Child {
    pub start: f32,
    pub duration: f32,
    pub tween: Box<dyn PrimitiveTween>,
    pub entered: bool,
}

/// An ordered/parallel arrangement of tweens behind one playhead
///
/// Children are pure functions of local time, so the composite just
/// maps its own (looped, possibly ease-warped) playhead into each
/// child's window. Placement order doubles as write order: when two
/// children touch the same property, the later one wins.
pub(crate) struct Composite {
    engine: Arc<dyn TweenEngine>,
    children: Vec<Child>,
    base: f32,
    loop_count: i32,
    loop_style: LoopStyle,
    ease: Ease,
    last_iter: i64,
}

impl Composite {
    pub(crate) fn new(engine: Arc<dyn TweenEngine>, children: Vec<Child>, base: f32) -> Self {
        Self {
            engine,
            children,
            base,
            loop_count: 1,
            loop_style: LoopStyle::Restart,
            ease: Ease::Linear,
            last_iter: 0,
        }
    }
}

impl PrimitiveTween for Composite {
    fn configure(&mut self, spec: &TweenSpec) {
        self.loop_count = spec.loop_count;
        self.loop_style = spec.loop_style;
        self.ease = spec.ease;
    }

    fn duration(&self) -> f32 {
        if !self.base.is_finite() || self.loop_count < 0 {
            f32::INFINITY
        } else {
            self.base * self.loop_count.max(1) as f32
        }
    }

    fn seek(&mut self, t: f32) {
        if self.base <= 0.0 {
            for child in &mut self.children {
                child.tween.complete();
            }
            return;
        }

        let (iter, u, _backward) = loop_position(t, self.base, self.loop_count, self.loop_style);
        if iter != self.last_iter {
            // New iteration: reset children so a restarted pass
            // replays from initial values.
            self.last_iter = iter;
            for child in self.children.iter_mut().rev() {
                child.tween.rewind();
                child.entered = false;
            }
        }

        let warped = if self.ease == Ease::Linear || !self.base.is_finite() {
            u
        } else {
            self.engine.ease_value(self.ease, (u / self.base).clamp(0.0, 1.0)) * self.base
        };

        for child in &mut self.children {
            if warped >= child.start {
                let local = if child.duration.is_finite() {
                    (warped - child.start).min(child.duration)
                } else {
                    warped - child.start
                };
                child.tween.seek(local);
                child.entered = true;
            } else if child.entered {
                // The playhead moved back out of this child's window.
                child.tween.rewind();
                child.entered = false;
            }
        }
    }

    fn complete(&mut self) {
        let total = self.duration();
        if total.is_finite() {
            self.seek(total);
        } else {
            for child in &mut self.children {
                child.tween.complete();
            }
        }
    }

    fn rewind(&mut self) {
        self.last_iter = 0;
        // Reverse order so the earliest writer of a shared property
        // ends up applied last.
        for child in self.children.iter_mut().rev() {
            child.tween.rewind();
            child.entered = false;
        }
    }
}

/// Map absolute local time onto a looped timeline
///
/// Returns `(iteration, position-within-iteration, backward)` where
/// `backward` marks the reverse sweep of an odd yoyo iteration. Times
/// at or past the end of the last iteration clamp into it.
pub(crate) fn loop_position(t: f32, base: f32, loop_count: i32, loop_style: LoopStyle) -> (i64, f32, bool) {
    if base <= 0.0 {
        return (0, 0.0, false);
    }
    let infinite = loop_count < 0;
    let iterations = loop_count.max(1) as i64;
    let total = base * iterations as f32;

    let (iter, u) = if t <= 0.0 {
        (0, 0.0)
    } else if !infinite && t >= total {
        (iterations - 1, base)
    } else {
        let iter = (t / base).floor() as i64;
        (iter, t - iter as f32 * base)
    };

    let backward = loop_style == LoopStyle::Yoyo && iter % 2 == 1;
    let u = if backward { base - u } else { u };
    (iter, u, backward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_position_single_iteration() {
        assert_eq!(loop_position(0.0, 1.0, 1, LoopStyle::Restart), (0, 0.0, false));
        assert_eq!(loop_position(0.5, 1.0, 1, LoopStyle::Restart), (0, 0.5, false));
        // Past the end clamps into the last iteration
        assert_eq!(loop_position(2.0, 1.0, 1, LoopStyle::Restart), (0, 1.0, false));
    }

    #[test]
    fn test_loop_position_restart() {
        let (iter, u, backward) = loop_position(2.5, 1.0, 4, LoopStyle::Restart);
        assert_eq!(iter, 2);
        assert!((u - 0.5).abs() < 1e-6);
        assert!(!backward);
    }

    #[test]
    fn test_loop_position_yoyo_reverses_odd_iterations() {
        let (iter, u, backward) = loop_position(1.25, 1.0, 2, LoopStyle::Yoyo);
        assert_eq!(iter, 1);
        assert!(backward);
        assert!((u - 0.75).abs() < 1e-6);

        // Yoyo with an even iteration count ends back at the start
        let (_, u, backward) = loop_position(2.0, 1.0, 2, LoopStyle::Yoyo);
        assert!(backward);
        assert!(u.abs() < 1e-6);
    }

    #[test]
    fn test_loop_position_zero_base() {
        assert_eq!(loop_position(5.0, 0.0, 3, LoopStyle::Restart), (0, 0.0, false));
    }
}
