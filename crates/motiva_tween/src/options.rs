//! Sparse per-call tween options
//!
//! Every field is optional; an absent field inherits from the next
//! layer down (builder override, then preset defaults, then the
//! context's [`TweenDefaults`](crate::defaults::TweenDefaults)).
//! Setters are consuming builders that change exactly one field.

use motiva_core::{Ease, LoopStyle, TweenSpec, UpdateChannel};

use crate::defaults::TweenDefaults;

/// Sparse overrides for one animation
///
/// The sole per-call configuration surface. Fields resolve
/// independently — overriding `ease` says nothing about `delay`.
///
/// # Example
///
/// ```
/// use motiva_tween::TweenOptions;
/// use motiva_core::Ease;
///
/// let opts = TweenOptions::new()
///     .ease(Ease::OutBack)
///     .delay(0.25)
///     .id("intro");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TweenOptions {
    pub(crate) delay: Option<f32>,
    pub(crate) ease: Option<Ease>,
    pub(crate) channel: Option<UpdateChannel>,
    pub(crate) unscaled: Option<bool>,
    pub(crate) snapping: Option<bool>,
    pub(crate) loop_count: Option<i32>,
    pub(crate) loop_style: Option<LoopStyle>,
    pub(crate) speed_based: Option<bool>,
    pub(crate) id: Option<String>,
}

impl TweenOptions {
    /// Options with every field inherited
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds to wait before playback starts
    pub fn delay(mut self, secs: f32) -> Self {
        self.delay = Some(secs);
        self
    }

    /// Easing curve
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Host update phase that advances the animation
    pub fn update_channel(mut self, channel: UpdateChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Advance on unscaled frame time
    pub fn unscaled(mut self, unscaled: bool) -> Self {
        self.unscaled = Some(unscaled);
        self
    }

    /// Round interpolated values to whole numbers
    pub fn snapping(mut self, snapping: bool) -> Self {
        self.snapping = Some(snapping);
        self
    }

    /// Number of iterations; -1 loops forever
    pub fn loop_count(mut self, count: i32) -> Self {
        self.loop_count = Some(count);
        self
    }

    /// How iterations chain together
    pub fn loop_style(mut self, style: LoopStyle) -> Self {
        self.loop_style = Some(style);
        self
    }

    /// Iteration count and style in one call
    pub fn loops(self, count: i32, style: LoopStyle) -> Self {
        self.loop_count(count).loop_style(style)
    }

    /// Treat the creation duration as units-per-second
    pub fn speed_based(mut self, speed_based: bool) -> Self {
        self.speed_based = Some(speed_based);
        self
    }

    /// Group identifier for id-keyed bulk control
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether every field is inherited
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer these options over a fallback, field by field
    ///
    /// A field present here wins; an absent field takes the fallback's
    /// value (which may itself be absent). This is the precedence
    /// ladder: `per_call.or(&builder).or(&preset)` then
    /// [`resolve`](Self::resolve) against the global defaults.
    pub fn or(mut self, fallback: &TweenOptions) -> TweenOptions {
        self.delay = self.delay.or(fallback.delay);
        self.ease = self.ease.or(fallback.ease);
        self.channel = self.channel.or(fallback.channel);
        self.unscaled = self.unscaled.or(fallback.unscaled);
        self.snapping = self.snapping.or(fallback.snapping);
        self.loop_count = self.loop_count.or(fallback.loop_count);
        self.loop_style = self.loop_style.or(fallback.loop_style);
        self.speed_based = self.speed_based.or(fallback.speed_based);
        if self.id.is_none() {
            self.id = fallback.id.clone();
        }
        self
    }

    /// Fill every remaining hole from the global defaults
    pub fn resolve(&self, defaults: &TweenDefaults) -> TweenSpec {
        TweenSpec {
            delay: self.delay.unwrap_or(defaults.delay),
            ease: self.ease.unwrap_or(defaults.ease),
            channel: self.channel.unwrap_or(defaults.channel),
            unscaled: self.unscaled.unwrap_or(defaults.unscaled),
            snapping: self.snapping.unwrap_or(defaults.snapping),
            loop_count: self.loop_count.unwrap_or(defaults.loop_count),
            loop_style: self.loop_style.unwrap_or(defaults.loop_style),
            speed_based: self.speed_based.unwrap_or(defaults.speed_based),
            id: self.id.clone(),
        }
    }
}
