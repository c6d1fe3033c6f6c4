//! Staggered composites
//!
//! Builds one composite where the *i*-th animation starts at offset
//! `i × stagger_delay` — offsets come from positions, not durations,
//! so starts stay evenly spaced however long each animation runs, and
//! animations freely overlap past their own offset.

use std::sync::Arc;

use motiva_core::{FnProperty, PrimitiveTween, TweenEngine, TweenValue};

use crate::context::{ContextHandle, TweenContext};
use crate::error::{Result, TweenError};
use crate::handle::TweenHandle;
use crate::options::TweenOptions;
use crate::sequence::{Child, Composite};

/// Which end of the collection staggers first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerDirection {
    /// First to last
    #[default]
    Forward,
    /// Last to first
    Reverse,
    /// Center outward
    FromCenter,
}

type EngineFactory = Box<dyn FnOnce(&dyn TweenEngine) -> Option<Box<dyn PrimitiveTween>> + Send>;

/// Accumulates per-target animations into a staggered composite
///
/// # Example
///
/// ```ignore
/// let handle = StaggerBuilder::new(0.1)
///     .pairs(props, end_positions, 0.5)?
///     .id("cards")
///     .spawn(&ctx);
/// ```
pub struct StaggerBuilder {
    delay: f32,
    direction: StaggerDirection,
    limit: Option<usize>,
    items: Vec<(EngineFactory, TweenOptions)>,
    options: TweenOptions,
}

impl StaggerBuilder {
    /// Builder with the given delay between consecutive starts
    pub fn new(stagger_delay: f32) -> Self {
        Self {
            delay: stagger_delay.max(0.0),
            direction: StaggerDirection::Forward,
            limit: None,
            items: Vec::new(),
            options: TweenOptions::new(),
        }
    }

    /// Stagger last to first
    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    /// Stagger from the center outward
    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    pub fn direction(mut self, direction: StaggerDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Cap the index used for offsets: items past `n` share the n-th
    /// offset
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Composite-level options (id, loops, delay, channel)
    pub fn options(mut self, options: TweenOptions) -> Self {
        self.options = options;
        self
    }

    /// Group id for id-keyed bulk control
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.options = self.options.id(id);
        self
    }

    /// Add one animation, built through the engine at spawn time
    pub fn push(
        self,
        factory: impl FnOnce(&dyn TweenEngine) -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
    ) -> Self {
        self.push_with(factory, TweenOptions::new())
    }

    /// Add one animation with per-item options
    pub fn push_with(
        mut self,
        factory: impl FnOnce(&dyn TweenEngine) -> Option<Box<dyn PrimitiveTween>> + Send + 'static,
        options: TweenOptions,
    ) -> Self {
        self.items.push((Box::new(factory), options));
        self
    }

    /// Add one tween per (property, end value) pair
    ///
    /// A 1:1 mapping is required: mismatched collection lengths are a
    /// construction-time error, never a silent truncation.
    pub fn pairs(
        mut self,
        properties: Vec<FnProperty>,
        ends: Vec<TweenValue>,
        duration: f32,
    ) -> Result<Self> {
        if properties.len() != ends.len() {
            return Err(TweenError::InvalidState(format!(
                "stagger pairs need a 1:1 mapping, got {} properties and {} end values",
                properties.len(),
                ends.len()
            )));
        }
        for (property, end) in properties.into_iter().zip(ends) {
            self = self.push(move |engine| engine.create(Box::new(property), end, duration));
        }
        Ok(self)
    }

    /// Number of accumulated animations
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Offset of the item at `index` out of `total`
    fn offset_for_index(&self, index: usize, total: usize) -> f32 {
        let effective = match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => {
                let center = total / 2;
                if index <= center {
                    center - index
                } else {
                    index - center
                }
            }
        };
        let capped = match self.limit {
            Some(limit) => effective.min(limit),
            None => effective,
        };
        self.delay * capped as f32
    }

    /// Build the composite and register it for playback
    pub fn spawn(self, ctx: &TweenContext) -> TweenHandle {
        self.spawn_handle(&ctx.handle())
    }

    /// Build against a context handle
    pub fn spawn_handle(self, ctx: &ContextHandle) -> TweenHandle {
        let Some(inner_arc) = ctx.inner.upgrade() else {
            tracing::warn!("stagger spawned against a dropped context; returning inert handle");
            return TweenHandle::dead(ctx.clone());
        };
        let defaults = inner_arc.lock().unwrap().defaults.clone();
        drop(inner_arc);

        let total_items = self.items.len();
        let offsets: Vec<f32> = (0..total_items)
            .map(|index| self.offset_for_index(index, total_items))
            .collect();
        let options = self.options.clone();

        let mut children: Vec<Child> = Vec::with_capacity(total_items);
        let mut base: f32 = 0.0;
        for (index, (factory, item_options)) in self.items.into_iter().enumerate() {
            let Some(mut tween) = factory(ctx.engine.as_ref()) else {
                tracing::warn!(index, "stagger item produced no animation; skipping");
                continue;
            };
            let spec = item_options.resolve(&defaults);
            tween.configure(&spec);
            let duration = tween.duration();
            let start = offsets[index] + spec.delay;
            let end = if duration.is_finite() {
                start + duration
            } else {
                f32::INFINITY
            };
            base = base.max(end);
            children.push(Child {
                start,
                duration,
                tween,
                entered: false,
            });
        }

        let mut outer_spec = options.resolve(&defaults);
        if options.ease.is_none() {
            // Same rule as sequences: only an explicit ease warps the
            // composite playhead.
            outer_spec.ease = motiva_core::Ease::Linear;
        }
        let mut composite = Composite::new(Arc::clone(&ctx.engine), children, base);
        composite.configure(&outer_spec);
        ctx.register(Box::new(composite), outer_spec, None)
    }
}

impl TweenContext {
    /// Start a staggered composite builder
    pub fn stagger(&self, stagger_delay: f32) -> StaggerBuilder {
        StaggerBuilder::new(stagger_delay)
    }
}
