//! Motiva Tween Orchestration
//!
//! A configuration-and-orchestration layer over an external
//! time-driven interpolation engine. The engine interpolates; this
//! crate does everything around it:
//!
//! - **Options resolution**: sparse [`TweenOptions`] layered per-call >
//!   builder > preset defaults > [`TweenDefaults`], each field resolved
//!   independently
//! - **Sequences**: ordered/parallel steps, intervals, and callbacks
//!   composed into one timeline with well-defined start offsets
//! - **Lifecycle links**: animations force-killed when their owning
//!   entity goes away
//! - **Presets**: a context-scoped name → recipe registry with lazy
//!   discovery and failure isolation
//! - **Bulk control**: pause/resume/kill/complete/rewind by target,
//!   by id, or globally, with affected counts
//! - **Awaitable completion**: callback-based completion bridged into
//!   futures with timeout and cancellation races that resolve exactly
//!   once
//! - **Stagger**: evenly spaced start offsets across many targets
//!
//! Everything is scoped to a [`TweenContext`] the caller owns and
//! ticks from its per-frame update loop. There are no global
//! registries and no background threads.
//!
//! # Example
//!
//! ```ignore
//! use motiva_tween::{TweenContext, TweenOptions};
//! use motiva_core::FrameDelta;
//!
//! let ctx = TweenContext::new(engine);
//! let handle = ctx.play("pop-in", &widget, Some(0.4), TweenOptions::new());
//!
//! // each frame:
//! ctx.tick(FrameDelta::uniform(dt));
//! ```

pub mod awaiting;
pub mod context;
pub mod control;
pub mod defaults;
pub mod error;
pub mod handle;
pub mod options;
pub mod presets;
pub mod sequence;
pub mod stagger;

pub use awaiting::{CancelToken, CancellableCompletion, Completion};
pub use context::{AnimationId, ContextHandle, TweenContext};
pub use defaults::TweenDefaults;
pub use error::{Result, TweenError};
pub use handle::TweenHandle;
pub use options::TweenOptions;
pub use presets::{
    register_builtin_presets, Preset, PresetFactory, PresetPredicate, PresetProvider,
    PresetRegistry,
};
pub use sequence::{SequenceBuilder, StepFactory};
pub use stagger::{StaggerBuilder, StaggerDirection};
