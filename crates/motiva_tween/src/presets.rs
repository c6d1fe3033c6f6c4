//! Named animation recipes
//!
//! A preset is a reusable animation-construction function keyed by
//! string name. The registry is scoped to its context (no static
//! state), fills itself lazily along two independent discovery paths —
//! the fixed built-ins and an explicit provider list — and isolates
//! recipe failures so an externally-authored factory can never take
//! the control surface down with it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use motiva_core::{
    motion_property, Ease, MotionProperty, PrimitiveTween, TargetKey, TargetRef, TweenEngine,
    TweenSpec, TweenValue, Vec3,
};

use crate::context::{ContextHandle, TweenContext};
use crate::error::{Result, TweenError};
use crate::handle::TweenHandle;
use crate::options::TweenOptions;

/// Applicability check: can this recipe animate that target?
pub type PresetPredicate = Arc<dyn Fn(&TargetRef) -> bool + Send + Sync>;

/// Recipe body: build the animation for a target
///
/// Receives the engine, the target, the resolved duration, and the
/// resolved configuration (useful for recipes that branch on it).
/// Returns `None` when the target turns out not to be animatable.
pub type PresetFactory = Arc<
    dyn Fn(&dyn TweenEngine, &TargetRef, f32, &TweenSpec) -> Option<Box<dyn PrimitiveTween>>
        + Send
        + Sync,
>;

/// One named recipe
#[derive(Clone)]
pub struct Preset {
    pub(crate) name: String,
    pub(crate) duration: f32,
    pub(crate) options: TweenOptions,
    pub(crate) applies: PresetPredicate,
    pub(crate) factory: PresetFactory,
}

impl Preset {
    /// A recipe applicable to every target by default
    pub fn new(
        name: impl Into<String>,
        default_duration: f32,
        factory: impl Fn(&dyn TweenEngine, &TargetRef, f32, &TweenSpec) -> Option<Box<dyn PrimitiveTween>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            duration: default_duration,
            options: TweenOptions::new(),
            applies: Arc::new(|_| true),
            factory: Arc::new(factory),
        }
    }

    /// Restrict applicability
    pub fn with_predicate(
        mut self,
        applies: impl Fn(&TargetRef) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applies = Arc::new(applies);
        self
    }

    /// Per-recipe default options (the layer between per-call options
    /// and the global defaults)
    pub fn with_options(mut self, options: TweenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Provider of dynamically-registered recipes
///
/// Stands in for attribute/reflection discovery: hosts hand the
/// registry an explicit list of registration functions, each run once
/// per session.
pub type PresetProvider = Arc<dyn Fn(&mut PresetRegistry) + Send + Sync>;

/// Context-scoped name → recipe store
pub struct PresetRegistry {
    entries: FxHashMap<String, Preset>,
    providers: Vec<PresetProvider>,
    builtins_scanned: bool,
    providers_scanned: bool,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            providers: Vec::new(),
            builtins_scanned: false,
            providers_scanned: false,
        }
    }

    /// Register a recipe; a name collision logs a warning and the new
    /// registration wins
    pub fn register(&mut self, preset: Preset) {
        if self.entries.contains_key(&preset.name) {
            tracing::warn!(preset = %preset.name, "preset re-registered; last registration wins");
        }
        self.entries.insert(preset.name.clone(), preset);
    }

    /// Add a discovery provider, run lazily once per session
    pub fn add_provider(&mut self, provider: impl Fn(&mut PresetRegistry) + Send + Sync + 'static) {
        self.providers.push(Arc::new(provider));
    }

    /// Run any discovery path that has not run this session yet.
    /// Idempotent; each path is guarded by its own flag.
    pub fn ensure_scanned(&mut self) {
        if !self.builtins_scanned {
            self.builtins_scanned = true;
            register_builtin_presets(self);
        }
        if !self.providers_scanned {
            self.providers_scanned = true;
            let providers = self.providers.clone();
            for provider in providers {
                provider(self);
            }
        }
    }

    /// Forget this session's registrations and scan flags; providers
    /// stay and both discovery paths run again on the next lookup
    pub fn reset_session(&mut self) {
        self.entries.clear();
        self.builtins_scanned = false;
        self.providers_scanned = false;
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted known names, for diagnostics
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Built-in recipes
// =============================================================================

/// The fixed built-in recipes over the standard motion surface
pub fn register_builtin_presets(registry: &mut PresetRegistry) {
    registry.register(fade_in());
    registry.register(fade_out());
    registry.register(pop_in());
    registry.register(pop_out());
}

fn supports(prop: MotionProperty) -> impl Fn(&TargetRef) -> bool + Send + Sync {
    move |target| target.motion_value(prop).is_some()
}

/// Opacity from 0 to its current value
fn fade_in() -> Preset {
    Preset::new("fade-in", 0.3, |engine, target, duration, _spec| {
        let current = target.motion_value(MotionProperty::Opacity)?;
        target.set_motion_value(MotionProperty::Opacity, TweenValue::Float(0.0));
        engine.create(
            Box::new(motion_property(target, MotionProperty::Opacity)),
            current,
            duration,
        )
    })
    .with_predicate(supports(MotionProperty::Opacity))
    .with_options(TweenOptions::new().ease(Ease::OutQuad))
}

/// Opacity to 0
fn fade_out() -> Preset {
    Preset::new("fade-out", 0.3, |engine, target, duration, _spec| {
        engine.create(
            Box::new(motion_property(target, MotionProperty::Opacity)),
            TweenValue::Float(0.0),
            duration,
        )
    })
    .with_predicate(supports(MotionProperty::Opacity))
    .with_options(TweenOptions::new().ease(Ease::InQuad))
}

/// Scale from zero back to its current value, overshooting
fn pop_in() -> Preset {
    Preset::new("pop-in", 0.35, |engine, target, duration, _spec| {
        let current = target.motion_value(MotionProperty::Scale)?;
        target.set_motion_value(MotionProperty::Scale, TweenValue::Vec3(Vec3::ZERO));
        engine.create(
            Box::new(motion_property(target, MotionProperty::Scale)),
            current,
            duration,
        )
    })
    .with_predicate(supports(MotionProperty::Scale))
    .with_options(TweenOptions::new().ease(Ease::OutBack))
}

/// Scale down to zero
fn pop_out() -> Preset {
    Preset::new("pop-out", 0.35, |engine, target, duration, _spec| {
        engine.create(
            Box::new(motion_property(target, MotionProperty::Scale)),
            TweenValue::Vec3(Vec3::ZERO),
            duration,
        )
    })
    .with_predicate(supports(MotionProperty::Scale))
    .with_options(TweenOptions::new().ease(Ease::InBack))
}

// =============================================================================
// Playback
// =============================================================================

impl ContextHandle {
    /// Play a named recipe on a target, reporting failures
    ///
    /// `NotFound` carries the sorted known-name list; a panicking
    /// factory is caught and reported as `CreationFailed`, never
    /// propagated.
    pub fn try_play(
        &self,
        name: &str,
        target: &TargetRef,
        duration: Option<f32>,
        options: TweenOptions,
    ) -> Result<TweenHandle> {
        let Some(inner_arc) = self.inner.upgrade() else {
            return Err(TweenError::InvalidState(
                "animation context was dropped".into(),
            ));
        };
        let (preset, defaults) = {
            let mut inner = inner_arc.lock().unwrap();
            let inner = &mut *inner;
            inner.presets.ensure_scanned();
            match inner.presets.get(name) {
                Some(preset) => (preset.clone(), inner.defaults.clone()),
                None => {
                    return Err(TweenError::NotFound {
                        name: name.to_owned(),
                        known: inner.presets.names(),
                    })
                }
            }
        };

        if !(preset.applies)(target) {
            return Err(TweenError::NotApplicable {
                name: name.to_owned(),
            });
        }

        let duration = duration.unwrap_or(preset.duration);
        let spec = options.or(&preset.options).resolve(&defaults);

        // Recipes may be externally authored; a panic in one must not
        // destabilize the control surface.
        let built = catch_unwind(AssertUnwindSafe(|| {
            (preset.factory)(self.engine.as_ref(), target, duration, &spec)
        }))
        .map_err(|panic| TweenError::CreationFailed {
            name: name.to_owned(),
            reason: panic_text(panic),
        })?;

        let Some(mut tween) = built else {
            return Err(TweenError::InvalidTarget);
        };
        tween.configure(&spec);
        Ok(self.register(tween, spec, Some(TargetKey::of(target))))
    }

    /// Play a named recipe on a target
    ///
    /// The graceful boundary form: failures are logged and an inert
    /// handle comes back, so an unknown preset name plays nothing
    /// rather than aborting the caller.
    pub fn play(
        &self,
        name: &str,
        target: &TargetRef,
        duration: Option<f32>,
        options: TweenOptions,
    ) -> TweenHandle {
        match self.try_play(name, target, duration, options) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "preset playback failed");
                TweenHandle::dead(self.clone())
            }
        }
    }
}

impl TweenContext {
    /// See [`ContextHandle::play`]
    pub fn play(
        &self,
        name: &str,
        target: &TargetRef,
        duration: Option<f32>,
        options: TweenOptions,
    ) -> TweenHandle {
        self.handle().play(name, target, duration, options)
    }

    /// See [`ContextHandle::try_play`]
    pub fn try_play(
        &self,
        name: &str,
        target: &TargetRef,
        duration: Option<f32>,
        options: TweenOptions,
    ) -> Result<TweenHandle> {
        self.handle().try_play(name, target, duration, options)
    }

    /// Register a recipe with this context's registry
    pub fn register_preset(&self, preset: Preset) {
        if let Some(inner) = self.handle().inner.upgrade() {
            inner.lock().unwrap().presets.register(preset);
        }
    }

    /// Add a lazy discovery provider
    pub fn add_preset_provider(
        &self,
        provider: impl Fn(&mut PresetRegistry) + Send + Sync + 'static,
    ) {
        if let Some(inner) = self.handle().inner.upgrade() {
            inner.lock().unwrap().presets.add_provider(provider);
        }
    }

    /// Reset the registry session: registrations are forgotten and
    /// both discovery paths run again on the next lookup
    pub fn reset_preset_session(&self) {
        if let Some(inner) = self.handle().inner.upgrade() {
            inner.lock().unwrap().presets.reset_session();
        }
    }

    /// Sorted names of every known recipe (forces discovery)
    pub fn preset_names(&self) -> Vec<String> {
        match self.handle().inner.upgrade() {
            Some(inner) => {
                let mut inner = inner.lock().unwrap();
                inner.presets.ensure_scanned();
                inner.presets.names()
            }
            None => Vec::new(),
        }
    }
}

fn panic_text(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
