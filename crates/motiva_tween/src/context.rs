//! Animation context and scheduler
//!
//! [`TweenContext`] owns every live animation plus the defaults and
//! preset registry scoped to it. The host drives progression by
//! calling [`tick`](TweenContext::tick) (or
//! [`tick_channel`](TweenContext::tick_channel)) from its per-frame
//! update loop; nothing advances on a background thread.
//!
//! Cloneable [`ContextHandle`]s hold the context weakly: every
//! operation through a handle upgrades first and silently no-ops once
//! the context is gone, so handles can be stored anywhere without
//! keeping the animation system alive.
//!
//! Callbacks are always invoked after the internal lock is released —
//! a completion callback may freely start, kill, or query other
//! animations.

use std::any::Any;
use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use motiva_core::{
    AnimatedProperty, FrameDelta, PrimitiveTween, TargetKey, TweenEngine, TweenSpec, TweenValue,
    UpdateChannel,
};

use crate::awaiting::Watcher;
use crate::defaults::TweenDefaults;
use crate::handle::TweenHandle;
use crate::options::TweenOptions;
use crate::presets::PresetRegistry;
use crate::sequence::loop_position;

new_key_type! {
    /// Key of a live animation inside its context
    pub struct AnimationId;
}

/// Side-effect callback attached to an animation
pub(crate) type Callback = Box<dyn FnMut() + Send>;
/// Per-tick callback; receives elapsed local time
pub(crate) type UpdateCallback = Box<dyn FnMut(f32) + Send>;
/// Weak lifetime anchor to an owning entity
pub(crate) type OwnerWeak = Weak<dyn Any + Send + Sync>;

/// Playback state of one entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayState {
    /// Counting down its pre-play delay (zero-delay entries pass
    /// through on their first tick, which is when `on_play` fires)
    Delayed,
    Playing,
    Paused,
}

#[derive(Default)]
pub(crate) struct Callbacks {
    pub on_complete: SmallVec<[Callback; 1]>,
    pub on_kill: SmallVec<[Callback; 1]>,
    pub on_play: SmallVec<[Callback; 1]>,
    pub on_pause: SmallVec<[Callback; 1]>,
    pub on_update: SmallVec<[UpdateCallback; 1]>,
}

/// A callback-step marker inside a composite's timeline
pub(crate) struct SeqEvent {
    pub at: f32,
    pub callback: Callback,
    pub fired: bool,
}

/// One live animation: the tween plus all orchestration state
pub(crate) struct Entry {
    pub tween: Box<dyn PrimitiveTween>,
    pub spec: TweenSpec,
    pub state: PlayState,
    /// Local time fed to `seek`, delay excluded
    pub elapsed: f32,
    pub delay_left: f32,
    /// Per-animation playback rate multiplier
    pub rate: f32,
    pub target: Option<TargetKey>,
    pub owner: Option<OwnerWeak>,
    pub owner_key: Option<usize>,
    pub callbacks: Callbacks,
    /// Callback-step markers, in unwarped composite-local time
    pub events: Vec<SeqEvent>,
    /// One iteration of the composite the events belong to
    pub event_base: f32,
    pub event_iter: i64,
}

impl Entry {
    fn new(tween: Box<dyn PrimitiveTween>, spec: TweenSpec) -> Self {
        let delay_left = spec.delay.max(0.0);
        Self {
            tween,
            spec,
            state: PlayState::Delayed,
            elapsed: 0.0,
            delay_left,
            rate: 1.0,
            target: None,
            owner: None,
            owner_key: None,
            callbacks: Callbacks::default(),
            events: Vec::new(),
            event_base: 0.0,
            event_iter: 0,
        }
    }

    fn advances_on(&self, channel: UpdateChannel) -> bool {
        self.spec.channel == channel
    }
}

pub(crate) struct ContextInner {
    pub entries: SlotMap<AnimationId, Entry>,
    /// Owner pointer identity -> linked animations
    pub owners: FxHashMap<usize, SmallVec<[AnimationId; 4]>>,
    /// Timeout/cancellation watchdogs, ticked on unscaled Update time
    pub watchers: Vec<Watcher>,
    pub defaults: TweenDefaults,
    pub presets: PresetRegistry,
    pub time_scale: f32,
}

/// The caller-owned animation context
///
/// Everything is scoped to this object — dropping it kills the whole
/// animation system, and handles left behind no-op gracefully.
///
/// # Example
///
/// ```ignore
/// let ctx = TweenContext::new(engine);
/// let handle = ctx.animate(prop, 1.0f32, 0.5, TweenOptions::new());
/// // each frame:
/// ctx.tick(FrameDelta::uniform(dt));
/// ```
pub struct TweenContext {
    engine: Arc<dyn TweenEngine>,
    inner: Arc<Mutex<ContextInner>>,
}

impl TweenContext {
    /// Context with default configuration
    pub fn new(engine: Arc<dyn TweenEngine>) -> Self {
        Self::with_defaults(engine, TweenDefaults::default())
    }

    /// Context with host-supplied defaults
    pub fn with_defaults(engine: Arc<dyn TweenEngine>, defaults: TweenDefaults) -> Self {
        let time_scale = defaults.time_scale;
        Self {
            engine,
            inner: Arc::new(Mutex::new(ContextInner {
                entries: SlotMap::with_key(),
                owners: FxHashMap::default(),
                watchers: Vec::new(),
                defaults,
                presets: PresetRegistry::new(),
                time_scale,
            })),
        }
    }

    /// A weak handle for passing into components
    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            engine: Arc::clone(&self.engine),
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The engine this context creates primitives through
    pub fn engine(&self) -> &Arc<dyn TweenEngine> {
        &self.engine
    }

    /// Replace the global defaults (explicit reinitialization)
    pub fn set_defaults(&self, defaults: TweenDefaults) {
        let mut inner = self.inner.lock().unwrap();
        inner.time_scale = defaults.time_scale;
        inner.defaults = defaults;
    }

    /// Current global defaults
    pub fn defaults(&self) -> TweenDefaults {
        self.inner.lock().unwrap().defaults.clone()
    }

    /// Set the context-wide time scale applied to scaled deltas
    pub fn set_time_scale(&self, scale: f32) {
        self.inner.lock().unwrap().time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.inner.lock().unwrap().time_scale
    }

    /// Create a tween animating `property` to `end` over `duration`
    /// seconds. See [`ContextHandle::animate`].
    pub fn animate(
        &self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
        options: TweenOptions,
    ) -> TweenHandle {
        self.handle().animate(property, end, duration, options)
    }

    /// Advance Update-channel animations by one frame
    pub fn tick(&self, delta: FrameDelta) {
        self.tick_channel(UpdateChannel::Update, delta);
    }

    /// Advance one update channel by one frame
    pub fn tick_channel(&self, channel: UpdateChannel, delta: FrameDelta) {
        let handle = self.handle();
        if channel == UpdateChannel::Update {
            handle.tick_watchers(delta.unscaled);
        }
        handle.tick_entries(channel, delta);
    }
}

/// A weak, cloneable reference to a [`TweenContext`]
///
/// Handed to sequence builders, presets, and [`TweenHandle`]s. Every
/// operation no-ops (returning dead handles or zero counts) once the
/// context has been dropped.
#[derive(Clone)]
pub struct ContextHandle {
    pub(crate) engine: Arc<dyn TweenEngine>,
    pub(crate) inner: Weak<Mutex<ContextInner>>,
}

impl ContextHandle {
    /// Whether the context is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Create a tween animating `property` to `end` over `duration`
    /// seconds
    ///
    /// Options resolve against the context defaults. An invalid
    /// (dead) target is not an error: the engine declines to create,
    /// a warning is logged, and an inert handle comes back so
    /// per-frame caller logic is never interrupted.
    pub fn animate(
        &self,
        property: impl AnimatedProperty + 'static,
        end: impl Into<TweenValue>,
        duration: f32,
        options: TweenOptions,
    ) -> TweenHandle {
        let Some(inner) = self.inner.upgrade() else {
            return TweenHandle::dead(self.clone());
        };
        let spec = {
            let inner = inner.lock().unwrap();
            options.resolve(&inner.defaults)
        };
        match self.engine.create(Box::new(property), end.into(), duration) {
            Some(mut tween) => {
                tween.configure(&spec);
                self.register(tween, spec, None)
            }
            None => {
                tracing::warn!("animation target is invalid; returning inert handle");
                TweenHandle::dead(self.clone())
            }
        }
    }

    /// Register a configured tween and return its handle
    pub(crate) fn register(
        &self,
        tween: Box<dyn PrimitiveTween>,
        spec: TweenSpec,
        target: Option<TargetKey>,
    ) -> TweenHandle {
        self.register_composite(tween, spec, target, Vec::new(), 0.0)
    }

    /// Register a tween together with its callback-step markers
    pub(crate) fn register_composite(
        &self,
        tween: Box<dyn PrimitiveTween>,
        spec: TweenSpec,
        target: Option<TargetKey>,
        events: Vec<SeqEvent>,
        event_base: f32,
    ) -> TweenHandle {
        let Some(inner) = self.inner.upgrade() else {
            return TweenHandle::dead(self.clone());
        };
        let mut entry = Entry::new(tween, spec);
        entry.target = target;
        entry.events = events;
        entry.event_base = event_base;
        let id = inner.lock().unwrap().entries.insert(entry);
        TweenHandle::new(id, self.clone())
    }

    /// Apply a function to a live entry, if any
    pub(crate) fn with_entry<R>(
        &self,
        id: AnimationId,
        f: impl FnOnce(&mut Entry) -> R,
    ) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut inner = inner.lock().unwrap();
        inner.entries.get_mut(id).map(f)
    }

    pub(crate) fn add_watcher(&self, watcher: Watcher) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().watchers.push(watcher);
        }
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    pub(crate) fn tick_entries(&self, channel: UpdateChannel, delta: FrameDelta) {
        let Some(inner_arc) = self.inner.upgrade() else {
            return;
        };

        let mut started: Vec<(AnimationId, SmallVec<[Callback; 1]>)> = Vec::new();
        let mut updates: Vec<(AnimationId, f32, SmallVec<[UpdateCallback; 1]>)> = Vec::new();
        let mut due_events: Vec<(AnimationId, Vec<SeqEvent>, SmallVec<[usize; 2]>)> = Vec::new();
        let mut owner_killed: Vec<Entry> = Vec::new();
        let mut finished: Vec<Entry> = Vec::new();

        {
            let mut inner = inner_arc.lock().unwrap();
            let time_scale = inner.time_scale;
            let ids: Vec<AnimationId> = inner
                .entries
                .iter()
                .filter(|(_, e)| e.advances_on(channel))
                .map(|(id, _)| id)
                .collect();

            for id in ids {
                let Some(entry) = inner.entries.get_mut(id) else {
                    continue;
                };

                // Lifecycle link: a dead owner force-kills before any
                // completion callback can fire.
                if let Some(owner) = &entry.owner {
                    if owner.strong_count() == 0 {
                        let entry = inner.entries.remove(id).expect("entry present");
                        unlink_owner(&mut inner, id, &entry);
                        owner_killed.push(entry);
                        continue;
                    }
                }

                if entry.state == PlayState::Paused {
                    continue;
                }

                let base_dt = if entry.spec.unscaled {
                    delta.unscaled
                } else {
                    delta.scaled * time_scale
                };
                let mut dt = base_dt * entry.rate;
                if dt <= 0.0 {
                    continue;
                }

                if entry.state == PlayState::Delayed {
                    if entry.delay_left > dt {
                        entry.delay_left -= dt;
                        continue;
                    }
                    dt -= entry.delay_left;
                    entry.delay_left = 0.0;
                    entry.state = PlayState::Playing;
                    if !entry.callbacks.on_play.is_empty() {
                        started.push((id, std::mem::take(&mut entry.callbacks.on_play)));
                    }
                }

                entry.elapsed += dt;
                let total = entry.tween.duration();
                let done = entry.elapsed >= total;
                if done {
                    entry.elapsed = total;
                    entry.tween.complete();
                } else {
                    entry.tween.seek(entry.elapsed);
                }

                if !entry.callbacks.on_update.is_empty() {
                    updates.push((
                        id,
                        entry.elapsed,
                        std::mem::take(&mut entry.callbacks.on_update),
                    ));
                }
                if !entry.events.is_empty() {
                    if let Some((events, due)) = collect_due_events(entry) {
                        due_events.push((id, events, due));
                    }
                }

                if done {
                    let entry = inner.entries.remove(id).expect("entry present");
                    unlink_owner(&mut inner, id, &entry);
                    finished.push(entry);
                }
            }
        }

        // All callbacks fire with the lock released; they may freely
        // reach back into the context.
        for (id, mut callbacks) in started {
            fire(&mut callbacks);
            self.restore_on_play(id, callbacks);
        }
        for (id, elapsed, mut callbacks) in updates {
            for cb in callbacks.iter_mut() {
                cb(elapsed);
            }
            self.restore_on_update(id, callbacks);
        }
        for (id, mut events, due) in due_events {
            for &idx in &due {
                (events[idx].callback)();
            }
            self.restore_events(id, events);
        }
        for mut entry in owner_killed {
            fire(&mut entry.callbacks.on_kill);
        }
        for mut entry in finished {
            fire(&mut entry.callbacks.on_complete);
            fire(&mut entry.callbacks.on_kill);
        }
    }

    pub(crate) fn tick_watchers(&self, dt: f32) {
        let Some(inner_arc) = self.inner.upgrade() else {
            return;
        };

        let mut cancelled: Vec<(AnimationId, Watcher)> = Vec::new();
        let mut timed_out: Vec<AnimationId> = Vec::new();
        {
            let mut guard = inner_arc.lock().unwrap();
            let inner = &mut *guard;
            let mut keep: Vec<Watcher> = Vec::with_capacity(inner.watchers.len());
            for mut watcher in inner.watchers.drain(..) {
                if watcher.is_resolved() || !inner.entries.contains_key(watcher.target()) {
                    continue;
                }
                if watcher.is_cancelled() {
                    cancelled.push((watcher.target(), watcher));
                    continue;
                }
                if watcher.expire(dt) {
                    timed_out.push(watcher.target());
                    continue;
                }
                keep.push(watcher);
            }
            inner.watchers = keep;
        }

        for (id, watcher) in cancelled {
            // Resolve first so the kill's own signal is a no-op.
            watcher.resolve_cancelled();
            self.kill_ids(&[id], false);
        }
        for id in timed_out {
            // The kill resolves the awaitable as "not completed".
            self.kill_ids(&[id], false);
        }
    }

    // =========================================================================
    // Kill / complete / pause / resume / rewind cores
    // =========================================================================

    /// Remove entries; optionally force final values first
    ///
    /// `on_kill` (and, for completing kills, `on_complete`) fires
    /// before this returns. Returns the number of animations removed.
    pub(crate) fn kill_ids(&self, ids: &[AnimationId], complete: bool) -> usize {
        let Some(inner_arc) = self.inner.upgrade() else {
            return 0;
        };
        let mut removed: Vec<Entry> = Vec::new();
        {
            let mut inner = inner_arc.lock().unwrap();
            for &id in ids {
                if let Some(entry) = inner.entries.remove(id) {
                    unlink_owner(&mut inner, id, &entry);
                    removed.push(entry);
                }
            }
        }
        let count = removed.len();
        for mut entry in removed {
            if complete {
                entry.tween.complete();
                fire(&mut entry.callbacks.on_complete);
            }
            fire(&mut entry.callbacks.on_kill);
        }
        count
    }

    /// Finish entries now: final values, completion callbacks, removal
    pub(crate) fn complete_ids(&self, ids: &[AnimationId]) -> usize {
        self.kill_ids(ids, true)
    }

    /// Pause entries; counts only those whose state changed
    pub(crate) fn pause_ids(&self, ids: &[AnimationId]) -> usize {
        let Some(inner_arc) = self.inner.upgrade() else {
            return 0;
        };
        let mut paused: Vec<(AnimationId, SmallVec<[Callback; 1]>)> = Vec::new();
        {
            let mut inner = inner_arc.lock().unwrap();
            for &id in ids {
                if let Some(entry) = inner.entries.get_mut(id) {
                    if entry.state != PlayState::Paused {
                        entry.state = PlayState::Paused;
                        paused.push((id, std::mem::take(&mut entry.callbacks.on_pause)));
                    }
                }
            }
        }
        let count = paused.len();
        for (id, mut callbacks) in paused {
            fire(&mut callbacks);
            self.restore_on_pause(id, callbacks);
        }
        count
    }

    /// Resume paused entries; counts only those whose state changed
    pub(crate) fn resume_ids(&self, ids: &[AnimationId]) -> usize {
        let Some(inner_arc) = self.inner.upgrade() else {
            return 0;
        };
        let mut resumed: Vec<(AnimationId, SmallVec<[Callback; 1]>)> = Vec::new();
        {
            let mut inner = inner_arc.lock().unwrap();
            for &id in ids {
                if let Some(entry) = inner.entries.get_mut(id) {
                    if entry.state == PlayState::Paused {
                        entry.state = if entry.delay_left > 0.0 {
                            PlayState::Delayed
                        } else {
                            PlayState::Playing
                        };
                        resumed.push((id, std::mem::take(&mut entry.callbacks.on_play)));
                    }
                }
            }
        }
        let count = resumed.len();
        for (id, mut callbacks) in resumed {
            fire(&mut callbacks);
            self.restore_on_play(id, callbacks);
        }
        count
    }

    /// Reset entries to their initial values and pause them
    pub(crate) fn rewind_ids(&self, ids: &[AnimationId]) -> usize {
        let Some(inner_arc) = self.inner.upgrade() else {
            return 0;
        };
        let mut inner = inner_arc.lock().unwrap();
        let mut count = 0;
        for &id in ids {
            if let Some(entry) = inner.entries.get_mut(id) {
                entry.elapsed = 0.0;
                entry.delay_left = entry.spec.delay.max(0.0);
                entry.state = PlayState::Paused;
                entry.event_iter = 0;
                for ev in &mut entry.events {
                    ev.fired = false;
                }
                entry.tween.rewind();
                count += 1;
            }
        }
        count
    }

    // =========================================================================
    // Callback restoration (fired lists go back unless the entry died)
    // =========================================================================

    fn restore_on_play(&self, id: AnimationId, fired: SmallVec<[Callback; 1]>) {
        self.with_entry(id, |entry| {
            let added = std::mem::replace(&mut entry.callbacks.on_play, fired);
            entry.callbacks.on_play.extend(added);
        });
    }

    fn restore_on_pause(&self, id: AnimationId, fired: SmallVec<[Callback; 1]>) {
        self.with_entry(id, |entry| {
            let added = std::mem::replace(&mut entry.callbacks.on_pause, fired);
            entry.callbacks.on_pause.extend(added);
        });
    }

    fn restore_on_update(&self, id: AnimationId, fired: SmallVec<[UpdateCallback; 1]>) {
        self.with_entry(id, |entry| {
            let added = std::mem::replace(&mut entry.callbacks.on_update, fired);
            entry.callbacks.on_update.extend(added);
        });
    }

    fn restore_events(&self, id: AnimationId, events: Vec<SeqEvent>) {
        self.with_entry(id, |entry| {
            entry.events = events;
        });
    }
}

/// Mark events newly crossed by the playhead; returns the taken event
/// list plus the indices that fire this tick
fn collect_due_events(entry: &mut Entry) -> Option<(Vec<SeqEvent>, SmallVec<[usize; 2]>)> {
    const EPS: f32 = 1e-6;
    let (iter, u, backward) = loop_position(
        entry.elapsed,
        entry.event_base,
        entry.spec.loop_count,
        entry.spec.loop_style,
    );
    if iter != entry.event_iter {
        for ev in &mut entry.events {
            ev.fired = false;
        }
        entry.event_iter = iter;
    }
    // Callback steps fire on forward crossings only.
    if backward {
        return None;
    }
    let mut due: SmallVec<[usize; 2]> = SmallVec::new();
    for (idx, ev) in entry.events.iter_mut().enumerate() {
        if !ev.fired && u + EPS >= ev.at {
            ev.fired = true;
            due.push(idx);
        }
    }
    if due.is_empty() {
        None
    } else {
        Some((std::mem::take(&mut entry.events), due))
    }
}

fn unlink_owner(inner: &mut ContextInner, id: AnimationId, entry: &Entry) {
    if let Some(key) = entry.owner_key {
        if let Some(list) = inner.owners.get_mut(&key) {
            list.retain(|x| *x != id);
            if list.is_empty() {
                inner.owners.remove(&key);
            }
        }
    }
}

pub(crate) fn fire(callbacks: &mut SmallVec<[Callback; 1]>) {
    for cb in callbacks.iter_mut() {
        cb();
    }
}
