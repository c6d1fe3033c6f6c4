//! Caller-facing animation handles
//!
//! A [`TweenHandle`] wraps one live animation (primitive or composite)
//! inside a context. It never owns the target entity, and every
//! operation no-ops gracefully once the animation or its context is
//! gone — an inert ("dead") handle is indistinguishable from one whose
//! animation already finished.

use std::any::Any;
use std::sync::{Arc, Weak};

use motiva_core::{Ease, LoopStyle, TargetKey, UpdateChannel};

use crate::context::{AnimationId, ContextHandle, OwnerWeak};

/// Control object for one live animation
///
/// Cheap to clone; clones refer to the same animation.
#[derive(Clone)]
pub struct TweenHandle {
    pub(crate) id: AnimationId,
    pub(crate) ctx: ContextHandle,
}

impl std::fmt::Debug for TweenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenHandle").field("id", &self.id).finish()
    }
}

impl TweenHandle {
    pub(crate) fn new(id: AnimationId, ctx: ContextHandle) -> Self {
        Self { id, ctx }
    }

    /// An inert handle: every operation no-ops
    pub(crate) fn dead(ctx: ContextHandle) -> Self {
        Self {
            id: AnimationId::default(),
            ctx,
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Whether the animation is still registered (not completed or
    /// killed)
    pub fn is_active(&self) -> bool {
        self.ctx.with_entry(self.id, |_| ()).is_some()
    }

    /// Whether the animation is advancing (delaying counts as playing)
    pub fn is_playing(&self) -> bool {
        self.ctx
            .with_entry(self.id, |e| e.state != crate::context::PlayState::Paused)
            .unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.ctx
            .with_entry(self.id, |e| e.state == crate::context::PlayState::Paused)
            .unwrap_or(false)
    }

    /// Local time in seconds, delay excluded; 0.0 once dead
    pub fn elapsed(&self) -> f32 {
        self.ctx.with_entry(self.id, |e| e.elapsed).unwrap_or(0.0)
    }

    /// Total duration in seconds including loops; 0.0 once dead
    pub fn duration(&self) -> f32 {
        self.ctx
            .with_entry(self.id, |e| e.tween.duration())
            .unwrap_or(0.0)
    }

    /// The id-keyed control group this animation belongs to, if any
    pub fn group_id(&self) -> Option<String> {
        self.ctx
            .with_entry(self.id, |e| e.spec.id.clone())
            .flatten()
    }

    // =========================================================================
    // Playback control
    // =========================================================================

    /// Pause playback; returns whether anything changed
    pub fn pause(&self) -> bool {
        self.ctx.pause_ids(&[self.id]) > 0
    }

    /// Resume paused playback; returns whether anything changed
    pub fn resume(&self) -> bool {
        self.ctx.resume_ids(&[self.id]) > 0
    }

    /// Alias for [`resume`](Self::resume)
    pub fn play(&self) -> bool {
        self.resume()
    }

    /// Remove the animation. `on_kill` fires before this returns.
    pub fn kill(&self) -> bool {
        self.ctx.kill_ids(&[self.id], false) > 0
    }

    /// Force final values onto the target, then remove. Fires
    /// `on_complete` then `on_kill` before returning.
    pub fn kill_complete(&self) -> bool {
        self.ctx.kill_ids(&[self.id], true) > 0
    }

    /// Finish now: final values, completion callbacks, removal
    pub fn complete(&self) -> bool {
        self.ctx.complete_ids(&[self.id]) > 0
    }

    /// Reset to initial values and pause
    pub fn rewind(&self) -> bool {
        self.ctx.rewind_ids(&[self.id]) > 0
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_ease(&self, ease: Ease) -> &Self {
        self.reconfigure(|spec| spec.ease = ease)
    }

    /// Change the pre-play delay; restarts the countdown if the
    /// animation has not started playing yet
    pub fn set_delay(&self, secs: f32) -> &Self {
        self.ctx.with_entry(self.id, |e| {
            e.spec.delay = secs.max(0.0);
            if e.state == crate::context::PlayState::Delayed {
                e.delay_left = e.spec.delay;
            }
        });
        self
    }

    pub fn set_loops(&self, count: i32, style: LoopStyle) -> &Self {
        self.reconfigure(|spec| {
            spec.loop_count = count;
            spec.loop_style = style;
        })
    }

    pub fn set_update_channel(&self, channel: UpdateChannel) -> &Self {
        self.ctx.with_entry(self.id, |e| e.spec.channel = channel);
        self
    }

    pub fn set_unscaled(&self, unscaled: bool) -> &Self {
        self.ctx.with_entry(self.id, |e| e.spec.unscaled = unscaled);
        self
    }

    pub fn set_snapping(&self, snapping: bool) -> &Self {
        self.reconfigure(|spec| spec.snapping = snapping)
    }

    pub fn set_speed_based(&self, speed_based: bool) -> &Self {
        self.reconfigure(|spec| spec.speed_based = speed_based)
    }

    /// Assign the id-keyed control group
    pub fn set_id(&self, id: impl Into<String>) -> &Self {
        let id = id.into();
        self.ctx.with_entry(self.id, |e| e.spec.id = Some(id));
        self
    }

    /// Key this animation for target-keyed bulk control
    pub fn set_target(&self, key: TargetKey) -> &Self {
        self.ctx.with_entry(self.id, |e| e.target = Some(key));
        self
    }

    /// Per-animation playback rate (1.0 = normal speed)
    pub fn set_playback_rate(&self, rate: f32) -> &Self {
        self.ctx.with_entry(self.id, |e| e.rate = rate.max(0.0));
        self
    }

    /// Tie this animation's lifetime to an owning entity
    ///
    /// The entity is held weakly and inspected only for liveness: once
    /// its last `Arc` drops, the animation is force-killed on the next
    /// tick, before any completion callback could fire. Pair with
    /// [`release_owned`](crate::context::ContextHandle::release_owned)
    /// in the entity's own teardown path for synchronous cleanup.
    pub fn link<T: Any + Send + Sync>(&self, owner: &Arc<T>) -> &Self {
        let weak: OwnerWeak = {
            let w: Weak<T> = Arc::downgrade(owner);
            w
        };
        let key = Arc::as_ptr(owner) as *const () as usize;
        if let Some(inner) = self.ctx.inner.upgrade() {
            let mut guard = inner.lock().unwrap();
            let inner = &mut *guard;
            if let Some(entry) = inner.entries.get_mut(self.id) {
                // Re-linking moves the animation to the new owner.
                if let Some(old) = entry.owner_key.take() {
                    if let Some(list) = inner.owners.get_mut(&old) {
                        list.retain(|x| *x != self.id);
                        if list.is_empty() {
                            inner.owners.remove(&old);
                        }
                    }
                }
                entry.owner = Some(weak);
                entry.owner_key = Some(key);
                inner.owners.entry(key).or_default().push(self.id);
            }
        }
        self
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Run when the animation reaches its final values (naturally or
    /// via a completing kill)
    pub fn on_complete(&self, f: impl FnMut() + Send + 'static) -> &Self {
        self.ctx
            .with_entry(self.id, |e| e.callbacks.on_complete.push(Box::new(f)));
        self
    }

    /// Run when the animation is removed, for any reason
    pub fn on_kill(&self, f: impl FnMut() + Send + 'static) -> &Self {
        self.ctx
            .with_entry(self.id, |e| e.callbacks.on_kill.push(Box::new(f)));
        self
    }

    /// Run when playback starts (after any delay) or resumes
    pub fn on_play(&self, f: impl FnMut() + Send + 'static) -> &Self {
        self.ctx
            .with_entry(self.id, |e| e.callbacks.on_play.push(Box::new(f)));
        self
    }

    pub fn on_pause(&self, f: impl FnMut() + Send + 'static) -> &Self {
        self.ctx
            .with_entry(self.id, |e| e.callbacks.on_pause.push(Box::new(f)));
        self
    }

    /// Run every tick the animation advances; receives elapsed local
    /// time
    pub fn on_update(&self, f: impl FnMut(f32) + Send + 'static) -> &Self {
        self.ctx
            .with_entry(self.id, |e| e.callbacks.on_update.push(Box::new(f)));
        self
    }

    fn reconfigure(&self, f: impl FnOnce(&mut motiva_core::TweenSpec)) -> &Self {
        self.ctx.with_entry(self.id, |e| {
            f(&mut e.spec);
            e.tween.configure(&e.spec);
        });
        self
    }
}
