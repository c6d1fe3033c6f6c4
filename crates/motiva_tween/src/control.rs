//! Bulk control surface
//!
//! Target-keyed, id-keyed, and global operations over live animations.
//! Every operation returns the affected count and no-ops gracefully —
//! an empty match is count 0, not an error. "Kill with complete"
//! forces final values onto targets before removal, so cancellation
//! still leaves a deterministic end state.

use std::sync::Arc;

use motiva_core::TargetKey;

use crate::context::{AnimationId, ContextHandle, PlayState, TweenContext};

/// Which live animations an operation addresses
#[derive(Clone, Copy)]
enum Matcher<'a> {
    All,
    Id(&'a str),
    Target(TargetKey),
}

impl ContextHandle {
    fn matching(&self, matcher: Matcher<'_>) -> Vec<AnimationId> {
        let Some(inner) = self.inner.upgrade() else {
            return Vec::new();
        };
        let inner = inner.lock().unwrap();
        inner
            .entries
            .iter()
            .filter(|(_, entry)| match matcher {
                Matcher::All => true,
                Matcher::Id(id) => entry.spec.id.as_deref() == Some(id),
                Matcher::Target(key) => entry.target == Some(key),
            })
            .map(|(id, _)| id)
            .collect()
    }

    // =========================================================================
    // Global operations
    // =========================================================================

    /// Pause every live animation; counts state changes
    pub fn pause_all(&self) -> usize {
        let ids = self.matching(Matcher::All);
        self.pause_ids(&ids)
    }

    /// Resume every paused animation; counts state changes
    pub fn resume_all(&self) -> usize {
        let ids = self.matching(Matcher::All);
        self.resume_ids(&ids)
    }

    /// Remove every live animation; `complete` forces final values
    /// first
    pub fn kill_all(&self, complete: bool) -> usize {
        let ids = self.matching(Matcher::All);
        self.kill_ids(&ids, complete)
    }

    /// Finish every live animation now
    pub fn complete_all(&self) -> usize {
        let ids = self.matching(Matcher::All);
        self.complete_ids(&ids)
    }

    /// Reset every live animation to initial values, paused
    pub fn rewind_all(&self) -> usize {
        let ids = self.matching(Matcher::All);
        self.rewind_ids(&ids)
    }

    // =========================================================================
    // Id-keyed operations
    // =========================================================================

    pub fn pause_by_id(&self, id: &str) -> usize {
        let ids = self.matching(Matcher::Id(id));
        self.pause_ids(&ids)
    }

    pub fn resume_by_id(&self, id: &str) -> usize {
        let ids = self.matching(Matcher::Id(id));
        self.resume_ids(&ids)
    }

    pub fn kill_by_id(&self, id: &str, complete: bool) -> usize {
        let ids = self.matching(Matcher::Id(id));
        self.kill_ids(&ids, complete)
    }

    pub fn complete_by_id(&self, id: &str) -> usize {
        let ids = self.matching(Matcher::Id(id));
        self.complete_ids(&ids)
    }

    pub fn rewind_by_id(&self, id: &str) -> usize {
        let ids = self.matching(Matcher::Id(id));
        self.rewind_ids(&ids)
    }

    // =========================================================================
    // Target-keyed operations
    // =========================================================================

    pub fn pause_target(&self, key: TargetKey) -> usize {
        let ids = self.matching(Matcher::Target(key));
        self.pause_ids(&ids)
    }

    pub fn resume_target(&self, key: TargetKey) -> usize {
        let ids = self.matching(Matcher::Target(key));
        self.resume_ids(&ids)
    }

    pub fn kill_target(&self, key: TargetKey, complete: bool) -> usize {
        let ids = self.matching(Matcher::Target(key));
        self.kill_ids(&ids, complete)
    }

    pub fn complete_target(&self, key: TargetKey) -> usize {
        let ids = self.matching(Matcher::Target(key));
        self.complete_ids(&ids)
    }

    pub fn rewind_target(&self, key: TargetKey) -> usize {
        let ids = self.matching(Matcher::Target(key));
        self.rewind_ids(&ids)
    }

    // =========================================================================
    // Owner teardown
    // =========================================================================

    /// Kill every animation linked to this owner
    ///
    /// The explicit arm of the lifecycle link: call from the owning
    /// entity's own teardown path. (A dropped owner is also detected
    /// on the next tick.)
    pub fn release_owned<T: ?Sized>(&self, owner: &Arc<T>) -> usize {
        let key = Arc::as_ptr(owner) as *const () as usize;
        let ids = {
            let Some(inner) = self.inner.upgrade() else {
                return 0;
            };
            let inner = inner.lock().unwrap();
            inner
                .owners
                .get(&key)
                .map(|list| list.to_vec())
                .unwrap_or_default()
        };
        self.kill_ids(&ids, false)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of live animations
    pub fn active_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().entries.len())
            .unwrap_or(0)
    }

    /// Number of live animations currently advancing
    pub fn playing_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| {
                inner
                    .lock()
                    .unwrap()
                    .entries
                    .iter()
                    .filter(|(_, e)| e.state != PlayState::Paused)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl TweenContext {
    pub fn pause_all(&self) -> usize {
        self.handle().pause_all()
    }

    pub fn resume_all(&self) -> usize {
        self.handle().resume_all()
    }

    pub fn kill_all(&self, complete: bool) -> usize {
        self.handle().kill_all(complete)
    }

    pub fn complete_all(&self) -> usize {
        self.handle().complete_all()
    }

    pub fn rewind_all(&self) -> usize {
        self.handle().rewind_all()
    }

    pub fn pause_by_id(&self, id: &str) -> usize {
        self.handle().pause_by_id(id)
    }

    pub fn resume_by_id(&self, id: &str) -> usize {
        self.handle().resume_by_id(id)
    }

    pub fn kill_by_id(&self, id: &str, complete: bool) -> usize {
        self.handle().kill_by_id(id, complete)
    }

    pub fn complete_by_id(&self, id: &str) -> usize {
        self.handle().complete_by_id(id)
    }

    pub fn rewind_by_id(&self, id: &str) -> usize {
        self.handle().rewind_by_id(id)
    }

    pub fn pause_target(&self, key: TargetKey) -> usize {
        self.handle().pause_target(key)
    }

    pub fn resume_target(&self, key: TargetKey) -> usize {
        self.handle().resume_target(key)
    }

    pub fn kill_target(&self, key: TargetKey, complete: bool) -> usize {
        self.handle().kill_target(key, complete)
    }

    pub fn complete_target(&self, key: TargetKey) -> usize {
        self.handle().complete_target(key)
    }

    pub fn rewind_target(&self, key: TargetKey) -> usize {
        self.handle().rewind_target(key)
    }

    /// See [`ContextHandle::release_owned`]
    pub fn release_owned<T: ?Sized>(&self, owner: &Arc<T>) -> usize {
        self.handle().release_owned(owner)
    }

    pub fn active_count(&self) -> usize {
        self.handle().active_count()
    }

    pub fn playing_count(&self) -> usize {
        self.handle().playing_count()
    }
}
