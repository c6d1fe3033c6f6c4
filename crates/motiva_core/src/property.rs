//! The property-lookup seam
//!
//! Preset authors and callers locate an animatable aspect of a target
//! by supplying an [`AnimatedProperty`]. The engine reads the start
//! value through it once and writes interpolated values back every
//! seek. Accessors hold `Weak` references so a destroyed target turns
//! the property dead rather than panicking.

use std::sync::{Arc, Mutex, Weak};

use crate::value::TweenValue;

/// An animatable aspect of some target
///
/// `get` returns `None` and `set` returns `false` once the underlying
/// target is gone; engines treat a dead property as an invalid target.
pub trait AnimatedProperty: Send {
    /// Read the current value, or `None` if the target is gone
    fn get(&self) -> Option<TweenValue>;

    /// Write a value; returns `false` if the target is gone
    fn set(&mut self, value: TweenValue) -> bool;
}

/// Closure-backed [`AnimatedProperty`]
pub struct FnProperty {
    get: Box<dyn Fn() -> Option<TweenValue> + Send>,
    set: Box<dyn FnMut(TweenValue) -> bool + Send>,
}

impl FnProperty {
    /// Build from raw accessor closures
    pub fn new(
        get: impl Fn() -> Option<TweenValue> + Send + 'static,
        set: impl FnMut(TweenValue) -> bool + Send + 'static,
    ) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// Accessors over a `Mutex`-guarded target held behind `Weak`
    ///
    /// The returned property goes dead when the last `Arc` to the
    /// target drops.
    pub fn of<T, G, S>(target: &Arc<Mutex<T>>, get: G, set: S) -> Self
    where
        T: Send + 'static,
        G: Fn(&T) -> TweenValue + Send + 'static,
        S: Fn(&mut T, TweenValue) + Send + 'static,
    {
        let read: Weak<Mutex<T>> = Arc::downgrade(target);
        let write: Weak<Mutex<T>> = Arc::downgrade(target);
        Self {
            get: Box::new(move || read.upgrade().map(|t| get(&t.lock().unwrap()))),
            set: Box::new(move |value| {
                if let Some(t) = write.upgrade() {
                    set(&mut t.lock().unwrap(), value);
                    true
                } else {
                    false
                }
            }),
        }
    }
}

impl AnimatedProperty for FnProperty {
    fn get(&self) -> Option<TweenValue> {
        (self.get)()
    }

    fn set(&mut self, value: TweenValue) -> bool {
        (self.set)(value)
    }
}
