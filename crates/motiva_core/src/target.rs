//! Animation targets
//!
//! Anything that wants to be driven by name-keyed recipes implements
//! [`MotionTarget`]: a small standard surface (opacity, scale,
//! position, rotation) plus `as_any` for recipe authors who need the
//! concrete type. Bulk control keys animations by [`TargetKey`] —
//! pointer identity of the target's `Arc`.

use std::any::Any;
use std::sync::Arc;

use crate::property::FnProperty;
use crate::value::TweenValue;

/// The standard animatable aspects of a [`MotionTarget`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionProperty {
    /// Opacity as `TweenValue::Float`
    Opacity,
    /// Scale as `TweenValue::Vec3`
    Scale,
    /// Position as `TweenValue::Vec3`
    Position,
    /// Rotation in degrees as `TweenValue::Float`
    Rotation,
}

/// A target recipes can animate without knowing its concrete type
///
/// Interior mutability is the implementor's concern; setters take
/// `&self` because animations write values during host ticks while
/// arbitrary code holds clones of the same `Arc`.
///
/// A target returns `None` from [`motion_value`](Self::motion_value)
/// for aspects it does not support; recipes use that as their
/// applicability check.
pub trait MotionTarget: Any + Send + Sync {
    /// Read one standard aspect, or `None` if unsupported
    fn motion_value(&self, prop: MotionProperty) -> Option<TweenValue>;

    /// Write one standard aspect (ignored if unsupported)
    fn set_motion_value(&self, prop: MotionProperty, value: TweenValue);

    /// The concrete type, for recipes that need more than the
    /// standard surface
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a motion target
pub type TargetRef = Arc<dyn MotionTarget>;

/// Identity key for target-keyed bulk control
///
/// Derived from the pointer identity of the target's `Arc`, so two
/// clones of the same `Arc` key the same animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

impl TargetKey {
    /// Key of a motion target
    pub fn of(target: &TargetRef) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }

    /// Key of any shared object used as a target
    pub fn of_arc<T: ?Sized>(target: &Arc<T>) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }
}

/// An [`FnProperty`] over one standard aspect of a motion target
///
/// Holds the target weakly: the property goes dead (and the engine
/// sees an invalid target) once the target is dropped.
pub fn motion_property(target: &TargetRef, prop: MotionProperty) -> FnProperty {
    let read = Arc::downgrade(target);
    let write = Arc::downgrade(target);
    FnProperty::new(
        move || read.upgrade().and_then(|t| t.motion_value(prop)),
        move |value| {
            if let Some(t) = write.upgrade() {
                t.set_motion_value(prop, value);
                true
            } else {
                false
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Dot {
        opacity: Mutex<f32>,
    }

    impl MotionTarget for Dot {
        fn motion_value(&self, prop: MotionProperty) -> Option<TweenValue> {
            match prop {
                MotionProperty::Opacity => Some(TweenValue::Float(*self.opacity.lock().unwrap())),
                _ => None,
            }
        }

        fn set_motion_value(&self, prop: MotionProperty, value: TweenValue) {
            if prop == MotionProperty::Opacity {
                if let Some(v) = value.as_float() {
                    *self.opacity.lock().unwrap() = v;
                }
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_target_key_identity() {
        let a: TargetRef = Arc::new(Dot { opacity: Mutex::new(1.0) });
        let b = a.clone();
        let c: TargetRef = Arc::new(Dot { opacity: Mutex::new(1.0) });

        assert_eq!(TargetKey::of(&a), TargetKey::of(&b));
        assert_ne!(TargetKey::of(&a), TargetKey::of(&c));
    }

    #[test]
    fn test_motion_property_accessors() {
        use crate::property::AnimatedProperty;

        let dot: TargetRef = Arc::new(Dot { opacity: Mutex::new(0.25) });
        let mut prop = motion_property(&dot, MotionProperty::Opacity);

        assert_eq!(prop.get(), Some(TweenValue::Float(0.25)));
        assert!(prop.set(TweenValue::Float(0.75)));
        assert_eq!(prop.get(), Some(TweenValue::Float(0.75)));

        // Unsupported aspect reads as None
        let mut scale = motion_property(&dot, MotionProperty::Scale);
        assert_eq!(scale.get(), None);
        // Dead target turns the property dead
        drop(dot);
        assert!(!scale.set(TweenValue::Float(0.0)));
    }
}
