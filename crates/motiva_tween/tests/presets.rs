//! Preset registry and playback behavior

use std::any::Any;
use std::sync::{Arc, Mutex};

use motiva_core::{
    motion_property, Ease, MotionProperty, MotionTarget, TargetRef, TweenValue, Vec3,
};
use motiva_testkit::{advance, advance_frames, ReferenceEngine, TestNode, TestNodeExt};
use motiva_tween::{Preset, TweenContext, TweenError, TweenOptions};

fn ctx() -> TweenContext {
    TweenContext::new(ReferenceEngine::shared())
}

// =============================================================================
// The pop-in scenario
// =============================================================================

#[test]
fn test_pop_in_zeroes_then_overshoots_to_original_scale() {
    let ctx = ctx();
    let node = TestNode::with_scale(Vec3::splat(2.0));

    let handle = ctx.play("pop-in", &node.target(), Some(1.0), TweenOptions::new());
    assert!(handle.is_active());
    // The recipe forces scale to zero at t = 0
    assert_eq!(node.scale(), Vec3::ZERO);

    let mut peak = f32::MIN;
    for _ in 0..21 {
        advance_frames(&ctx, 1, 0.05);
        peak = peak.max(node.scale().x);
    }

    // Overshoot ease: the scale peaks above its target before settling
    assert!(peak > 2.0);
    assert_eq!(node.scale(), Vec3::splat(2.0));
    assert!(!handle.is_active());
}

#[test]
fn test_per_call_ease_overrides_preset_default() {
    let ctx = ctx();
    let node = TestNode::with_scale(Vec3::splat(2.0));

    ctx.play(
        "pop-in",
        &node.target(),
        Some(1.0),
        TweenOptions::new().ease(Ease::Linear),
    );

    let mut peak = f32::MIN;
    for _ in 0..25 {
        advance_frames(&ctx, 1, 0.05);
        peak = peak.max(node.scale().x);
    }

    // Linear won over the preset's overshooting default
    assert!(peak <= 2.0 + 1e-4);
    assert_eq!(node.scale(), Vec3::splat(2.0));
}

#[test]
fn test_fade_in_rises_to_original_opacity() {
    let ctx = ctx();
    let node = TestNode::new();
    node.set_motion_value(MotionProperty::Opacity, TweenValue::Float(0.6));

    ctx.play("fade-in", &node.target(), Some(0.5), TweenOptions::new());
    assert_eq!(node.opacity(), 0.0);

    advance(&ctx, 0.6, 0.05);
    assert!((node.opacity() - 0.6).abs() < 1e-4);
}

// =============================================================================
// Failure isolation
// =============================================================================

#[test]
fn test_unknown_preset_reports_known_names() {
    let ctx = ctx();
    let node = TestNode::new();

    let err = ctx
        .try_play("wiggle", &node.target(), None, TweenOptions::new())
        .unwrap_err();
    match err {
        TweenError::NotFound { name, known } => {
            assert_eq!(name, "wiggle");
            assert!(known.contains(&"fade-in".to_owned()));
            assert!(known.contains(&"pop-in".to_owned()));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    // The graceful form plays nothing rather than aborting
    let handle = ctx.play("wiggle", &node.target(), None, TweenOptions::new());
    assert!(!handle.is_active());
    assert_eq!(ctx.active_count(), 0);
}

/// A target supporting only opacity
struct FadeOnly {
    opacity: Mutex<f32>,
}

impl MotionTarget for FadeOnly {
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
fn test_predicate_rejection_is_not_applicable() {
    let ctx = ctx();
    let target: TargetRef = Arc::new(FadeOnly {
        opacity: Mutex::new(1.0),
    });

    let err = ctx
        .try_play("pop-in", &target, None, TweenOptions::new())
        .unwrap_err();
    assert!(matches!(err, TweenError::NotApplicable { .. }));

    // But the surface it does support still works
    let handle = ctx.try_play("fade-out", &target, None, TweenOptions::new());
    assert!(handle.is_ok());
}

#[test]
fn test_panicking_factory_is_contained() {
    let ctx = ctx();
    let node = TestNode::new();
    ctx.register_preset(Preset::new("explode", 0.5, |_, _, _, _| {
        panic!("recipe went sideways")
    }));

    let err = ctx
        .try_play("explode", &node.target(), None, TweenOptions::new())
        .unwrap_err();
    match err {
        TweenError::CreationFailed { name, reason } => {
            assert_eq!(name, "explode");
            assert!(reason.contains("sideways"));
        }
        other => panic!("expected CreationFailed, got {other:?}"),
    }

    // The registry and control surface stay usable
    let handle = ctx.play("fade-in", &node.target(), None, TweenOptions::new());
    assert!(handle.is_active());
}

// =============================================================================
// Registration semantics
// =============================================================================

#[test]
fn test_last_registration_wins() {
    let ctx = ctx();
    let node = TestNode::new();

    ctx.register_preset(Preset::new("burst", 0.5, |engine, target, duration, _| {
        engine.create(
            Box::new(motion_property(target, MotionProperty::Opacity)),
            TweenValue::Float(0.0),
            duration,
        )
    }));
    // Re-register under the same name: this factory animates position
    ctx.register_preset(Preset::new("burst", 0.5, |engine, target, duration, _| {
        engine.create(
            Box::new(motion_property(target, MotionProperty::Position)),
            TweenValue::Vec3(Vec3::new(5.0, 0.0, 0.0)),
            duration,
        )
    }));

    ctx.play("burst", &node.target(), None, TweenOptions::new());
    advance(&ctx, 0.6, 0.05);

    assert_eq!(node.opacity(), 1.0); // first factory never ran
    assert_eq!(node.position().x, 5.0); // second one did
}

#[test]
fn test_provider_discovery_and_session_reset() {
    let ctx = ctx();
    let node = TestNode::new();

    ctx.add_preset_provider(|registry| {
        registry.register(Preset::new("spin", 0.25, |engine, target, duration, _| {
            engine.create(
                Box::new(motion_property(target, MotionProperty::Rotation)),
                TweenValue::Float(90.0),
                duration,
            )
        }));
    });

    let names = ctx.preset_names();
    assert!(names.contains(&"spin".to_owned()));
    assert!(names.contains(&"pop-out".to_owned()));

    let handle = ctx.play("spin", &node.target(), None, TweenOptions::new());
    assert!(handle.is_active());
    advance(&ctx, 0.3, 0.05);
    assert_eq!(node.rotation(), 90.0);

    // A session reset forgets everything, then both discovery paths
    // rerun lazily on the next lookup
    ctx.reset_preset_session();
    let names = ctx.preset_names();
    assert!(names.contains(&"spin".to_owned()));
    assert!(names.contains(&"fade-out".to_owned()));
}

#[test]
fn test_preset_default_duration_applies() {
    let ctx = ctx();
    let node = TestNode::new();

    // fade-out's default duration is 0.3
    let handle = ctx.play("fade-out", &node.target(), None, TweenOptions::new());
    assert!((handle.duration() - 0.3).abs() < 1e-4);

    let handle = ctx.play("fade-out", &node.target(), Some(2.0), TweenOptions::new());
    assert!((handle.duration() - 2.0).abs() < 1e-4);
}
