//! End-to-end orchestration behavior over the reference engine

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use motiva_core::{Ease, LoopStyle, MotionProperty, TargetKey, UpdateChannel, Vec3};
use motiva_testkit::{
    advance, advance_channel, advance_dilated, advance_frames, ReferenceEngine, TestNode,
    TestNodeExt,
};
use motiva_tween::{StaggerBuilder, TweenContext, TweenError, TweenOptions};

fn ctx() -> TweenContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("motiva_tween=debug")
        .with_test_writer()
        .try_init();
    TweenContext::new(ReferenceEngine::shared())
}

fn linear() -> TweenOptions {
    TweenOptions::new().ease(Ease::Linear)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.05
}

// =============================================================================
// Tween factory / adapter
// =============================================================================

#[test]
fn test_tween_progresses_and_completes() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());

    assert!(handle.is_active());
    assert!(close(handle.duration(), 1.0));

    advance(&ctx, 0.5, 0.1);
    assert!(close(node.opacity(), 0.5));
    assert!(close(handle.elapsed(), 0.5));

    advance(&ctx, 0.7, 0.1);
    assert_eq!(node.opacity(), 0.0);
    assert!(!handle.is_active());
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_delay_defers_playback() {
    let ctx = ctx();
    let node = TestNode::new();
    ctx.animate(
        node.property(MotionProperty::Opacity),
        0.0f32,
        1.0,
        linear().delay(0.5),
    );

    advance(&ctx, 0.4, 0.1);
    assert_eq!(node.opacity(), 1.0);

    advance(&ctx, 0.8, 0.1);
    // Past the delay and into the interpolation
    assert!(node.opacity() < 0.9);
}

#[test]
fn test_dead_target_yields_inert_handle() {
    let ctx = ctx();
    let node = TestNode::new();
    let prop = node.property(MotionProperty::Opacity);
    drop(node);

    let handle = ctx.animate(prop, 0.0f32, 1.0, linear());
    assert!(!handle.is_active());
    assert_eq!(ctx.active_count(), 0);
    // Inert handles no-op everywhere
    assert!(!handle.pause());
    assert!(!handle.kill());
    assert_eq!(handle.duration(), 0.0);
}

#[test]
fn test_on_play_and_on_update_fire() {
    let ctx = ctx();
    let node = TestNode::new();
    let played = Arc::new(AtomicBool::new(false));
    let updates = Arc::new(AtomicUsize::new(0));

    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 0.3, linear());
    let played_flag = played.clone();
    let update_count = updates.clone();
    handle
        .on_play(move || played_flag.store(true, Ordering::SeqCst))
        .on_update(move |_| {
            update_count.fetch_add(1, Ordering::SeqCst);
        });

    assert!(!played.load(Ordering::SeqCst));
    advance_frames(&ctx, 1, 0.1);
    assert!(played.load(Ordering::SeqCst));
    advance(&ctx, 0.4, 0.1);
    assert!(updates.load(Ordering::SeqCst) >= 3);
}

#[test]
fn test_yoyo_loops_end_at_start_value() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(
        node.property(MotionProperty::Opacity),
        0.0f32,
        0.5,
        linear().loops(2, LoopStyle::Yoyo),
    );
    assert!(close(handle.duration(), 1.0));

    advance(&ctx, 0.5, 0.05);
    assert!(node.opacity() < 0.15);

    advance(&ctx, 0.6, 0.05);
    assert_eq!(node.opacity(), 1.0);
    assert!(!handle.is_active());
}

#[test]
fn test_infinite_loops_never_complete() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(
        node.property(MotionProperty::Rotation),
        360.0f32,
        0.25,
        linear().loop_count(-1),
    );
    assert!(handle.duration().is_infinite());

    advance(&ctx, 3.0, 0.1);
    assert!(handle.is_active());
    assert_eq!(ctx.active_count(), 1);
}

// =============================================================================
// Update channels and time scaling
// =============================================================================

#[test]
fn test_update_channels_are_independent() {
    let ctx = ctx();
    let node = TestNode::new();
    ctx.animate(
        node.property(MotionProperty::Opacity),
        0.0f32,
        1.0,
        linear().update_channel(UpdateChannel::Late),
    );

    advance(&ctx, 1.5, 0.1);
    assert_eq!(node.opacity(), 1.0); // Update ticks did nothing

    advance_channel(&ctx, UpdateChannel::Late, 5, 0.1);
    assert!(close(node.opacity(), 0.5));
}

#[test]
fn test_unscaled_time_ignores_dilation() {
    let ctx = ctx();
    let scaled = TestNode::new();
    let unscaled = TestNode::new();
    ctx.animate(scaled.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    ctx.animate(
        unscaled.property(MotionProperty::Opacity),
        0.0f32,
        1.0,
        linear().unscaled(true),
    );

    // Host time frozen: scaled delta 0, wall-clock delta 0.1
    advance_dilated(&ctx, 5, 0.0, 0.1);
    assert_eq!(scaled.opacity(), 1.0);
    assert!(close(unscaled.opacity(), 0.5));
}

#[test]
fn test_time_scale_speeds_up_scaled_animations() {
    let ctx = ctx();
    ctx.set_time_scale(2.0);
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());

    advance(&ctx, 0.6, 0.1);
    assert!(!handle.is_active());
    assert_eq!(node.opacity(), 0.0);
}

#[test]
fn test_playback_rate_per_animation() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    handle.set_playback_rate(0.5);

    advance(&ctx, 1.0, 0.1);
    assert!(close(node.opacity(), 0.5));
    assert!(handle.is_active());
}

// =============================================================================
// Sequence builder
// =============================================================================

#[test]
fn test_sequence_offsets_join_and_delay() {
    let ctx = ctx();
    let a = TestNode::new();
    let b = TestNode::new();
    let c = TestNode::new();
    let end = Vec3::new(10.0, 0.0, 0.0);

    let handle = ctx
        .sequence()
        .append_tween_with(a.property(MotionProperty::Position), end, 1.0, linear())
        .join_tween_with(b.property(MotionProperty::Position), end, 2.0, linear())
        .append_tween_with(
            c.property(MotionProperty::Position),
            end,
            1.0,
            linear().delay(0.5),
        )
        .build();

    // s0 and s1 share offset 0; s2 starts at max(1.0, 2.0) + 0.5
    assert!(close(handle.duration(), 3.5));

    advance(&ctx, 0.5, 0.1);
    assert!(close(a.position().x, 5.0));
    assert!(close(b.position().x, 2.5));
    assert_eq!(c.position().x, 0.0);

    advance(&ctx, 1.8, 0.1); // t ~ 2.3
    assert_eq!(a.position().x, 10.0);
    assert!(c.position().x < 0.1);

    advance(&ctx, 0.7, 0.1); // t ~ 3.0
    assert!(close(c.position().x, 5.0));

    advance(&ctx, 0.7, 0.1);
    assert_eq!(c.position().x, 10.0);
    assert!(!handle.is_active());
}

#[test]
fn test_sequence_interval_and_callback() {
    let ctx = ctx();
    let a = TestNode::new();
    let b = TestNode::new();
    let hits = Arc::new(Mutex::new(Vec::new()));

    let hits_cb = hits.clone();
    ctx.sequence()
        .append_tween_with(a.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .append_interval(0.25)
        .append_callback(move || hits_cb.lock().unwrap().push("mid"))
        .append_tween_with(b.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .build();

    advance(&ctx, 0.7, 0.05);
    assert!(hits.lock().unwrap().is_empty());
    assert_eq!(b.opacity(), 1.0);

    advance(&ctx, 0.1, 0.05);
    assert_eq!(*hits.lock().unwrap(), vec!["mid"]);

    advance(&ctx, 0.6, 0.05);
    assert_eq!(b.opacity(), 0.0);
    // Callback fires exactly once
    assert_eq!(hits.lock().unwrap().len(), 1);
}

#[test]
fn test_sequence_skips_dead_step_and_proceeds() {
    let ctx = ctx();
    let alive = TestNode::new();
    let dead = TestNode::new();
    let dead_prop = dead.property(MotionProperty::Opacity);
    drop(dead);

    let handle = ctx
        .sequence()
        .append_tween_with(dead_prop, 0.0f32, 5.0, linear())
        .append_tween_with(alive.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .build();

    // The dead step contributed nothing to the timeline
    assert!(close(handle.duration(), 0.5));
    advance(&ctx, 0.6, 0.1);
    assert_eq!(alive.opacity(), 0.0);
}

#[test]
fn test_single_step_degrades_to_primitive() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx
        .sequence()
        .append_tween_with(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear())
        .build();

    assert!(close(handle.duration(), 1.0));
    advance(&ctx, 0.5, 0.1);
    assert!(close(node.opacity(), 0.5));
    advance(&ctx, 0.6, 0.1);
    assert!(!handle.is_active());
}

#[test]
fn test_sequence_builder_options_apply_to_composite() {
    let ctx = ctx();
    let a = TestNode::new();
    let b = TestNode::new();

    let handle = ctx
        .sequence()
        .append_tween_with(a.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .append_tween_with(b.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .id("intro")
        .delay(0.5)
        .build();

    assert_eq!(handle.group_id().as_deref(), Some("intro"));

    advance(&ctx, 0.4, 0.1);
    assert_eq!(a.opacity(), 1.0); // still in composite delay

    advance(&ctx, 0.4, 0.1);
    assert!(a.opacity() < 0.9);
    assert_eq!(ctx.pause_by_id("intro"), 1);
}

#[test]
fn test_speed_based_step_duration_inside_sequence() {
    let ctx = ctx();
    let a = TestNode::new();
    let b = TestNode::new();
    let end = Vec3::new(10.0, 0.0, 0.0);

    // 10 units at 5 units/sec: the step occupies 2 seconds
    let handle = ctx
        .sequence()
        .append_tween_with(
            a.property(MotionProperty::Position),
            end,
            5.0,
            linear().speed_based(true),
        )
        .append_tween_with(b.property(MotionProperty::Position), end, 1.0, linear())
        .build();

    assert!(close(handle.duration(), 3.0));

    advance(&ctx, 1.0, 0.1);
    assert!(close(a.position().x, 5.0));
    assert_eq!(b.position().x, 0.0);

    advance(&ctx, 1.5, 0.1); // t ~ 2.5
    assert_eq!(a.position().x, 10.0);
    assert!(b.position().x > 1.0);
}

#[test]
fn test_sequence_loops_restart_children() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx
        .sequence()
        .append_tween_with(node.property(MotionProperty::Opacity), 0.0f32, 0.5, linear())
        .loops(2, LoopStyle::Restart)
        .build();

    assert!(close(handle.duration(), 1.0));
    advance(&ctx, 0.45, 0.05);
    let near_end = node.opacity();
    assert!(near_end < 0.15);

    // Second pass replays from the top
    advance(&ctx, 0.15, 0.05);
    assert!(node.opacity() > near_end + 0.5);

    advance(&ctx, 0.5, 0.05);
    assert!(!handle.is_active());
}

// =============================================================================
// Stagger
// =============================================================================

#[test]
fn test_stagger_offsets_are_position_based() {
    let ctx = ctx();
    let nodes: Vec<_> = (0..3).map(|_| TestNode::new()).collect();
    let props = nodes
        .iter()
        .map(|n| n.property(MotionProperty::Position))
        .collect();
    let ends = vec![motiva_core::TweenValue::Vec3(Vec3::new(10.0, 0.0, 0.0)); 3];

    let handle = StaggerBuilder::new(0.5)
        .pairs(props, ends, 1.0)
        .unwrap()
        .spawn(&ctx);

    // k-th start offset is k * 0.5, independent of the 1.0s durations
    assert!(close(handle.duration(), 2.0));

    advance(&ctx, 0.4, 0.1);
    assert!(nodes[0].position().x > 0.0);
    assert_eq!(nodes[1].position().x, 0.0);
    assert_eq!(nodes[2].position().x, 0.0);

    advance(&ctx, 0.3, 0.1); // t ~ 0.7
    assert!(nodes[1].position().x > 0.0);
    assert_eq!(nodes[2].position().x, 0.0);

    advance(&ctx, 0.5, 0.1); // t ~ 1.2: first done, last mid-flight
    assert_eq!(nodes[0].position().x, 10.0);
    assert!(nodes[2].position().x > 0.0);
    assert!(nodes[2].position().x < 10.0);

    advance(&ctx, 1.0, 0.1);
    assert!(!handle.is_active());
    assert_eq!(nodes[2].position().x, 10.0);
}

#[test]
fn test_stagger_length_mismatch_is_an_error() {
    let nodes: Vec<_> = (0..2).map(|_| TestNode::new()).collect();
    let props = nodes
        .iter()
        .map(|n| n.property(MotionProperty::Position))
        .collect();
    let ends = vec![motiva_core::TweenValue::Vec3(Vec3::ONE); 3];

    let result = StaggerBuilder::new(0.1).pairs(props, ends, 1.0);
    assert!(matches!(result, Err(TweenError::InvalidState(_))));
}

// =============================================================================
// Control surface
// =============================================================================

#[test]
fn test_kill_by_id_with_complete_forces_final_values() {
    let ctx = ctx();
    let nodes: Vec<_> = (0..3).map(|_| TestNode::new()).collect();
    for node in &nodes {
        ctx.animate(
            node.property(MotionProperty::Opacity),
            0.0f32,
            1.0,
            linear().id("group-x"),
        );
    }

    advance(&ctx, 0.3, 0.1);
    assert_eq!(ctx.kill_by_id("group-x", true), 3);
    for node in &nodes {
        assert_eq!(node.opacity(), 0.0);
    }
    // Nothing left to match
    assert_eq!(ctx.kill_by_id("group-x", true), 0);
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_plain_kill_leaves_values_in_place() {
    let ctx = ctx();
    let node = TestNode::new();
    ctx.animate(
        node.property(MotionProperty::Opacity),
        0.0f32,
        1.0,
        linear().id("g"),
    );

    advance(&ctx, 0.5, 0.1);
    let mid = node.opacity();
    assert_eq!(ctx.kill_by_id("g", false), 1);
    assert_eq!(node.opacity(), mid);
}

#[test]
fn test_target_keyed_operations() {
    let ctx = ctx();
    let node = TestNode::new();
    let other = TestNode::new();
    let target = node.target();

    ctx.play("fade-out", &target, Some(1.0), TweenOptions::new());
    ctx.play("fade-out", &other.target(), Some(1.0), TweenOptions::new());
    assert_eq!(ctx.active_count(), 2);

    assert_eq!(ctx.pause_target(TargetKey::of(&target)), 1);
    assert_eq!(ctx.kill_target(TargetKey::of(&target), false), 1);
    assert_eq!(ctx.active_count(), 1);

    // No matches is count 0, not an error
    assert_eq!(ctx.kill_target(node.key(), false), 0);
    assert_eq!(ctx.pause_by_id("missing"), 0);
}

#[test]
fn test_global_operations_and_counts() {
    let ctx = ctx();
    let a = TestNode::new();
    let b = TestNode::new();
    ctx.animate(a.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    ctx.animate(b.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());

    assert_eq!(ctx.active_count(), 2);
    assert_eq!(ctx.playing_count(), 2);

    assert_eq!(ctx.pause_all(), 2);
    assert_eq!(ctx.playing_count(), 0);
    // Already paused: no state changes to report
    assert_eq!(ctx.pause_all(), 0);

    assert_eq!(ctx.resume_all(), 2);
    assert_eq!(ctx.complete_all(), 2);
    assert_eq!(a.opacity(), 0.0);
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_pause_freezes_and_resume_continues() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());

    advance(&ctx, 0.4, 0.1);
    assert!(handle.pause());
    let frozen = node.opacity();

    advance(&ctx, 0.5, 0.1);
    assert_eq!(node.opacity(), frozen);
    assert!(handle.is_paused());

    assert!(handle.resume());
    advance(&ctx, 0.7, 0.1);
    assert_eq!(node.opacity(), 0.0);
}

#[test]
fn test_rewind_resets_and_pauses() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());

    advance(&ctx, 0.6, 0.1);
    assert!(node.opacity() < 0.5);

    assert!(handle.rewind());
    assert_eq!(node.opacity(), 1.0);
    assert!(handle.is_paused());
    assert_eq!(handle.elapsed(), 0.0);

    handle.resume();
    advance(&ctx, 0.5, 0.1);
    assert!(close(node.opacity(), 0.5));
}

// =============================================================================
// Lifecycle links
// =============================================================================

#[test]
fn test_killed_then_destroyed_owner_never_completes() {
    let ctx = ctx();
    let node = TestNode::new();
    let owner = Arc::new(String::from("panel"));
    let completed = Arc::new(AtomicBool::new(false));

    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 0.5, linear());
    let flag = completed.clone();
    handle.link(&owner).on_complete(move || flag.store(true, Ordering::SeqCst));

    handle.kill();
    drop(owner);
    advance(&ctx, 2.0, 0.1);

    assert!(!completed.load(Ordering::SeqCst));
}

#[test]
fn test_dead_owner_force_kills_on_next_tick() {
    let ctx = ctx();
    let node = TestNode::new();
    let owner = Arc::new(42u32);
    let completed = Arc::new(AtomicBool::new(false));
    let killed = Arc::new(AtomicBool::new(false));

    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    let complete_flag = completed.clone();
    let kill_flag = killed.clone();
    handle
        .link(&owner)
        .on_complete(move || complete_flag.store(true, Ordering::SeqCst))
        .on_kill(move || kill_flag.store(true, Ordering::SeqCst));

    advance(&ctx, 0.3, 0.1);
    let mid = node.opacity();
    assert!(mid < 1.0);

    drop(owner);
    advance_frames(&ctx, 1, 0.1);

    assert!(!handle.is_active());
    assert!(killed.load(Ordering::SeqCst));
    assert!(!completed.load(Ordering::SeqCst));
    // Values freeze where the kill caught them
    assert_eq!(node.opacity(), mid);
}

#[test]
fn test_release_owned_kills_synchronously() {
    let ctx = ctx();
    let owner = Arc::new(String::from("screen"));
    let nodes: Vec<_> = (0..3).map(|_| TestNode::new()).collect();
    for node in &nodes {
        ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear())
            .link(&owner);
    }

    assert_eq!(ctx.release_owned(&owner), 3);
    assert_eq!(ctx.active_count(), 0);
    // Teardown is idempotent
    assert_eq!(ctx.release_owned(&owner), 0);
}

#[test]
fn test_kill_fires_on_kill_before_returning() {
    let ctx = ctx();
    let node = TestNode::new();
    let killed = Arc::new(AtomicBool::new(false));

    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    let flag = killed.clone();
    handle.on_kill(move || flag.store(true, Ordering::SeqCst));

    assert!(handle.kill());
    assert!(killed.load(Ordering::SeqCst));
}

// =============================================================================
// Dead context
// =============================================================================

#[test]
fn test_everything_noops_after_context_drop() {
    let ctx = ctx();
    let node = TestNode::new();
    let handle = ctx.animate(node.property(MotionProperty::Opacity), 0.0f32, 1.0, linear());
    let weak = ctx.handle();
    drop(ctx);

    assert!(!weak.is_alive());
    assert!(!handle.is_active());
    assert!(!handle.pause());
    assert_eq!(weak.kill_all(false), 0);
    assert_eq!(weak.active_count(), 0);

    let late = weak.play("fade-in", &node.target(), None, TweenOptions::new());
    assert!(!late.is_active());
}
