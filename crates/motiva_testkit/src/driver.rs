//! Fixed-step tick drivers
//!
//! Deterministic stand-ins for the host's per-frame update loop.

use motiva_core::{FrameDelta, UpdateChannel};
use motiva_tween::TweenContext;

/// Advance a context by `total_secs` in fixed `step`-second ticks
///
/// Uses a tick count derived up front so float accumulation cannot
/// change how many frames run.
pub fn advance(ctx: &TweenContext, total_secs: f32, step: f32) {
    let frames = (total_secs / step).round().max(0.0) as usize;
    advance_frames(ctx, frames, step);
}

/// Advance a context by a number of uniform ticks
pub fn advance_frames(ctx: &TweenContext, frames: usize, dt: f32) {
    for _ in 0..frames {
        ctx.tick(FrameDelta::uniform(dt));
    }
}

/// Advance one channel by a number of uniform ticks
pub fn advance_channel(ctx: &TweenContext, channel: UpdateChannel, frames: usize, dt: f32) {
    for _ in 0..frames {
        ctx.tick_channel(channel, FrameDelta::uniform(dt));
    }
}

/// Advance with differing scaled/unscaled deltas (time-dilated host)
pub fn advance_dilated(ctx: &TweenContext, frames: usize, scaled: f32, unscaled: f32) {
    for _ in 0..frames {
        ctx.tick(FrameDelta::new(scaled, unscaled));
    }
}
