//! Global tween defaults
//!
//! The bottom layer of option resolution. The host constructs one of
//! these (or deserializes it from its own config file) and hands it to
//! [`TweenContext`](crate::context::TweenContext) at initialization;
//! there is no implicit global settings lookup.

use motiva_core::{Ease, LoopStyle, UpdateChannel};
use serde::{Deserialize, Serialize};

/// A concrete value for every option field
///
/// Stable for the lifetime of a context unless the host explicitly
/// reinitializes via
/// [`TweenContext::set_defaults`](crate::context::TweenContext::set_defaults).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenDefaults {
    /// Seconds to wait before playback starts
    pub delay: f32,
    /// Easing curve
    pub ease: Ease,
    /// Host update phase
    pub channel: UpdateChannel,
    /// Advance on unscaled frame time
    pub unscaled: bool,
    /// Round interpolated values to whole numbers
    pub snapping: bool,
    /// Number of iterations; -1 loops forever
    pub loop_count: i32,
    /// How iterations chain together
    pub loop_style: LoopStyle,
    /// Treat creation durations as units-per-second
    pub speed_based: bool,
    /// Initial context-wide time scale applied to scaled deltas
    pub time_scale: f32,
}

impl Default for TweenDefaults {
    fn default() -> Self {
        Self {
            delay: 0.0,
            ease: Ease::OutQuad,
            channel: UpdateChannel::Update,
            unscaled: false,
            snapping: false,
            loop_count: 1,
            loop_style: LoopStyle::Restart,
            speed_based: false,
            time_scale: 1.0,
        }
    }
}
