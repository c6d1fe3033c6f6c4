//! Motiva Test Support
//!
//! Everything needed to exercise the orchestration layer without a
//! real host or engine:
//!
//! - [`ReferenceEngine`]: a deterministic lerp engine with the full
//!   curve set, loop mapping, speed-based durations, and snapping
//! - [`TestNode`]: a target implementing the standard motion surface
//! - fixed-step tick drivers ([`advance`], [`advance_frames`], ...)
//!
//! The engine here is the reference implementation of the external
//! interpolation boundary; hosts with their own engines only need it
//! for tests.

pub mod driver;
pub mod engine;
pub mod target;

pub use driver::{advance, advance_channel, advance_dilated, advance_frames};
pub use engine::{ease_value, lerp_value, snap_value, value_distance, LerpTween, ReferenceEngine};
pub use target::{TestNode, TestNodeExt};
