//! Motiva Core Vocabulary
//!
//! Shared types between the Motiva orchestration layer and the
//! external interpolation engine it sits on:
//!
//! - **Values**: `TweenValue` and the small vector/color types it wraps
//! - **Easing names**: `Ease` — names only, curve math lives in engines
//! - **Tick vocabulary**: `UpdateChannel`, `LoopStyle`, `FrameDelta`
//! - **Property seam**: `AnimatedProperty` / `FnProperty`
//! - **Targets**: `MotionTarget`, `TargetRef`, `TargetKey`
//! - **Engine boundary**: `TweenEngine`, `PrimitiveTween`, `TweenSpec`
//!
//! This crate contains no orchestration logic and no interpolation
//! math; it is the contract both sides compile against.

pub mod ease;
pub mod engine;
pub mod property;
pub mod target;
pub mod time;
pub mod value;

pub use ease::Ease;
pub use engine::{PrimitiveTween, TweenEngine, TweenSpec};
pub use property::{AnimatedProperty, FnProperty};
pub use target::{motion_property, MotionProperty, MotionTarget, TargetKey, TargetRef};
pub use time::{FrameDelta, LoopStyle, UpdateChannel};
pub use value::{Color, TweenValue, Vec2, Vec3};
