//! Animatable value vocabulary
//!
//! The value types an engine interpolates. Motiva itself never does the
//! interpolation — these are pure data carried across the engine boundary.

use serde::{Deserialize, Serialize};

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// All components set to the same value
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

/// 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// All components set to the same value
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Largest component magnitude, used by speed-based engines to derive
    /// a duration from a travel distance
    pub fn max_abs_component(&self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

/// RGBA color with components in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A value an engine can animate
///
/// Every variant is a plain component bundle; which variants a given
/// engine supports is the engine's business.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TweenValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Color),
}

impl TweenValue {
    /// Whether two values are the same variant (and therefore
    /// interpolatable against each other)
    pub fn same_kind(&self, other: &TweenValue) -> bool {
        matches!(
            (self, other),
            (TweenValue::Float(_), TweenValue::Float(_))
                | (TweenValue::Vec2(_), TweenValue::Vec2(_))
                | (TweenValue::Vec3(_), TweenValue::Vec3(_))
                | (TweenValue::Color(_), TweenValue::Color(_))
        )
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            TweenValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            TweenValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            TweenValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            TweenValue::Color(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for TweenValue {
    fn from(v: f32) -> Self {
        TweenValue::Float(v)
    }
}

impl From<Vec2> for TweenValue {
    fn from(v: Vec2) -> Self {
        TweenValue::Vec2(v)
    }
}

impl From<Vec3> for TweenValue {
    fn from(v: Vec3) -> Self {
        TweenValue::Vec3(v)
    }
}

impl From<Color> for TweenValue {
    fn from(v: Color) -> Self {
        TweenValue::Color(v)
    }
}
