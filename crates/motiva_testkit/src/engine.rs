//! Deterministic reference engine
//!
//! A linear-interpolation [`TweenEngine`] for driving the
//! orchestration layer in tests (and simple hosts). This is where the
//! curve math lives — the orchestration crates only name curves.

use std::f32::consts::PI;

use motiva_core::{
    AnimatedProperty, Color, Ease, LoopStyle, PrimitiveTween, TweenEngine, TweenSpec, TweenValue,
    Vec2, Vec3,
};

/// Reference implementation of the external interpolation engine
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Shared engine for handing to a context
    pub fn shared() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self)
    }
}

impl TweenEngine for ReferenceEngine {
    fn create(
        &self,
        property: Box<dyn AnimatedProperty>,
        end_value: TweenValue,
        duration: f32,
    ) -> Option<Box<dyn PrimitiveTween>> {
        let start = property.get()?;
        if !start.same_kind(&end_value) {
            return None;
        }
        Some(Box::new(LerpTween {
            property,
            start,
            end: end_value,
            created_duration: duration.max(0.0),
            base: duration.max(0.0),
            spec: TweenSpec::default(),
        }))
    }

    fn ease_value(&self, ease: Ease, t: f32) -> f32 {
        ease_value(ease, t)
    }
}

/// One linear interpolation of a property, start value captured at
/// creation
pub struct LerpTween {
    property: Box<dyn AnimatedProperty>,
    start: TweenValue,
    end: TweenValue,
    /// Duration argument at creation; units-per-second when the spec
    /// is speed-based
    created_duration: f32,
    /// Derived one-iteration duration
    base: f32,
    spec: TweenSpec,
}

impl LerpTween {
    fn write(&mut self, t_factor: f32) {
        let mut value = lerp_value(&self.start, &self.end, t_factor);
        if self.spec.snapping {
            value = snap_value(&value);
        }
        self.property.set(value);
    }
}

impl PrimitiveTween for LerpTween {
    fn configure(&mut self, spec: &TweenSpec) {
        self.spec = spec.clone();
        self.base = if spec.speed_based {
            // Duration was units-per-second: derive seconds from the
            // travel distance.
            let speed = self.created_duration.max(1e-6);
            value_distance(&self.start, &self.end) / speed
        } else {
            self.created_duration
        };
    }

    fn duration(&self) -> f32 {
        if self.spec.loop_count < 0 {
            f32::INFINITY
        } else {
            self.base * self.spec.loop_count.max(1) as f32
        }
    }

    fn seek(&mut self, t: f32) {
        if self.base <= 0.0 {
            self.write(1.0);
            return;
        }
        let (iter, u) = self.position(t);
        let eased = ease_value(self.spec.ease, u / self.base);
        let factor = if self.spec.loop_style == LoopStyle::Incremental {
            // Affine lerp: shifting the factor by whole iterations
            // continues each pass from where the previous ended.
            eased + iter as f32
        } else {
            eased
        };
        self.write(factor);
    }

    fn complete(&mut self) {
        if self.duration().is_finite() {
            self.seek(self.duration());
        } else {
            self.write(1.0);
        }
    }

    fn rewind(&mut self) {
        self.seek(0.0);
    }
}

impl LerpTween {
    /// Map absolute time to (iteration, forward position within it)
    fn position(&self, t: f32) -> (i64, f32) {
        let infinite = self.spec.loop_count < 0;
        let iterations = self.spec.loop_count.max(1) as i64;
        let total = self.base * iterations as f32;

        let (iter, u) = if t <= 0.0 {
            (0, 0.0)
        } else if !infinite && t >= total {
            (iterations - 1, self.base)
        } else {
            let iter = (t / self.base).floor() as i64;
            (iter, t - iter as f32 * self.base)
        };

        if self.spec.loop_style == LoopStyle::Yoyo && iter % 2 == 1 {
            (iter, self.base - u)
        } else {
            (iter, u)
        }
    }
}

// =============================================================================
// Value math
// =============================================================================

/// Component-wise affine interpolation; `t` may exceed 0..=1 for
/// overshooting curves
pub fn lerp_value(a: &TweenValue, b: &TweenValue, t: f32) -> TweenValue {
    fn mix(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
    match (a, b) {
        (TweenValue::Float(a), TweenValue::Float(b)) => TweenValue::Float(mix(*a, *b, t)),
        (TweenValue::Vec2(a), TweenValue::Vec2(b)) => {
            TweenValue::Vec2(Vec2::new(mix(a.x, b.x, t), mix(a.y, b.y, t)))
        }
        (TweenValue::Vec3(a), TweenValue::Vec3(b)) => TweenValue::Vec3(Vec3::new(
            mix(a.x, b.x, t),
            mix(a.y, b.y, t),
            mix(a.z, b.z, t),
        )),
        (TweenValue::Color(a), TweenValue::Color(b)) => TweenValue::Color(Color::new(
            mix(a.r, b.r, t),
            mix(a.g, b.g, t),
            mix(a.b, b.b, t),
            mix(a.a, b.a, t),
        )),
        // Mismatched kinds are rejected at creation; hold position.
        _ => *a,
    }
}

/// Travel distance as the largest component change
pub fn value_distance(a: &TweenValue, b: &TweenValue) -> f32 {
    match (a, b) {
        (TweenValue::Float(a), TweenValue::Float(b)) => (b - a).abs(),
        (TweenValue::Vec2(a), TweenValue::Vec2(b)) => {
            (b.x - a.x).abs().max((b.y - a.y).abs())
        }
        (TweenValue::Vec3(a), TweenValue::Vec3(b)) => Vec3::new(b.x - a.x, b.y - a.y, b.z - a.z)
            .max_abs_component(),
        (TweenValue::Color(a), TweenValue::Color(b)) => (b.r - a.r)
            .abs()
            .max((b.g - a.g).abs())
            .max((b.b - a.b).abs())
            .max((b.a - a.a).abs()),
        _ => 0.0,
    }
}

/// Round every component to the nearest whole number
pub fn snap_value(v: &TweenValue) -> TweenValue {
    match v {
        TweenValue::Float(v) => TweenValue::Float(v.round()),
        TweenValue::Vec2(v) => TweenValue::Vec2(Vec2::new(v.x.round(), v.y.round())),
        TweenValue::Vec3(v) => TweenValue::Vec3(Vec3::new(v.x.round(), v.y.round(), v.z.round())),
        TweenValue::Color(v) => {
            TweenValue::Color(Color::new(v.r.round(), v.g.round(), v.b.round(), v.a.round()))
        }
    }
}

// =============================================================================
// Curves
// =============================================================================

/// Evaluate a named curve at normalized time `t`
pub fn ease_value(ease: Ease, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match ease {
        Ease::Linear => t,
        Ease::InQuad => t * t,
        Ease::OutQuad => t * (2.0 - t),
        Ease::InOutQuad => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Ease::InCubic => t.powi(3),
        Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
        Ease::InOutCubic => {
            if t < 0.5 {
                4.0 * t.powi(3)
            } else {
                1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
            }
        }
        Ease::InSine => 1.0 - (t * PI / 2.0).cos(),
        Ease::OutSine => (t * PI / 2.0).sin(),
        Ease::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
        Ease::InExpo => {
            if t == 0.0 {
                0.0
            } else {
                2f32.powf(10.0 * t - 10.0)
            }
        }
        Ease::OutExpo => {
            if t == 1.0 {
                1.0
            } else {
                1.0 - 2f32.powf(-10.0 * t)
            }
        }
        Ease::InOutExpo => {
            if t == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else if t < 0.5 {
                2f32.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
        Ease::InBack => {
            const C1: f32 = 1.70158;
            const C3: f32 = C1 + 1.0;
            C3 * t.powi(3) - C1 * t * t
        }
        Ease::OutBack => {
            const C1: f32 = 1.70158;
            const C3: f32 = C1 + 1.0;
            1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
        }
        Ease::InOutBack => {
            const C1: f32 = 1.70158;
            const C2: f32 = C1 * 1.525;
            if t < 0.5 {
                ((2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2)) / 2.0
            } else {
                ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
            }
        }
        Ease::InElastic => {
            const C4: f32 = 2.0 * PI / 3.0;
            if t == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else {
                -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
            }
        }
        Ease::OutElastic => {
            const C4: f32 = 2.0 * PI / 3.0;
            if t == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else {
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
            }
        }
        Ease::InOutElastic => {
            const C5: f32 = 2.0 * PI / 4.5;
            if t == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else if t < 0.5 {
                -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
            } else {
                2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin() / 2.0 + 1.0
            }
        }
        Ease::OutBounce => {
            const N1: f32 = 7.5625;
            const D1: f32 = 2.75;
            let mut t = t;
            if t < 1.0 / D1 {
                N1 * t * t
            } else if t < 2.0 / D1 {
                t -= 1.5 / D1;
                N1 * t * t + 0.75
            } else if t < 2.5 / D1 {
                t -= 2.25 / D1;
                N1 * t * t + 0.9375
            } else {
                t -= 2.625 / D1;
                N1 * t * t + 0.984375
            }
        }
    }
}
