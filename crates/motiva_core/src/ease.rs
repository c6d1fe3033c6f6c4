//! Easing curve names
//!
//! Motiva only names curves; evaluating them is the engine's job
//! (see [`TweenEngine::ease_value`](crate::engine::TweenEngine::ease_value)).

use serde::{Deserialize, Serialize};

/// Named easing curves an engine is expected to understand
///
/// `t` is normalized time in 0.0..=1.0; curves map it to a (possibly
/// overshooting) progress factor. `OutBack` and the elastic variants
/// intentionally exceed 1.0 before settling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    OutBounce,
}

impl Ease {
    /// Whether the curve can produce values outside 0.0..=1.0
    pub fn overshoots(&self) -> bool {
        matches!(
            self,
            Ease::InBack
                | Ease::OutBack
                | Ease::InOutBack
                | Ease::InElastic
                | Ease::OutElastic
                | Ease::InOutElastic
        )
    }
}
