//! Tick and loop vocabulary
//!
//! The host drives all progression from its per-frame update loop;
//! these types describe which loop phase an animation follows and how
//! much time a tick carries.

use serde::{Deserialize, Serialize};

/// Which host update phase advances an animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateChannel {
    /// The regular per-frame update (default)
    #[default]
    Update,
    /// The late-update pass, after regular updates have run
    Late,
    /// The fixed-timestep pass
    Fixed,
}

/// How an animation repeats once its base duration elapses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopStyle {
    /// Jump back to the start each iteration (default)
    #[default]
    Restart,
    /// Reverse direction each iteration
    Yoyo,
    /// Each iteration continues from where the previous ended
    Incremental,
}

/// Elapsed time carried by one host tick
///
/// `scaled` has the host's time dilation applied; `unscaled` is raw
/// wall-clock frame time. Animations pick one based on their
/// unscaled-time flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDelta {
    pub scaled: f32,
    pub unscaled: f32,
}

impl FrameDelta {
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self { scaled, unscaled }
    }

    /// A tick with no time dilation (scaled == unscaled)
    pub fn uniform(dt: f32) -> Self {
        Self { scaled: dt, unscaled: dt }
    }
}
