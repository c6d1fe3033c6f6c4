//! A standard test target
//!
//! [`TestNode`] implements the full [`MotionTarget`] surface with
//! interior mutability, so preset playback, bulk control, and stagger
//! can all be exercised against it.

use std::any::Any;
use std::sync::{Arc, Mutex};

use motiva_core::{
    motion_property, FnProperty, MotionProperty, MotionTarget, TargetKey, TargetRef, TweenValue,
    Vec3,
};

#[derive(Clone, Copy, Debug)]
struct NodeState {
    opacity: f32,
    scale: Vec3,
    position: Vec3,
    rotation: f32,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            rotation: 0.0,
        }
    }
}

/// A target with the full standard motion surface
pub struct TestNode {
    state: Mutex<NodeState>,
}

impl TestNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(NodeState::default()),
        })
    }

    pub fn with_scale(scale: Vec3) -> Arc<Self> {
        let node = Self::new();
        node.state.lock().unwrap().scale = scale;
        node
    }

    pub fn with_position(position: Vec3) -> Arc<Self> {
        let node = Self::new();
        node.state.lock().unwrap().position = position;
        node
    }

    pub fn opacity(&self) -> f32 {
        self.state.lock().unwrap().opacity
    }

    pub fn scale(&self) -> Vec3 {
        self.state.lock().unwrap().scale
    }

    pub fn position(&self) -> Vec3 {
        self.state.lock().unwrap().position
    }

    pub fn rotation(&self) -> f32 {
        self.state.lock().unwrap().rotation
    }
}

/// Ergonomics over `Arc<TestNode>`
pub trait TestNodeExt {
    /// This node as a recipe target
    fn target(&self) -> TargetRef;

    /// Key for target-keyed bulk control
    fn key(&self) -> TargetKey;

    /// An accessor over one standard aspect
    fn property(&self, prop: MotionProperty) -> FnProperty;
}

impl TestNodeExt for Arc<TestNode> {
    fn target(&self) -> TargetRef {
        self.clone()
    }

    fn key(&self) -> TargetKey {
        TargetKey::of_arc(self)
    }

    fn property(&self, prop: MotionProperty) -> FnProperty {
        motion_property(&self.target(), prop)
    }
}

impl MotionTarget for TestNode {
    fn motion_value(&self, prop: MotionProperty) -> Option<TweenValue> {
        let state = self.state.lock().unwrap();
        Some(match prop {
            MotionProperty::Opacity => TweenValue::Float(state.opacity),
            MotionProperty::Scale => TweenValue::Vec3(state.scale),
            MotionProperty::Position => TweenValue::Vec3(state.position),
            MotionProperty::Rotation => TweenValue::Float(state.rotation),
        })
    }

    fn set_motion_value(&self, prop: MotionProperty, value: TweenValue) {
        let mut state = self.state.lock().unwrap();
        match (prop, value) {
            (MotionProperty::Opacity, TweenValue::Float(v)) => state.opacity = v,
            (MotionProperty::Scale, TweenValue::Vec3(v)) => state.scale = v,
            (MotionProperty::Position, TweenValue::Vec3(v)) => state.position = v,
            (MotionProperty::Rotation, TweenValue::Float(v)) => state.rotation = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
