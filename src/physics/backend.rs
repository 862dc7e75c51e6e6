//! Capability interface the picker engine needs from a 2D rigid-body library.
//!
//! The engine only ever creates circular dynamic bodies, static segments, and a single
//! point constraint for dragging; any backend offering those can drive it.

use bevy::math::Vec2;
use std::fmt::Debug;

/// Parameters for a new circular dynamic body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    /// Collider radius (visual radius plus margin).
    pub radius: f32,
    pub density: f32,
    pub linear_damping: f32,
}

/// Spring-like joint pinning a body to a movable target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointConstraintDesc {
    pub target: Vec2,
    pub stiffness: f32,
    pub damping: f32,
}

pub trait PhysicsBackend {
    type BodyHandle: Copy + Eq + Debug + Send + Sync;
    type ConstraintHandle: Copy + Eq + Debug + Send + Sync;

    /// True while the world is mid-step and must not be mutated.
    fn is_locked(&self) -> bool {
        false
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Self::BodyHandle;
    fn destroy_body(&mut self, body: Self::BodyHandle);
    fn set_body_radius(&mut self, body: Self::BodyHandle, radius: f32);
    fn body_position(&self, body: Self::BodyHandle) -> Option<Vec2>;
    /// Force applied during the next step only.
    fn apply_force(&mut self, body: Self::BodyHandle, force: Vec2);

    /// Static line segment bodies collide with.
    fn create_segment(&mut self, from: Vec2, to: Vec2) -> Self::BodyHandle;

    fn create_point_constraint(
        &mut self,
        body: Self::BodyHandle,
        desc: &PointConstraintDesc,
    ) -> Self::ConstraintHandle;
    fn set_constraint_target(&mut self, constraint: Self::ConstraintHandle, target: Vec2);
    fn destroy_point_constraint(&mut self, constraint: Self::ConstraintHandle);

    fn step(&mut self, dt: f32, solver_iterations: usize);

    /// Remove every body and constraint.
    fn clear(&mut self);
}
