//! [`PhysicsBackend`] on top of rapier2d. The backend owns every rapier set; nothing is global,
//! so several pickers can run side by side.

use bevy::math::Vec2;
use rapier2d::prelude::*;
use std::num::NonZeroUsize;

use super::backend::{BodyDesc, PhysicsBackend, PointConstraintDesc};

#[inline]
fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

/// Drag constraint: a kinematic anchor following the pointer, sprung to the dragged body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RapierConstraint {
    anchor: RigidBodyHandle,
    joint: ImpulseJointHandle,
}

pub struct RapierBackend {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierBackend {
    pub fn new() -> Self {
        Self {
            // Centering is applied as explicit forces; the world itself has no gravity.
            gravity: vector![0.0, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    fn remove(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }
}

impl PhysicsBackend for RapierBackend {
    type BodyHandle = RigidBodyHandle;
    type ConstraintHandle = RapierConstraint;

    fn create_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_na(desc.position))
            .linear_damping(desc.linear_damping)
            .lock_rotations()
            .build();
        let collider = ColliderBuilder::ball(desc.radius.max(f32::EPSILON))
            .density(desc.density)
            .friction(0.0)
            .build();
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    fn destroy_body(&mut self, body: RigidBodyHandle) {
        self.remove(body);
    }

    fn set_body_radius(&mut self, body: RigidBodyHandle, radius: f32) {
        let Some(rb) = self.bodies.get(body) else {
            return;
        };
        for &collider in rb.colliders() {
            if let Some(c) = self.colliders.get_mut(collider) {
                c.set_shape(SharedShape::ball(radius.max(f32::EPSILON)));
            }
        }
    }

    fn body_position(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(body).map(|rb| {
            let t = rb.translation();
            Vec2::new(t.x, t.y)
        })
    }

    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.add_force(to_na(force), true);
        }
    }

    fn create_segment(&mut self, from: Vec2, to: Vec2) -> RigidBodyHandle {
        let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::segment(point![from.x, from.y], point![to.x, to.y])
            .friction(0.0)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    fn create_point_constraint(
        &mut self,
        body: RigidBodyHandle,
        desc: &PointConstraintDesc,
    ) -> RapierConstraint {
        let anchor = self.bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(to_na(desc.target))
                .build(),
        );
        let spring = SpringJointBuilder::new(0.0, desc.stiffness, desc.damping)
            .local_anchor1(point![0.0, 0.0])
            .local_anchor2(point![0.0, 0.0])
            .build();
        let joint = self.impulse_joints.insert(anchor, body, spring, true);
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.wake_up(true);
        }
        RapierConstraint { anchor, joint }
    }

    fn set_constraint_target(&mut self, constraint: RapierConstraint, target: Vec2) {
        if let Some(anchor) = self.bodies.get_mut(constraint.anchor) {
            anchor.set_next_kinematic_translation(to_na(target));
        }
    }

    fn destroy_point_constraint(&mut self, constraint: RapierConstraint) {
        self.impulse_joints.remove(constraint.joint, true);
        self.remove(constraint.anchor);
    }

    fn step(&mut self, dt: f32, solver_iterations: usize) {
        self.integration_parameters.dt = dt;
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(solver_iterations).unwrap_or(NonZeroUsize::MIN);
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        // Forces only last one step, like the centering model expects.
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }
}
