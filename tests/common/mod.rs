//! Deterministic backend for integration tests: bodies only move when a constraint drags them.
#![allow(dead_code)]

use std::collections::HashMap;

use bevy::math::Vec2;
use bubble_picker::physics::backend::{BodyDesc, PhysicsBackend, PointConstraintDesc};

#[derive(Default)]
pub struct RecordingBackend {
    next: u32,
    pub locked: bool,
    pub positions: HashMap<u32, Vec2>,
    pub radii: HashMap<u32, f32>,
    pub constraints: HashMap<u32, u32>,
    /// Every applied force, in order.
    pub forces: Vec<(u32, Vec2)>,
    pub destroyed: Vec<u32>,
    pub steps: usize,
}

impl RecordingBackend {
    pub fn locked() -> Self {
        Self {
            locked: true,
            ..Default::default()
        }
    }

    pub fn forces_on(&self, body: u32) -> usize {
        self.forces.iter().filter(|(b, _)| *b == body).count()
    }
}

impl PhysicsBackend for RecordingBackend {
    type BodyHandle = u32;
    type ConstraintHandle = u32;

    fn is_locked(&self) -> bool {
        self.locked
    }
    fn create_body(&mut self, desc: &BodyDesc) -> u32 {
        self.next += 1;
        self.positions.insert(self.next, desc.position);
        self.radii.insert(self.next, desc.radius);
        self.next
    }
    fn destroy_body(&mut self, body: u32) {
        self.positions.remove(&body);
        self.radii.remove(&body);
        self.destroyed.push(body);
    }
    fn set_body_radius(&mut self, body: u32, radius: f32) {
        self.radii.insert(body, radius);
    }
    fn body_position(&self, body: u32) -> Option<Vec2> {
        self.positions.get(&body).copied()
    }
    fn apply_force(&mut self, body: u32, force: Vec2) {
        self.forces.push((body, force));
    }
    fn create_segment(&mut self, _from: Vec2, _to: Vec2) -> u32 {
        self.next += 1;
        self.next
    }
    fn create_point_constraint(&mut self, body: u32, _desc: &PointConstraintDesc) -> u32 {
        self.next += 1;
        self.constraints.insert(self.next, body);
        self.next
    }
    fn set_constraint_target(&mut self, constraint: u32, target: Vec2) {
        if let Some(body) = self.constraints.get(&constraint) {
            self.positions.insert(*body, target);
        }
    }
    fn destroy_point_constraint(&mut self, constraint: u32) {
        self.constraints.remove(&constraint);
    }
    fn step(&mut self, _dt: f32, _solver_iterations: usize) {
        self.steps += 1;
    }
    fn clear(&mut self) {
        self.positions.clear();
        self.radii.clear();
        self.constraints.clear();
    }
}
