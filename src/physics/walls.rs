use bevy::math::Vec2;

use super::backend::PhysicsBackend;

/// Horizontal extent of each wall; far wider than any pan so bubbles can't slip around the ends.
const WALL_HALF_LENGTH: f32 = 50.0;

/// Two static horizontal segments at the top and bottom of the normalized viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryWalls<H> {
    pub top: H,
    pub bottom: H,
    /// Distance of each wall from the horizontal axis.
    pub half_height: f32,
}

impl<H: Copy> BoundaryWalls<H> {
    /// `scale_y` is the viewport's vertical scale; the visible half height is `1 / scale_y`.
    pub fn create<B>(backend: &mut B, scale_y: f32) -> Self
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        let half_height = 1.0 / scale_y.max(f32::EPSILON);
        let wall = |backend: &mut B, y: f32| {
            backend.create_segment(Vec2::new(-WALL_HALF_LENGTH, y), Vec2::new(WALL_HALF_LENGTH, y))
        };
        Self {
            top: wall(backend, half_height),
            bottom: wall(backend, -half_height),
            half_height,
        }
    }

    pub fn contains(&self, y: f32) -> bool {
        y.abs() <= self.half_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::backend::testing::{Call, ScriptedBackend};

    #[test]
    fn creates_two_segments() {
        let mut backend = ScriptedBackend::default();
        let walls = BoundaryWalls::create(&mut backend, 0.5);
        assert_eq!(walls.half_height, 2.0);
        assert_ne!(walls.top, walls.bottom);
        let segments = backend.calls.iter().filter(|c| matches!(c, Call::Segment(_))).count();
        assert_eq!(segments, 2);
        assert!(walls.contains(1.9));
        assert!(!walls.contains(-2.1));
    }
}
