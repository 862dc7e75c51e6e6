//! Pixel <-> world conversions.
//!
//! One world unit is half of the viewport's shorter side, so the shorter axis always spans
//! `-1..=1` and the longer one `-1/scale..=1/scale`.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(720.0, 1280.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// `(scale_x, scale_y)`: 1 on the shorter axis, shorter / longer on the other.
    pub fn scale(&self) -> Vec2 {
        if self.width > self.height {
            Vec2::new(self.height / self.width, 1.0)
        } else {
            Vec2::new(1.0, self.width / self.height)
        }
    }

    pub fn pixels_per_unit(&self) -> f32 {
        self.width.min(self.height) * 0.5
    }

    /// Half extents of the visible area in world units.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::ONE / self.scale()
    }

    /// Window coordinates (origin top-left, y down) to world.
    pub fn screen_to_world(&self, px: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (2.0 * (px.x / self.width) - 1.0) / scale.x,
            -(2.0 * (px.y / self.height) - 1.0) / scale.y,
        )
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (world.x * scale.x + 1.0) * 0.5 * self.width,
            (1.0 - world.y * scale.y) * 0.5 * self.height,
        )
    }

    /// World to 2D camera space (origin center, y up, one unit per pixel).
    pub fn world_to_camera(&self, world: Vec2) -> Vec2 {
        world * self.pixels_per_unit()
    }

    pub fn camera_to_world(&self, camera: Vec2) -> Vec2 {
        camera / self.pixels_per_unit()
    }

    /// Converts a screen-space displacement (y down) to world units.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        Vec2::new(delta.x, -delta.y) / self.pixels_per_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_scales_vertical_axis() {
        let vp = Viewport::new(720.0, 1280.0);
        assert_eq!(vp.scale(), Vec2::new(1.0, 0.5625));
        assert_eq!(vp.screen_to_world(Vec2::new(360.0, 640.0)), Vec2::ZERO);
        let top_right = vp.screen_to_world(Vec2::new(720.0, 0.0));
        assert!((top_right - Vec2::new(1.0, 1.0 / 0.5625)).length() < 1e-5);
    }

    #[test]
    fn screen_and_world_agree() {
        let vp = Viewport::new(1920.0, 1080.0);
        let p = Vec2::new(0.4, -0.7);
        let back = vp.screen_to_world(vp.world_to_screen(p));
        assert!((back - p).length() < 1e-5);
        let px = vp.world_to_screen(p);
        let cam = vp.world_to_camera(p);
        assert!((cam.x - (px.x - 960.0)).abs() < 1e-3);
        assert!((cam.y - (540.0 - px.y)).abs() < 1e-3);
    }
}
