//! Radius / visibility state machine for one bubble's physical body.
//!
//! The body animates its radius in fixed steps toward a target picked from its flags:
//!
//! * inflating: shown but below the default radius (also lazily recreates the physical handle)
//! * deflating: hidden but still above zero; reaching zero destroys the physical handle
//! * increasing / decreasing: moving between default and increased radius
//!
//! Priority per [`Body::resize`] call: inflate, then deflate, then decrease/increase.

use bevy::math::Vec2;

use super::backend::{BodyDesc, PhysicsBackend};

/// Lifecycle of the backend handle: `Uninitialized -> Live -> Destroyed -> Live ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalHandle<H> {
    Uninitialized,
    Live(H),
    Destroyed,
}

impl<H: Copy> PhysicalHandle<H> {
    pub fn live(&self) -> Option<H> {
        match self {
            PhysicalHandle::Live(h) => Some(*h),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Settled,
    Inflating,
    Deflating,
    Increasing,
    Decreasing,
}

/// What a completed transition changed, reported by [`Body::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Left the increased state and rests at the default radius.
    Default,
    /// Reached the increased radius.
    Increased,
    /// Deflated to zero; the physical body is gone.
    Hidden,
}

#[derive(Debug, Clone)]
pub struct Body<H> {
    /// Last known center; the spawn position until the physical body exists.
    pub position: Vec2,
    pub default_radius: f32,
    pub increased_radius: f32,
    pub actual_radius: f32,
    pub density: f32,
    pub margin: f32,
    pub linear_damping: f32,
    pub should_show: bool,
    pub is_visible: bool,
    pub is_being_dragged: bool,
    pub increased: bool,
    pub to_be_increased: bool,
    pub to_be_decreased: bool,
    motion: Motion,
    handle: PhysicalHandle<H>,
}

impl<H: Copy + PartialEq> Body<H> {
    /// Creates the body record. A shown body starts settled at its default radius, a hidden one at
    /// zero; neither has a physical handle until [`Body::initialize`] or the first inflate.
    pub fn new(
        position: Vec2,
        default_radius: f32,
        increased_radius: f32,
        density: f32,
        margin: f32,
        linear_damping: f32,
        should_show: bool,
    ) -> Self {
        Self {
            position,
            default_radius,
            increased_radius,
            actual_radius: if should_show { default_radius } else { 0.0 },
            density,
            margin,
            linear_damping,
            should_show,
            is_visible: should_show,
            is_being_dragged: false,
            increased: false,
            to_be_increased: false,
            to_be_decreased: false,
            motion: Motion::Settled,
            handle: PhysicalHandle::Uninitialized,
        }
    }

    pub fn handle(&self) -> Option<H> {
        self.handle.live()
    }

    pub fn handle_state(&self) -> PhysicalHandle<H> {
        self.handle
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// No physical body exists (never created, or destroyed after deflating).
    pub fn is_destroyed(&self) -> bool {
        self.handle.live().is_none()
    }

    /// Actively animating this tick.
    pub fn is_busy(&self) -> bool {
        self.motion != Motion::Settled
    }

    pub fn has_pending(&self) -> bool {
        self.to_be_increased || self.to_be_decreased
    }

    pub fn finished(&self) -> bool {
        !self.has_pending() && !self.is_busy()
    }

    pub fn collider_radius(&self) -> f32 {
        self.actual_radius + self.margin
    }

    /// Creates the physical body if there is none. Returns false when the world is locked.
    pub fn initialize<B>(&mut self, backend: &mut B) -> bool
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        if self.handle.live().is_some() {
            return true;
        }
        if backend.is_locked() {
            return false;
        }
        let handle = backend.create_body(&BodyDesc {
            position: self.position,
            radius: self.collider_radius(),
            density: self.density,
            linear_damping: self.linear_damping,
        });
        self.handle = PhysicalHandle::Live(handle);
        true
    }

    /// Restart from zero radius so the next resizes inflate the body into existence.
    pub fn collapse(&mut self) {
        self.actual_radius = 0.0;
        self.is_visible = false;
    }

    /// Toggle intent: grow if currently default, shrink if currently increased.
    pub fn define_state(&mut self) {
        self.to_be_increased = !self.increased;
        self.to_be_decreased = self.increased;
    }

    /// Intent to end up at the default radius regardless of the current state.
    pub fn request_default(&mut self) {
        self.to_be_increased = false;
        self.to_be_decreased = true;
    }

    /// Drop intent and settled enlargement, e.g. when the visible set changes.
    pub fn reset_selection(&mut self) {
        self.increased = false;
        self.to_be_increased = false;
        self.to_be_decreased = false;
    }

    fn wants_increased(&self) -> bool {
        self.to_be_increased || (self.increased && !self.to_be_decreased)
    }

    /// Advance the radius one step. Returns the state reached when a transition completes.
    pub fn resize<B>(&mut self, step: f32, backend: &mut B) -> Option<Settled>
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        if self.should_show && self.actual_radius < self.default_radius {
            self.inflate(step, backend)
        } else if !self.should_show && (self.actual_radius > 0.0 || self.handle.live().is_some()) {
            self.deflate(step, backend)
        } else if self.should_show {
            let wants_increased = self.wants_increased();
            let target = if wants_increased {
                self.increased_radius
            } else {
                self.default_radius
            };
            if self.actual_radius > target {
                self.decrease(step, target, wants_increased, backend)
            } else if self.actual_radius < target {
                self.increase(step, target, wants_increased, backend)
            } else {
                self.settle(wants_increased)
            }
        } else {
            // Hidden and already at zero: nothing left to animate.
            self.clear();
            None
        }
    }

    fn inflate<B>(&mut self, step: f32, backend: &mut B) -> Option<Settled>
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        if !self.initialize(backend) {
            // Retried on the next tick once the world is unlocked.
            return None;
        }
        self.is_visible = true;
        self.motion = Motion::Inflating;
        self.actual_radius = (self.actual_radius + step).min(self.default_radius);
        self.sync_radius(backend);
        if self.actual_radius >= self.default_radius {
            return self.settle(false);
        }
        None
    }

    fn deflate<B>(&mut self, step: f32, backend: &mut B) -> Option<Settled>
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        self.motion = Motion::Deflating;
        self.actual_radius = (self.actual_radius - step).max(0.0);
        self.sync_radius(backend);
        if self.actual_radius <= 0.0 {
            if backend.is_locked() {
                return None;
            }
            self.actual_radius = 0.0;
            self.is_visible = false;
            self.increased = false;
            if let Some(h) = self.handle.live() {
                backend.destroy_body(h);
            }
            self.handle = PhysicalHandle::Destroyed;
            self.clear();
            return Some(Settled::Hidden);
        }
        None
    }

    fn increase<B>(&mut self, step: f32, target: f32, wants_increased: bool, backend: &mut B) -> Option<Settled>
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        self.motion = Motion::Increasing;
        let next = (self.actual_radius + step).min(target);
        self.actual_radius = if target - next < step { target } else { next };
        self.sync_radius(backend);
        if self.actual_radius == target {
            self.settle(wants_increased)
        } else {
            None
        }
    }

    fn decrease<B>(&mut self, step: f32, target: f32, wants_increased: bool, backend: &mut B) -> Option<Settled>
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        self.motion = Motion::Decreasing;
        let next = (self.actual_radius - step).max(target);
        self.actual_radius = if next - target < step { target } else { next };
        self.sync_radius(backend);
        if self.actual_radius == target {
            self.settle(wants_increased)
        } else {
            None
        }
    }

    /// Ends the current transition; reports only a change of the settled enlargement.
    fn settle(&mut self, increased: bool) -> Option<Settled> {
        let was_increased = self.increased;
        self.increased = increased;
        self.clear();
        match (was_increased, increased) {
            (false, true) => Some(Settled::Increased),
            (true, false) => Some(Settled::Default),
            _ => None,
        }
    }

    fn sync_radius<B>(&self, backend: &mut B)
    where
        B: PhysicsBackend<BodyHandle = H>,
    {
        if let Some(h) = self.handle.live() {
            backend.set_body_radius(h, self.collider_radius());
        }
    }

    fn clear(&mut self) {
        self.to_be_increased = false;
        self.to_be_decreased = false;
        self.motion = Motion::Settled;
    }
}
