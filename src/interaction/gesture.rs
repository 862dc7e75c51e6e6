//! Turns raw pointer samples into picker gestures: tap, drag (bubble or pan) and long press.
//!
//! Positions are window pixels; times are seconds from any monotonic origin.

use bevy::math::Vec2;

use crate::core::config::GestureConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Press { at: Vec2 },
    /// First movement past the swipe slop.
    DragStart { origin: Vec2, at: Vec2 },
    /// `speed` is in pixels per second.
    DragMove { at: Vec2, delta: Vec2, speed: f32 },
    DragEnd { at: Vec2 },
    /// Released close to where it went down, with no long press in between.
    Tap { at: Vec2 },
    LongPress { at: Vec2 },
    /// Released without tapping or dragging (after a long press, or cancelled).
    Release { at: Vec2 },
}

#[derive(Debug, Clone, Copy)]
struct Track {
    origin: Vec2,
    previous: Vec2,
    pressed_at: f64,
    last_time: f64,
    dragging: bool,
    long_pressed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    cfg: GestureConfig,
    active: Option<Track>,
}

impl GestureTracker {
    pub fn new(cfg: GestureConfig) -> Self {
        Self { cfg, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some_and(|t| t.dragging)
    }

    pub fn origin(&self) -> Option<Vec2> {
        self.active.map(|t| t.origin)
    }

    pub fn press(&mut self, at: Vec2, now: f64) -> Gesture {
        self.active = Some(Track {
            origin: at,
            previous: at,
            pressed_at: now,
            last_time: now,
            dragging: false,
            long_pressed: false,
        });
        Gesture::Press { at }
    }

    pub fn moved(&mut self, at: Vec2, now: f64) -> Option<Gesture> {
        let slop = self.cfg.swipe_slop_px;
        let track = self.active.as_mut()?;
        let delta = at - track.previous;
        if !track.dragging {
            if delta.abs().max_element() <= slop {
                return None;
            }
            track.dragging = true;
            track.previous = at;
            track.last_time = now;
            return Some(Gesture::DragStart {
                origin: track.origin,
                at,
            });
        }
        if delta == Vec2::ZERO {
            return None;
        }
        let dt = (now - track.last_time).max(1e-3) as f32;
        track.previous = at;
        track.last_time = now;
        Some(Gesture::DragMove {
            at,
            delta,
            speed: delta.length() / dt,
        })
    }

    pub fn release(&mut self, at: Vec2) -> Option<Gesture> {
        let track = self.active.take()?;
        if track.dragging {
            return Some(Gesture::DragEnd { at });
        }
        let travel = (at - track.origin).abs().max_element();
        if !track.long_pressed && travel < self.cfg.click_slop_px {
            Some(Gesture::Tap { at })
        } else {
            Some(Gesture::Release { at })
        }
    }

    pub fn cancel(&mut self) -> Option<Gesture> {
        let track = self.active.take()?;
        Some(if track.dragging {
            Gesture::DragEnd { at: track.previous }
        } else {
            Gesture::Release { at: track.previous }
        })
    }

    /// Fires a long press once a still press has been held long enough.
    pub fn poll(&mut self, now: f64) -> Option<Gesture> {
        let hold = self.cfg.long_press_secs as f64;
        let track = self.active.as_mut()?;
        if track.dragging || track.long_pressed || now - track.pressed_at < hold {
            return None;
        }
        track.long_pressed = true;
        Some(Gesture::LongPress { at: track.previous })
    }
}
