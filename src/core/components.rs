use bevy::prelude::*;

use crate::physics::events::BubbleId;

/// Root entity of one bubble; `id` indexes the engine's current build.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleVisual {
    pub id: BubbleId,
}

/// Rendered radius in world units, mirrored from the engine each frame.
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone, PartialEq)]
pub struct BubbleRadius(pub f32);

/// Tag for the filled circle child.
#[derive(Component)]
pub struct BubbleFill;

/// Ring shown while a bubble is enlarged.
#[derive(Component)]
pub struct BubbleOutline;

#[derive(Component)]
pub struct BubbleLabel;
