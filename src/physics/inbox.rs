//! Thread-safe command queue feeding the engine from input threads.
//!
//! Producers only push; the engine drains the queue at the start of each `step()`, so nothing
//! mutates the simulation while it is iterating.

use bevy::math::Vec2;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::events::BubbleId;
use crate::core::item::Mode;

#[derive(Debug, Clone, PartialEq)]
pub enum PickerCommand {
    BeginDrag { bubble: BubbleId, pointer: Vec2 },
    Drag { pointer: Vec2 },
    Pan { delta: Vec2, speed: f32 },
    EndDrag,
    Select(BubbleId),
    SelectAt(Vec2),
    SetMode(Mode),
}

#[derive(Debug, Clone, Default)]
pub struct PickerInbox {
    queue: Arc<Mutex<VecDeque<PickerCommand>>>,
}

impl PickerInbox {
    pub fn push(&self, command: PickerCommand) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(command);
    }

    pub fn drain(&self) -> Vec<PickerCommand> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
