//! Central system ordering labels to make the frame explicit.
//! Stages:
//! 1. PickerRebuildSet (window / item changes rebuild the engine)
//! 2. PickerInputSet (pointer gestures become engine calls)
//! 3. PickerStepSet (engine ticks, FixedUpdate)
//! 4. PickerSyncSet (engine state mirrored onto entities)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PickerRebuildSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PickerInputSet; // gestures applied before the next fixed step

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PickerStepSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PickerSyncSet; // read-only view of the engine
