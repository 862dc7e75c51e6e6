// This file is part of Bubble Picker.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::config::PickerConfig;
use crate::core::item::{ItemId, Mode, PickerItem};
use crate::core::system::system_order::{PickerInputSet, PickerRebuildSet, PickerStepSet, PickerSyncSet};
use crate::interaction::input::input_interaction::PickerInputPlugin;
use crate::interaction::viewport::Viewport;
use crate::physics::engine::PickerEngine;
use crate::physics::events::{BubbleId, SelectionEvent};
use crate::rendering::bubbles::BubbleRenderPlugin;
use crate::rendering::camera::CameraPlugin;

/// The simulation as a Bevy resource. `generation` bumps on every rebuild so visuals know to
/// respawn.
#[derive(Resource, Deref, DerefMut)]
pub struct Picker {
    #[deref]
    pub engine: PickerEngine,
    pub generation: u32,
}

impl Picker {
    pub fn new(config: PickerConfig) -> Self {
        Self {
            engine: PickerEngine::with_rapier(config),
            generation: 0,
        }
    }
}

/// Items the picker shows; replacing the resource rebuilds the picker.
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct PickerItems(pub Vec<PickerItem>);

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct BubbleSelected {
    pub bubble: BubbleId,
    pub item: ItemId,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct BubbleDeselected {
    pub bubble: BubbleId,
    pub item: ItemId,
}

/// Request a switch between main and secondary values.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPickerMode(pub Mode);

/// Forces a rebuild from the current items and viewport.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RebuildPicker;

/// Core picker: engine resource, fixed-rate stepping, rebuilds and selection events.
/// Rendering and input are added by [`BubblePickerAppPlugin`].
pub struct BubblePickerPlugin;

impl Plugin for BubblePickerPlugin {
    fn build(&self, app: &mut App) {
        let cfg = app
            .world()
            .get_resource::<PickerConfig>()
            .cloned()
            .unwrap_or_default();
        let hz = cfg.simulation.steps_per_second;
        app.insert_resource(Time::<Fixed>::from_hz(hz))
            .insert_resource(Picker::new(cfg.clone()))
            .insert_resource(cfg)
            .init_resource::<PickerItems>()
            .init_resource::<Viewport>()
            .add_event::<BubbleSelected>()
            .add_event::<BubbleDeselected>()
            .add_event::<SetPickerMode>()
            .add_event::<RebuildPicker>()
            .configure_sets(
                Update,
                (
                    PickerRebuildSet,
                    PickerInputSet.after(PickerRebuildSet),
                    PickerSyncSet.after(PickerInputSet),
                ),
            )
            .add_systems(
                Update,
                (track_viewport, rebuild_picker).chain().in_set(PickerRebuildSet),
            )
            .add_systems(Update, apply_mode_requests.in_set(PickerInputSet))
            .add_systems(FixedUpdate, step_picker.in_set(PickerStepSet));
    }
}

/// Everything needed for the windowed demo.
pub struct BubblePickerAppPlugin;

impl Plugin for BubblePickerAppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((BubblePickerPlugin, CameraPlugin, BubbleRenderPlugin, PickerInputPlugin));
    }
}

fn track_viewport(windows: Query<&Window>, mut viewport: ResMut<Viewport>) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = Viewport::new(window.width(), window.height());
    if *viewport != next {
        *viewport = next;
    }
}

fn rebuild_picker(
    mut picker: ResMut<Picker>,
    items: Res<PickerItems>,
    viewport: Res<Viewport>,
    mut requests: EventReader<RebuildPicker>,
) {
    let requested = requests.read().count() > 0;
    if !(requested || items.is_changed() || viewport.is_changed()) {
        return;
    }
    let scale = viewport.scale();
    picker.engine.build(items.0.clone(), scale.x, scale.y);
    picker.generation = picker.generation.wrapping_add(1);
}

fn apply_mode_requests(mut picker: ResMut<Picker>, mut requests: EventReader<SetPickerMode>) {
    for SetPickerMode(mode) in requests.read() {
        picker.set_mode(*mode);
    }
}

fn step_picker(
    mut picker: ResMut<Picker>,
    mut selected: EventWriter<BubbleSelected>,
    mut deselected: EventWriter<BubbleDeselected>,
) {
    let report = picker.step();
    for event in report.events {
        match event {
            SelectionEvent::Selected { bubble, item } => {
                selected.write(BubbleSelected { bubble, item });
            }
            SelectionEvent::Deselected { bubble, item } => {
                deselected.write(BubbleDeselected { bubble, item });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(items: Vec<PickerItem>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(BubblePickerPlugin)
            .insert_resource(PickerItems(items));
        app
    }

    #[test]
    fn builds_on_first_update() {
        let mut app = app_with(vec![PickerItem::new("a", 1.0), PickerItem::new("b", 2.0)]);
        app.update();
        let picker = app.world().resource::<Picker>();
        assert_eq!(picker.bubbles().len(), 2);
        assert_eq!(picker.generation, 1);
        app.update();
        assert_eq!(app.world().resource::<Picker>().generation, 1);
    }

    #[test]
    fn replacing_items_rebuilds() {
        let mut app = app_with(vec![PickerItem::new("a", 1.0)]);
        app.update();
        app.world_mut().resource_mut::<PickerItems>().0.push(PickerItem::new("b", 1.0));
        app.update();
        let picker = app.world().resource::<Picker>();
        assert_eq!(picker.bubbles().len(), 2);
        assert_eq!(picker.generation, 2);
    }

    #[test]
    fn fixed_steps_emit_selection_events() {
        let mut app = app_with(vec![PickerItem::new("a", 1.0), PickerItem::new("b", 2.0)]);
        app.update();
        assert!(app.world_mut().resource_mut::<Picker>().select(BubbleId(0)));
        for _ in 0..30 {
            app.world_mut().run_schedule(FixedUpdate);
        }
        let seen: Vec<BubbleSelected> = app
            .world()
            .resource::<Events<BubbleSelected>>()
            .iter_current_update_events()
            .cloned()
            .collect();
        assert_eq!(
            seen,
            vec![BubbleSelected {
                bubble: BubbleId(0),
                item: ItemId::new("a")
            }]
        );
    }
}
