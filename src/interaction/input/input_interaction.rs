use bevy::prelude::*;
use smallvec::SmallVec;

use crate::app::picker::{Picker, SetPickerMode};
use crate::core::config::PickerConfig;
use crate::core::item::ItemId;
use crate::core::system::system_order::PickerInputSet;
use crate::interaction::gesture::{Gesture, GestureTracker};
use crate::interaction::viewport::Viewport;
use crate::physics::backend::PhysicsBackend;
use crate::physics::engine::PickerEngine;
use crate::physics::events::{BubbleId, TouchListener};

pub struct PickerInputPlugin;

impl Plugin for PickerInputPlugin {
    fn build(&self, app: &mut App) {
        let gesture_cfg = app
            .world()
            .get_resource::<PickerConfig>()
            .map(|c| c.gesture.clone())
            .unwrap_or_default();
        app.insert_resource(PickerGestures::new(GestureTracker::new(gesture_cfg)))
            .init_resource::<PickerTouchListener>()
            .add_event::<BubbleLongPressed>()
            .add_systems(
                Update,
                (read_pointer, toggle_mode_on_key, recenter_on_key).in_set(PickerInputSet),
            );
    }
}

/// Pointer state between frames.
#[derive(Resource, Debug, Default)]
pub struct PickerGestures {
    pub tracker: GestureTracker,
    /// Bubble under the pointer when it went down.
    pub grabbed: Option<BubbleId>,
    pub last_pointer: Option<Vec2>,
}

impl PickerGestures {
    pub fn new(tracker: GestureTracker) -> Self {
        Self {
            tracker,
            grabbed: None,
            last_pointer: None,
        }
    }
}

/// Optional host callbacks for raw touch activity.
#[derive(Resource, Default)]
pub struct PickerTouchListener(pub Option<Box<dyn TouchListener>>);

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct BubbleLongPressed {
    pub bubble: BubbleId,
    pub item: ItemId,
}

/// Window-space pointer: first active touch, a touch released this frame, else the cursor.
fn primary_pointer_screen_pos(window: &Window, touches: &Touches) -> Option<Vec2> {
    if let Some(touch) = touches.iter().next() {
        return Some(touch.position());
    }
    if let Some(touch) = touches.iter_just_released().next() {
        return Some(touch.position());
    }
    window.cursor_position()
}

/// Drives the engine from one gesture. Returns the bubble a long press landed on.
pub fn apply_gesture<B: PhysicsBackend>(
    engine: &mut PickerEngine<B>,
    viewport: &Viewport,
    state: &mut PickerGestures,
    listener: Option<&mut (dyn TouchListener + 'static)>,
    gesture: Gesture,
) -> Option<BubbleId> {
    let world = |px: Vec2| viewport.screen_to_world(px);
    let mut long_pressed = None;
    match gesture {
        Gesture::Press { at } => {
            state.grabbed = engine.bubble_at(world(at));
            if let Some(l) = listener {
                l.on_touch_down();
            }
        }
        Gesture::DragStart { origin, at } => {
            match state.grabbed {
                Some(bubble) if engine.begin_drag(bubble, world(origin)) => {
                    engine.drag(world(at));
                }
                _ => {
                    state.grabbed = None;
                    engine.pan(world(at) - world(origin), 0.0);
                }
            }
            if let Some(l) = listener {
                l.on_touch_move();
            }
        }
        Gesture::DragMove { at, delta, speed } => {
            // A grab whose drag is still deferred (locked world) must not turn into a pan.
            if state.grabbed.is_some() {
                engine.drag(world(at));
            } else {
                engine.pan(
                    viewport.screen_delta_to_world(delta),
                    speed / viewport.pixels_per_unit(),
                );
            }
            if let Some(l) = listener {
                l.on_touch_move();
            }
        }
        Gesture::Tap { at } => {
            engine.end_drag();
            if let Some(outcome) = engine.select_at(world(at)) {
                debug!("tap on {:?} (selecting: {})", outcome.bubble, outcome.selecting);
            }
            state.grabbed = None;
            if let Some(l) = listener {
                l.on_touch_up();
            }
        }
        Gesture::LongPress { at } => {
            long_pressed = engine.long_press_at(world(at));
        }
        Gesture::DragEnd { .. } | Gesture::Release { .. } => {
            engine.end_drag();
            state.grabbed = None;
            if let Some(l) = listener {
                l.on_touch_up();
            }
        }
    }
    long_pressed
}

#[allow(clippy::too_many_arguments)]
fn read_pointer(
    time: Res<Time>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows_q: Query<&Window>,
    viewport: Res<Viewport>,
    mut gestures: ResMut<PickerGestures>,
    mut picker: ResMut<Picker>,
    mut touch_listener: ResMut<PickerTouchListener>,
    mut long_presses: EventWriter<BubbleLongPressed>,
) {
    let Ok(window) = windows_q.single() else {
        return;
    };
    let now = time.elapsed_secs_f64();
    let pointer = primary_pointer_screen_pos(window, &touches);
    if pointer.is_some() {
        gestures.last_pointer = pointer;
    }

    let pressed = buttons.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    let released = buttons.just_released(MouseButton::Left) || touches.any_just_released();
    let cancelled = touches.any_just_canceled();

    let mut batch: SmallVec<[Gesture; 3]> = SmallVec::new();
    if pressed {
        if let Some(at) = pointer {
            batch.push(gestures.tracker.press(at, now));
        }
    } else if let Some(at) = pointer.filter(|_| gestures.tracker.is_active()) {
        batch.extend(gestures.tracker.moved(at, now));
    }
    batch.extend(gestures.tracker.poll(now));
    if cancelled {
        batch.extend(gestures.tracker.cancel());
    } else if released {
        let at = pointer.or(gestures.last_pointer).unwrap_or_default();
        batch.extend(gestures.tracker.release(at));
    }

    for gesture in batch {
        let listener = touch_listener.0.as_deref_mut();
        if let Some(bubble) = apply_gesture(&mut picker.engine, &viewport, &mut gestures, listener, gesture) {
            if let Some(b) = picker.bubble(bubble) {
                long_presses.write(BubbleLongPressed {
                    bubble,
                    item: b.item.id.clone(),
                });
            }
        }
    }
}

fn toggle_mode_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    picker: Res<Picker>,
    mut requests: EventWriter<SetPickerMode>,
) {
    if keys.just_pressed(KeyCode::KeyM) {
        requests.write(SetPickerMode(picker.mode().toggled()));
    }
}

fn recenter_on_key(keys: Res<ButtonInput<KeyCode>>, mut picker: ResMut<Picker>) {
    if keys.just_pressed(KeyCode::KeyC) {
        picker.recenter();
    }
}
