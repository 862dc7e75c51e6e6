//! The picker simulation: owns the physics world, the bubbles, the resize queue and the
//! selection / drag / pan state. One call to [`PickerEngine::step`] is one simulation tick.
//!
//! Tick order:
//! 1. drain the command inbox and any operations deferred while the world was locked
//! 2. advance every queued bubble's radius state machine
//! 3. advance the physics world one fixed step
//! 4. tear down a released drag constraint
//! 5. read back positions and apply centering forces for the next step
//! 6. forget bubbles whose transitions finished, then notify the listener

use bevy::log::{debug, info, trace};
use bevy::math::Vec2;
use smallvec::SmallVec;
use std::collections::{BTreeSet, VecDeque};
use std::f32::consts::PI;

use super::backend::{PhysicsBackend, PointConstraintDesc};
use super::body::{Body, Settled};
use super::events::{BubbleId, BubblePickerListener, SelectionEvent};
use super::inbox::{PickerCommand, PickerInbox};
use super::layout::spiral_position;
use super::rapier_backend::RapierBackend;
use super::sizing::Sizing;
use super::walls::BoundaryWalls;
use crate::core::config::PickerConfig;
use crate::core::item::{ItemId, Mode, PickerItem};

/// Distance-squared gain of the pull toward the gravity center.
const CENTERING_GAIN: f32 = 3.0;

/// One item and its body.
#[derive(Debug, Clone)]
pub struct Bubble<H> {
    pub id: BubbleId,
    pub item: PickerItem,
    pub body: Body<H>,
    /// Slot in the spiral of the item's own set.
    pub layout_index: usize,
}

/// Read-only snapshot for renderers and hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleView {
    pub id: BubbleId,
    pub item: ItemId,
    pub position: Vec2,
    pub radius: f32,
    pub visible: bool,
    pub increased: bool,
    pub selected: bool,
    pub dragged: bool,
}

/// Which bubbles a mode switch touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeChange {
    pub previous: Mode,
    pub mode: Mode,
    /// Becoming visible in the new mode.
    pub shown: Vec<BubbleId>,
    /// Leaving the view.
    pub hidden: Vec<BubbleId>,
    /// Dual items whose value (and so radius) swapped.
    pub resized: Vec<BubbleId>,
    /// Selection cleared by the switch.
    pub deselected: Option<BubbleId>,
}

impl ModeChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.mode
    }
}

/// Result of a tap on the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    pub bubble: BubbleId,
    /// True when the tap started an enlarge, false when it started a shrink.
    pub selecting: bool,
}

/// What one tick produced.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub events: Vec<SelectionEvent>,
    /// Bubbles still animating after the tick.
    pub resizing: usize,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag<C> {
    bubble: BubbleId,
    constraint: C,
    /// Body center minus pointer at grab time, so the bubble doesn't jump under the finger.
    offset: Vec2,
    /// Released; the constraint goes away at the next safe point.
    releasing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Deferred {
    Walls,
    BeginDrag { bubble: BubbleId, pointer: Vec2 },
}

pub struct PickerEngine<B: PhysicsBackend = RapierBackend> {
    backend: B,
    config: PickerConfig,
    bubbles: Vec<Bubble<B::BodyHandle>>,
    walls: Option<BoundaryWalls<B::BodyHandle>>,
    resize_queue: BTreeSet<BubbleId>,
    sizing: Option<Sizing>,
    scale: Vec2,
    mode: Mode,
    gravity_center: Vec2,
    selected: Option<BubbleId>,
    touch: bool,
    pan_boost: f32,
    drag: Option<ActiveDrag<B::ConstraintHandle>>,
    deferred: VecDeque<Deferred>,
    pending_events: Vec<SelectionEvent>,
    listener: Option<Box<dyn BubblePickerListener>>,
    inbox: PickerInbox,
    ticks: u64,
}

impl PickerEngine<RapierBackend> {
    pub fn with_rapier(config: PickerConfig) -> Self {
        Self::new(RapierBackend::new(), config)
    }
}

impl<B: PhysicsBackend> PickerEngine<B> {
    pub fn new(backend: B, config: PickerConfig) -> Self {
        let mode = config.selection.start_mode;
        Self {
            backend,
            config,
            bubbles: Vec::new(),
            walls: None,
            resize_queue: BTreeSet::new(),
            sizing: None,
            scale: Vec2::ONE,
            mode,
            gravity_center: Vec2::ZERO,
            selected: None,
            touch: false,
            pan_boost: 1.0,
            drag: None,
            deferred: VecDeque::new(),
            pending_events: Vec::new(),
            listener: None,
            inbox: PickerInbox::default(),
            ticks: 0,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------------------------

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn bubbles(&self) -> &[Bubble<B::BodyHandle>] {
        &self.bubbles
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble<B::BodyHandle>> {
        self.bubbles.get(id.0)
    }

    pub fn views(&self) -> impl Iterator<Item = BubbleView> + '_ {
        let dragged = self.drag.filter(|d| !d.releasing).map(|d| d.bubble);
        self.bubbles.iter().map(move |b| BubbleView {
            id: b.id,
            item: b.item.id.clone(),
            position: b.body.position,
            radius: b.body.actual_radius,
            visible: b.body.is_visible,
            increased: b.body.increased,
            selected: self.selected == Some(b.id),
            dragged: dragged == Some(b.id),
        })
    }

    pub fn selected(&self) -> Option<BubbleId> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ItemId> {
        self.selected.and_then(|id| self.bubble(id)).map(|b| &b.item.id)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn gravity_center(&self) -> Vec2 {
        self.gravity_center
    }

    pub fn is_touching(&self) -> bool {
        self.touch
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some_and(|d| !d.releasing)
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn walls(&self) -> Option<&BoundaryWalls<B::BodyHandle>> {
        self.walls.as_ref()
    }

    /// Bubbles with an unfinished transition.
    pub fn resizing(&self) -> impl Iterator<Item = BubbleId> + '_ {
        self.resize_queue.iter().copied()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Handle for queuing commands from other threads; drained at the start of each step.
    pub fn inbox(&self) -> PickerInbox {
        self.inbox.clone()
    }

    pub fn set_listener(&mut self, listener: Box<dyn BubblePickerListener>) {
        self.listener = Some(listener);
    }

    pub fn take_listener(&mut self) -> Option<Box<dyn BubblePickerListener>> {
        self.listener.take()
    }

    // ---------------------------------------------------------------------------------------------
    // Build / clear
    // ---------------------------------------------------------------------------------------------

    /// Remove every body, constraint and bubble. Configuration and mode are kept.
    pub fn clear(&mut self) {
        self.backend.clear();
        self.bubbles.clear();
        self.walls = None;
        self.resize_queue.clear();
        self.sizing = None;
        self.gravity_center = Vec2::ZERO;
        self.selected = None;
        self.touch = false;
        self.pan_boost = 1.0;
        self.drag = None;
        self.deferred.clear();
        self.pending_events.clear();
    }

    /// Replace the world with one bubble per item. `scale_x` / `scale_y` describe the viewport
    /// aspect (see `Viewport`); walls land at `±1 / scale_y`.
    pub fn build(&mut self, items: Vec<PickerItem>, scale_x: f32, scale_y: f32) -> &[Bubble<B::BodyHandle>] {
        self.clear();
        self.scale = Vec2::new(scale_x, scale_y);

        let values: Vec<f32> = items
            .iter()
            .flat_map(|item| std::iter::once(item.value).chain(item.secondary_value))
            .collect();
        let container_area = (2.0 / scale_x.max(f32::EPSILON)) * (2.0 / scale_y.max(f32::EPSILON));
        let sizing = Sizing::new(&self.config.bubbles, &values, container_area);

        let locked = self.backend.is_locked();
        let (mut main_slot, mut secondary_slot) = (0usize, 0usize);
        for (index, item) in items.into_iter().enumerate() {
            let slot = if item.is_secondary { &mut secondary_slot } else { &mut main_slot };
            let layout_index = *slot;
            *slot += 1;

            let size = sizing.size_for(item.value_for(self.mode));
            let show = item.is_shown_in(self.mode);
            let mut body = Body::new(
                spiral_position(layout_index, &self.config.layout),
                size.radius,
                size.increased_radius,
                size.density,
                self.config.bubbles.margin,
                self.config.simulation.linear_damping,
                show,
            );
            let id = BubbleId(index);
            if show && !body.initialize(&mut self.backend) {
                body.collapse();
                self.resize_queue.insert(id);
            }
            self.bubbles.push(Bubble { id, item, body, layout_index });
        }
        self.sizing = Some(sizing);

        if locked {
            self.deferred.push_back(Deferred::Walls);
        } else {
            self.walls = Some(BoundaryWalls::create(&mut self.backend, scale_y));
        }

        let preselected = self
            .bubbles
            .iter()
            .find(|b| b.item.is_selected && b.body.should_show)
            .map(|b| b.id);
        if let Some(id) = preselected {
            self.select(id);
        }

        info!(
            "Picker built: {} bubbles ({} shown, mode {:?}, scale {:.3}x{:.3}{})",
            self.bubbles.len(),
            self.bubbles.iter().filter(|b| b.body.should_show).count(),
            self.mode,
            scale_x,
            scale_y,
            if locked { ", world locked: creation deferred" } else { "" }
        );
        &self.bubbles
    }

    // ---------------------------------------------------------------------------------------------
    // Step
    // ---------------------------------------------------------------------------------------------

    pub fn step(&mut self) -> StepReport {
        for command in self.inbox.drain() {
            self.apply(command);
        }
        self.run_deferred();

        let mut events = std::mem::take(&mut self.pending_events);

        // Radius animation.
        let resize_step = self.config.simulation.resize_step;
        let mut settled: SmallVec<[(BubbleId, Settled); 4]> = SmallVec::new();
        for &id in &self.resize_queue {
            let Some(bubble) = self.bubbles.get_mut(id.0) else {
                continue;
            };
            if let Some(state) = bubble.body.resize(resize_step, &mut self.backend) {
                settled.push((id, state));
            }
        }
        for (id, state) in settled {
            if let Some(event) = self.on_settled(id, state) {
                events.push(event);
            }
        }

        // World step.
        self.backend.step(
            self.config.simulation.time_step,
            self.config.simulation.solver_iterations,
        );

        // Released drag constraint.
        if let Some(active) = self.drag.filter(|d| d.releasing) {
            if !self.backend.is_locked() {
                self.backend.destroy_point_constraint(active.constraint);
                self.drag = None;
                trace!("drag constraint on {:?} released", active.bubble);
            }
        }

        // Positions and forces.
        self.apply_centering_forces();

        // Finished transitions.
        let bubbles = &self.bubbles;
        self.resize_queue
            .retain(|id| bubbles.get(id.0).is_some_and(|b| !b.body.finished()));

        if let Some(listener) = self.listener.as_mut() {
            for event in &events {
                match event {
                    SelectionEvent::Selected { item, .. } => listener.on_bubble_selected(item),
                    SelectionEvent::Deselected { item, .. } => listener.on_bubble_deselected(item),
                }
            }
        }

        self.ticks += 1;
        StepReport {
            events,
            resizing: self.resize_queue.len(),
        }
    }

    fn apply(&mut self, command: PickerCommand) {
        trace!("inbox: {:?}", command);
        match command {
            PickerCommand::BeginDrag { bubble, pointer } => {
                self.begin_drag(bubble, pointer);
            }
            PickerCommand::Drag { pointer } => {
                self.drag(pointer);
            }
            PickerCommand::Pan { delta, speed } => self.pan(delta, speed),
            PickerCommand::EndDrag => self.end_drag(),
            PickerCommand::Select(bubble) => {
                self.select(bubble);
            }
            PickerCommand::SelectAt(point) => {
                self.select_at(point);
            }
            PickerCommand::SetMode(mode) => {
                self.set_mode(mode);
            }
        }
    }

    fn run_deferred(&mut self) {
        if self.backend.is_locked() {
            return;
        }
        while let Some(op) = self.deferred.pop_front() {
            match op {
                Deferred::Walls => {
                    self.walls = Some(BoundaryWalls::create(&mut self.backend, self.scale.y));
                }
                Deferred::BeginDrag { bubble, pointer } => {
                    self.begin_drag(bubble, pointer);
                }
            }
        }
    }

    fn on_settled(&mut self, id: BubbleId, state: Settled) -> Option<SelectionEvent> {
        if state == Settled::Hidden {
            self.release_drag_of(id);
        }
        let bubble = self.bubbles.get(id.0)?;
        trace!("bubble {:?} settled: {:?}", id, state);
        match state {
            Settled::Increased => {
                debug!("selected {}", bubble.item.id);
                Some(SelectionEvent::Selected { bubble: id, item: bubble.item.id.clone() })
            }
            Settled::Default => {
                debug!("deselected {}", bubble.item.id);
                Some(SelectionEvent::Deselected { bubble: id, item: bubble.item.id.clone() })
            }
            Settled::Hidden => None,
        }
    }

    fn apply_centering_forces(&mut self) {
        let gravity = &self.config.gravity;
        let boost = if self.touch { self.pan_boost } else { 1.0 };
        let dragged = self.drag.filter(|d| !d.releasing).map(|d| d.bubble);
        for bubble in &mut self.bubbles {
            let Some(handle) = bubble.body.handle() else {
                continue;
            };
            if let Some(position) = self.backend.body_position(handle) {
                bubble.body.position = position;
            }
            if bubble.body.is_being_dragged || dragged == Some(bubble.id) {
                continue;
            }
            let position = bubble.body.position;
            let force = if self.selected == Some(bubble.id) {
                // The selected bubble homes on the fixed origin regardless of panning.
                let to_center = -position;
                (to_center.length() > gravity.selected_threshold)
                    .then(|| to_center * gravity.selected_strength)
            } else {
                let direction = self.gravity_center - position;
                let distance = direction.length();
                (distance > gravity.distance_threshold).then(|| {
                    let multiplier = if bubble.body.increased {
                        gravity.increased_multiplier
                    } else {
                        1.0
                    };
                    direction
                        * gravity.speed_to_center
                        * multiplier
                        * CENTERING_GAIN
                        * distance
                        * distance
                        * boost
                })
            };
            if let Some(force) = force {
                self.backend.apply_force(handle, force);
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------------------------------

    /// Topmost visible bubble under `point` (world units), nearest center first.
    pub fn bubble_at(&self, point: Vec2) -> Option<BubbleId> {
        self.bubbles
            .iter()
            .filter(|b| b.body.is_visible && !b.body.is_destroyed() && b.body.actual_radius > 0.0)
            .map(|b| (b.id, b.body.position.distance(point), b.body.actual_radius))
            .filter(|(_, distance, radius)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _, _)| id)
    }

    /// Toggle the enlargement of the bubble under `point`.
    pub fn select_at(&mut self, point: Vec2) -> Option<TapOutcome> {
        let bubble = self.bubble_at(point)?;
        self.select(bubble).then(|| TapOutcome {
            bubble,
            selecting: self.selected == Some(bubble),
        })
    }

    /// Report a long press on the bubble under `point` to the listener. Selection is unchanged.
    pub fn long_press_at(&mut self, point: Vec2) -> Option<BubbleId> {
        let id = self.bubble_at(point)?;
        let bubble = self.bubbles.get(id.0)?;
        debug!("long press on {}", bubble.item.id);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_bubble_long_pressed(&bubble.item.id);
        }
        Some(id)
    }

    /// Request a toggle of `id`. Returns false when the request was ignored: unknown or hidden
    /// bubble, or a transition for it is still running or pending.
    pub fn select(&mut self, id: BubbleId) -> bool {
        let Some(target) = self.bubbles.get(id.0) else {
            return false;
        };
        let body = &target.body;
        if !body.should_show || !body.is_visible || body.is_destroyed() {
            trace!("select {:?} ignored: not visible", id);
            return false;
        }
        if body.is_busy() || body.has_pending() {
            trace!("select {:?} ignored: transition in progress", id);
            return false;
        }
        if self.selected == Some(id) && !self.config.selection.toggle_on_reselect {
            return false;
        }

        if let Some(previous) = self.selected.filter(|p| *p != id) {
            if let Some(prev) = self.bubbles.get_mut(previous.0) {
                prev.body.request_default();
                self.resize_queue.insert(previous);
            }
        }

        let Some(target) = self.bubbles.get_mut(id.0) else {
            return false;
        };
        target.body.define_state();
        self.selected = target.body.to_be_increased.then_some(id);
        self.resize_queue.insert(id);
        debug!(
            "{} {}",
            if self.selected.is_some() { "enlarging" } else { "shrinking" },
            target.item.id
        );
        true
    }

    // ---------------------------------------------------------------------------------------------
    // Drag / pan
    // ---------------------------------------------------------------------------------------------

    /// Grab `bubble` at `pointer` (world units) and pin it with a point constraint.
    pub fn begin_drag(&mut self, bubble: BubbleId, pointer: Vec2) -> bool {
        if self.backend.is_locked() {
            self.deferred.push_back(Deferred::BeginDrag { bubble, pointer });
            return true;
        }
        let Some(handle) = self
            .bubbles
            .get(bubble.0)
            .filter(|b| b.body.should_show && b.body.is_visible)
            .and_then(|b| b.body.handle())
        else {
            return false;
        };

        if let Some(active) = self.drag.as_mut() {
            if active.bubble == bubble {
                // Re-grabbed before the teardown ran: keep the constraint.
                active.releasing = false;
                self.touch = true;
                if let Some(b) = self.bubbles.get_mut(bubble.0) {
                    b.body.is_being_dragged = true;
                }
                return true;
            }
            let stale = *active;
            self.backend.destroy_point_constraint(stale.constraint);
            if let Some(b) = self.bubbles.get_mut(stale.bubble.0) {
                b.body.is_being_dragged = false;
            }
            self.drag = None;
        }

        let Some(target) = self.bubbles.get_mut(bubble.0) else {
            return false;
        };
        let position = self.backend.body_position(handle).unwrap_or(target.body.position);
        let radius = target.body.collider_radius();
        let mass = target.body.density * PI * radius * radius;
        let stiffness = mass * self.config.drag.stiffness_per_mass;
        let damping = 2.0 * (stiffness * mass).sqrt() * self.config.drag.damping_ratio;
        let constraint = self.backend.create_point_constraint(
            handle,
            &PointConstraintDesc {
                target: position,
                stiffness,
                damping,
            },
        );
        target.body.is_being_dragged = true;
        self.drag = Some(ActiveDrag {
            bubble,
            constraint,
            offset: position - pointer,
            releasing: false,
        });
        self.touch = true;
        trace!("drag begins on {:?}", bubble);
        true
    }

    /// Move the drag target. Returns false when nothing is being dragged.
    pub fn drag(&mut self, pointer: Vec2) -> bool {
        let Some(active) = self.drag.filter(|d| !d.releasing) else {
            return false;
        };
        let mut target = pointer + active.offset;
        if self.config.drag.horizontal_only {
            if let Some(b) = self.bubbles.get(active.bubble.0) {
                target.y = b.body.position.y;
            }
        }
        self.backend.set_constraint_target(active.constraint, target);
        true
    }

    /// Offset the gravity center by `delta` (world units). `speed` is the pointer speed in world
    /// units per second and boosts the pull while the touch lasts.
    pub fn pan(&mut self, delta: Vec2, speed: f32) {
        let delta = if self.config.drag.horizontal_only {
            Vec2::new(delta.x, 0.0)
        } else {
            delta
        };
        let limit_x = self.config.gravity.pan_limit_x;
        let limit_y = 1.0 / self.scale.y.max(f32::EPSILON);
        let center = self.gravity_center + delta;
        self.gravity_center = Vec2::new(center.x.clamp(-limit_x, limit_x), center.y.clamp(-limit_y, limit_y));
        self.touch = true;
        self.pan_boost = 1.0 + speed.max(0.0) * self.config.gravity.pan_boost_factor;
    }

    /// Release any drag. The constraint is removed at the next safe point in `step`.
    pub fn end_drag(&mut self) {
        for bubble in &mut self.bubbles {
            bubble.body.is_being_dragged = false;
        }
        if let Some(active) = self.drag.as_mut() {
            active.releasing = true;
        }
        self.deferred.retain(|op| !matches!(op, Deferred::BeginDrag { .. }));
        self.touch = false;
        self.pan_boost = 1.0;
    }

    /// Drops the drag if it holds `id`; the constraint is torn down after the next world step.
    fn release_drag_of(&mut self, id: BubbleId) {
        if let Some(active) = self.drag.as_mut().filter(|d| d.bubble == id) {
            active.releasing = true;
            if let Some(b) = self.bubbles.get_mut(id.0) {
                b.body.is_being_dragged = false;
            }
        }
    }

    /// Move the gravity center back to the origin.
    pub fn recenter(&mut self) {
        self.gravity_center = Vec2::ZERO;
    }

    // ---------------------------------------------------------------------------------------------
    // Mode
    // ---------------------------------------------------------------------------------------------

    /// Switch between main and secondary values. Clears the selection, hides / shows bubbles
    /// whose membership changes and swaps radii of items present in both sets.
    pub fn set_mode(&mut self, mode: Mode) -> ModeChange {
        let mut change = ModeChange {
            previous: self.mode,
            mode,
            ..Default::default()
        };
        if mode == self.mode {
            return change;
        }
        self.mode = mode;
        self.end_drag();

        if let Some(previous) = self.selected.take() {
            change.deselected = Some(previous);
            if let Some(b) = self.bubbles.get(previous.0).filter(|b| b.body.increased) {
                self.pending_events.push(SelectionEvent::Deselected {
                    bubble: previous,
                    item: b.item.id.clone(),
                });
            }
        }

        for bubble in &mut self.bubbles {
            bubble.body.reset_selection();
            let show = bubble.item.is_shown_in(mode);
            if show != bubble.body.should_show {
                if show {
                    change.shown.push(bubble.id);
                } else {
                    change.hidden.push(bubble.id);
                }
            }
            bubble.body.should_show = show;
            if bubble.item.is_dual() {
                if let Some(sizing) = &self.sizing {
                    let size = sizing.size_for(bubble.item.value_for(mode));
                    bubble.body.default_radius = size.radius;
                    bubble.body.increased_radius = size.increased_radius;
                    bubble.body.density = size.density;
                    change.resized.push(bubble.id);
                }
            }
            self.resize_queue.insert(bubble.id);
        }

        info!(
            "Mode {:?} -> {:?}: {} shown, {} hidden, {} resized",
            change.previous,
            mode,
            change.shown.len(),
            change.hidden.len(),
            change.resized.len()
        );
        change
    }

    pub fn toggle_mode(&mut self) -> ModeChange {
        self.set_mode(self.mode.toggled())
    }

    // ---------------------------------------------------------------------------------------------
    // Runtime configuration
    // ---------------------------------------------------------------------------------------------

    pub fn set_speed_to_center(&mut self, speed: f32) {
        self.config.gravity.speed_to_center = speed.max(0.0);
    }

    pub fn set_horizontal_only(&mut self, horizontal_only: bool) {
        self.config.drag.horizontal_only = horizontal_only;
        if horizontal_only {
            self.gravity_center.y = 0.0;
        }
    }

    pub fn set_toggle_on_reselect(&mut self, toggle: bool) {
        self.config.selection.toggle_on_reselect = toggle;
    }

    /// Collider padding around every bubble; applied to live bodies immediately.
    pub fn set_margin(&mut self, margin: f32) {
        let margin = margin.max(0.0);
        self.config.bubbles.margin = margin;
        for bubble in &mut self.bubbles {
            bubble.body.margin = margin;
            if let Some(handle) = bubble.body.handle() {
                self.backend.set_body_radius(handle, bubble.body.collider_radius());
            }
        }
    }

    /// New size range (fractions of the shorter viewport dimension). Existing bubbles animate to
    /// their new radii.
    pub fn set_bubble_size(&mut self, min_size: f32, max_size: f32) -> Result<(), String> {
        if !(min_size > 0.0 && max_size >= min_size) {
            return Err(format!("invalid bubble size range {min_size}..{max_size}"));
        }
        self.config.bubbles.min_size = min_size;
        self.config.bubbles.max_size = max_size;
        if self.bubbles.is_empty() {
            return Ok(());
        }
        let values: Vec<f32> = self
            .bubbles
            .iter()
            .flat_map(|b| std::iter::once(b.item.value).chain(b.item.secondary_value))
            .collect();
        let container_area = (2.0 / self.scale.x.max(f32::EPSILON)) * (2.0 / self.scale.y.max(f32::EPSILON));
        let sizing = Sizing::new(&self.config.bubbles, &values, container_area);
        for bubble in &mut self.bubbles {
            let size = sizing.size_for(bubble.item.value_for(self.mode));
            bubble.body.default_radius = size.radius;
            bubble.body.increased_radius = size.increased_radius;
            bubble.body.density = size.density;
            self.resize_queue.insert(bubble.id);
        }
        self.sizing = Some(sizing);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::backend::testing::{Call, ScriptedBackend};
    use std::sync::{Arc, Mutex};

    fn items(n: usize) -> Vec<PickerItem> {
        (0..n)
            .map(|i| PickerItem::new(format!("item{i}"), (n - i) as f32))
            .collect()
    }

    fn engine(n: usize) -> PickerEngine<ScriptedBackend> {
        let mut engine = PickerEngine::new(ScriptedBackend::default(), PickerConfig::default());
        engine.build(items(n), 1.0, 1.0);
        engine
    }

    fn settle(engine: &mut PickerEngine<ScriptedBackend>) -> Vec<SelectionEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(engine.step().events);
            if engine.resizing().next().is_none() {
                break;
            }
        }
        events
    }

    #[test]
    fn build_places_bubbles_on_the_spiral() {
        let engine = engine(5);
        let positions: Vec<Vec2> = engine.bubbles().iter().map(|b| b.body.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(0.0, 0.15),
                Vec2::new(0.0, -0.15),
                Vec2::new(0.5, 0.15),
                Vec2::new(0.5, -0.15),
                Vec2::new(-0.5, 0.15),
            ]
        );
        assert_eq!(engine.backend().live_bodies(), 5);
        assert!(engine.walls().is_some());
    }

    #[test]
    fn selecting_another_bubble_shrinks_the_previous() {
        let mut engine = engine(3);
        assert!(engine.select(BubbleId(0)));
        let events = settle(&mut engine);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SelectionEvent::Selected { bubble: BubbleId(0), .. }));

        assert!(engine.select(BubbleId(1)));
        assert_eq!(engine.selected(), Some(BubbleId(1)));
        let events = settle(&mut engine);
        assert_eq!(events.len(), 2);
        let increased: Vec<_> = engine.bubbles().iter().filter(|b| b.body.increased).map(|b| b.id).collect();
        assert_eq!(increased, vec![BubbleId(1)]);
    }

    #[test]
    fn busy_bubble_ignores_select() {
        let mut engine = engine(2);
        assert!(engine.select(BubbleId(0)));
        assert!(!engine.select(BubbleId(0)));
        engine.step();
        assert!(!engine.select(BubbleId(0)));
    }

    #[test]
    fn reselect_toggles_back_unless_disabled() {
        let mut engine = engine(2);
        engine.select(BubbleId(0));
        settle(&mut engine);
        engine.set_toggle_on_reselect(false);
        assert!(!engine.select(BubbleId(0)));
        engine.set_toggle_on_reselect(true);
        assert!(engine.select(BubbleId(0)));
        assert_eq!(engine.selected(), None);
        let events = settle(&mut engine);
        assert!(matches!(events.as_slice(), [SelectionEvent::Deselected { .. }]));
    }

    #[test]
    fn dragged_bubble_receives_no_force() {
        let mut engine = engine(3);
        let far = engine.bubbles()[2].body.handle().expect("live");
        assert!(engine.begin_drag(BubbleId(2), Vec2::new(0.5, 0.15)));
        engine.step();
        assert_eq!(engine.backend().forces_on(far), 0);
        engine.end_drag();
        engine.step();
        assert!(engine.backend().calls.iter().any(|c| matches!(c, Call::DropConstraint(_))));
        engine.step();
        assert!(engine.backend().forces_on(far) > 0);
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let mut engine = engine(1);
        let handle = engine.bubbles()[0].body.handle().expect("live");
        engine.begin_drag(BubbleId(0), Vec2::new(0.05, 0.1));
        engine.drag(Vec2::new(0.3, 0.1));
        let moved = engine.backend().body_position(handle).expect("live");
        assert!((moved - Vec2::new(0.25, 0.15)).length() < 1e-6);
    }

    #[test]
    fn regrab_before_teardown_keeps_constraint() {
        let mut engine = engine(1);
        engine.begin_drag(BubbleId(0), Vec2::ZERO);
        engine.end_drag();
        engine.begin_drag(BubbleId(0), Vec2::ZERO);
        engine.step();
        let constraints = engine.backend().calls.iter().filter(|c| matches!(c, Call::Constraint(_))).count();
        let drops = engine.backend().calls.iter().filter(|c| matches!(c, Call::DropConstraint(_))).count();
        assert_eq!((constraints, drops), (1, 0));
        assert!(engine.is_dragging());
    }

    #[test]
    fn grabbing_another_bubble_releases_the_first() {
        let mut engine = engine(3);
        let first = engine.bubbles()[2].body.handle().expect("live");
        assert!(engine.begin_drag(BubbleId(2), Vec2::new(0.5, 0.15)));
        assert!(engine.begin_drag(BubbleId(1), Vec2::new(0.0, -0.15)));
        assert!(!engine.bubbles()[2].body.is_being_dragged);
        assert!(engine.bubbles()[1].body.is_being_dragged);
        for _ in 0..3 {
            engine.step();
        }
        assert!(engine.backend().forces_on(first) > 0);
        assert_eq!(engine.views().filter(|v| v.dragged).map(|v| v.id).collect::<Vec<_>>(), vec![BubbleId(1)]);
    }

    #[test]
    fn hidden_bubble_cannot_be_dragged() {
        let mut engine = engine(2);
        engine.set_mode(Mode::Secondary);
        assert!(!engine.begin_drag(BubbleId(0), Vec2::new(0.0, 0.15)));
        assert!(!engine.is_dragging());
        settle(&mut engine);
        assert!(engine.bubbles()[0].body.is_destroyed());
        assert!(!engine.begin_drag(BubbleId(0), Vec2::new(0.0, 0.15)));
        assert!(!engine.drag(Vec2::ZERO));
    }

    #[test]
    fn drag_ends_when_its_bubble_deflates_away() {
        let mut engine = engine(2);
        assert!(engine.begin_drag(BubbleId(0), Vec2::new(0.0, 0.15)));
        // Hide the grabbed bubble without going through a mode switch.
        engine.bubbles[0].body.should_show = false;
        engine.resize_queue.insert(BubbleId(0));
        settle(&mut engine);
        assert!(engine.bubbles()[0].body.is_destroyed());
        assert!(!engine.is_dragging());
        assert!(!engine.drag(Vec2::ZERO));
        engine.step();
        assert!(engine.drag.is_none());
    }

    #[test]
    fn pan_moves_gravity_center_within_limits() {
        let mut engine = engine(1);
        engine.pan(Vec2::new(10.0, 0.3), 0.0);
        assert_eq!(engine.gravity_center(), Vec2::new(2.0, 0.3));
        engine.set_horizontal_only(true);
        engine.pan(Vec2::new(-0.5, 0.3), 0.0);
        assert_eq!(engine.gravity_center(), Vec2::new(1.5, 0.0));
        engine.end_drag();
        assert!(!engine.is_touching());
        engine.recenter();
        assert_eq!(engine.gravity_center(), Vec2::ZERO);
    }

    #[test]
    fn locked_world_defers_bodies_and_walls() {
        let mut engine = PickerEngine::new(
            ScriptedBackend::locked(),
            PickerConfig::default(),
        );
        engine.build(items(2), 1.0, 1.0);
        assert_eq!(engine.backend().live_bodies(), 0);
        assert!(engine.walls().is_none());
        engine.backend_mut().locked = false;
        engine.step();
        assert!(engine.walls().is_some());
        assert_eq!(engine.backend().live_bodies(), 2);
        settle(&mut engine);
        assert!(engine.bubbles().iter().all(|b| b.body.actual_radius == b.body.default_radius));
    }

    #[test]
    fn listener_hears_settled_transitions() {
        #[derive(Default)]
        struct Log(Arc<Mutex<Vec<String>>>);
        impl BubblePickerListener for Log {
            fn on_bubble_selected(&mut self, item: &ItemId) {
                self.0.lock().expect("log").push(format!("+{item}"));
            }
            fn on_bubble_deselected(&mut self, item: &ItemId) {
                self.0.lock().expect("log").push(format!("-{item}"));
            }
        }
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = engine(2);
        engine.set_listener(Box::new(Log(log.clone())));
        engine.select(BubbleId(1));
        settle(&mut engine);
        engine.select(BubbleId(1));
        settle(&mut engine);
        assert_eq!(*log.lock().expect("log"), vec!["+item1".to_string(), "-item1".to_string()]);
    }

    #[test]
    fn inbox_commands_apply_on_step() {
        let mut engine = engine(2);
        let inbox = engine.inbox();
        inbox.push(PickerCommand::Select(BubbleId(0)));
        assert_eq!(engine.selected(), None);
        engine.step();
        assert_eq!(engine.selected(), Some(BubbleId(0)));
        assert!(inbox.is_empty());
    }
}
