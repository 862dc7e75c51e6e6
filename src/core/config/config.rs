use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::core::item::Mode;

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 1280.0,
            title: "Bubble Picker".into(),
        }
    }
}

/// Physics world stepping parameters. Values are tuning, not protocol.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics time advanced per `step()` call (world units are normalized, so this is tiny).
    pub time_step: f32,
    pub solver_iterations: usize,
    /// Radius change per tick for every animating bubble.
    pub resize_step: f32,
    pub linear_damping: f32,
    /// Host frame rate the engine is stepped at.
    pub steps_per_second: f64,
}
impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.0009,
            solver_iterations: 11,
            resize_step: 0.009,
            linear_damping: 25.0,
            steps_per_second: 60.0,
        }
    }
}

/// Centripetal pull toward the gravity center.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    pub speed_to_center: f32,
    /// Multiplier for bubbles in the increased state.
    pub increased_multiplier: f32,
    /// Bodies closer than this to the gravity center feel no pull.
    pub distance_threshold: f32,
    /// Pull on the selected bubble toward the fixed visual center.
    pub selected_strength: f32,
    pub selected_threshold: f32,
    /// Pan velocity (world units / s) to extra pull factor.
    pub pan_boost_factor: f32,
    /// Gravity center may not be panned further than this horizontally.
    pub pan_limit_x: f32,
}
impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            speed_to_center: 16.0,
            increased_multiplier: 2.0,
            distance_threshold: 0.18,
            selected_strength: 3850.0,
            selected_threshold: 0.045,
            pan_boost_factor: 0.5,
            pan_limit_x: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String")]
pub enum SizingMode {
    /// Radius interpolated linearly between min and max by value / max value.
    #[default]
    Linear,
    /// Radius derived from a share of the total area, clamped to the min/max areas.
    Area,
}

impl TryFrom<String> for SizingMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "linear" => Ok(SizingMode::Linear),
            "area" => Ok(SizingMode::Area),
            _ => Err(format!("unknown sizing {value:?} (expected \"Linear\" or \"Area\")")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BubbleSizeConfig {
    /// Smallest bubble radius as a fraction of the viewport's shorter dimension.
    pub min_size: f32,
    /// Largest bubble radius as a fraction of the viewport's shorter dimension.
    pub max_size: f32,
    pub increase_factor: f32,
    /// Extra collider radius keeping neighbours apart.
    pub margin: f32,
    pub min_density: f32,
    pub max_density: f32,
    pub sizing: SizingMode,
}
impl Default for BubbleSizeConfig {
    fn default() -> Self {
        Self {
            min_size: 0.05,
            max_size: 0.1,
            increase_factor: 1.2,
            margin: 0.001,
            min_density: 0.4,
            max_density: 0.8,
            sizing: SizingMode::Linear,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_offset: f32,
    pub column_step: f32,
}
impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_offset: 0.15,
            column_step: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DragConfig {
    /// Panning only moves the gravity center along x.
    pub horizontal_only: bool,
    /// Drag spring stiffness per unit of body mass.
    pub stiffness_per_mass: f32,
    /// Fraction of critical damping for the drag spring.
    pub damping_ratio: f32,
}
impl Default for DragConfig {
    fn default() -> Self {
        Self {
            horizontal_only: false,
            stiffness_per_mass: 40_000.0,
            damping_ratio: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    pub click_slop_px: f32,
    pub swipe_slop_px: f32,
    pub long_press_secs: f32,
}
impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_slop_px: 10.0,
            swipe_slop_px: 10.0,
            long_press_secs: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Tapping the selected bubble deselects it.
    pub toggle_on_reselect: bool,
    pub start_mode: Mode,
}
impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            toggle_on_reselect: true,
            start_mode: Mode::Main,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PickerConfig {
    pub window: WindowConfig,
    pub simulation: SimulationConfig,
    pub gravity: GravityConfig,
    pub bubbles: BubbleSizeConfig,
    pub layout: LayoutConfig,
    pub drag: DragConfig,
    pub gesture: GestureConfig,
    pub selection: SelectionConfig,
}

impl PickerConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load several RON files and deep-merge them in order (later files win per key).
    /// Returns the config, the paths actually used and any errors; never fails.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                if let Some(val) = incoming.take() {
                                    merge_value(ev, val);
                                }
                                break;
                            }
                        }
                        if let Some(val) = incoming {
                            bm.insert(k, val);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                // Optional layers (e.g. a local overlay) may simply not exist.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<PickerConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                    (PickerConfig::default(), used, errors)
                }
            },
            None => (PickerConfig::default(), used, errors),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        let sim = &self.simulation;
        if sim.time_step <= 0.0 {
            w.push(format!("simulation.time_step {} must be > 0", sim.time_step));
        }
        if sim.solver_iterations == 0 {
            w.push("simulation.solver_iterations is 0 -> treated as 1".into());
        }
        if sim.resize_step <= 0.0 {
            w.push(format!(
                "simulation.resize_step {} must be > 0 (bubbles would never finish resizing)",
                sim.resize_step
            ));
        }
        if sim.linear_damping < 0.0 {
            w.push("simulation.linear_damping negative -> energy gain".into());
        }
        if sim.steps_per_second <= 0.0 {
            w.push("simulation.steps_per_second must be > 0".into());
        }
        let g = &self.gravity;
        if g.speed_to_center <= 0.0 {
            w.push("gravity.speed_to_center <= 0; bubbles will not gather".into());
        }
        if g.increased_multiplier < 1.0 {
            w.push(format!(
                "gravity.increased_multiplier {} < 1 weakens pull on enlarged bubbles",
                g.increased_multiplier
            ));
        }
        if g.distance_threshold < 0.0 || g.selected_threshold < 0.0 {
            w.push("gravity thresholds must be >= 0".into());
        }
        if g.pan_limit_x <= 0.0 {
            w.push("gravity.pan_limit_x must be > 0".into());
        }
        let b = &self.bubbles;
        if b.min_size <= 0.0 {
            w.push("bubbles.min_size must be > 0".into());
        }
        if b.min_size > b.max_size {
            w.push(format!(
                "bubbles.min_size ({}) greater than max_size ({})",
                b.min_size, b.max_size
            ));
        }
        if b.max_size > 0.5 {
            w.push(format!(
                "bubbles.max_size {} exceeds half the shorter viewport dimension",
                b.max_size
            ));
        }
        if b.increase_factor < 1.0 {
            w.push(format!(
                "bubbles.increase_factor {} < 1 shrinks selected bubbles",
                b.increase_factor
            ));
        }
        if b.margin < 0.0 {
            w.push("bubbles.margin negative -> overlapping bubbles".into());
        }
        if b.min_density <= 0.0 || b.max_density <= 0.0 {
            w.push("bubble densities must be > 0".into());
        }
        if self.layout.column_step <= 0.0 {
            w.push("layout.column_step must be > 0".into());
        }
        if self.drag.stiffness_per_mass <= 0.0 {
            w.push("drag.stiffness_per_mass must be > 0".into());
        }
        if self.drag.damping_ratio < 0.0 {
            w.push("drag.damping_ratio negative".into());
        }
        let ge = &self.gesture;
        if ge.click_slop_px < 0.0 || ge.swipe_slop_px < 0.0 {
            w.push("gesture slop distances must be >= 0".into());
        }
        if ge.long_press_secs <= 0.0 {
            w.push("gesture.long_press_secs must be > 0".into());
        }
        w
    }
}
