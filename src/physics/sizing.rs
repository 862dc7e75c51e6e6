//! Maps item values to body radii and densities.

use std::f32::consts::PI;

use crate::core::config::{BubbleSizeConfig, SizingMode};

#[inline]
fn interpolate(start: f32, end: f32, f: f32) -> f32 {
    start + f * (end - start)
}

/// Radius / density targets for one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleSize {
    pub radius: f32,
    pub increased_radius: f32,
    pub density: f32,
}

/// Sizing derived once per build from the whole item set, so that re-sizing the same value
/// (e.g. after a mode round trip) yields bit-identical radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    mode: SizingMode,
    /// Radii in world units (world unit = half the shorter viewport dimension).
    min_radius: f32,
    max_radius: f32,
    increase_factor: f32,
    min_density: f32,
    max_density: f32,
    max_value: f32,
    /// Area-mode normalizer: sum of values, at least the item count.
    total_value: f32,
    total_area: f32,
}

impl Sizing {
    /// `values` is every value that may drive a size (primary and secondary).
    /// `container_area` is the normalized viewport area in world units squared.
    pub fn new(cfg: &BubbleSizeConfig, values: &[f32], container_area: f32) -> Self {
        let max_value = values.iter().copied().fold(0.0_f32, f32::max);
        let sum: f32 = values.iter().copied().map(|v| if v == 0.0 { 1.0 } else { v }).sum();
        Self {
            mode: cfg.sizing,
            min_radius: cfg.min_size * 2.0,
            max_radius: cfg.max_size * 2.0,
            increase_factor: cfg.increase_factor,
            min_density: cfg.min_density,
            max_density: cfg.max_density,
            max_value,
            total_value: sum.max(values.len() as f32),
            // Slightly more than the container so bubbles fill most of the view.
            total_area: container_area * 2.5,
        }
    }

    /// Value normalized into `0..=1`. A set whose values are all zero is treated as uniform.
    pub fn normalized(&self, value: f32) -> f32 {
        if self.max_value <= 0.0 {
            return 1.0;
        }
        (value.max(0.0) / self.max_value).clamp(0.0, 1.0)
    }

    pub fn size_for(&self, value: f32) -> BubbleSize {
        let norm = self.normalized(value);
        let radius = match self.mode {
            SizingMode::Linear => interpolate(self.min_radius, self.max_radius, norm),
            SizingMode::Area => {
                let value = if value <= 0.0 { 1.0 } else { value };
                let area = self.total_area * (value / self.total_value.max(f32::EPSILON));
                let min_area = PI * self.min_radius * self.min_radius;
                let max_area = PI * self.max_radius * self.max_radius;
                (area.clamp(min_area, max_area) / PI).sqrt()
            }
        };
        BubbleSize {
            radius,
            increased_radius: radius * self.increase_factor,
            // Larger bubbles are lighter so they win the race to the center less brutally.
            density: interpolate(self.max_density, self.min_density, norm),
        }
    }
}
