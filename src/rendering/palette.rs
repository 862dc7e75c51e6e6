use bevy::prelude::*;

use crate::core::item::ItemPayload;

pub const BACKGROUND: Color = Color::srgb(0.06, 0.06, 0.09);

pub const BASE_COLORS: [Color; 6] = [
    Color::srgb(0.94, 0.33, 0.31), // coral
    Color::srgb(0.16, 0.59, 0.98), // azure
    Color::srgb(0.99, 0.76, 0.18), // amber
    Color::srgb(0.22, 0.80, 0.55), // mint
    Color::srgb(0.62, 0.39, 0.93), // violet
    Color::srgb(0.98, 0.50, 0.75), // pink
];

pub const LABEL_COLOR: Color = Color::WHITE;
pub const OUTLINE_COLOR: Color = Color::WHITE;

#[inline]
pub fn color_for_index(i: usize) -> Color {
    BASE_COLORS[i % BASE_COLORS.len()]
}

#[inline]
fn linear(rgba: [f32; 4]) -> Color {
    Color::linear_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Fill color: the item's own color, else a palette entry by index.
pub fn fill_color(payload: &ItemPayload, index: usize) -> Color {
    payload.color.map(linear).unwrap_or_else(|| color_for_index(index))
}

pub fn label_color(payload: &ItemPayload) -> Color {
    payload.text_color.map(linear).unwrap_or(LABEL_COLOR)
}

pub fn outline_color(payload: &ItemPayload) -> Color {
    payload.border_color.map(linear).unwrap_or(OUTLINE_COLOR)
}
