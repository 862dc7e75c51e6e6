//! Initial placement: an alternating rectangular spiral around the origin.
//!
//! ```text
//! 8 4 0 2 6
//! 9 5 1 3 7
//! ```
//! Earlier (larger) items land nearest the center.

use bevy::math::Vec2;

use crate::core::config::LayoutConfig;

/// Position of the `index`-th item. Pure function of the index.
pub fn spiral_position(index: usize, cfg: &LayoutConfig) -> Vec2 {
    let y = if index % 2 == 0 { cfg.row_offset } else { -cfg.row_offset };
    if index < 2 {
        return Vec2::new(0.0, y);
    }
    // Columns of two: 2,3 right of center, 4,5 left, 6,7 further right, ...
    let column = (index - 2) / 2;
    let distance = (column / 2 + 1) as f32 * cfg.column_step;
    let x = if column % 2 == 0 { distance } else { -distance };
    Vec2::new(x, y)
}

pub fn spiral_coordinates(count: usize, cfg: &LayoutConfig) -> Vec<Vec2> {
    (0..count).map(|i| spiral_position(i, cfg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_documented_grid() {
        let cfg = LayoutConfig::default();
        let coords = spiral_coordinates(10, &cfg);
        let expected = [
            (0.0, 0.15),
            (0.0, -0.15),
            (0.5, 0.15),
            (0.5, -0.15),
            (-0.5, 0.15),
            (-0.5, -0.15),
            (1.0, 0.15),
            (1.0, -0.15),
            (-1.0, 0.15),
            (-1.0, -0.15),
        ];
        for (i, (p, (x, y))) in coords.iter().zip(expected).enumerate() {
            assert_eq!(*p, Vec2::new(x, y), "index {i}");
        }
    }

    #[test]
    fn deterministic_and_prefix_stable() {
        let cfg = LayoutConfig::default();
        let a = spiral_coordinates(17, &cfg);
        let b = spiral_coordinates(17, &cfg);
        assert_eq!(a, b);
        assert_eq!(&spiral_coordinates(5, &cfg)[..], &a[..5]);
    }

    #[test]
    fn distance_from_center_never_decreases_by_column() {
        let cfg = LayoutConfig::default();
        let coords = spiral_coordinates(24, &cfg);
        for pair in coords.chunks(2).collect::<Vec<_>>().windows(2) {
            assert!(pair[1][0].x.abs() >= pair[0][0].x.abs());
        }
    }
}
