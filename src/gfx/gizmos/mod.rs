//! # Debug Helper Overlay
//!
//! Visual aids for debug mode: an axis indicator and a ground grid. The two
//! helpers are toggled on and off as a unit by the animation driver and are
//! deliberately kept out of the core node array; they carry no lighting or
//! material state, just colored line lists.

use crate::gfx::vertex::LineVertex;

/// A named batch of line-list vertices.
pub struct LineSet {
    pub name: &'static str,
    pub vertices: Vec<LineVertex>,
}

impl LineSet {
    /// Number of line segments in the set.
    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// The axis/grid helper pair, added and removed together.
pub struct DebugOverlay {
    pub axes: LineSet,
    pub grid: LineSet,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self {
            axes: axes_helper(5.0),
            grid: grid_helper(20.0, 20),
        }
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Three colored axis lines from the origin: X red, Y green, Z blue.
pub fn axes_helper(half_length: f32) -> LineSet {
    let axes = [
        ([half_length, 0.0, 0.0], [1.0, 0.2, 0.2, 1.0]),
        ([0.0, half_length, 0.0], [0.2, 1.0, 0.2, 1.0]),
        ([0.0, 0.0, half_length], [0.2, 0.4, 1.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(6);
    for (tip, color) in axes {
        vertices.push(LineVertex {
            position: [0.0, 0.0, 0.0],
            color,
        });
        vertices.push(LineVertex {
            position: tip,
            color,
        });
    }

    LineSet {
        name: "axes_helper",
        vertices,
    }
}

/// A square grid on the ground plane, centered at the origin.
///
/// `extent` is the full side length and `divisions` the number of cells per
/// side, matching the usual size/divisions convention of grid helpers.
pub fn grid_helper(extent: f32, divisions: u32) -> LineSet {
    let half = extent * 0.5;
    let step = extent / divisions.max(1) as f32;
    let color = [0.35, 0.35, 0.35, 1.0];

    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;

        // Line parallel to X
        vertices.push(LineVertex {
            position: [-half, 0.0, offset],
            color,
        });
        vertices.push(LineVertex {
            position: [half, 0.0, offset],
            color,
        });

        // Line parallel to Z
        vertices.push(LineVertex {
            position: [offset, 0.0, -half],
            color,
        });
        vertices.push(LineVertex {
            position: [offset, 0.0, half],
            color,
        });
    }

    LineSet {
        name: "grid_helper",
        vertices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_helper_has_three_lines() {
        let axes = axes_helper(5.0);
        assert_eq!(axes.line_count(), 3);
        assert_eq!(axes.vertices.len(), 6);
    }

    #[test]
    fn test_grid_helper_line_count() {
        let grid = grid_helper(20.0, 20);
        // 21 lines in each direction
        assert_eq!(grid.line_count(), 42);
    }

    #[test]
    fn test_grid_stays_within_extent() {
        let grid = grid_helper(20.0, 20);
        for v in &grid.vertices {
            assert!(v.position[0].abs() <= 10.0 + 1e-6);
            assert!(v.position[2].abs() <= 10.0 + 1e-6);
            assert_eq!(v.position[1], 0.0);
        }
    }

    #[test]
    fn test_overlay_is_a_pair() {
        let overlay = DebugOverlay::new();
        assert_eq!(overlay.axes.name, "axes_helper");
        assert_eq!(overlay.grid.name, "grid_helper");
    }
}
