//! Field of view and line of sight.
//!
//! Recursive shadowcasting over eight octants, bounded by squared Euclidean
//! radius. `compute_fov_mask` is the only traversal; `compute_fov` runs it and
//! copies the result into the tile flags, so the two can never disagree.
//!
//! Recursion depth is bounded by the radius.

use crate::geometry::Pos;
use crate::grid::Dungeon;

/// `(xx, xy, yx, yy)` transforms mapping octant-local `(dx, dy)` to the grid.
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

impl Dungeon {
    /// Recompute `visible` for every tile from `(px, py)`.
    ///
    /// With `mark_explored`, newly visible tiles also get the sticky
    /// `explored` flag. An out-of-bounds origin leaves nothing visible.
    pub fn compute_fov(&mut self, px: i32, py: i32, radius: i32, mark_explored: bool) {
        let mut mask = Vec::new();
        self.compute_fov_mask(px, py, radius, &mut mask);
        for (tile, &seen) in self.tiles.iter_mut().zip(&mask) {
            tile.visible = seen;
            if seen && mark_explored {
                tile.explored = true;
            }
        }
    }

    /// Same traversal as [`Dungeon::compute_fov`], written into `out`
    /// (resized to `width * height`) without touching any tile.
    pub fn compute_fov_mask(&self, px: i32, py: i32, radius: i32, out: &mut Vec<bool>) {
        out.clear();
        out.resize(self.tiles.len(), false);

        let Some(origin_idx) = self.index_of(px, py) else {
            return;
        };
        out[origin_idx] = true;

        let origin = Pos::new(px, py);
        // Nothing on the grid lies farther than `width + height`, so a larger
        // radius sees the same tiles.
        let radius = radius.clamp(0, self.width.saturating_add(self.height));
        let mut visit = |x: i32, y: i32| {
            if let Some(i) = self.index_of(x, y) {
                out[i] = true;
            }
        };
        for octant in &OCTANTS {
            self.cast_light(origin, radius, 1, 1.0, 0.0, *octant, &mut visit);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_light<F: FnMut(i32, i32)>(
        &self,
        origin: Pos,
        radius: i32,
        row: i32,
        mut start: f32,
        end: f32,
        (xx, xy, yx, yy): (i32, i32, i32, i32),
        visit: &mut F,
    ) {
        if start < end {
            return;
        }
        let r2 = radius.saturating_mul(radius);
        let mut new_start = start;

        for dist in row..=radius {
            let mut blocked = false;
            let dy = -dist;

            for dx in -dist..=0 {
                let l_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
                let r_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);
                if start < r_slope {
                    continue;
                }
                if end > l_slope {
                    break;
                }

                let ax = origin.x + dx * xx + dy * xy;
                let ay = origin.y + dx * yx + dy * yy;
                if !self.in_bounds(ax, ay) {
                    continue;
                }
                if Pos::new(ax, ay).dist2(origin) <= r2 {
                    visit(ax, ay);
                }

                let opaque = self.is_opaque(ax, ay);
                if blocked {
                    if opaque {
                        new_start = r_slope;
                    } else {
                        blocked = false;
                        start = new_start;
                    }
                } else if opaque && dist < radius {
                    blocked = true;
                    self.cast_light(origin, radius, dist + 1, start, l_slope, (xx, xy, yx, yy), visit);
                    new_start = r_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }

    /// Bresenham line of sight from `(x0, y0)` to `(x1, y1)`.
    ///
    /// Fails on the first opaque cell strictly between the endpoints, or on
    /// a diagonal step squeezing between two opaque orthogonal cells. The
    /// target itself is never tested. Out-of-bounds endpoints see nothing.
    pub fn has_line_of_sight(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        if !self.in_bounds(x0, y0) || !self.in_bounds(x1, y1) {
            return false;
        }

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            if x == x1 && y == y1 {
                return true;
            }
            if (x, y) != (x0, y0) && self.is_opaque(x, y) {
                return false;
            }

            let (px, py) = (x, y);
            let e2 = err * 2;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }

            // No peeking through a diagonal gap between two solid corners.
            if x != px && y != py && self.is_opaque(x, py) && self.is_opaque(px, y) {
                return false;
            }
            if !self.in_bounds(x, y) {
                return false;
            }
        }
    }
}
