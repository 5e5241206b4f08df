//! Connected-component grouping of seat-like cells and pitch splitting

use super::grid::CellGrid;
use super::LocatorConfig;
use crate::bbox::BBox;
use std::collections::VecDeque;

/// A group of 4-connected seat-like cells of similar color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub bbox: BBox,
    /// Boxes of the member cells, in flood-fill order
    pub cells: Vec<BBox>,
}

impl Component {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Fraction of `area` covered by this component's cells. Cells never
    /// overlap, so their intersections simply add up.
    pub fn coverage_of(&self, area: &BBox) -> f64 {
        if area.is_empty() {
            return 0.0;
        }
        let covered: u64 = self
            .cells
            .iter()
            .filter_map(|cell| cell.intersection(area))
            .map(|overlap| overlap.area())
            .sum();
        covered as f64 / area.area() as f64
    }
}

/// Flood-fill seat-like cells in row-major seed order. Neighbours join when
/// their mean colors are within `merge_tolerance` of each other, so touching
/// glyphs of different states stay separate.
pub fn connected_components(grid: &CellGrid, merge_tolerance: f64) -> Vec<Component> {
    let (cols, rows) = (grid.cols(), grid.rows());
    let mut visited = vec![false; grid.len()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            let seed_idx = (row * cols + col) as usize;
            let Some(seed) = grid.get(col, row) else {
                continue;
            };
            if visited[seed_idx] || !seed.seat_like {
                continue;
            }

            visited[seed_idx] = true;
            queue.push_back((col, row));
            let mut bbox = seed.bbox;
            let mut cells = Vec::new();

            while let Some((c, r)) = queue.pop_front() {
                let Some(cell) = grid.get(c, r) else {
                    continue;
                };
                bbox = bbox.union(&cell.bbox);
                cells.push(cell.bbox);

                let neighbours = [
                    (c.checked_sub(1), Some(r)),
                    (Some(c + 1), Some(r)),
                    (Some(c), r.checked_sub(1)),
                    (Some(c), Some(r + 1)),
                ];
                for (nc, nr) in neighbours {
                    let (Some(nc), Some(nr)) = (nc, nr) else {
                        continue;
                    };
                    let Some(next) = grid.get(nc, nr) else {
                        continue;
                    };
                    let idx = (nr * cols + nc) as usize;
                    if visited[idx] || !next.seat_like {
                        continue;
                    }
                    if cell.stats.mean.euclidean(&next.stats.mean) > merge_tolerance {
                        continue;
                    }
                    visited[idx] = true;
                    queue.push_back((nc, nr));
                }
            }

            components.push(Component { bbox, cells });
        }
    }

    components
}

/// Number of glyphs laid side by side along one axis of `extent` pixels.
///
/// Interior cells lose up to a cell's width at each glyph edge, so one cell
/// is added back before comparing against the glyph pitch.
fn glyphs_along(extent: u32, glyph: u32, config: &LocatorConfig) -> u32 {
    let padded = (extent + config.cell_size) as f64;
    let glyph = glyph as f64;
    if padded <= config.split_factor * glyph {
        return 1;
    }
    ((padded / glyph).round() as u32).clamp(1, extent.max(1))
}

/// Cut an oversized component into a grid of pitch-sized slices, returned
/// in row-major order. A component within the expected footprint comes back
/// unchanged as a single box.
pub fn split_at_pitch(bbox: &BBox, config: &LocatorConfig) -> Vec<BBox> {
    let nx = glyphs_along(bbox.width, config.glyph_width, config);
    let ny = glyphs_along(bbox.height, config.glyph_height, config);
    if nx == 1 && ny == 1 {
        return vec![*bbox];
    }

    let edge = |origin: u32, extent: u32, parts: u32, i: u32| {
        origin + (extent as u64 * i as u64 / parts as u64) as u32
    };

    let mut parts = Vec::with_capacity((nx * ny) as usize);
    for j in 0..ny {
        let y0 = edge(bbox.y, bbox.height, ny, j);
        let y1 = edge(bbox.y, bbox.height, ny, j + 1);
        for i in 0..nx {
            let x0 = edge(bbox.x, bbox.width, nx, i);
            let x1 = edge(bbox.x, bbox.width, nx, i + 1);
            parts.push(BBox::new(x0, y0, x1 - x0, y1 - y0));
        }
    }
    parts
}
