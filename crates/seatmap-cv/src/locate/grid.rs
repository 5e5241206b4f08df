//! Fixed-size cell grid over the region of interest

use super::LocatorConfig;
use crate::bbox::BBox;
use crate::traits::PixelSource;
use seatmap_core::Color;

/// Mean color and worst per-channel variance of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStats {
    pub mean: Color,
    pub variance: f64,
}

impl CellStats {
    /// `bbox` must lie inside the image.
    pub fn measure<P: PixelSource>(image: &P, bbox: &BBox) -> CellStats {
        let mut sums = [0u64; 3];
        let mut squares = [0u64; 3];
        for y in bbox.y..bbox.bottom() {
            for x in bbox.x..bbox.right() {
                for (c, v) in image.rgb_at(x, y).into_iter().enumerate() {
                    let v = v as u64;
                    sums[c] += v;
                    squares[c] += v * v;
                }
            }
        }

        let n = bbox.area().max(1) as f64;
        let mut mean = [0.0f64; 3];
        let mut variance = 0.0f64;
        for c in 0..3 {
            mean[c] = sums[c] as f64 / n;
            let var = (squares[c] as f64 / n - mean[c] * mean[c]).max(0.0);
            variance = variance.max(var);
        }

        CellStats {
            mean: Color::new(mean[0], mean[1], mean[2]),
            variance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub bbox: BBox,
    pub stats: CellStats,
    /// Solid fill that differs from the page background
    pub seat_like: bool,
}

/// Row-major grid of cells fully inside the ROI. Cells that would straddle
/// the ROI's right or bottom edge are not part of the grid.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cols: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn build<P: PixelSource>(
        image: &P,
        roi: BBox,
        config: &LocatorConfig,
        background: Color,
    ) -> Self {
        let size = config.cell_size;
        let cols = roi.width / size;
        let rows = roi.height / size;

        let build_row = |row: u32| -> Vec<Cell> {
            (0..cols)
                .map(|col| {
                    let bbox = BBox::new(roi.x + col * size, roi.y + row * size, size, size);
                    let stats = CellStats::measure(image, &bbox);
                    let seat_like = stats.variance <= config.variance_threshold
                        && stats.mean.euclidean(&background) > config.background_tolerance;
                    Cell {
                        bbox,
                        stats,
                        seat_like,
                    }
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let cell_rows: Vec<Vec<Cell>> = {
            use rayon::prelude::*;
            (0..rows).into_par_iter().map(build_row).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let cell_rows: Vec<Vec<Cell>> = (0..rows).map(build_row).collect();

        Self {
            cols,
            rows,
            cells: cell_rows.into_iter().flatten().collect(),
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, col: u32, row: u32) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get((row * self.cols + col) as usize)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn seat_like_count(&self) -> usize {
        self.cells.iter().filter(|c| c.seat_like).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_cell_stats_uniform() {
        let img = RgbImage::from_pixel(8, 8, Rgb([40, 180, 40]));
        let stats = CellStats::measure(&img, &BBox::new(0, 0, 4, 4));
        assert_eq!(stats.mean, Color::from_rgb8(40, 180, 40));
        assert_eq!(stats.variance, 0.0);
    }

    #[test]
    fn test_cell_stats_mixed() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([200, 0, 0]));
        let stats = CellStats::measure(&img, &BBox::new(0, 0, 2, 1));
        assert_eq!(stats.mean, Color::new(100.0, 0.0, 0.0));
        assert_eq!(stats.variance, 10000.0);
    }

    #[test]
    fn test_grid_excludes_partial_cells() {
        let img = RgbImage::from_pixel(23, 17, Rgb([255, 255, 255]));
        let config = LocatorConfig {
            cell_size: 5,
            ..Default::default()
        };
        let grid = CellGrid::build(&img, BBox::new(1, 1, 22, 16), &config, Color::WHITE);

        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.seat_like_count(), 0);
        assert_eq!(grid.get(3, 2).map(|c| c.bbox), Some(BBox::new(16, 11, 5, 5)));
        assert!(grid.get(4, 0).is_none());
    }
}
