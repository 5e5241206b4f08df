//! Seat region locator
//!
//! Partitions the region of interest into cells, keeps solid cells that do
//! not match the page background, groups them into components and turns
//! each component (or each pitch-sized slice of an oversized one) into a
//! [`Region`].

pub mod components;
pub mod grid;

pub use components::{connected_components, split_at_pitch, Component};
pub use grid::{Cell, CellGrid, CellStats};

use crate::bbox::BBox;
use crate::error::LocatorError;
use crate::region::{Region, RegionCollection, RegionOrigin};
use crate::traits::PixelSource;
use crate::utils::ImageUtils;
use log::{debug, warn};
use seatmap_core::Color;
use serde::{Deserialize, Serialize};

/// Locator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Expected seat glyph footprint in pixels
    pub glyph_width: u32,
    pub glyph_height: u32,
    /// Side of the square analysis cell; at most the glyph size
    pub cell_size: u32,
    /// Largest per-channel variance of a solid-fill cell
    pub variance_threshold: f64,
    /// Cells closer than this to the background color are ignored
    pub background_tolerance: f64,
    /// Neighbouring cells merge only when their means are this close
    pub merge_tolerance: f64,
    /// Components longer than this many glyphs along an axis get split
    pub split_factor: f64,
    /// Slices of a split component must be at least this fraction covered
    /// by the component's own cells; the rest is page background
    pub min_slice_coverage: f64,
    /// Minimum region area as a fraction of the glyph footprint
    pub min_fill: f64,
    /// Accepted width / height range of a region
    pub aspect_range: (f64, f64),
    /// Pixels ignored along each region edge when sampling its color
    pub border_inset: u32,
    /// Overlap ratio above which the smaller of two regions is dropped
    pub dedup_overlap: f64,
    /// Side of the corner squares used to estimate the background
    pub background_patch: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            glyph_width: 24,
            glyph_height: 24,
            cell_size: 6,
            variance_threshold: 120.0,
            background_tolerance: 40.0,
            merge_tolerance: 30.0,
            split_factor: 1.5,
            min_slice_coverage: 0.5,
            min_fill: 0.2,
            aspect_range: (0.4, 2.5),
            border_inset: 1,
            dedup_overlap: 0.5,
            background_patch: 4,
        }
    }
}

impl LocatorConfig {
    /// Glyph of `width` x `height` with a cell a quarter of the smaller side.
    pub fn for_glyph(width: u32, height: u32) -> Self {
        Self {
            glyph_width: width,
            glyph_height: height,
            cell_size: (width.min(height) / 4).max(1),
            ..Default::default()
        }
    }

    pub fn glyph_area(&self) -> u64 {
        self.glyph_width as u64 * self.glyph_height as u64
    }

    pub fn validate(&self) -> Result<(), LocatorError> {
        let invalid = |msg: String| Err(LocatorError::InvalidConfig(msg));

        if self.glyph_width == 0 || self.glyph_height == 0 {
            return invalid("glyph size must be non-zero".into());
        }
        if self.cell_size == 0 || self.cell_size > self.glyph_width.min(self.glyph_height) {
            return invalid(format!(
                "cell_size must be in 1..={}, got {}",
                self.glyph_width.min(self.glyph_height),
                self.cell_size
            ));
        }
        for (name, value) in [
            ("variance_threshold", self.variance_threshold),
            ("background_tolerance", self.background_tolerance),
            ("merge_tolerance", self.merge_tolerance),
            ("min_fill", self.min_fill),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must be >= 0, got {}", name, value));
            }
        }
        if !(self.split_factor.is_finite() && self.split_factor >= 1.0) {
            return invalid(format!("split_factor must be >= 1, got {}", self.split_factor));
        }
        let (lo, hi) = self.aspect_range;
        if !(lo > 0.0 && lo <= hi) {
            return invalid(format!("aspect_range must satisfy 0 < min <= max, got {:?}", self.aspect_range));
        }
        if !(0.0..=1.0).contains(&self.min_slice_coverage) {
            return invalid(format!(
                "min_slice_coverage must lie in [0, 1], got {}",
                self.min_slice_coverage
            ));
        }
        if !(self.dedup_overlap > 0.0 && self.dedup_overlap <= 1.0) {
            return invalid(format!("dedup_overlap must lie in (0, 1], got {}", self.dedup_overlap));
        }
        Ok(())
    }
}

/// Counters from one locator pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocatorStats {
    pub cells: usize,
    pub seat_like_cells: usize,
    pub components: usize,
    pub split_components: usize,
    /// Split slices dropped for lying mostly on background
    pub empty_slices: usize,
    pub rejected_fragments: usize,
    pub deduplicated: usize,
}

/// Output of a successful locator pass
#[derive(Debug, Clone)]
pub struct Located {
    /// Row-major, never empty
    pub regions: RegionCollection,
    pub roi: BBox,
    pub background: Color,
    pub stats: LocatorStats,
}

/// Clip the requested ROI to the image; the whole image when none is given.
pub fn resolve_roi(dimensions: (u32, u32), roi: Option<BBox>) -> Result<BBox, LocatorError> {
    let (width, height) = dimensions;
    let requested = roi.unwrap_or(BBox::full(width, height));
    let resolved = requested
        .clip_to(width, height)
        .ok_or(LocatorError::EmptyRoi {
            roi: requested,
            width,
            height,
        })?;
    if resolved != requested {
        warn!("ROI {} clipped to {} to fit the {}x{} image", requested, resolved, width, height);
    }
    Ok(resolved)
}

/// Seat region locator
#[derive(Debug, Clone, Default)]
pub struct SeatLocator {
    config: LocatorConfig,
}

impl SeatLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Locate seat-glyph candidates inside `roi`.
    ///
    /// `background` overrides the corner-sampled page background. Fails with
    /// [`LocatorError::NoRegions`] rather than returning an empty sequence.
    pub fn locate<P: PixelSource>(
        &self,
        image: &P,
        roi: Option<BBox>,
        background: Option<Color>,
    ) -> Result<Located, LocatorError> {
        self.config.validate()?;

        let roi = resolve_roi(image.dimensions(), roi)?;
        let background = background
            .unwrap_or_else(|| ImageUtils::corner_background(image, self.config.background_patch));
        debug!("Locating seats in {} against background {}", roi, background);

        let grid = CellGrid::build(image, roi, &self.config, background);
        let components = connected_components(&grid, self.config.merge_tolerance);

        let mut stats = LocatorStats {
            cells: grid.len(),
            seat_like_cells: grid.seat_like_count(),
            components: components.len(),
            ..Default::default()
        };

        let mut regions = RegionCollection::new();
        for component in &components {
            let parts = split_at_pitch(&component.bbox, &self.config);
            let count = parts.len() as u32;
            let origin = if count > 1 {
                stats.split_components += 1;
                debug!("Split {} into {} glyph-sized regions", component.bbox, count);
                RegionOrigin::Split { parts: count }
            } else {
                RegionOrigin::Component
            };

            for part in parts {
                if count > 1 && component.coverage_of(&part) < self.config.min_slice_coverage {
                    stats.empty_slices += 1;
                    debug!("Dropped slice {} of {}: mostly background", part, component.bbox);
                    continue;
                }
                if !self.accepts(&part) {
                    stats.rejected_fragments += 1;
                    debug!("Rejected fragment {} ({} cells)", part, component.cell_count());
                    continue;
                }
                if let Some(region) = Region::sample(image, part, self.config.border_inset, origin) {
                    regions.push(region);
                }
            }
        }

        stats.deduplicated = regions.dedup_overlapping(self.config.dedup_overlap);
        regions.sort_row_major(self.config.glyph_height as f64 / 2.0);

        debug!(
            "Located {} regions ({} seat-like of {} cells, {} components, {} split, {} empty slices, {} rejected, {} deduplicated)",
            regions.len(),
            stats.seat_like_cells,
            stats.cells,
            stats.components,
            stats.split_components,
            stats.empty_slices,
            stats.rejected_fragments,
            stats.deduplicated
        );

        if regions.is_empty() {
            return Err(LocatorError::NoRegions { roi });
        }

        Ok(Located {
            regions,
            roi,
            background,
            stats,
        })
    }

    /// Size and shape filter for text strokes, rules and other fragments.
    fn accepts(&self, bbox: &BBox) -> bool {
        let min_area = self.config.min_fill * self.config.glyph_area() as f64;
        let (lo, hi) = self.config.aspect_range;
        let aspect = bbox.aspect_ratio();
        bbox.area() as f64 >= min_area && aspect >= lo && aspect <= hi
    }
}
