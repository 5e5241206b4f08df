//! Calibrated palette and the calibrator that builds it

pub mod calibrator;
pub mod samples;

pub use calibrator::{CalibrationConfig, PaletteCalibrator};
pub use samples::{LabeledSample, SampleSet};

use crate::category::Category;
use crate::color::{Color, ColorMetric};
use serde::Serialize;

/// Reference colors and matching tolerance for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteEntry {
    pub category: Category,
    pub centroid: Color,
    pub references: Vec<Color>,
    /// Largest distance from the centroid to any reference.
    pub spread: f64,
    /// Matching radius around the centroid.
    pub tolerance: f64,
}

impl PaletteEntry {
    pub fn distance(&self, color: &Color, metric: ColorMetric) -> f64 {
        metric.distance(&self.centroid, color)
    }

    pub fn contains(&self, color: &Color, metric: ColorMetric) -> bool {
        self.distance(color, metric) <= self.tolerance
    }
}

/// Category -> reference colors + tolerance. Only produced by
/// [`PaletteCalibrator`], immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    metric: ColorMetric,
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub(crate) fn from_entries(metric: ColorMetric, mut entries: Vec<PaletteEntry>) -> Self {
        entries.sort_by_key(|e| e.category);
        Self { metric, entries }
    }

    pub fn metric(&self) -> ColorMetric {
        self.metric
    }

    /// Entries in category order.
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn entry(&self, category: Category) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|e| e.category)
    }

    /// Worst pairwise overlap fraction in this palette.
    pub fn max_overlap(&self) -> Option<(Category, Category, f64)> {
        let mut worst: Option<(Category, Category, f64)> = None;
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                let fraction = overlap_fraction(a, b, self.metric);
                if worst.is_none_or(|(_, _, w)| fraction > w) {
                    worst = Some((a.category, b.category, fraction));
                }
            }
        }
        worst
    }
}

/// How deeply two tolerance balls interpenetrate, normalised by the diameter
/// of the smaller ball. 0 when disjoint or touching, 1 when the smaller ball
/// sits entirely inside the other.
pub fn overlap_fraction(a: &PaletteEntry, b: &PaletteEntry, metric: ColorMetric) -> f64 {
    let distance = metric.distance(&a.centroid, &b.centroid);
    let depth = a.tolerance + b.tolerance - distance;
    if depth <= 0.0 {
        return 0.0;
    }
    let smaller = a.tolerance.min(b.tolerance);
    if smaller <= 0.0 {
        return 0.0;
    }
    (depth / (2.0 * smaller)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: Category, rgb: (u8, u8, u8), tolerance: f64) -> PaletteEntry {
        let centroid = Color::from_rgb8(rgb.0, rgb.1, rgb.2);
        PaletteEntry {
            category,
            centroid,
            references: vec![centroid],
            spread: 0.0,
            tolerance,
        }
    }

    #[test]
    fn test_overlap_fraction_disjoint() {
        let a = entry(Category::Sold, (200, 40, 40), 10.0);
        let b = entry(Category::Available, (40, 180, 40), 10.0);
        assert_eq!(overlap_fraction(&a, &b, ColorMetric::Euclidean), 0.0);
    }

    #[test]
    fn test_overlap_fraction_nested() {
        let a = entry(Category::Available, (40, 180, 40), 50.0);
        let b = entry(Category::Bestseller, (40, 180, 40), 5.0);
        assert_eq!(overlap_fraction(&a, &b, ColorMetric::Euclidean), 1.0);
    }

    #[test]
    fn test_palette_orders_entries() {
        let palette = Palette::from_entries(
            ColorMetric::Euclidean,
            vec![
                entry(Category::Bestseller, (240, 200, 40), 10.0),
                entry(Category::Sold, (200, 40, 40), 10.0),
            ],
        );
        let categories: Vec<_> = palette.categories().collect();
        assert_eq!(categories, vec![Category::Sold, Category::Bestseller]);
        assert!(palette.entry(Category::Available).is_none());
    }
}
