//! Palette calibration from labeled sample colors

use super::{overlap_fraction, Palette, PaletteEntry, SampleSet};
use crate::category::Category;
use crate::color::{Color, ColorMetric};
use crate::error::CalibrationError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calibration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Floor for every tolerance radius
    pub min_tolerance: f64,
    /// Added on top of the observed sample spread
    pub spread_margin: f64,
    /// Largest allowed pairwise overlap fraction between tolerance balls
    pub max_overlap: f64,
    pub metric: ColorMetric,
    /// Categories that must have at least one sample
    pub required: Vec<Category>,
    /// Per-category floors replacing `min_tolerance`
    pub tolerance_overrides: BTreeMap<Category, f64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_tolerance: 20.0,
            spread_margin: 2.0,
            max_overlap: 0.25,
            metric: ColorMetric::Euclidean,
            required: Category::SEAT_STATES.to_vec(),
            tolerance_overrides: BTreeMap::new(),
        }
    }
}

impl CalibrationConfig {
    /// Fixed-floor calibration, as used with exact legend colors.
    pub fn with_min_tolerance(min_tolerance: f64) -> Self {
        Self {
            min_tolerance,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CalibrationError::InvalidInput(format!(
                    "{} must be a positive number, got {}",
                    name, v
                )))
            }
        };

        positive("min_tolerance", self.min_tolerance)?;
        for (category, floor) in &self.tolerance_overrides {
            positive(&format!("tolerance override for `{}`", category), *floor)?;
        }
        if !(self.spread_margin.is_finite() && self.spread_margin >= 0.0) {
            return Err(CalibrationError::InvalidInput(format!(
                "spread_margin must be >= 0, got {}",
                self.spread_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.max_overlap) {
            return Err(CalibrationError::InvalidInput(format!(
                "max_overlap must lie in [0, 1], got {}",
                self.max_overlap
            )));
        }
        Ok(())
    }

    fn floor_for(&self, category: Category) -> f64 {
        self.tolerance_overrides
            .get(&category)
            .copied()
            .unwrap_or(self.min_tolerance)
    }
}

/// Builds a [`Palette`] from labeled samples.
#[derive(Debug, Clone, Default)]
pub struct PaletteCalibrator {
    config: CalibrationConfig,
}

impl PaletteCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Centroid per category, tolerance = max(floor, spread + margin).
    ///
    /// Fails when a required category has no sample, or when two categories'
    /// tolerance balls overlap by more than `max_overlap`.
    pub fn calibrate(&self, samples: &SampleSet) -> Result<Palette, CalibrationError> {
        self.config.validate()?;

        if samples.is_empty() {
            return Err(CalibrationError::NoSamples);
        }
        for &category in &self.config.required {
            if !samples.has_category(category) {
                return Err(CalibrationError::MissingSamples(category));
            }
        }

        let metric = self.config.metric;
        let mut entries = Vec::new();

        for category in Category::ALL {
            let references: Vec<Color> = samples.for_category(category).collect();
            let Some(centroid) = Color::mean(references.iter().copied()) else {
                continue;
            };

            let spread = references
                .iter()
                .map(|c| metric.distance(&centroid, c))
                .fold(0.0, f64::max);
            let tolerance = self
                .config
                .floor_for(category)
                .max(spread + self.config.spread_margin);

            debug!(
                "Calibrated {}: centroid {} spread {:.2} tolerance {:.2} ({} samples)",
                category,
                centroid,
                spread,
                tolerance,
                references.len()
            );

            entries.push(PaletteEntry {
                category,
                centroid,
                references,
                spread,
                tolerance,
            });
        }

        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                let fraction = overlap_fraction(a, b, metric);
                if fraction > self.config.max_overlap {
                    return Err(CalibrationError::Overlap {
                        first: a.category,
                        second: b.category,
                        fraction,
                        max: self.config.max_overlap,
                    });
                }
            }
        }

        Ok(Palette::from_entries(metric, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat_samples() -> SampleSet {
        SampleSet::new()
            .with(Category::Available, Color::from_rgb8(40, 180, 40))
            .with(Category::Sold, Color::from_rgb8(200, 40, 40))
            .with(Category::Bestseller, Color::from_rgb8(240, 200, 40))
    }

    #[test]
    fn test_exact_samples_use_floor() -> Result<(), CalibrationError> {
        let calibrator = PaletteCalibrator::new(CalibrationConfig::with_min_tolerance(10.0));
        let palette = calibrator.calibrate(&seat_samples())?;

        assert_eq!(palette.entries().len(), 3);
        for entry in palette.entries() {
            assert_eq!(entry.spread, 0.0);
            assert_eq!(entry.tolerance, 10.0);
        }
        assert_eq!(
            palette.entry(Category::Sold).map(|e| e.centroid),
            Some(Color::from_rgb8(200, 40, 40))
        );
        Ok(())
    }

    #[test]
    fn test_spread_widens_tolerance() -> Result<(), CalibrationError> {
        let samples = seat_samples()
            .with(Category::Available, Color::from_rgb8(40, 210, 40))
            .with(Category::Available, Color::from_rgb8(40, 150, 40));
        let calibrator = PaletteCalibrator::new(CalibrationConfig::with_min_tolerance(10.0));
        let palette = calibrator.calibrate(&samples)?;

        let available = palette.entry(Category::Available).unwrap();
        assert_eq!(available.centroid, Color::from_rgb8(40, 180, 40));
        assert_eq!(available.spread, 30.0);
        assert_eq!(available.tolerance, 32.0);
        Ok(())
    }

    #[test]
    fn test_missing_required_category() {
        let samples = SampleSet::new()
            .with(Category::Available, Color::from_rgb8(40, 180, 40))
            .with(Category::Sold, Color::from_rgb8(200, 40, 40));
        let err = PaletteCalibrator::default().calibrate(&samples).unwrap_err();
        assert_eq!(err, CalibrationError::MissingSamples(Category::Bestseller));
    }

    #[test]
    fn test_empty_samples() {
        let err = PaletteCalibrator::default()
            .calibrate(&SampleSet::new())
            .unwrap_err();
        assert_eq!(err, CalibrationError::NoSamples);
    }

    #[test]
    fn test_overlapping_categories_rejected() {
        let samples = SampleSet::new()
            .with(Category::Available, Color::from_rgb8(40, 180, 40))
            .with(Category::Bestseller, Color::from_rgb8(41, 181, 41))
            .with(Category::Sold, Color::from_rgb8(200, 40, 40));
        let calibrator = PaletteCalibrator::new(CalibrationConfig::with_min_tolerance(50.0));

        match calibrator.calibrate(&samples) {
            Err(CalibrationError::Overlap {
                first,
                second,
                fraction,
                ..
            }) => {
                assert_eq!(first, Category::Available);
                assert_eq!(second, Category::Bestseller);
                assert!(fraction > 0.9);
            }
            other => panic!("expected overlap error, got {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_override() -> Result<(), CalibrationError> {
        let mut config = CalibrationConfig::with_min_tolerance(10.0);
        config.tolerance_overrides.insert(Category::Sold, 25.0);
        let palette = PaletteCalibrator::new(config).calibrate(&seat_samples())?;
        assert_eq!(palette.entry(Category::Sold).unwrap().tolerance, 25.0);
        assert_eq!(palette.entry(Category::Available).unwrap().tolerance, 10.0);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let config = CalibrationConfig {
            max_overlap: 1.5,
            ..Default::default()
        };
        let err = PaletteCalibrator::new(config)
            .calibrate(&seat_samples())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidInput(_)));
    }
}
