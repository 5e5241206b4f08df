//! Region classifier: nearest palette centroid within tolerance

use crate::region::Region;
use log::trace;
use seatmap_core::{Category, Color, Outcome, Palette};
use serde::{Deserialize, Serialize};

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Two in-tolerance distances closer than this are a tie
    pub tie_epsilon: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { tie_epsilon: 1e-6 }
    }
}

/// Assigns each region exactly one [`Outcome`] against a shared palette.
#[derive(Debug, Clone)]
pub struct RegionClassifier<'p> {
    palette: &'p Palette,
    config: ClassifierConfig,
}

impl<'p> RegionClassifier<'p> {
    pub fn new(palette: &'p Palette, config: ClassifierConfig) -> Self {
        Self { palette, config }
    }

    pub fn palette(&self) -> &Palette {
        self.palette
    }

    /// Distance from `color` to every category centroid, in palette order.
    pub fn distances(&self, color: &Color) -> Vec<(Category, f64)> {
        let metric = self.palette.metric();
        self.palette
            .entries()
            .iter()
            .map(|e| (e.category, e.distance(color, metric)))
            .collect()
    }

    /// Classify a bare color.
    ///
    /// Nearest in-tolerance category wins; no candidate is `Unclassified`;
    /// the two nearest candidates within `tie_epsilon` of each other are
    /// `Ambiguous`.
    pub fn evaluate(&self, color: &Color) -> Outcome {
        let metric = self.palette.metric();
        let mut best: Option<(Category, f64)> = None;
        let mut runner_up: Option<f64> = None;

        for entry in self.palette.entries() {
            let distance = entry.distance(color, metric);
            if distance > entry.tolerance {
                continue;
            }
            match best {
                Some((_, d)) if distance >= d => {
                    if runner_up.is_none_or(|r| distance < r) {
                        runner_up = Some(distance);
                    }
                }
                _ => {
                    runner_up = best.map(|(_, d)| d);
                    best = Some((entry.category, distance));
                }
            }
        }

        let outcome = match (best, runner_up) {
            (None, _) => Outcome::Unclassified,
            (Some((_, d)), Some(r)) if (r - d).abs() <= self.config.tie_epsilon => {
                Outcome::Ambiguous
            }
            (Some((category, _)), _) => Outcome::Matched(category),
        };
        trace!("{} -> {}", color, outcome);
        outcome
    }

    /// Classify one region, storing the outcome on it. A region that was
    /// already classified keeps its earlier outcome.
    pub fn classify(&self, region: &mut Region) -> Outcome {
        if let Some(outcome) = region.outcome() {
            return outcome;
        }
        let outcome = self.evaluate(&region.color);
        region.assign(outcome)
    }

    /// Classify every region. Regions are independent; with the `parallel`
    /// feature they are spread across the rayon pool.
    pub fn classify_all(&self, regions: &mut [Region]) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            regions.par_iter_mut().for_each(|region| {
                self.classify(region);
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for region in regions.iter_mut() {
                self.classify(region);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use seatmap_core::{CalibrationConfig, PaletteCalibrator, SampleSet};

    fn palette(min_tolerance: f64) -> Palette {
        let samples = SampleSet::new()
            .with(Category::Available, Color::from_rgb8(40, 180, 40))
            .with(Category::Sold, Color::from_rgb8(200, 40, 40))
            .with(Category::Bestseller, Color::from_rgb8(240, 200, 40));
        PaletteCalibrator::new(CalibrationConfig::with_min_tolerance(min_tolerance))
            .calibrate(&samples)
            .unwrap()
    }

    #[test]
    fn test_centroid_always_matches() {
        let palette = palette(10.0);
        let classifier = RegionClassifier::new(&palette, ClassifierConfig::default());
        for entry in palette.entries() {
            assert_eq!(
                classifier.evaluate(&entry.centroid),
                Outcome::Matched(entry.category)
            );
        }
    }

    #[test]
    fn test_out_of_tolerance_is_unclassified() {
        let palette = palette(10.0);
        let classifier = RegionClassifier::new(&palette, ClassifierConfig::default());
        assert_eq!(
            classifier.evaluate(&Color::from_rgb8(130, 130, 130)),
            Outcome::Unclassified
        );
        assert_eq!(
            classifier.evaluate(&Color::from_rgb8(46, 186, 40)),
            Outcome::Matched(Category::Available)
        );
    }

    #[test]
    fn test_nearer_category_wins_inside_overlap() {
        let samples = SampleSet::new()
            .with(Category::Available, Color::from_rgb8(40, 180, 40))
            .with(Category::Bestseller, Color::from_rgb8(40, 180, 100));
        let config = CalibrationConfig {
            min_tolerance: 40.0,
            max_overlap: 0.5,
            required: Vec::new(),
            ..Default::default()
        };
        let palette = PaletteCalibrator::new(config).calibrate(&samples).unwrap();
        let classifier = RegionClassifier::new(&palette, ClassifierConfig::default());

        assert_eq!(
            classifier.evaluate(&Color::from_rgb8(40, 180, 60)),
            Outcome::Matched(Category::Available)
        );
        assert_eq!(
            classifier.evaluate(&Color::from_rgb8(40, 180, 80)),
            Outcome::Matched(Category::Bestseller)
        );
        assert_eq!(
            classifier.evaluate(&Color::from_rgb8(40, 180, 70)),
            Outcome::Ambiguous
        );
    }

    #[test]
    fn test_classify_assigns_once() {
        let palette = palette(10.0);
        let classifier = RegionClassifier::new(&palette, ClassifierConfig::default());
        let mut region = Region::with_color(BBox::new(0, 0, 10, 10), Color::from_rgb8(200, 40, 40));

        assert_eq!(classifier.classify(&mut region), Outcome::Matched(Category::Sold));
        region.color = Color::from_rgb8(40, 180, 40);
        assert_eq!(classifier.classify(&mut region), Outcome::Matched(Category::Sold));
    }

    #[test]
    fn test_classify_all() {
        let palette = palette(10.0);
        let classifier = RegionClassifier::new(&palette, ClassifierConfig::default());
        let mut regions: Vec<Region> = [(40, 180, 40), (200, 40, 40), (0, 0, 255)]
            .iter()
            .enumerate()
            .map(|(i, &(r, g, b))| {
                Region::with_color(BBox::new(i as u32 * 30, 0, 20, 20), Color::from_rgb8(r, g, b))
            })
            .collect();
        classifier.classify_all(&mut regions);

        let outcomes: Vec<_> = regions.iter().map(|r| r.outcome()).collect();
        assert_eq!(
            outcomes,
            vec![
                Some(Outcome::Matched(Category::Available)),
                Some(Outcome::Matched(Category::Sold)),
                Some(Outcome::Unclassified),
            ]
        );
    }
}
