//! Analysis configuration

use crate::calibration::Swatch;
use crate::classify::ClassifierConfig;
use crate::error::SeatMapError;
use crate::locate::LocatorConfig;
use crate::Result;
use anyhow::Context;
use seatmap_core::{CalibrationConfig, SampleSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub calibration: CalibrationConfig,
    pub locator: LocatorConfig,
    pub classifier: ClassifierConfig,
    /// Inline palette samples
    pub samples: SampleSet,
    /// Extra samples in `category\-R,G,B` text form
    pub samples_file: Option<PathBuf>,
    /// Legend swatches, sampled from each capture before calibration
    pub swatches: Vec<Swatch>,
    /// Coverage below this flags the capture for a retake
    pub min_coverage: f64,
    pub visualization: VisualizationConfig,
}

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub draw_regions: bool,
    pub line_thickness: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            draw_regions: true,
            line_thickness: 2,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            locator: LocatorConfig::default(),
            classifier: ClassifierConfig::default(),
            samples: SampleSet::new(),
            samples_file: None,
            swatches: Vec::new(),
            min_coverage: 0.95,
            visualization: VisualizationConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_samples(samples: SampleSet) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    /// Configuration for captures taken at 2x device pixel ratio
    pub fn for_high_dpi() -> Self {
        Self {
            locator: LocatorConfig {
                border_inset: 2,
                background_patch: 8,
                ..LocatorConfig::for_glyph(48, 48)
            },
            ..Default::default()
        }
    }

    /// Configuration for small, tightly packed seat glyphs
    pub fn for_dense_layout() -> Self {
        Self {
            locator: LocatorConfig {
                merge_tolerance: 20.0,
                split_factor: 1.3,
                ..LocatorConfig::for_glyph(16, 16)
            },
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(json).context("Failed to parse analysis config")?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json_str(&json).map_err(|e| match e {
            SeatMapError::Other(err) => {
                SeatMapError::Other(err.context(format!("Invalid config file: {:?}", path)))
            }
            other => other,
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        Ok(json)
    }

    /// Check every section before any run starts.
    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.locator.validate()?;

        if !(self.classifier.tie_epsilon.is_finite() && self.classifier.tie_epsilon >= 0.0) {
            return Err(SeatMapError::Config(format!(
                "tie_epsilon must be >= 0, got {}",
                self.classifier.tie_epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(SeatMapError::Config(format!(
                "min_coverage must lie in [0, 1], got {}",
                self.min_coverage
            )));
        }
        if self.samples.is_empty() && self.samples_file.is_none() && self.swatches.is_empty() {
            return Err(SeatMapError::Config(
                "no palette source: provide samples, samples_file or swatches".into(),
            ));
        }
        Ok(())
    }
}
