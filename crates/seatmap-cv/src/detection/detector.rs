//! Seat map analyzer: calibrate, locate, classify, aggregate

use super::config::AnalysisConfig;
use super::run::{PipelineRun, Stage};
use crate::aggregate::Aggregator;
use crate::bbox::BBox;
use crate::calibration::sample_swatches;
use crate::classify::RegionClassifier;
use crate::locate::{LocatorStats, SeatLocator};
use crate::region::Region;
use crate::traits::PixelSource;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use log::{debug, info, warn};
use seatmap_core::{CalibrationError, Color, Palette, PaletteCalibrator, Report, SampleSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Per-capture hints from whoever took the screenshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureHints {
    /// Sub-rectangle holding the seat grid (no legend, header or footer)
    pub roi: Option<BBox>,
    /// Page background color, overriding the corner estimate
    pub background: Option<Color>,
}

impl CaptureHints {
    pub fn with_roi(mut self, roi: BBox) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }
}

/// Analysis statistics
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStats {
    pub roi: BBox,
    pub background: Color,
    pub locator: LocatorStats,
    pub processing_time_ms: u64,
}

/// Result of one successful run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub report: Report,
    /// Classified regions in row-major order
    pub regions: Vec<Region>,
    pub palette: Palette,
    pub stats: AnalysisStats,
    /// Coverage fell below the configured minimum
    pub needs_recapture: bool,
}

/// One entry of a batch. Each capture has its own run; a failure here says
/// nothing about the other entries.
#[derive(Debug)]
pub struct BatchOutcome {
    pub label: String,
    pub run: PipelineRun,
    pub result: Result<Analysis>,
}

/// Main seat map analyzer
#[derive(Debug, Clone)]
pub struct SeatMapAnalyzer {
    config: AnalysisConfig,
    samples: SampleSet,
}

impl SeatMapAnalyzer {
    /// Validate the configuration and load any sample file it names
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let mut samples = config.samples.clone();
        if let Some(path) = &config.samples_file {
            samples.extend(SampleSet::load(path)?);
        }

        Ok(Self { config, samples })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Calibrate from configured samples only; swatches are ignored.
    pub fn calibrate_samples(&self) -> Result<Palette, CalibrationError> {
        PaletteCalibrator::new(self.config.calibration.clone()).calibrate(&self.samples)
    }

    /// Calibrate from configured samples plus swatches read from `reference`.
    pub fn calibrate<P: PixelSource>(&self, reference: &P) -> Result<Palette, CalibrationError> {
        let mut samples = self.samples.clone();
        if !self.config.swatches.is_empty() {
            samples.extend(sample_swatches(
                reference,
                &self.config.swatches,
                self.config.locator.border_inset,
            )?);
        }
        PaletteCalibrator::new(self.config.calibration.clone()).calibrate(&samples)
    }

    /// Run the whole pipeline on one capture
    pub fn analyze<P: PixelSource>(&self, image: &P, hints: &CaptureHints) -> Result<Analysis> {
        let mut run = PipelineRun::new();
        self.analyze_with_run(image, hints, &mut run)
    }

    /// Like [`analyze`](Self::analyze), recording progress in `run`
    pub fn analyze_with_run<P: PixelSource>(
        &self,
        image: &P,
        hints: &CaptureHints,
        run: &mut PipelineRun,
    ) -> Result<Analysis> {
        let result = self.run_stages(image, hints, run);
        if let Err(e) = &result {
            run.fail();
            warn!("Analysis failed at {:?}: {}", run.failed_at(), e);
        }
        result
    }

    fn run_stages<P: PixelSource>(
        &self,
        image: &P,
        hints: &CaptureHints,
        run: &mut PipelineRun,
    ) -> Result<Analysis> {
        let start_time = Instant::now();

        let palette = self.calibrate(image)?;
        run.advance(Stage::Calibrated)?;

        let located = SeatLocator::new(self.config.locator.clone()).locate(
            image,
            hints.roi,
            hints.background,
        )?;
        run.advance(Stage::Located)?;

        let mut regions = located.regions.into_vec();
        RegionClassifier::new(&palette, self.config.classifier.clone()).classify_all(&mut regions);
        run.advance(Stage::Classified)?;

        let report = Aggregator::aggregate(&regions)?;
        run.advance(Stage::Aggregated)?;

        let needs_recapture = !report.meets_coverage(self.config.min_coverage);
        if needs_recapture {
            warn!(
                "Coverage {:.3} below {:.3}: {} unclassified, {} ambiguous; re-capture recommended",
                report.coverage(),
                self.config.min_coverage,
                report.unclassified(),
                report.ambiguous()
            );
        }

        let processing_time = start_time.elapsed().as_millis() as u64;
        debug!(
            "Analysis completed: {} sold, {} available, {} bestseller in {}ms",
            report.sold(),
            report.available(),
            report.bestseller(),
            processing_time
        );

        Ok(Analysis {
            report,
            regions,
            palette,
            stats: AnalysisStats {
                roi: located.roi,
                background: located.background,
                locator: located.stats,
                processing_time_ms: processing_time,
            },
            needs_recapture,
        })
    }

    /// Load an image file and analyze it
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P, hints: &CaptureHints) -> Result<Analysis> {
        let mut run = PipelineRun::new();
        self.analyze_file_with_run(path.as_ref(), hints, &mut run)
    }

    fn analyze_file_with_run(
        &self,
        path: &Path,
        hints: &CaptureHints,
        run: &mut PipelineRun,
    ) -> Result<Analysis> {
        match ImageUtils::load_rgb(path) {
            Ok(image) => {
                info!("Analyzing {:?}", path);
                self.analyze_with_run(&image, hints, run)
            }
            Err(e) => {
                run.fail();
                Err(e)
            }
        }
    }

    /// Analyze independent captures, one pipeline run each
    pub fn analyze_batch<P: PixelSource>(
        &self,
        captures: &[P],
        hints: &CaptureHints,
    ) -> Vec<BatchOutcome> {
        let run_one = |(index, image): (usize, &P)| {
            let mut run = PipelineRun::new();
            let result = self.analyze_with_run(image, hints, &mut run);
            BatchOutcome {
                label: format!("capture {}", index),
                run,
                result,
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            captures.par_iter().enumerate().map(run_one).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            captures.iter().enumerate().map(run_one).collect()
        }
    }

    /// Analyze image files, one pipeline run each
    pub fn analyze_files(&self, paths: &[PathBuf], hints: &CaptureHints) -> Vec<BatchOutcome> {
        let run_one = |path: &PathBuf| {
            let mut run = PipelineRun::new();
            let result = self.analyze_file_with_run(path, hints, &mut run);
            BatchOutcome {
                label: path.display().to_string(),
                run,
                result,
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            paths.par_iter().map(run_one).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            paths.iter().map(run_one).collect()
        }
    }

    /// Save a copy of `image` with each region outlined by outcome
    pub fn create_visualization<P: PixelSource>(
        &self,
        image: &P,
        analysis: &Analysis,
        output_path: &Path,
    ) -> Result<()> {
        if !self.config.visualization.draw_regions {
            return Ok(());
        }
        let overlay = ImageUtils::render_overlay(
            image,
            &analysis.regions,
            self.config.visualization.line_thickness,
        );
        ImageUtils::save_rgb(&overlay, output_path)?;
        info!("Visualization saved: {:?}", output_path);
        Ok(())
    }

    /// Export analysis results in JSON format
    pub fn export_json(&self, analysis: &Analysis, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(analysis)
            .context("Failed to serialize analysis results")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }
}
