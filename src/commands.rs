//! Subcommand implementations

use crate::cli::{AnalyzeArgs, CalibrateArgs, ConfigArgs, Preset};
use anyhow::{bail, Result};
use log::{info, warn};
use seatmap_cv::utils::ImageUtils;
use seatmap_cv::{
    Analysis, AnalysisConfig, BatchOutcome, CaptureHints, Category, Report, SeatMapAnalyzer, Stage,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One line of output per capture
#[derive(Debug, Serialize)]
struct CaptureSummary<'a> {
    image: &'a str,
    stage: Stage,
    failed_at: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    needs_recapture: bool,
}

impl<'a> CaptureSummary<'a> {
    fn new(outcome: &'a BatchOutcome) -> Self {
        let (report, error, needs_recapture) = match &outcome.result {
            Ok(analysis) => (Some(&analysis.report), None, analysis.needs_recapture),
            Err(e) => (None, Some(error_chain(e)), true),
        };
        Self {
            image: &outcome.label,
            stage: outcome.run.stage(),
            failed_at: outcome.run.failed_at(),
            report,
            error,
            needs_recapture,
        }
    }
}

/// Error message followed by its sources, colon separated
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn load_config(args: &ConfigArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => args.preset.config(),
    };
    if let Some(samples) = &args.samples {
        config.samples_file = Some(samples.clone());
    }
    Ok(config)
}

pub fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(min_coverage) = args.min_coverage {
        config.min_coverage = min_coverage;
    }
    let analyzer = SeatMapAnalyzer::new(config)?;

    let hints = CaptureHints {
        roi: args.roi,
        background: args.background,
    };
    let outcomes = analyzer.analyze_files(&args.images, &hints);

    let overlay_failures = match &args.overlay_dir {
        Some(dir) => write_overlays(&analyzer, &args.images, &outcomes, dir),
        None => 0,
    };

    if args.json {
        let summaries: Vec<CaptureSummary> = outcomes.iter().map(CaptureSummary::new).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for outcome in &outcomes {
            print_summary(outcome);
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    let recapture = outcomes
        .iter()
        .filter(|o| matches!(&o.result, Ok(a) if a.needs_recapture))
        .count();
    if failed + recapture > 0 {
        warn!("{} of {} captures failed, {} need a retake", failed, outcomes.len(), recapture);
    }
    if args.strict && failed + recapture + overlay_failures > 0 {
        bail!(
            "{} failed, {} low-coverage captures, {} overlays not written",
            failed,
            recapture,
            overlay_failures
        );
    }
    Ok(())
}

/// Write one overlay per successful capture. A capture whose overlay cannot
/// be written is logged and skipped; returns how many were skipped.
fn write_overlays(
    analyzer: &SeatMapAnalyzer,
    images: &[PathBuf],
    outcomes: &[BatchOutcome],
    dir: &Path,
) -> usize {
    let written: Vec<(&PathBuf, &Analysis)> = images
        .iter()
        .zip(outcomes)
        .filter_map(|(path, outcome)| outcome.result.as_ref().ok().map(|a| (path, a)))
        .collect();

    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create overlay directory {:?}: {}", dir, e);
        return written.len();
    }

    let mut failures = 0;
    for (path, analysis) in written {
        if let Err(e) = write_overlay(analyzer, path, analysis, dir) {
            warn!("Skipping overlay for {:?}: {:#}", path, e);
            failures += 1;
        }
    }
    failures
}

fn write_overlay(
    analyzer: &SeatMapAnalyzer,
    path: &Path,
    analysis: &Analysis,
    dir: &Path,
) -> Result<()> {
    let image = ImageUtils::load_rgb(path)?;
    analyzer.create_visualization(&image, analysis, &overlay_path(path, dir))?;
    Ok(())
}

/// `dir/<stem>_overlay.png`
fn overlay_path(input: &Path, dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".into());
    dir.join(format!("{}_overlay.png", stem))
}

fn print_summary(outcome: &BatchOutcome) {
    println!("{}", outcome.label);
    match &outcome.result {
        Ok(analysis) => {
            let report = &analysis.report;
            for category in Category::SEAT_STATES {
                println!("  {:<12} {}", category.as_str().to_uppercase(), report.count(category));
            }
            if report.background() > 0 {
                println!("  {:<12} {}", "BACKGROUND", report.background());
            }
            if !report.is_complete() {
                println!("  {:<12} {}", "UNCLASSIFIED", report.unclassified());
                println!("  {:<12} {}", "AMBIGUOUS", report.ambiguous());
            }
            println!(
                "  unsold {} of {} seats, coverage {:.1}%{}",
                report.unsold(),
                report.seats(),
                report.coverage() * 100.0,
                if analysis.needs_recapture { " (retake recommended)" } else { "" }
            );
        }
        Err(e) => {
            println!(
                "  failed at {:?}: {}",
                outcome.run.failed_at().unwrap_or(Stage::Init),
                error_chain(e)
            );
        }
    }
}

pub fn calibrate(args: &CalibrateArgs) -> Result<()> {
    let analyzer = SeatMapAnalyzer::new(load_config(&args.config)?)?;
    let palette = match &args.reference {
        Some(path) => analyzer.calibrate(&ImageUtils::load_rgb(path)?)?,
        None => analyzer.calibrate_samples()?,
    };
    info!("Calibrated {} categories", palette.entries().len());
    if let Some((first, second, fraction)) = palette.max_overlap() {
        info!("Closest pair {} / {} overlaps {:.3}", first, second, fraction);
    }
    println!("{}", serde_json::to_string_pretty(&palette)?);
    Ok(())
}

pub fn print_config(preset: Preset) -> Result<()> {
    println!("{}", preset.config().to_json_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use seatmap_cv::{CalibrationConfig, Color, LocatorConfig, SampleSet};

    fn test_analyzer() -> SeatMapAnalyzer {
        let config = AnalysisConfig {
            calibration: CalibrationConfig::with_min_tolerance(10.0),
            locator: LocatorConfig::for_glyph(20, 20),
            samples: SampleSet::new()
                .with(Category::Available, Color::from_rgb8(40, 180, 40))
                .with(Category::Sold, Color::from_rgb8(200, 40, 40))
                .with(Category::Bestseller, Color::from_rgb8(240, 200, 40)),
            ..Default::default()
        };
        SeatMapAnalyzer::new(config).unwrap()
    }

    fn two_seat_capture() -> RgbImage {
        let mut image = RgbImage::from_pixel(70, 40, Rgb([255, 255, 255]));
        for x0 in [10u32, 40] {
            for y in 10..30 {
                for x in x0..x0 + 20 {
                    image.put_pixel(x, y, Rgb([40, 180, 40]));
                }
            }
        }
        image
    }

    #[test]
    fn test_unwritable_overlay_skips_only_that_capture() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("seatmap_overlays_{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let kept = dir.join("kept.png");
        let removed = dir.join("removed.png");
        two_seat_capture().save(&kept)?;
        two_seat_capture().save(&removed)?;

        let analyzer = test_analyzer();
        let images = vec![removed.clone(), kept.clone()];
        let outcomes = analyzer.analyze_files(&images, &CaptureHints::default());
        assert!(outcomes.iter().all(|o| o.result.is_ok()));

        // Source gone by the time overlays are drawn
        std::fs::remove_file(&removed)?;
        let out = dir.join("overlays");
        let failures = write_overlays(&analyzer, &images, &outcomes, &out);
        let kept_written = out.join("kept_overlay.png").exists();
        let removed_written = out.join("removed_overlay.png").exists();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(failures, 1);
        assert!(kept_written);
        assert!(!removed_written);
        Ok(())
    }

    #[test]
    fn test_overlay_path() {
        let path = overlay_path(Path::new("captures/show_1.png"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/show_1_overlay.png"));
    }

    #[test]
    fn test_preset_samples_override() -> Result<()> {
        let args = ConfigArgs {
            config: None,
            preset: Preset::Dense,
            samples: Some(PathBuf::from("samples.txt")),
        };
        let config = load_config(&args)?;
        assert_eq!(config.locator.glyph_width, 16);
        assert_eq!(config.samples_file, Some(PathBuf::from("samples.txt")));
        Ok(())
    }
}
