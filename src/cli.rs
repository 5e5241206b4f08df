//! Command-line interface definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use seatmap_cv::{AnalysisConfig, BBox, Color};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Count sold, available and bestseller seats in seat-map captures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one or more seat-map captures
    Analyze(AnalyzeArgs),
    /// Build the palette and print it as JSON
    Calibrate(CalibrateArgs),
    /// Print a configuration preset as JSON
    Config {
        #[arg(long, value_enum, default_value_t = Preset::Default)]
        preset: Preset,
    },
}

/// Where the analysis configuration comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// JSON analysis config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Preset used when no config file is given
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// Palette samples file (`category\-R,G,B` per line)
    #[arg(short, long)]
    pub samples: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input captures (png/jpg/etc)
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Seat grid sub-rectangle as x,y,w,h
    #[arg(long)]
    pub roi: Option<BBox>,

    /// Page background as R,G,B or #rrggbb
    #[arg(long)]
    pub background: Option<Color>,

    /// Write an annotated overlay per capture into this directory
    #[arg(long)]
    pub overlay_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with an error if any capture fails or needs a retake
    #[arg(long)]
    pub strict: bool,

    /// Override the configured minimum coverage
    #[arg(long)]
    pub min_coverage: Option<f64>,
}

#[derive(Args, Debug)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Capture to read legend swatches from
    #[arg(long)]
    pub reference: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    HighDpi,
    Dense,
}

impl Preset {
    pub fn config(self) -> AnalysisConfig {
        match self {
            Preset::Default => AnalysisConfig::default(),
            Preset::HighDpi => AnalysisConfig::for_high_dpi(),
            Preset::Dense => AnalysisConfig::for_dense_layout(),
        }
    }
}
