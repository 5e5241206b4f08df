//! High-level analysis pipeline

pub mod config;
pub mod detector;
pub mod run;

pub use config::{AnalysisConfig, VisualizationConfig};
pub use detector::{Analysis, AnalysisStats, BatchOutcome, CaptureHints, SeatMapAnalyzer};
pub use run::{PipelineRun, Stage};
