//! Error types for seat location and the analysis pipeline

use crate::bbox::BBox;
use crate::detection::Stage;
use seatmap_core::{CalibrationError, EmptyInputError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocatorError {
    #[error("no seat-like regions found inside {roi}; wrong ROI or unsupported image")]
    NoRegions { roi: BBox },

    #[error("region of interest {roi} does not intersect the {width}x{height} image")]
    EmptyRoi { roi: BBox, width: u32, height: u32 },

    #[error("invalid locator config: {0}")]
    InvalidConfig(String),
}

/// Anything that aborts one analysis run.
#[derive(Debug, Error)]
pub enum SeatMapError {
    #[error("calibration failed: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("seat location failed: {0}")]
    Locator(#[from] LocatorError),

    #[error("aggregation failed: {0}")]
    EmptyInput(#[from] EmptyInputError),

    #[error("illegal pipeline transition {from:?} -> {to:?}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("failed to load image {path:?}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {path:?}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SeatMapError {
    /// True for errors that a fresh capture might fix.
    pub fn is_capture_related(&self) -> bool {
        matches!(
            self,
            SeatMapError::Locator(LocatorError::NoRegions { .. })
                | SeatMapError::EmptyInput(_)
                | SeatMapError::ImageLoad { .. }
        )
    }
}
