//! Error types for palette calibration and aggregation

use crate::category::Category;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("no sample colors supplied")]
    NoSamples,

    #[error("no sample colors supplied for required category `{0}`")]
    MissingSamples(Category),

    #[error(
        "tolerance balls of `{first}` and `{second}` overlap by {fraction:.3} (maximum {max:.3})"
    )]
    Overlap {
        first: Category,
        second: Category,
        fraction: f64,
        max: f64,
    },

    #[error("invalid calibration input: {0}")]
    InvalidInput(String),
}

/// Aggregation was asked to tally zero regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot build a report from an empty region sequence")]
pub struct EmptyInputError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct ParseCategoryError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{0}` (expected R,G,B or #rrggbb)")]
pub struct ParseColorError(pub String);
