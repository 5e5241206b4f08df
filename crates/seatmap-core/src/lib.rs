//! Seat map core types
//!
//! Colors, seat categories, the calibrated palette and the occupancy report.
//! Nothing in this crate touches pixels; see `seatmap-cv` for that.

pub mod category;
pub mod color;
pub mod error;
pub mod palette;
pub mod report;

pub use category::{Category, Outcome};
pub use color::{Color, ColorMetric};
pub use error::{CalibrationError, EmptyInputError, ParseCategoryError, ParseColorError};
pub use palette::{
    CalibrationConfig, LabeledSample, Palette, PaletteCalibrator, PaletteEntry, SampleSet,
};
pub use report::{Report, Tally};
