//! Seat map computer vision library
//!
//! Locates seat glyphs in a captured seat-map image, classifies each one
//! against a calibrated palette and tallies the result into a [`Report`].

pub mod aggregate;
pub mod bbox;
pub mod calibration;
pub mod classify;
pub mod detection;
pub mod error;
pub mod locate;
pub mod region;
pub mod utils;

// Re-export commonly used types
pub use aggregate::Aggregator;
pub use bbox::BBox;
pub use calibration::{calibrate_from_swatches, sample_swatches, Swatch};
pub use classify::{ClassifierConfig, RegionClassifier};
pub use detection::{
    Analysis, AnalysisConfig, AnalysisStats, BatchOutcome, CaptureHints, PipelineRun,
    SeatMapAnalyzer, Stage,
};
pub use error::{LocatorError, SeatMapError};
pub use locate::{Located, LocatorConfig, SeatLocator};
pub use region::{Region, RegionCollection, RegionOrigin};
pub use traits::PixelSource;

pub use seatmap_core::{
    CalibrationConfig, CalibrationError, Category, Color, ColorMetric, EmptyInputError, Outcome,
    Palette, PaletteCalibrator, Report, SampleSet,
};

// Error handling
pub type Result<T, E = SeatMapError> = std::result::Result<T, E>;

/// Core traits for the CV system
pub mod traits {
    use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
    use seatmap_core::Color;

    /// Read-only access to an RGB pixel grid. Implementations must never
    /// expose a way to mutate the underlying image.
    pub trait PixelSource: Sync {
        fn dimensions(&self) -> (u32, u32);

        /// RGB triple at (x, y). Callers stay within `dimensions()`.
        fn rgb_at(&self, x: u32, y: u32) -> [u8; 3];

        fn color_at(&self, x: u32, y: u32) -> Color {
            Color::from_array(self.rgb_at(x, y))
        }
    }

    impl PixelSource for RgbImage {
        fn dimensions(&self) -> (u32, u32) {
            ImageBuffer::<Rgb<u8>, Vec<u8>>::dimensions(self)
        }

        fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
            self.get_pixel(x, y).0
        }
    }

    /// Alpha is ignored; captures are expected to be opaque.
    impl PixelSource for RgbaImage {
        fn dimensions(&self) -> (u32, u32) {
            ImageBuffer::<Rgba<u8>, Vec<u8>>::dimensions(self)
        }

        fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
            let [r, g, b, _] = self.get_pixel(x, y).0;
            [r, g, b]
        }
    }
}
