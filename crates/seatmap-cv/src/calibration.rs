//! Palette calibration from legend swatches in a reference image

use crate::bbox::BBox;
use crate::traits::PixelSource;
use crate::utils::ImageUtils;
use log::debug;
use seatmap_core::{
    CalibrationConfig, CalibrationError, Category, Palette, PaletteCalibrator, SampleSet,
};
use serde::{Deserialize, Serialize};

/// Known location of a legend swatch for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub category: Category,
    pub bbox: BBox,
}

impl Swatch {
    pub fn new(category: Category, bbox: BBox) -> Self {
        Self { category, bbox }
    }
}

/// Sample the interior mean of each swatch, `border` pixels excluded.
pub fn sample_swatches<P: PixelSource>(
    image: &P,
    swatches: &[Swatch],
    border: u32,
) -> Result<SampleSet, CalibrationError> {
    let (width, height) = image.dimensions();
    let mut samples = SampleSet::new();

    for swatch in swatches {
        if !BBox::full(width, height).contains(&swatch.bbox) || swatch.bbox.is_empty() {
            return Err(CalibrationError::InvalidInput(format!(
                "{} swatch {} is not inside the {}x{} reference image",
                swatch.category, swatch.bbox, width, height
            )));
        }

        let Some((color, pixels)) = ImageUtils::interior_mean(image, &swatch.bbox, border) else {
            continue;
        };
        debug!(
            "Sampled {} swatch {} -> {} ({} px)",
            swatch.category, swatch.bbox, color, pixels
        );
        samples.push(swatch.category, color);
    }

    Ok(samples)
}

/// Sample swatches from `image` and calibrate a palette from them.
pub fn calibrate_from_swatches<P: PixelSource>(
    image: &P,
    swatches: &[Swatch],
    config: &CalibrationConfig,
    border: u32,
) -> Result<Palette, CalibrationError> {
    let samples = sample_swatches(image, swatches, border)?;
    PaletteCalibrator::new(config.clone()).calibrate(&samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use seatmap_core::Color;

    fn legend() -> RgbImage {
        let mut img = RgbImage::from_pixel(90, 20, Rgb([255, 255, 255]));
        for (i, rgb) in [[40, 180, 40], [200, 40, 40], [240, 200, 40]].iter().enumerate() {
            let x0 = 5 + i as u32 * 30;
            for y in 5..15 {
                for x in x0..x0 + 10 {
                    img.put_pixel(x, y, Rgb(*rgb));
                }
            }
        }
        img
    }

    fn swatches() -> Vec<Swatch> {
        vec![
            Swatch::new(Category::Available, BBox::new(5, 5, 10, 10)),
            Swatch::new(Category::Sold, BBox::new(35, 5, 10, 10)),
            Swatch::new(Category::Bestseller, BBox::new(65, 5, 10, 10)),
        ]
    }

    #[test]
    fn test_calibrate_from_legend() -> Result<(), CalibrationError> {
        let palette = calibrate_from_swatches(
            &legend(),
            &swatches(),
            &CalibrationConfig::with_min_tolerance(10.0),
            1,
        )?;
        assert_eq!(
            palette.entry(Category::Bestseller).map(|e| e.centroid),
            Some(Color::from_rgb8(240, 200, 40))
        );
        Ok(())
    }

    #[test]
    fn test_swatch_outside_image() {
        let mut swatches = swatches();
        swatches[0].bbox = BBox::new(85, 5, 10, 10);
        let err = sample_swatches(&legend(), &swatches, 1).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidInput(_)));
    }
}
