//! Image loading, pixel sampling and overlay rendering

use crate::bbox::BBox;
use crate::error::SeatMapError;
use crate::region::Region;
use crate::traits::PixelSource;
use crate::Result;
use image::{Rgb, RgbImage};
use seatmap_core::{Category, Color, Outcome};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load any supported image format as RGB
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| SeatMapError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(img.to_rgb8())
    }

    /// Save an RGB image, format chosen by extension
    pub fn save_rgb<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
        let path = path.as_ref();
        image.save(path).map_err(|source| SeatMapError::ImageSave {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Copy any pixel source into an owned RGB image
    pub fn to_rgb_image<P: PixelSource>(source: &P) -> RgbImage {
        let (width, height) = source.dimensions();
        RgbImage::from_fn(width, height, |x, y| Rgb(source.rgb_at(x, y)))
    }

    /// Convert RGBA to RGB, dropping alpha
    pub fn rgba_to_rgb(rgba_image: &image::RgbaImage) -> RgbImage {
        Self::to_rgb_image(rgba_image)
    }

    /// Mean color of `bbox` shrunk by `border` on each side, with the number
    /// of pixels averaged. `None` when the box misses the image entirely.
    pub fn interior_mean<P: PixelSource>(
        image: &P,
        bbox: &BBox,
        border: u32,
    ) -> Option<(Color, u32)> {
        let (width, height) = image.dimensions();
        let area = bbox.clip_to(width, height)?.inset(border);

        let mut sums = [0u64; 3];
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let px = image.rgb_at(x, y);
                for (sum, v) in sums.iter_mut().zip(px) {
                    *sum += v as u64;
                }
            }
        }

        let count = area.area();
        let n = count as f64;
        let color = Color::new(sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n);
        Some((color, u32::try_from(count).unwrap_or(u32::MAX)))
    }

    /// Page background estimate: per-channel median of the mean colors of
    /// `patch` x `patch` squares in the four image corners.
    pub fn corner_background<P: PixelSource>(image: &P, patch: u32) -> Color {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Color::WHITE;
        }
        let pw = patch.clamp(1, width);
        let ph = patch.clamp(1, height);

        let corners = [
            BBox::new(0, 0, pw, ph),
            BBox::new(width - pw, 0, pw, ph),
            BBox::new(0, height - ph, pw, ph),
            BBox::new(width - pw, height - ph, pw, ph),
        ];
        let means: Vec<Color> = corners
            .iter()
            .filter_map(|c| Self::interior_mean(image, c, 0).map(|(color, _)| color))
            .collect();

        let median = |mut values: Vec<f64>| {
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        };

        Color::new(
            median(means.iter().map(|c| c.r).collect()),
            median(means.iter().map(|c| c.g).collect()),
            median(means.iter().map(|c| c.b).collect()),
        )
    }

    /// Outline color used for each outcome in overlays
    pub fn outcome_color(outcome: Option<Outcome>) -> Rgb<u8> {
        match outcome {
            Some(Outcome::Matched(Category::Available)) => Rgb([0, 200, 0]),
            Some(Outcome::Matched(Category::Bestseller)) => Rgb([0, 0, 255]),
            Some(Outcome::Matched(Category::Sold)) => Rgb([255, 0, 0]),
            Some(Outcome::Matched(Category::Background)) => Rgb([128, 128, 128]),
            Some(Outcome::Ambiguous) => Rgb([0, 255, 255]),
            Some(Outcome::Unclassified) | None => Rgb([255, 0, 255]),
        }
    }

    /// Draw a hollow rectangle, clipped to the image
    pub fn draw_outline(image: &mut RgbImage, bbox: &BBox, color: Rgb<u8>, thickness: u32) {
        let (width, height) = image.dimensions();
        let Some(area) = bbox.clip_to(width, height) else {
            return;
        };
        let t = thickness.max(1);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let edge = x < area.x + t
                    || x + t >= area.right()
                    || y < area.y + t
                    || y + t >= area.bottom();
                if edge {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Copy of `source` with every region outlined in its outcome color.
    /// The source is left untouched.
    pub fn render_overlay<P: PixelSource>(
        source: &P,
        regions: &[Region],
        thickness: u32,
    ) -> RgbImage {
        let mut output = Self::to_rgb_image(source);
        for region in regions {
            Self::draw_outline(
                &mut output,
                &region.bbox,
                Self::outcome_color(region.outcome()),
                thickness,
            );
        }
        output
    }
}
