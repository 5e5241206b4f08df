#![allow(dead_code)]

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seatmap_cv::{
    AnalysisConfig, BBox, CalibrationConfig, Category, Color, LocatorConfig, SampleSet,
};

pub const AVAILABLE: [u8; 3] = [40, 180, 40];
pub const SOLD: [u8; 3] = [200, 40, 40];
pub const BESTSELLER: [u8; 3] = [240, 200, 40];
pub const WHITE: [u8; 3] = [255, 255, 255];

pub const GLYPH: u32 = 20;
pub const PITCH: u32 = 30;
pub const MARGIN: u32 = 10;

/// Top-left corner of the glyph at (col, row)
pub fn glyph_bbox(col: u32, row: u32) -> BBox {
    BBox::new(MARGIN + col * PITCH, MARGIN + row * PITCH, GLYPH, GLYPH)
}

pub fn fill(img: &mut RgbImage, bbox: BBox, rgb: [u8; 3]) {
    for y in bbox.y..bbox.bottom() {
        for x in bbox.x..bbox.right() {
            img.put_pixel(x, y, Rgb(rgb));
        }
    }
}

/// White page with one solid glyph per entry, laid out row by row.
pub fn seat_grid(rows: &[&[[u8; 3]]]) -> RgbImage {
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
    let width = MARGIN + cols * PITCH;
    let height = MARGIN + rows.len() as u32 * PITCH;
    let mut img = RgbImage::from_pixel(width, height, Rgb(WHITE));
    for (row, colors) in rows.iter().enumerate() {
        for (col, rgb) in colors.iter().enumerate() {
            fill(&mut img, glyph_bbox(col as u32, row as u32), *rgb);
        }
    }
    img
}

/// Like [`seat_grid`] with a half-blended ring around each glyph and
/// uniform noise in its interior.
pub fn noisy_seat_grid(rows: &[&[[u8; 3]]], seed: u64, amplitude: i16) -> RgbImage {
    let mut img = seat_grid(rows);
    let mut rng = StdRng::seed_from_u64(seed);
    for (row, colors) in rows.iter().enumerate() {
        for (col, rgb) in colors.iter().enumerate() {
            let bbox = glyph_bbox(col as u32, row as u32);
            let ring = blend(*rgb, WHITE);
            for y in bbox.y..bbox.bottom() {
                for x in bbox.x..bbox.right() {
                    let on_ring = x == bbox.x
                        || y == bbox.y
                        || x + 1 == bbox.right()
                        || y + 1 == bbox.bottom();
                    let pixel = if on_ring {
                        ring
                    } else {
                        (*rgb).map(|c| {
                            (c as i16 + rng.gen_range(-amplitude..=amplitude)).clamp(0, 255) as u8
                        })
                    };
                    img.put_pixel(x, y, Rgb(pixel));
                }
            }
        }
    }
    img
}

fn blend(a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    [0, 1, 2].map(|i| ((a[i] as u16 + b[i] as u16) / 2) as u8)
}

pub fn palette_samples() -> SampleSet {
    SampleSet::new()
        .with(Category::Available, Color::from_array(AVAILABLE))
        .with(Category::Sold, Color::from_array(SOLD))
        .with(Category::Bestseller, Color::from_array(BESTSELLER))
}

pub fn test_config() -> AnalysisConfig {
    AnalysisConfig {
        calibration: CalibrationConfig::with_min_tolerance(10.0),
        locator: LocatorConfig::for_glyph(GLYPH, GLYPH),
        samples: palette_samples(),
        ..Default::default()
    }
}
