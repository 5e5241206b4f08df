//! RGB colors and distance metrics
//!
//! Channels are kept as `f64` in the 0-255 range so that centroids and
//! region means do not lose precision before distances are taken.

use crate::error::ParseColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color::new(255.0, 255.0, 255.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64, g as f64, b as f64)
    }

    pub fn from_array(rgb: [u8; 3]) -> Self {
        Self::from_rgb8(rgb[0], rgb[1], rgb[2])
    }

    /// Nearest 8-bit representation.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// Arithmetic mean, `None` for an empty input.
    pub fn mean<I: IntoIterator<Item = Color>>(colors: I) -> Option<Color> {
        let mut count = 0usize;
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        for color in colors {
            r += color.r;
            g += color.g;
            b += color.b;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Color::new(r / n, g / n, b / n))
    }

    pub fn euclidean(&self, other: &Color) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "rgb({}, {}, {})", r, g, b)
    }
}

/// Accepts `R,G,B` (0-255 each) or `#rrggbb`.
impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(ParseColorError(s.to_string()));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
            };
            return Ok(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 3 {
            return Err(ParseColorError(s.to_string()));
        }
        let mut rgb = [0u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| ParseColorError(s.to_string()))?;
        }
        Ok(Color::from_array(rgb))
    }
}

/// Distance used for palette matching. Tolerance radii are expressed in the
/// units of whichever metric the palette was calibrated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMetric {
    /// Plain Euclidean distance in RGB
    #[default]
    Euclidean,
    /// "Redmean" weighted RGB distance, closer to perceived difference
    Redmean,
}

impl ColorMetric {
    pub fn distance(self, a: &Color, b: &Color) -> f64 {
        match self {
            ColorMetric::Euclidean => a.euclidean(b),
            ColorMetric::Redmean => {
                let rmean = (a.r + b.r) / 2.0;
                let dr = a.r - b.r;
                let dg = a.g - b.g;
                let db = a.b - b.b;
                ((2.0 + rmean / 256.0) * dr * dr
                    + 4.0 * dg * dg
                    + (2.0 + (255.0 - rmean) / 256.0) * db * db)
                    .sqrt()
            }
        }
    }
}
