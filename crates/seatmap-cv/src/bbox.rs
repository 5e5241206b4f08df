//! Axis-aligned bounding boxes in image pixel coordinates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel rectangle; `x + width` and `y + height` are exclusive. Edges past
/// `u32::MAX` saturate, so such a box can only be clipped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    /// Create a new bounding box
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering a whole image
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Calculate center point
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return f64::INFINITY;
        }
        self.width as f64 / self.height as f64
    }

    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(BBox::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BBox) -> BBox {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        BBox::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Intersection area relative to the smaller of the two boxes. A box
    /// fully inside another scores 1.0 regardless of the size difference.
    pub fn overlap_ratio(&self, other: &BBox) -> f64 {
        let Some(inter) = self.intersection(other) else {
            return 0.0;
        };
        let smaller = self.area().min(other.area());
        if smaller == 0 {
            return 0.0;
        }
        inter.area() as f64 / smaller as f64
    }

    /// Check if this box overlaps with another
    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.overlap_ratio(other) > threshold
    }

    pub fn contains(&self, other: &BBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink by `margin` on every side, never below one pixel per axis.
    pub fn inset(&self, margin: u32) -> BBox {
        let shrink = |origin: u32, extent: u32| {
            let m = margin.min(extent.saturating_sub(1) / 2);
            (origin + m, extent - 2 * m)
        };
        let (x, width) = shrink(self.x, self.width);
        let (y, height) = shrink(self.y, self.height);
        BBox::new(x, y, width, height)
    }

    /// Part of this box inside a `width` x `height` image
    pub fn clip_to(&self, width: u32, height: u32) -> Option<BBox> {
        self.intersection(&BBox::full(width, height))
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Parses `x,y,width,height`.
impl FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 4 {
            return Err(format!("expected x,y,width,height, got '{}'", s));
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid number '{}' in '{}'", part, s))?;
        }
        Ok(BBox::new(values[0], values[1], values[2], values[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_ratio_partial() {
        let box1 = BBox::new(0, 0, 10, 10);
        let box2 = BBox::new(5, 5, 10, 10);

        assert_eq!(box1.overlap_ratio(&box2), 0.25);
        assert_eq!(box1.overlap_ratio(&BBox::new(20, 20, 5, 5)), 0.0);
    }

    #[test]
    fn test_overlap_ratio_containment() {
        let outer = BBox::new(0, 0, 40, 40);
        let inner = BBox::new(10, 10, 10, 10);
        assert_eq!(outer.overlap_ratio(&inner), 1.0);
        assert!(outer.overlaps(&inner, 0.5));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_inset_keeps_a_pixel() {
        assert_eq!(BBox::new(10, 10, 20, 20).inset(2), BBox::new(12, 12, 16, 16));
        let tiny = BBox::new(5, 5, 2, 3).inset(4);
        assert_eq!(tiny, BBox::new(5, 6, 2, 1));
    }

    #[test]
    fn test_clip_and_union() {
        let roi = BBox::new(90, 90, 50, 50);
        assert_eq!(roi.clip_to(100, 100), Some(BBox::new(90, 90, 10, 10)));
        assert_eq!(BBox::new(200, 0, 5, 5).clip_to(100, 100), None);

        let union = BBox::new(0, 0, 5, 5).union(&BBox::new(10, 2, 5, 5));
        assert_eq!(union, BBox::new(0, 0, 15, 7));
    }

    #[test]
    fn test_edges_saturate_near_u32_max() {
        let far = "4294967290,0,100,100".parse::<BBox>().unwrap();
        assert_eq!(far.right(), u32::MAX);
        assert_eq!(far.clip_to(100, 100), None);
        assert_eq!(far.intersection(&BBox::new(0, 0, 50, 50)), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("1, 2,3,4".parse::<BBox>(), Ok(BBox::new(1, 2, 3, 4)));
        assert!("1,2,3".parse::<BBox>().is_err());
    }
}
