//! Seat-glyph candidate regions and batch operations over them

use crate::bbox::BBox;
use crate::traits::PixelSource;
use crate::utils::ImageUtils;
use seatmap_core::{Color, Outcome, Tally};
use serde::Serialize;

/// How a region came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegionOrigin {
    /// One connected component of seat-like cells
    Component,
    /// One of `parts` pitch-sized slices of an oversized component
    Split { parts: u32 },
    /// Supplied directly by a caller
    External,
}

/// A located seat-glyph candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub bbox: BBox,
    /// Mean of the interior pixels, border excluded
    pub color: Color,
    pub sampled_pixels: u32,
    pub origin: RegionOrigin,
    outcome: Option<Outcome>,
}

impl Region {
    pub fn new(bbox: BBox, color: Color, sampled_pixels: u32, origin: RegionOrigin) -> Self {
        Self {
            bbox,
            color,
            sampled_pixels,
            origin,
            outcome: None,
        }
    }

    /// Region with an externally known representative color.
    pub fn with_color(bbox: BBox, color: Color) -> Self {
        let pixels = u32::try_from(bbox.area()).unwrap_or(u32::MAX);
        Self::new(bbox, color, pixels, RegionOrigin::External)
    }

    /// Sample the representative color of `bbox` from `image`, ignoring a
    /// `border` pixel frame. `None` if the box lies outside the image.
    pub fn sample<P: PixelSource>(
        image: &P,
        bbox: BBox,
        border: u32,
        origin: RegionOrigin,
    ) -> Option<Self> {
        let (color, pixels) = ImageUtils::interior_mean(image, &bbox, border)?;
        Some(Self::new(bbox, color, pixels, origin))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_classified(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record the classification. The first assignment sticks; later calls
    /// return the stored outcome unchanged.
    pub fn assign(&mut self, outcome: Outcome) -> Outcome {
        *self.outcome.get_or_insert(outcome)
    }

    pub fn area(&self) -> u64 {
        self.bbox.area()
    }
}

/// Ordered collection of regions with batch operations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionCollection {
    regions: Vec<Region>,
}

impl RegionCollection {
    /// Create new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn extend(&mut self, other: RegionCollection) {
        self.regions.extend(other.regions);
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn as_mut_slice(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    pub fn into_vec(self) -> Vec<Region> {
        self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Region> {
        self.regions.iter_mut()
    }

    /// Drop the smaller region of every pair whose overlap ratio exceeds
    /// `threshold`. Equal areas keep the earlier region. Returns the number
    /// of regions removed; surviving regions keep their relative order.
    pub fn dedup_overlapping(&mut self, threshold: f64) -> usize {
        let n = self.regions.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            self.regions[b]
                .area()
                .cmp(&self.regions[a].area())
                .then(a.cmp(&b))
        });

        let mut suppressed = vec![false; n];
        for (rank, &i) in order.iter().enumerate() {
            if suppressed[i] {
                continue;
            }
            for &j in &order[rank + 1..] {
                if !suppressed[j] && self.regions[i].bbox.overlaps(&self.regions[j].bbox, threshold)
                {
                    suppressed[j] = true;
                }
            }
        }

        let before = n;
        let mut index = 0;
        self.regions.retain(|_| {
            let keep = !suppressed[index];
            index += 1;
            keep
        });
        before - self.regions.len()
    }

    /// Sort top-to-bottom, left-to-right. Regions whose centers lie within
    /// `row_tolerance` pixels of a row's first region share that row.
    pub fn sort_row_major(&mut self, row_tolerance: f64) {
        self.regions.sort_by(|a, b| {
            let (ax, ay) = a.bbox.center();
            let (bx, by) = b.bbox.center();
            ay.total_cmp(&by).then(ax.total_cmp(&bx))
        });

        let mut rows: Vec<usize> = Vec::with_capacity(self.regions.len());
        let mut row = 0usize;
        let mut anchor_y: Option<f64> = None;
        for region in &self.regions {
            let (_, cy) = region.bbox.center();
            match anchor_y {
                Some(y) if cy - y <= row_tolerance => {}
                Some(_) => {
                    row += 1;
                    anchor_y = Some(cy);
                }
                None => anchor_y = Some(cy),
            }
            rows.push(row);
        }

        let mut keyed: Vec<(usize, Region)> = rows.into_iter().zip(self.regions.drain(..)).collect();
        keyed.sort_by(|(ra, a), (rb, b)| {
            let (ax, ay) = a.bbox.center();
            let (bx, by) = b.bbox.center();
            ra.cmp(rb).then(ax.total_cmp(&bx)).then(ay.total_cmp(&by))
        });
        self.regions = keyed.into_iter().map(|(_, region)| region).collect();
    }

    /// Tally of assigned outcomes; unassigned regions count as unclassified.
    pub fn tally(&self) -> Tally {
        self.regions
            .iter()
            .map(|r| r.outcome().unwrap_or(Outcome::Unclassified))
            .collect()
    }
}

impl IntoIterator for RegionCollection {
    type Item = Region;
    type IntoIter = std::vec::IntoIter<Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}

impl FromIterator<Region> for RegionCollection {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
