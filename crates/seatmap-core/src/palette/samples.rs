//! Labeled sample colors and the plain-text samples file

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::category::Category;
use crate::color::Color;

/// One reference color known to denote `category`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub category: Category,
    pub color: Color,
}

/// Labeled sample colors used as calibration input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<LabeledSample>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: Vec<LabeledSample>) -> Self {
        Self { samples }
    }

    pub fn push(&mut self, category: Category, color: Color) {
        self.samples.push(LabeledSample { category, color });
    }

    /// Builder-style `push`.
    pub fn with(mut self, category: Category, color: Color) -> Self {
        self.push(category, color);
        self
    }

    pub fn extend(&mut self, other: SampleSet) {
        self.samples.extend(other.samples);
    }

    pub fn for_category(&self, category: Category) -> impl Iterator<Item = Color> + '_ {
        self.samples
            .iter()
            .filter(move |s| s.category == category)
            .map(|s| s.color)
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.samples.iter().any(|s| s.category == category)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load samples from a text file.
    ///
    /// One sample per line, `category\-R,G,B` or `category\-label\-R,G,B`.
    /// Blank lines and lines starting with `#` are skipped. Lines with the
    /// wrong shape are skipped with a warning; bad channel values are errors.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open samples file: {:?}", path))?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read line {} from {:?}", line_num + 1, path)
            })?;
            lines.push(line);
        }

        let samples = Self::parse_lines(lines.iter().map(String::as_str))
            .with_context(|| format!("Invalid samples file: {:?}", path))?;
        debug!("Loaded {} palette samples from {:?}", samples.len(), path);
        Ok(samples)
    }

    pub fn parse(text: &str) -> Result<SampleSet> {
        Self::parse_lines(text.lines())
    }

    fn parse_lines<'a, I: Iterator<Item = &'a str>>(lines: I) -> Result<SampleSet> {
        let mut samples = SampleSet::new();

        for (line_num, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(r"\-").map(|s| s.trim()).collect();
            if parts.len() < 2 || parts.len() > 3 {
                warn!(
                    "Skipping line {}: '{}' (expected category\\-R,G,B)",
                    line_num + 1,
                    line
                );
                continue;
            }

            let category: Category = parts[0]
                .parse()
                .with_context(|| format!("Invalid category at line {}", line_num + 1))?;

            let rgb = parts[parts.len() - 1];
            let channels: Vec<&str> = rgb.split(',').map(|s| s.trim()).collect();
            if channels.len() != 3 {
                warn!(
                    "Skipping line {}: invalid color '{}' (expected R,G,B)",
                    line_num + 1,
                    rgb
                );
                continue;
            }

            let mut values = [0u8; 3];
            for (slot, (name, raw)) in values
                .iter_mut()
                .zip(["red", "green", "blue"].iter().zip(&channels))
            {
                *slot = raw.parse::<u8>().with_context(|| {
                    format!("Invalid {} value at line {}: '{}'", name, line_num + 1, raw)
                })?;
            }

            samples.push(category, Color::from_array(values));
        }

        Ok(samples)
    }
}

impl FromIterator<LabeledSample> for SampleSet {
    fn from_iter<T: IntoIterator<Item = LabeledSample>>(iter: T) -> Self {
        Self::from_samples(iter.into_iter().collect())
    }
}
