//! Occupancy report

use crate::category::{Category, Outcome};
use crate::error::EmptyInputError;
use serde::Serialize;

/// Running count of classification outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    matched: [usize; 4],
    unclassified: usize,
    ambiguous: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Matched(category) => self.matched[category.index()] += 1,
            Outcome::Unclassified => self.unclassified += 1,
            Outcome::Ambiguous => self.ambiguous += 1,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.matched[category.index()]
    }

    pub fn total(&self) -> usize {
        self.matched.iter().sum::<usize>() + self.unclassified + self.ambiguous
    }
}

impl Extend<Outcome> for Tally {
    fn extend<T: IntoIterator<Item = Outcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}

impl FromIterator<Outcome> for Tally {
    fn from_iter<T: IntoIterator<Item = Outcome>>(iter: T) -> Self {
        let mut tally = Tally::new();
        tally.extend(iter);
        tally
    }
}

/// Per-category seat counts for one capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    sold: usize,
    available: usize,
    bestseller: usize,
    background: usize,
    unclassified: usize,
    ambiguous: usize,
    total_detected: usize,
    total_classified: usize,
    coverage: f64,
}

impl Report {
    /// Fails on an empty tally: zero regions is never reported as zero occupancy.
    pub fn from_tally(tally: &Tally) -> Result<Report, EmptyInputError> {
        let total = tally.total();
        if total == 0 {
            return Err(EmptyInputError);
        }

        let classified = total - tally.unclassified - tally.ambiguous;
        let coverage = (classified as f64 / total as f64).clamp(0.0, 1.0);

        Ok(Report {
            sold: tally.count(Category::Sold),
            available: tally.count(Category::Available),
            bestseller: tally.count(Category::Bestseller),
            background: tally.count(Category::Background),
            unclassified: tally.unclassified,
            ambiguous: tally.ambiguous,
            total_detected: total,
            total_classified: classified,
            coverage,
        })
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Sold => self.sold,
            Category::Available => self.available,
            Category::Bestseller => self.bestseller,
            Category::Background => self.background,
        }
    }

    pub fn sold(&self) -> usize {
        self.sold
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn bestseller(&self) -> usize {
        self.bestseller
    }

    pub fn background(&self) -> usize {
        self.background
    }

    pub fn unclassified(&self) -> usize {
        self.unclassified
    }

    pub fn ambiguous(&self) -> usize {
        self.ambiguous
    }

    /// Seats still on sale (available + bestseller).
    pub fn unsold(&self) -> usize {
        self.available + self.bestseller
    }

    /// Seats in any seat state, excluding background matches.
    pub fn seats(&self) -> usize {
        self.sold + self.unsold()
    }

    pub fn total_detected(&self) -> usize {
        self.total_detected
    }

    pub fn total_classified(&self) -> usize {
        self.total_classified
    }

    /// classified / detected, in [0, 1].
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn is_complete(&self) -> bool {
        self.unclassified == 0 && self.ambiguous == 0
    }

    pub fn meets_coverage(&self, min_coverage: f64) -> bool {
        self.coverage >= min_coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally_fails() {
        assert_eq!(Report::from_tally(&Tally::new()), Err(EmptyInputError));
    }

    #[test]
    fn test_full_coverage() {
        let tally: Tally = [
            Outcome::Matched(Category::Available),
            Outcome::Matched(Category::Sold),
            Outcome::Matched(Category::Background),
        ]
        .into_iter()
        .collect();
        let report = Report::from_tally(&tally).unwrap();

        assert_eq!(report.coverage(), 1.0);
        assert!(report.is_complete());
        assert_eq!(report.seats(), 2);
        assert_eq!(report.background(), 1);
    }

    #[test]
    fn test_partial_coverage() {
        let tally: Tally = [
            Outcome::Matched(Category::Available),
            Outcome::Matched(Category::Bestseller),
            Outcome::Unclassified,
            Outcome::Ambiguous,
        ]
        .into_iter()
        .collect();
        let report = Report::from_tally(&tally).unwrap();

        assert_eq!(report.total_detected(), 4);
        assert_eq!(report.total_classified(), 2);
        assert_eq!(report.coverage(), 0.5);
        assert_eq!(report.unsold(), 2);
        assert!(!report.is_complete());
        assert!(!report.meets_coverage(0.95));
    }

    #[test]
    fn test_nothing_classified() {
        let tally: Tally = std::iter::repeat_n(Outcome::Unclassified, 3).collect();
        let report = Report::from_tally(&tally).unwrap();
        assert_eq!(report.coverage(), 0.0);
        assert_eq!(report.total_classified(), 0);
    }
}
