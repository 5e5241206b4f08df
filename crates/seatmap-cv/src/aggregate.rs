//! Aggregation of classified regions into a report

use crate::region::Region;
use seatmap_core::{EmptyInputError, Outcome, Report, Tally};

/// Region tally utility functions
pub struct Aggregator;

impl Aggregator {
    /// Tally regions into a [`Report`]. Regions that were never classified
    /// count as unclassified. An empty slice is an error, never a zero report.
    pub fn aggregate(regions: &[Region]) -> Result<Report, EmptyInputError> {
        let tally: Tally = regions
            .iter()
            .map(|r| r.outcome().unwrap_or(Outcome::Unclassified))
            .collect();
        Report::from_tally(&tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use seatmap_core::{Category, Color};

    fn classified(outcome: Outcome) -> Region {
        let mut region = Region::with_color(BBox::new(0, 0, 10, 10), Color::BLACK);
        region.assign(outcome);
        region
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Aggregator::aggregate(&[]), Err(EmptyInputError));
    }

    #[test]
    fn test_counts_and_coverage() {
        let regions = vec![
            classified(Outcome::Matched(Category::Available)),
            classified(Outcome::Matched(Category::Available)),
            classified(Outcome::Matched(Category::Sold)),
            classified(Outcome::Ambiguous),
            Region::with_color(BBox::new(0, 0, 10, 10), Color::BLACK),
        ];
        let report = Aggregator::aggregate(&regions).unwrap();

        assert_eq!(report.available(), 2);
        assert_eq!(report.sold(), 1);
        assert_eq!(report.ambiguous(), 1);
        assert_eq!(report.unclassified(), 1);
        assert_eq!(report.total_detected(), 5);
        assert!((report.coverage() - 0.6).abs() < 1e-12);
    }
}
