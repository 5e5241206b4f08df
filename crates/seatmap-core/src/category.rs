use crate::error::ParseCategoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Palette category. The first three are seat states, `Background` covers
/// non-seat chrome that happens to be solid-filled (legend boxes, badges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sold,
    Available,
    Bestseller,
    Background,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sold,
        Category::Available,
        Category::Bestseller,
        Category::Background,
    ];

    pub const SEAT_STATES: [Category; 3] =
        [Category::Sold, Category::Available, Category::Bestseller];

    pub fn is_seat_state(self) -> bool {
        !matches!(self, Category::Background)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sold => "sold",
            Category::Available => "available",
            Category::Bestseller => "bestseller",
            Category::Background => "background",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sold" | "filled" => Ok(Category::Sold),
            "available" => Ok(Category::Available),
            "bestseller" => Ok(Category::Bestseller),
            "background" => Ok(Category::Background),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Result of classifying one region against a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "category", rename_all = "lowercase")]
pub enum Outcome {
    Matched(Category),
    /// Outside every category's tolerance.
    Unclassified,
    /// Within tolerance of two categories at (numerically) equal distance.
    Ambiguous,
}

impl Outcome {
    pub fn category(self) -> Option<Category> {
        match self {
            Outcome::Matched(category) => Some(category),
            _ => None,
        }
    }

    pub fn is_matched(self) -> bool {
        matches!(self, Outcome::Matched(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched(category) => write!(f, "{}", category),
            Outcome::Unclassified => f.write_str("unclassified"),
            Outcome::Ambiguous => f.write_str("ambiguous"),
        }
    }
}
