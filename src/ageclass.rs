// 🏷️ Age Classes - Fixed "MIN-MAX" label table
// A single label-selection step shared by every resolution branch

use crate::interval::{AgeRange, MAX_AGE};
use serde::{Deserialize, Serialize};

/// Standard age classes, ordered and disjoint
pub const STANDARD_AGE_CLASSES: [&str; 16] = [
    "5-12", "13-15", "16-17", "18-19", "20-23", "24-34", "35-39", "40-44", "45-49", "50-54",
    "55-59", "60-64", "65-69", "70-74", "75-79", "80-999",
];

// ============================================================================
// AGE CLASS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeClass {
    /// Label as written to the entry table
    pub label: String,

    /// Ages covered by the class, inclusive
    pub range: AgeRange,
}

impl AgeClass {
    pub fn parse(label: &str) -> Option<AgeClass> {
        let range = parse_division(label)?;
        Some(AgeClass {
            label: label.trim().to_string(),
            range,
        })
    }
}

/// Parse a "MIN-MAX" division into an age range.
///
/// Federations sometimes publish fractional edges ("39.5"); the lower edge
/// rounds down and the upper edge rounds up so the range never shrinks.
/// The upper edge is capped at `MAX_AGE`.
pub fn parse_division(text: &str) -> Option<AgeRange> {
    let (min, max) = text.trim().split_once('-')?;
    let min: f64 = min.trim().parse().ok()?;
    let max: f64 = max.trim().parse().ok()?;
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return None;
    }
    if min > f64::from(MAX_AGE) {
        return None;
    }
    let max = max.ceil().min(f64::from(MAX_AGE));
    Some(AgeRange::new(min.floor() as i32, max as i32))
}

// ============================================================================
// AGE CLASS TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeClassTable {
    classes: Vec<AgeClass>,
}

impl AgeClassTable {
    pub fn standard() -> Self {
        AgeClassTable::from_labels(STANDARD_AGE_CLASSES)
    }

    /// Build a table from labels, skipping any that are not "MIN-MAX"
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes = labels
            .into_iter()
            .filter_map(|label| AgeClass::parse(label.as_ref()))
            .collect();
        AgeClassTable { classes }
    }

    /// The class fully containing `range`, or "" when none does
    pub fn label_for(&self, range: AgeRange) -> &str {
        self.classes
            .iter()
            .find(|class| class.range.contains(&range))
            .map(|class| class.label.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for AgeClassTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================
