// 🎂 Age - The textual age field of an entry
// "" (absent), "n" (exact) or "n.5" (one of n and n+1)

use crate::interval::{AgeRange, MAX_AGE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reported age of a competitor at one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Age {
    /// The exact age.
    Exact(u32),

    /// Either one of two adjacent ages, stored as the lower of the pair.
    ///
    /// Written as "n.5". Comes from a known birth year where it is not known
    /// whether the birthday had passed yet.
    Approximate(u32),

    /// No age recorded.
    #[default]
    None,
}

impl Age {
    /// Parse the textual field. Anything unparseable or above `MAX_AGE` is
    /// `Age::None`.
    pub fn parse(text: &str) -> Age {
        let text = text.trim();
        if text.is_empty() {
            return Age::None;
        }

        let value: f64 = match text.parse() {
            Ok(v) => v,
            Err(_) => return Age::None,
        };
        if !value.is_finite() || value < 0.0 || value > f64::from(MAX_AGE) {
            return Age::None;
        }

        let whole = value.floor();
        let fraction = value - whole;
        if fraction == 0.0 {
            Age::Exact(whole as u32)
        } else if (fraction - 0.5).abs() < 1e-9 {
            Age::Approximate(whole as u32)
        } else {
            Age::None
        }
    }

    /// The tightest age precision a range can be written with.
    ///
    /// Ranges wider than two adjacent ages have no textual form.
    pub fn from_range(range: AgeRange) -> Age {
        if range.min < 0 {
            return Age::None;
        }
        if range.is_exact() {
            Age::Exact(range.min as u32)
        } else if range.max == range.min + 1 {
            Age::Approximate(range.min as u32)
        } else {
            Age::None
        }
    }

    /// The set of integer ages this value stands for
    pub fn range(self) -> Option<AgeRange> {
        match self {
            Age::Exact(n) => Some(AgeRange::exact(n as i32)),
            Age::Approximate(n) => Some(AgeRange::new(n as i32, n as i32 + 1)),
            Age::None => None,
        }
    }

    /// Numeric value with approximate ages at the half year
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Age::Exact(n) => Some(f64::from(n)),
            Age::Approximate(n) => Some(f64::from(n) + 0.5),
            Age::None => None,
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Exact(n) => write!(f, "{}", n),
            Age::Approximate(n) => write!(f, "{}.5", n),
            Age::None => Ok(()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
