// 📅 Birth-Window Estimator - Bracket the birth date from a birthday crossing
// Two exact ages one year apart, seen on either side of the birthday in the
// calendar year, pin the birthday between their month/days.

use crate::interval::{add_days, age_on, month_day, on_year, AgeRange};
use crate::observation::{EntryIndex, IdentityGroup, Observation};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default tolerance for multi-day events: a competitor whose birthday falls
/// during the event may be recorded with either age
pub const DEFAULT_MEET_LENGTH_SLACK_DAYS: i64 = 12;

// ============================================================================
// BIRTH WINDOW
// ============================================================================

/// Tightest known bracket on a birth date, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl BirthWindow {
    pub fn new(earliest: NaiveDate, latest: NaiveDate) -> Self {
        BirthWindow { earliest, latest }
    }

    /// Zero-width window from a recorded birth date
    pub fn exact(birth_date: NaiveDate) -> Self {
        BirthWindow {
            earliest: birth_date,
            latest: birth_date,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.earliest == self.latest
    }

    /// Ages on `date` implied by the two ends of the window.
    ///
    /// A later birth means a younger competitor, so `latest` gives the
    /// lower bound.
    pub fn age_on(&self, date: NaiveDate) -> AgeRange {
        AgeRange::new(age_on(self.latest, date), age_on(self.earliest, date))
    }

    pub fn birth_year(&self) -> Option<i32> {
        (self.earliest.year() == self.latest.year()).then_some(self.earliest.year())
    }
}

// ============================================================================
// NORMALIZED AGES
// ============================================================================

/// An exact age moved to a common reference year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizedAge {
    pub age: i32,
    pub month_day: (u32, u32),
    pub entry: EntryIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedAges {
    pub reference_year: i32,

    /// Sorted by month/day, then by event date
    pub ages: Vec<NormalizedAge>,
}

/// Exact reported ages as of the year of the earliest one, ordered by
/// month/day. In a consistent group the ages are then non-decreasing and
/// step up by one at the birthday.
pub(crate) fn normalized_exact_ages(observations: &[Observation]) -> NormalizedAges {
    let exact: Vec<(&Observation, i32)> = observations
        .iter()
        .filter_map(|o| o.exact_age().map(|age| (o, age)))
        .collect();

    let reference_year = exact
        .iter()
        .map(|(o, _)| o.year())
        .min()
        .unwrap_or_default();

    let mut keyed: Vec<(NaiveDate, NormalizedAge)> = exact
        .iter()
        .map(|(o, age)| {
            let normalized = NormalizedAge {
                age: age - (o.year() - reference_year),
                month_day: month_day(o.date),
                entry: o.entry,
            };
            (o.date, normalized)
        })
        .collect();
    keyed.sort_by(|(da, a), (db, b)| a.month_day.cmp(&b.month_day).then(da.cmp(db)));

    NormalizedAges {
        reference_year,
        ages: keyed.into_iter().map(|(_, n)| n).collect(),
    }
}

// ============================================================================
// ESTIMATOR
// ============================================================================

pub struct BirthWindowEstimator {
    /// Days added past the first higher-age observation (default: 12)
    pub meet_length_slack_days: i64,
}

impl BirthWindowEstimator {
    pub fn new() -> Self {
        BirthWindowEstimator {
            meet_length_slack_days: DEFAULT_MEET_LENGTH_SLACK_DAYS,
        }
    }

    pub fn with_slack(meet_length_slack_days: i64) -> Self {
        BirthWindowEstimator {
            meet_length_slack_days,
        }
    }

    /// Estimate the birth window of a consistent group.
    ///
    /// A recorded birth date wins outright. Otherwise the window runs from
    /// the last lower-age month/day to the first higher-age month/day (plus
    /// slack) in the inferred birth year. `None` if no pair brackets the
    /// birthday.
    pub fn estimate(&self, group: &IdentityGroup) -> Option<BirthWindow> {
        if let Some(birth_date) = group.birth_date() {
            return Some(BirthWindow::exact(birth_date));
        }

        let normalized = normalized_exact_ages(group.observations());
        if normalized.ages.len() < 2 {
            return None;
        }

        let first = normalized.ages[0];
        let lower_age = first.age;
        let mut lower_month_day = first.month_day;
        let mut upper_month_day = None;

        for age in &normalized.ages[1..] {
            if age.age == lower_age {
                lower_month_day = age.month_day;
            } else if age.age == lower_age + 1 {
                upper_month_day = Some(age.month_day);
                break;
            }
        }

        let upper_month_day = upper_month_day?;
        let birth_year = normalized.reference_year - lower_age - 1;

        let earliest = on_year(lower_month_day, birth_year)?;
        let latest = add_days(
            on_year(upper_month_day, birth_year)?,
            self.meet_length_slack_days,
        );

        Some(BirthWindow { earliest, latest })
    }
}

impl Default for BirthWindowEstimator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
