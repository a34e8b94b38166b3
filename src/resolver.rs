// 🎯 Age/Class Resolver - Best-known age for every appearance
// Precision order: birth date > estimated birth window > birth year >
// division bounds tightened by siblings. Every branch ends in the same
// interval and the same label lookup.

use crate::age::Age;
use crate::ageclass::AgeClassTable;
use crate::birth_window::BirthWindow;
use crate::consistency::{implied_birth_year, sibling_bounds, Conflict, Verdict};
use crate::interval::{add_days, month_day, on_year, AgeRange, Disjoint, YearRange};
use crate::observation::{EntryIndex, IdentityGroup, Observation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolved age fields for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Entry to overwrite
    pub entry: EntryIndex,

    pub identity_id: String,
    pub event_id: String,

    /// Exact, half-year, or none when the bounds are wider than two ages
    pub age: Age,

    pub min_age: i32,
    pub max_age: i32,

    /// Label from the age-class table, "" when no class contains the bounds
    pub age_class: String,

    /// Birth year pinned for the whole identity, if any
    pub birth_year: Option<i32>,
}

impl Resolution {
    pub fn range(&self) -> AgeRange {
        AgeRange::new(self.min_age, self.max_age)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct AgeResolver {
    pub age_classes: AgeClassTable,
}

impl AgeResolver {
    pub fn new() -> Self {
        AgeResolver {
            age_classes: AgeClassTable::standard(),
        }
    }

    pub fn with_age_classes(age_classes: AgeClassTable) -> Self {
        AgeResolver { age_classes }
    }

    /// Resolve every observation of a consistent group.
    ///
    /// `window` comes from the birth-window estimator. Without one, a window
    /// covering the birth year is used when the group pins that year down.
    /// Sibling bounds always tighten the result; a contradiction between the
    /// two is reported as a verdict instead of a resolution.
    pub fn resolve(
        &self,
        group: &IdentityGroup,
        window: Option<&BirthWindow>,
    ) -> Result<Vec<Resolution>, Verdict> {
        let observations = group.observations();
        let siblings = sibling_bounds(observations)?;

        let window = match window {
            Some(window) => Some(*window),
            None => birth_year_window(group, &siblings)?,
        };
        let birth_year = window
            .and_then(|w| w.birth_year())
            .or_else(|| group.birth_year());

        observations
            .iter()
            .zip(&siblings)
            .map(|(obs, bounds)| {
                let range = match window {
                    Some(window) => window.age_on(obs.date).narrow(bounds).map_err(|d| {
                        Verdict::from_disjoint(Conflict::YearProgression { entry: obs.entry }, d)
                    })?,
                    None => *bounds,
                };
                Ok(self.resolution(obs, range, birth_year))
            })
            .collect()
    }

    /// Shared final step: textual age and class label from the interval
    fn resolution(
        &self,
        obs: &Observation,
        range: AgeRange,
        birth_year: Option<i32>,
    ) -> Resolution {
        let age = match Age::from_range(range) {
            Age::None => match obs.age.range() {
                Some(reported) if range.contains(&reported) => obs.age,
                _ => Age::None,
            },
            age => age,
        };

        Resolution {
            entry: obs.entry,
            identity_id: obs.identity_id.clone(),
            event_id: obs.event_id.clone(),
            age,
            min_age: range.min,
            max_age: range.max,
            age_class: self.age_classes.label_for(range).to_string(),
            birth_year,
        }
    }
}

impl Default for AgeResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BIRTH YEAR
// ============================================================================

/// Birth year pinned by the group, if exactly one year fits.
///
/// Sources: a recorded birth year, half-year ages, and the birth years each
/// observation's sibling bounds allow.
pub(crate) fn pinned_birth_year(
    group: &IdentityGroup,
    siblings: &[AgeRange],
) -> Result<Option<i32>, Verdict> {
    let observations = group.observations();

    let recorded = group
        .birth_year()
        .into_iter()
        .chain(observations.iter().filter_map(implied_birth_year))
        .map(YearRange::exact);

    let from_bounds = observations
        .iter()
        .zip(siblings)
        .map(|(obs, bounds)| bounds.birth_years_on(obs.date));

    let mut years: Option<YearRange> = None;
    for candidate in recorded.chain(from_bounds) {
        years = match years {
            None => Some(candidate),
            Some(current) => match current.narrow(&candidate) {
                Some(narrowed) => Some(narrowed),
                None => {
                    let gap = (candidate.min - current.max).max(current.min - candidate.max);
                    return Err(Verdict::from_disjoint(Conflict::BirthYears, Disjoint { gap }));
                }
            },
        };
    }

    Ok(years.and_then(|y| y.single()))
}

/// Window over a pinned birth year, narrowed by every exact age.
///
/// An exact age equal to (event year - birth year) means the birthday had
/// passed by that month/day; one less means it had not.
fn birth_year_window(
    group: &IdentityGroup,
    siblings: &[AgeRange],
) -> Result<Option<BirthWindow>, Verdict> {
    let Some(birth_year) = pinned_birth_year(group, siblings)? else {
        return Ok(None);
    };

    let (Some(mut earliest), Some(mut latest)) = (
        NaiveDate::from_ymd_opt(birth_year, 1, 1),
        NaiveDate::from_ymd_opt(birth_year, 12, 31),
    ) else {
        return Ok(None);
    };

    for (obs, bounds) in group.observations().iter().zip(siblings) {
        if !bounds.is_exact() {
            continue;
        }
        let Some(same_day) = on_year(month_day(obs.date), birth_year) else {
            continue;
        };

        let turning = obs.year() - birth_year;
        if bounds.min == turning {
            latest = latest.min(same_day);
        } else if bounds.min == turning - 1 {
            earliest = earliest.max(add_days(same_day, 1));
        } else {
            let gap = (bounds.min - turning).max(turning - 1 - bounds.min);
            return Err(Verdict::from_disjoint(Conflict::BirthYears, Disjoint { gap }));
        }

        if earliest > latest {
            return Err(Verdict::Ambiguous(Conflict::BirthdayOrder { entry: obs.entry }));
        }
    }

    Ok(Some(BirthWindow::new(earliest, latest)))
}

// ============================================================================
// TESTS
// ============================================================================
