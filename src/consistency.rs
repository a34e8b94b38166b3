// ⚖️ Consistency Checker - Can these observations be one person?
// Gates the rest of the pipeline: only consistent groups get resolved.
//
// Two checks from the age data itself:
//   (a) year progression: age never drops and never outruns the calendar
//       between any two observations
//   (b) birthday order: exact ages within a calendar year step up once
// plus identity-level agreement of birth dates/years and an age-gap limit.

use crate::birth_window::normalized_exact_ages;
use crate::interval::{age_on, AgeRange, Disjoint};
use chrono::Datelike;
use crate::observation::{EntryIndex, IdentityGroup, Observation};
use serde::{Deserialize, Serialize};

/// Default limit on the spacing of reported ages before a group is
/// considered to mix two people
pub const DEFAULT_MAX_AGE_GAP: u32 = 5;

// ============================================================================
// VERDICT
// ============================================================================

/// Why a group was not resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// Different birth dates recorded for the identity
    BirthDates,

    /// Birth years disagree (explicit, from birth dates, or implied by
    /// half-year ages)
    BirthYears,

    /// A single entry contradicts itself
    Observation { entry: EntryIndex },

    /// An entry's age cannot follow from the ages around it in time
    YearProgression { entry: EntryIndex },

    /// Exact ages go down within the calendar year
    BirthdayOrder { entry: EntryIndex },

    /// An exact age disagrees with the recorded birth date
    BirthDate { entry: EntryIndex },

    /// Reported ages are too far apart to belong to one person
    AgeGap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Consistent,

    /// The observations cannot describe one person
    Inconsistent(Conflict),

    /// The observations disagree by exactly one year; could be a birthday
    /// during a multi-day event or a data error
    Ambiguous(Conflict),
}

impl Verdict {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Verdict::Consistent)
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Verdict::Ambiguous(_))
    }

    /// Classify a failed intersection by how far apart the ranges were
    pub fn from_disjoint(conflict: Conflict, disjoint: Disjoint) -> Verdict {
        if disjoint.is_off_by_one() {
            Verdict::Ambiguous(conflict)
        } else {
            Verdict::Inconsistent(conflict)
        }
    }
}

// ============================================================================
// SIBLING BOUNDS
// ============================================================================

/// Check (a) forward in time.
///
/// Each output element is the observation's own bounds intersected with the
/// own bounds of every earlier observation, projected to its date. Bounds
/// are projected straight from the observation that supplied them, so entries
/// without any age data in between add no birthday widening.
pub(crate) fn forward_bounds(observations: &[Observation]) -> Result<Vec<AgeRange>, Verdict> {
    let own = own_bounds(observations)?;

    observations
        .iter()
        .enumerate()
        .map(|(i, obs)| implied_bounds(obs, own[i], observations[..i].iter().zip(&own[..i])))
        .collect()
}

/// Own bounds of each observation intersected with the bounds implied by
/// every sibling, earlier or later
pub(crate) fn sibling_bounds(observations: &[Observation]) -> Result<Vec<AgeRange>, Verdict> {
    let own = own_bounds(observations)?;

    observations
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let siblings = observations
                .iter()
                .zip(&own)
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, pair)| pair);
            implied_bounds(obs, own[i], siblings)
        })
        .collect()
}

fn own_bounds(observations: &[Observation]) -> Result<Vec<AgeRange>, Verdict> {
    observations
        .iter()
        .map(|obs| {
            obs.own_bounds().map_err(|d| {
                Verdict::from_disjoint(Conflict::Observation { entry: obs.entry }, d)
            })
        })
        .collect()
}

fn implied_bounds<'a, I>(obs: &Observation, own: AgeRange, mut others: I) -> Result<AgeRange, Verdict>
where
    I: Iterator<Item = (&'a Observation, &'a AgeRange)>,
{
    others.try_fold(own, |bounds, (other, other_own)| {
        other_own
            .projected(other.date, obs.date)
            .narrow(&bounds)
            .map_err(|d| {
                Verdict::from_disjoint(Conflict::YearProgression { entry: obs.entry }, d)
            })
    })
}

// ============================================================================
// CONSISTENCY CHECKER
// ============================================================================

pub struct ConsistencyChecker {
    /// Largest allowed spacing between sorted reported ages (default: 5).
    /// `None` disables the check.
    pub max_age_gap: Option<u32>,
}

impl ConsistencyChecker {
    pub fn new() -> Self {
        ConsistencyChecker {
            max_age_gap: Some(DEFAULT_MAX_AGE_GAP),
        }
    }

    pub fn with_max_age_gap(max_age_gap: Option<u32>) -> Self {
        ConsistencyChecker { max_age_gap }
    }

    pub fn is_consistent(&self, group: &IdentityGroup) -> bool {
        self.check(group).is_consistent()
    }

    /// Run every check; the first failure decides the verdict
    pub fn check(&self, group: &IdentityGroup) -> Verdict {
        let verdict = self.check_birth_fields(group);
        if !verdict.is_consistent() {
            return verdict;
        }

        let verdict = self.check_age_gap(group);
        if !verdict.is_consistent() {
            return verdict;
        }

        if let Err(verdict) = forward_bounds(group.observations()) {
            return verdict;
        }

        self.check_birthday_order(group)
    }

    /// Birth dates must all be equal, and every birth year (explicit,
    /// the year of a birth date, or implied by a half-year age) must agree
    fn check_birth_fields(&self, group: &IdentityGroup) -> Verdict {
        let observations = group.observations();

        if let Some(first) = group.birth_date() {
            if observations
                .iter()
                .filter_map(|o| o.birth_date)
                .any(|d| d != first)
            {
                return Verdict::Inconsistent(Conflict::BirthDates);
            }
        }

        let years: Vec<i32> = observations
            .iter()
            .flat_map(|o| {
                o.birth_year
                    .into_iter()
                    .chain(o.birth_date.map(|d| d.year()))
                    .chain(implied_birth_year(o))
            })
            .collect();

        if let (Some(min), Some(max)) = (years.iter().min(), years.iter().max()) {
            if min != max {
                return Verdict::from_disjoint(Conflict::BirthYears, Disjoint { gap: max - min });
            }
        }

        Verdict::Consistent
    }

    /// Sorted reported ages must not jump by more than `max_age_gap`
    fn check_age_gap(&self, group: &IdentityGroup) -> Verdict {
        let max_gap = match self.max_age_gap {
            Some(gap) => f64::from(gap),
            None => return Verdict::Consistent,
        };

        let mut ages: Vec<f64> = group
            .observations()
            .iter()
            .filter_map(|o| o.age.as_f64())
            .collect();
        ages.sort_by(|a, b| a.total_cmp(b));

        if ages.windows(2).any(|pair| pair[1] - pair[0] > max_gap) {
            return Verdict::Inconsistent(Conflict::AgeGap);
        }

        Verdict::Consistent
    }

    /// Check (b): exact ages against the birthday.
    ///
    /// With a recorded birth date every exact age must match it. Otherwise
    /// exact ages moved to one reference year and sorted by month/day must
    /// never decrease and span at most one birthday.
    fn check_birthday_order(&self, group: &IdentityGroup) -> Verdict {
        if let Some(birth_date) = group.birth_date() {
            for obs in group.observations() {
                if let Some(age) = obs.exact_age() {
                    if age_on(birth_date, obs.date) != age {
                        return Verdict::Inconsistent(Conflict::BirthDate { entry: obs.entry });
                    }
                }
            }
            return Verdict::Consistent;
        }

        let normalized = normalized_exact_ages(group.observations());
        let Some(first) = normalized.ages.first() else {
            return Verdict::Consistent;
        };

        for pair in normalized.ages.windows(2) {
            if pair[1].age < pair[0].age {
                return Verdict::Inconsistent(Conflict::BirthdayOrder {
                    entry: pair[1].entry,
                });
            }
        }

        if let Some(last) = normalized.ages.last() {
            if last.age - first.age > 1 {
                return Verdict::Inconsistent(Conflict::BirthdayOrder { entry: last.entry });
            }
        }

        Verdict::Consistent
    }
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// A half-year age "n.5" on date d means the birth year is d.year - n - 1
pub(crate) fn implied_birth_year(obs: &Observation) -> Option<i32> {
    match obs.age {
        crate::age::Age::Approximate(n) => Some(obs.year() - n as i32 - 1),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::Age;
    use crate::interval::parse_date;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn age_obs(entry: usize, age: Age, on: &str) -> Observation {
        Observation::new(entry, "lifter", &format!("m{}", entry), date(on)).with_age(age)
    }

    fn division_obs(entry: usize, min: i32, max: i32, on: &str) -> Observation {
        Observation::new(entry, "lifter", &format!("m{}", entry), date(on))
            .with_bounds(AgeRange::new(min, max))
    }

    fn group(observations: Vec<Observation>) -> IdentityGroup {
        IdentityGroup::new("lifter", observations)
    }

    #[test]
    fn test_decreasing_ages_rejected() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Exact(30), "2020-05-01"),
            age_obs(1, Age::Exact(28), "2021-05-01"),
        ]);

        assert_eq!(
            checker.check(&g),
            Verdict::Inconsistent(Conflict::YearProgression { entry: 1 })
        );
        assert!(!checker.is_consistent(&g));
    }

    #[test]
    fn test_half_ages_one_year_apart_consistent() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Approximate(23), "2021-03-01"),
            age_obs(1, Age::Approximate(24), "2022-04-01"),
        ]);

        assert!(checker.is_consistent(&g));
    }

    #[test]
    fn test_age_outrunning_calendar_rejected() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Exact(25), "2015-07-01"),
            age_obs(1, Age::Exact(29), "2016-07-01"),
        ]);

        assert_eq!(
            checker.check(&g),
            Verdict::Inconsistent(Conflict::YearProgression { entry: 1 })
        );
    }

    #[test]
    fn test_off_by_one_is_ambiguous() {
        let checker = ConsistencyChecker::new();
        // Same age a full year later: birthday edge or typo
        let g = group(vec![
            age_obs(0, Age::Exact(30), "2020-05-01"),
            age_obs(1, Age::Exact(30), "2021-05-01"),
        ]);

        let verdict = checker.check(&g);
        assert!(verdict.is_ambiguous());
        assert!(!verdict.is_consistent());
    }

    #[test]
    fn test_birth_date_against_division() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            Observation::new(0, "lifter", "m0", date("2015-07-01"))
                .with_birth_date(date("1990-06-15")),
            division_obs(1, 35, 39, "2016-07-01"),
        ]);

        assert_eq!(
            checker.check(&g),
            Verdict::Inconsistent(Conflict::YearProgression { entry: 1 })
        );
    }

    #[test]
    fn test_same_date_divisions_intersect() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            division_obs(0, 35, 39, "2016-07-01"),
            division_obs(1, 38, 44, "2016-07-01"),
        ]);
        assert!(checker.is_consistent(&g));

        // Disjoint divisions on the same day are not widened by a birthday
        let g = group(vec![
            division_obs(0, 35, 39, "2016-07-01"),
            division_obs(1, 45, 49, "2016-07-01"),
        ]);
        assert!(!checker.is_consistent(&g));
    }

    #[test]
    fn test_conflicting_birth_dates() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            Observation::new(0, "lifter", "m0", date("2015-07-01"))
                .with_birth_date(date("1990-06-15")),
            Observation::new(1, "lifter", "m1", date("2016-07-01"))
                .with_birth_date(date("1990-06-16")),
        ]);

        assert_eq!(checker.check(&g), Verdict::Inconsistent(Conflict::BirthDates));
    }

    #[test]
    fn test_half_age_birth_year_mismatch() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Approximate(23), "2021-03-01").with_birth_year(1990),
            age_obs(1, Age::Exact(24), "2022-04-01"),
        ]);

        assert_eq!(checker.check(&g), Verdict::Inconsistent(Conflict::BirthYears));
    }

    #[test]
    fn test_exact_age_against_birth_date() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            Observation::new(0, "lifter", "m0", date("2015-07-01"))
                .with_birth_date(date("1990-06-15")),
            age_obs(1, Age::Exact(26), "2016-03-01"),
        ]);

        // 26 is reachable by year progression but not from the birth date
        assert_eq!(
            checker.check(&g),
            Verdict::Inconsistent(Conflict::BirthDate { entry: 1 })
        );
    }

    #[test]
    fn test_birthday_order_detects_decrease() {
        let checker = ConsistencyChecker::new();
        // 31 in March, then 30 in September of the same year
        let g = group(vec![
            age_obs(0, Age::Exact(31), "2010-03-01"),
            age_obs(1, Age::Exact(30), "2010-09-01"),
        ]);

        assert_eq!(
            checker.check_birthday_order(&g),
            Verdict::Inconsistent(Conflict::BirthdayOrder { entry: 1 })
        );
    }

    #[test]
    fn test_birthday_order_detects_two_birthdays() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Exact(30), "2010-03-01"),
            age_obs(1, Age::Exact(34), "2012-09-01"),
        ]);

        assert_eq!(
            checker.check_birthday_order(&g),
            Verdict::Inconsistent(Conflict::BirthdayOrder { entry: 1 })
        );
    }

    #[test]
    fn test_birthday_order_accepts_single_step() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            age_obs(0, Age::Exact(30), "2010-03-01"),
            age_obs(1, Age::Exact(31), "2010-09-01"),
            age_obs(2, Age::Exact(32), "2012-02-01"),
        ]);

        assert!(checker.is_consistent(&g));
    }

    #[test]
    fn test_age_gap_limit() {
        let g = group(vec![
            age_obs(0, Age::Exact(20), "2010-03-01"),
            age_obs(1, Age::Exact(27), "2017-03-01"),
        ]);

        assert_eq!(
            ConsistencyChecker::new().check(&g),
            Verdict::Inconsistent(Conflict::AgeGap)
        );
        assert!(ConsistencyChecker::with_max_age_gap(None).is_consistent(&g));
        assert!(ConsistencyChecker::with_max_age_gap(Some(8)).is_consistent(&g));
    }

    #[test]
    fn test_birth_year_against_birth_date_year() {
        let checker = ConsistencyChecker::new();
        let g = group(vec![
            Observation::new(0, "lifter", "m0", date("2015-07-01"))
                .with_birth_date(date("1990-06-15"))
                .with_birth_year(1989),
            Observation::new(1, "lifter", "m1", date("2016-07-01")),
        ]);

        let verdict = checker.check(&g);
        assert_eq!(verdict, Verdict::Ambiguous(Conflict::BirthYears));
        assert!(!verdict.is_consistent());

        let g = group(vec![
            Observation::new(0, "lifter", "m0", date("2015-07-01"))
                .with_birth_date(date("1990-06-15"))
                .with_birth_year(1985),
        ]);
        assert_eq!(checker.check(&g), Verdict::Inconsistent(Conflict::BirthYears));
    }

    #[test]
    fn test_blank_entry_adds_no_widening() {
        let direct = vec![
            division_obs(0, 35, 39, "2015-07-01"),
            division_obs(2, 40, 44, "2016-06-01"),
        ];
        let with_blank = vec![
            division_obs(0, 35, 39, "2015-07-01"),
            division_obs(1, 0, 999, "2015-12-01"),
            division_obs(2, 40, 44, "2016-06-01"),
        ];

        let direct = sibling_bounds(&direct).unwrap();
        let with_blank = sibling_bounds(&with_blank).unwrap();

        assert_eq!(direct, vec![AgeRange::exact(39), AgeRange::exact(40)]);
        assert_eq!(with_blank[0], AgeRange::exact(39));
        assert_eq!(with_blank[1], AgeRange::new(39, 40));
        assert_eq!(with_blank[2], AgeRange::exact(40));
    }

    #[test]
    fn test_blank_entries_keep_two_year_gap_inconsistent() {
        let checker = ConsistencyChecker::new();
        // 30, then 34 one year later: at least two years too old, however
        // many blanks sit in between
        let g = group(vec![
            age_obs(0, Age::Exact(30), "2020-05-01"),
            division_obs(1, 0, 999, "2020-09-01"),
            division_obs(2, 0, 999, "2021-01-01"),
            age_obs(3, Age::Exact(34), "2021-05-01"),
        ]);

        assert_eq!(
            checker.check(&g),
            Verdict::Inconsistent(Conflict::YearProgression { entry: 3 })
        );
    }

    #[test]
    fn test_huge_division_does_not_overflow() {
        let observations = vec![
            division_obs(0, i32::MAX - 1, i32::MAX - 1, "2015-07-01"),
            division_obs(1, 0, 999, "2016-07-01"),
        ];

        assert_eq!(
            forward_bounds(&observations),
            Err(Verdict::Inconsistent(Conflict::YearProgression { entry: 1 }))
        );
    }

    #[test]
    fn test_sibling_bounds_both_directions() {
        let observations = vec![
            division_obs(0, 0, 999, "2015-07-01"),
            age_obs(1, Age::Exact(30), "2017-07-01"),
            division_obs(2, 0, 999, "2019-07-01"),
        ];

        let bounds = sibling_bounds(&observations).unwrap();

        assert_eq!(bounds[0], AgeRange::new(27, 28));
        assert_eq!(bounds[1], AgeRange::exact(30));
        assert_eq!(bounds[2], AgeRange::new(32, 33));
    }
}
