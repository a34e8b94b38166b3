// 📏 Interval Arithmetic - Age ranges and calendar year math
// One small utility shared by the consistency checker, the birth-window
// estimator and the resolver.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest age any bound can express
pub const MIN_AGE: i32 = 0;

/// Open upper end used by divisions like "80-999"
pub const MAX_AGE: i32 = 999;

// ============================================================================
// AGE RANGE
// ============================================================================

/// Closed integer interval `[min, max]` of possible ages on one date.
///
/// Ages are signed so that backward projection and contradictory birth data
/// can be expressed without underflow; a negative range simply fails to
/// intersect with anything real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: i32,
    pub max: i32,
}

/// Two ranges failed to intersect.
///
/// `gap` is the number of years between the closer ends: adjacent ranges like
/// `[25, 25]` and `[26, 29]` have a gap of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disjoint {
    pub gap: i32,
}

impl Disjoint {
    /// Disagreement of exactly one year (birthday edge or data error)
    pub fn is_off_by_one(&self) -> bool {
        self.gap == 1
    }
}

impl AgeRange {
    pub fn new(min: i32, max: i32) -> Self {
        AgeRange { min, max }
    }

    pub fn exact(age: i32) -> Self {
        AgeRange { min: age, max: age }
    }

    /// The default bounds of an observation with no age information
    pub fn unbounded() -> Self {
        AgeRange {
            min: MIN_AGE,
            max: MAX_AGE,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    /// Whether `other` lies entirely inside this range
    pub fn contains(&self, other: &AgeRange) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Intersect two ranges, reporting the gap when they are disjoint
    pub fn narrow(&self, other: &AgeRange) -> Result<AgeRange, Disjoint> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Ok(AgeRange { min, max })
        } else {
            Err(Disjoint { gap: min - max })
        }
    }

    /// Bounds on the age at `to`, given these bounds at `from`.
    ///
    /// Forward in time the range moves up by the elapsed whole years and
    /// widens by one for a birthday that may fall in the remainder. Backward
    /// is the mirror image. Equal dates carry the range over unchanged.
    pub fn projected(&self, from: NaiveDate, to: NaiveDate) -> AgeRange {
        if from == to {
            return *self;
        }

        if from < to {
            let elapsed = whole_years_between(from, to);
            AgeRange {
                min: self.min.saturating_add(elapsed),
                max: open_end(self.max, |max| max.saturating_add(elapsed).saturating_add(1)),
            }
        } else {
            let elapsed = whole_years_between(to, from);
            AgeRange {
                min: self.min.saturating_sub(elapsed).saturating_sub(1).max(MIN_AGE),
                max: open_end(self.max, |max| max.saturating_sub(elapsed)),
            }
        }
    }

    /// Birth years compatible with these bounds on `date`
    pub fn birth_years_on(&self, date: NaiveDate) -> YearRange {
        let year = date.year();
        YearRange {
            min: year.saturating_sub(self.max).saturating_sub(1),
            max: year.saturating_sub(self.min),
        }
    }
}

/// Keep the open end of a division pinned at `MAX_AGE`
fn open_end(current: i32, project: impl FnOnce(i32) -> i32) -> i32 {
    if current >= MAX_AGE {
        MAX_AGE
    } else {
        project(current)
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ============================================================================
// YEAR RANGE
// ============================================================================

/// Closed interval of candidate birth years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn exact(year: i32) -> Self {
        YearRange {
            min: year,
            max: year,
        }
    }

    pub fn narrow(&self, other: &YearRange) -> Option<YearRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(YearRange { min, max })
    }

    /// The single year this range pins down, if any
    pub fn single(&self) -> Option<i32> {
        (self.min == self.max).then_some(self.min)
    }
}

// ============================================================================
// CALENDAR HELPERS
// ============================================================================

/// (month, day) key used for day-of-year ordering across different years
pub fn month_day(date: NaiveDate) -> (u32, u32) {
    (date.month(), date.day())
}

/// Whole years from `earlier` to `later`.
///
/// The year difference, minus one when `later`'s month/day has not yet
/// reached `earlier`'s. Negative when the dates are reversed.
pub fn whole_years_between(earlier: NaiveDate, later: NaiveDate) -> i32 {
    let mut years = later.year() - earlier.year();
    if month_day(later) < month_day(earlier) {
        years -= 1;
    }
    years
}

/// Exact age on `date` of someone born on `birth_date`
pub fn age_on(birth_date: NaiveDate, date: NaiveDate) -> i32 {
    whole_years_between(birth_date, date)
}

/// The given month/day placed in `year`.
///
/// February 29th falls back to the 28th in common years.
pub fn on_year(month_day: (u32, u32), year: i32) -> Option<NaiveDate> {
    let (month, day) = month_day;
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, day.saturating_sub(1)))
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

/// Parse an ISO-8601 calendar date, treating anything else as absent
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_narrow_overlapping() {
        let a = AgeRange::new(20, 25);
        let b = AgeRange::new(23, 30);
        assert_eq!(a.narrow(&b), Ok(AgeRange::new(23, 25)));
    }

    #[test]
    fn test_narrow_reports_gap() {
        let a = AgeRange::exact(25);
        assert_eq!(a.narrow(&AgeRange::new(26, 29)), Err(Disjoint { gap: 1 }));
        assert_eq!(a.narrow(&AgeRange::new(35, 39)), Err(Disjoint { gap: 10 }));
        assert_eq!(AgeRange::new(35, 39).narrow(&a), Err(Disjoint { gap: 10 }));
    }

    #[test]
    fn test_whole_years_between() {
        assert_eq!(whole_years_between(date("2020-05-01"), date("2021-05-01")), 1);
        assert_eq!(whole_years_between(date("2020-05-01"), date("2021-04-30")), 0);
        assert_eq!(whole_years_between(date("2020-05-01"), date("2020-12-31")), 0);
        assert_eq!(whole_years_between(date("2015-07-01"), date("2022-07-02")), 7);
    }

    #[test]
    fn test_age_on_birthday() {
        let birth = date("1990-06-15");
        assert_eq!(age_on(birth, date("2015-06-14")), 24);
        assert_eq!(age_on(birth, date("2015-06-15")), 25);
        assert_eq!(age_on(birth, date("2015-07-01")), 25);
    }

    #[test]
    fn test_projected_forward_widens_by_one() {
        let bounds = AgeRange::new(23, 24);
        let projected = bounds.projected(date("2021-03-01"), date("2022-04-01"));
        assert_eq!(projected, AgeRange::new(24, 26));
    }

    #[test]
    fn test_projected_backward() {
        let bounds = AgeRange::new(24, 25);
        let projected = bounds.projected(date("2022-04-01"), date("2021-03-01"));
        assert_eq!(projected, AgeRange::new(22, 24));
    }

    #[test]
    fn test_projected_same_date_is_unchanged() {
        let bounds = AgeRange::new(35, 39);
        let d = date("2016-07-01");
        assert_eq!(bounds.projected(d, d), bounds);
    }

    #[test]
    fn test_projected_keeps_open_end() {
        let bounds = AgeRange::new(80, MAX_AGE);
        let projected = bounds.projected(date("2010-01-01"), date("2015-01-01"));
        assert_eq!(projected, AgeRange::new(85, MAX_AGE));
    }

    #[test]
    fn test_projected_extreme_bounds_saturate() {
        let bounds = AgeRange::new(i32::MAX - 1, i32::MAX - 1);
        let projected = bounds.projected(date("2010-01-01"), date("2015-01-01"));
        assert_eq!(projected.min, i32::MAX);

        let bounds = AgeRange::new(i32::MIN + 1, 0);
        let projected = bounds.projected(date("2015-01-01"), date("2010-01-01"));
        assert_eq!(projected.min, MIN_AGE);
    }

    #[test]
    fn test_birth_years_on() {
        let years = AgeRange::new(23, 24).birth_years_on(date("2021-03-01"));
        assert_eq!(years, YearRange { min: 1996, max: 1998 });
    }

    #[test]
    fn test_on_year_leap_day_fallback() {
        assert_eq!(on_year((2, 29), 2021), Some(date("2021-02-28")));
        assert_eq!(on_year((2, 29), 2020), Some(date("2020-02-29")));
    }
}
