// 👁️ Observations - What one appearance says about a competitor's age
// Plus the event calendar and identity grouping that feed the engine.

use crate::age::Age;
use crate::ageclass::parse_division;
use crate::interval::{age_on, parse_date, AgeRange, Disjoint};
use crate::table::{EntryRow, EventRow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Position of an entry in the entry table
pub type EntryIndex = usize;

// ============================================================================
// EVENT CALENDAR
// ============================================================================

/// Maps event identifiers to their calendar date. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct EventCalendar {
    dates: HashMap<String, NaiveDate>,
}

impl EventCalendar {
    pub fn new() -> Self {
        EventCalendar {
            dates: HashMap::new(),
        }
    }

    /// Build from event rows; rows with an unparseable date are left out
    pub fn from_rows(rows: &[EventRow]) -> Self {
        let mut calendar = EventCalendar::new();
        for row in rows {
            if let Some(date) = parse_date(&row.date) {
                calendar.insert(row.event_id.clone(), date);
            }
        }
        calendar
    }

    pub fn insert(&mut self, event_id: impl Into<String>, date: NaiveDate) {
        self.dates.insert(event_id.into(), date);
    }

    pub fn date_of(&self, event_id: &str) -> Option<NaiveDate> {
        self.dates.get(event_id).copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ============================================================================
// OBSERVATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Entry the observation was extracted from
    pub entry: EntryIndex,

    pub identity_id: String,
    pub event_id: String,

    /// Date of the event, from the calendar
    pub date: NaiveDate,

    /// Reported age, if any
    pub age: Age,

    /// Bounds from the reported age, or from the division when no age was
    /// reported. `[0, 999]` when neither is known.
    pub bounds: AgeRange,

    pub birth_year: Option<i32>,
    pub birth_date: Option<NaiveDate>,
}

impl Observation {
    pub fn new(entry: EntryIndex, identity_id: &str, event_id: &str, date: NaiveDate) -> Self {
        Observation {
            entry,
            identity_id: identity_id.to_string(),
            event_id: event_id.to_string(),
            date,
            age: Age::None,
            bounds: AgeRange::unbounded(),
            birth_year: None,
            birth_date: None,
        }
    }

    /// Extract an observation from an entry row.
    ///
    /// Returns `None` when the row's event has no date in the calendar.
    /// Unparseable fields are treated as absent.
    pub fn from_entry(
        entry: EntryIndex,
        row: &EntryRow,
        calendar: &EventCalendar,
    ) -> Option<Observation> {
        let date = calendar.date_of(&row.event_id)?;
        let mut observation = Observation::new(entry, &row.identity_id, &row.event_id, date);

        observation.age = Age::parse(&row.age);
        observation.bounds = match observation.age.range() {
            Some(range) => range,
            None => parse_division(&row.age_class).unwrap_or_default(),
        };

        observation.birth_date = parse_date(&row.birth_date);
        observation.birth_year = parse_birth_year(&row.birth_year)
            .or_else(|| observation.birth_date.map(|d| d.year()));

        Some(observation)
    }

    pub fn with_age(mut self, age: Age) -> Self {
        self.age = age;
        if let Some(range) = age.range() {
            self.bounds = range;
        }
        self
    }

    pub fn with_bounds(mut self, bounds: AgeRange) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self.birth_year = Some(birth_date.year());
        self
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Exact reported age, if the reported age is exact
    pub fn exact_age(&self) -> Option<i32> {
        match self.age {
            Age::Exact(n) => Some(n as i32),
            _ => None,
        }
    }

    /// Everything this single observation says about the age on its date:
    /// reported age or division, birth year and birth date, intersected.
    pub fn own_bounds(&self) -> Result<AgeRange, Disjoint> {
        let mut bounds = self.bounds;

        if let Some(range) = self.age.range() {
            bounds = bounds.narrow(&range)?;
        }

        if let Some(birth_year) = self.birth_year {
            let turning = self.year() - birth_year;
            bounds = bounds.narrow(&AgeRange::new(turning - 1, turning))?;
        }

        if let Some(birth_date) = self.birth_date {
            bounds = bounds.narrow(&AgeRange::exact(age_on(birth_date, self.date)))?;
        }

        Ok(bounds)
    }
}

fn parse_birth_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.len() != 4 {
        return None;
    }
    text.parse().ok()
}

// ============================================================================
// IDENTITY GROUP
// ============================================================================

/// All observations of one identity, ordered by event date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityGroup {
    pub identity_id: String,
    observations: Vec<Observation>,
}

impl IdentityGroup {
    pub fn new(identity_id: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| a.date.cmp(&b.date).then(a.entry.cmp(&b.entry)));
        IdentityGroup {
            identity_id: identity_id.into(),
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// First explicit birth date recorded for the identity
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.observations.iter().find_map(|o| o.birth_date)
    }

    /// First explicit birth year recorded for the identity
    pub fn birth_year(&self) -> Option<i32> {
        self.observations.iter().find_map(|o| o.birth_year)
    }
}

/// Extract observations from entry rows and group them by identity.
///
/// Groups come out ordered by identity id so batch runs are reproducible.
pub fn group_entries(entries: &[EntryRow], calendar: &EventCalendar) -> Vec<IdentityGroup> {
    let observations = entries
        .iter()
        .enumerate()
        .filter_map(|(index, row)| Observation::from_entry(index, row, calendar));
    group_observations(observations)
}

pub fn group_observations<I>(observations: I) -> Vec<IdentityGroup>
where
    I: IntoIterator<Item = Observation>,
{
    let mut by_identity: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for observation in observations {
        by_identity
            .entry(observation.identity_id.clone())
            .or_default()
            .push(observation);
    }

    by_identity
        .into_iter()
        .map(|(identity_id, observations)| IdentityGroup::new(identity_id, observations))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
