// 📄 Tables - Entry and event rows as loaded by the hosting pipeline
// CSV in, CSV out; the engine only ever touches the rows in memory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One competitor appearance in the entry table.
///
/// Fields keep their textual conventions so rows round-trip unchanged
/// unless the engine overwrites them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    #[serde(rename = "IdentityID")]
    pub identity_id: String,

    #[serde(rename = "EventID")]
    pub event_id: String,

    /// "", "n" or "n.5"
    #[serde(rename = "Age", default)]
    pub age: String,

    /// "MIN-MAX" or ""
    #[serde(rename = "AgeClass", default)]
    pub age_class: String,

    /// Four digits or ""
    #[serde(rename = "BirthYear", default)]
    pub birth_year: String,

    /// ISO-8601 or ""
    #[serde(rename = "BirthDate", default)]
    pub birth_date: String,

    #[serde(rename = "Country", default)]
    pub country: String,
}

impl EntryRow {
    pub fn new(identity_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        EntryRow {
            identity_id: identity_id.into(),
            event_id: event_id.into(),
            ..EntryRow::default()
        }
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    pub fn with_age_class(mut self, age_class: impl Into<String>) -> Self {
        self.age_class = age_class.into();
        self
    }

    pub fn with_birth_year(mut self, birth_year: impl Into<String>) -> Self {
        self.birth_year = birth_year.into();
        self
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = birth_date.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }
}

/// One dated event in the event table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(rename = "EventID")]
    pub event_id: String,

    /// ISO-8601
    #[serde(rename = "Date")]
    pub date: String,
}

impl EventRow {
    pub fn new(event_id: impl Into<String>, date: impl Into<String>) -> Self {
        EventRow {
            event_id: event_id.into(),
            date: date.into(),
        }
    }
}

// ============================================================================
// CSV LOADING / SAVING
// ============================================================================

pub fn load_entries(csv_path: &Path) -> Result<Vec<EntryRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open entries CSV: {:?}", csv_path))?;

    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let entry: EntryRow = result.context("Failed to deserialize entry")?;
        entries.push(entry);
    }

    Ok(entries)
}

pub fn load_events(csv_path: &Path) -> Result<Vec<EventRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open events CSV: {:?}", csv_path))?;

    let mut events = Vec::new();
    for result in rdr.deserialize() {
        let event: EventRow = result.context("Failed to deserialize event")?;
        events.push(event);
    }

    Ok(events)
}

pub fn save_entries(csv_path: &Path, entries: &[EntryRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create entries CSV: {:?}", csv_path))?;

    for entry in entries {
        wtr.serialize(entry).context("Failed to serialize entry")?;
    }
    wtr.flush().context("Failed to flush entries CSV")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
