// Age Interpolation - Core Library
// Fills in missing or imprecise competitor ages from their other appearances

pub mod age;
pub mod ageclass;
pub mod birth_window;
pub mod config;
pub mod consistency;
pub mod country;
pub mod engine;
pub mod interval;
pub mod observation;
pub mod resolver;
pub mod table;
pub mod writer;

// Re-export commonly used types
pub use age::Age;
pub use ageclass::{parse_division, AgeClass, AgeClassTable, STANDARD_AGE_CLASSES};
pub use birth_window::{BirthWindow, BirthWindowEstimator, DEFAULT_MEET_LENGTH_SLACK_DAYS};
pub use config::InterpolationConfig;
pub use consistency::{Conflict, ConsistencyChecker, Verdict, DEFAULT_MAX_AGE_GAP};
pub use country::{consistent_country, interpolate_countries};
pub use engine::{GroupOutcome, InterpolationEngine, InterpolationReport};
pub use interval::{age_on, whole_years_between, AgeRange, Disjoint, YearRange};
pub use observation::{
    group_entries, group_observations, EntryIndex, EventCalendar, IdentityGroup, Observation,
};
pub use resolver::{AgeResolver, Resolution};
pub use table::{load_entries, load_events, save_entries, EntryRow, EventRow};
pub use writer::write_resolutions;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
