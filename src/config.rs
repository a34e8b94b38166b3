// ⚙️ Interpolation Config - Named, overridable knobs
// Loaded from JSON; every field falls back to its default when absent.

use crate::ageclass::{AgeClassTable, STANDARD_AGE_CLASSES};
use crate::birth_window::DEFAULT_MEET_LENGTH_SLACK_DAYS;
use crate::consistency::DEFAULT_MAX_AGE_GAP;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Days of tolerance past a birthday crossing for multi-day events
    pub meet_length_slack_days: i64,

    /// Largest allowed spacing between sorted reported ages; `null` disables
    pub max_age_gap: Option<u32>,

    /// Age-class labels as "MIN-MAX"
    pub age_classes: Vec<String>,

    /// Also fill missing countries from an identity's other entries
    pub infer_countries: bool,
}

impl InterpolationConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        InterpolationConfig::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }

    pub fn age_class_table(&self) -> AgeClassTable {
        AgeClassTable::from_labels(&self.age_classes)
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        InterpolationConfig {
            meet_length_slack_days: DEFAULT_MEET_LENGTH_SLACK_DAYS,
            max_age_gap: Some(DEFAULT_MAX_AGE_GAP),
            age_classes: STANDARD_AGE_CLASSES.iter().map(|s| s.to_string()).collect(),
            infer_countries: true,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = InterpolationConfig::from_json("{}").unwrap();

        assert_eq!(config, InterpolationConfig::default());
        assert_eq!(config.meet_length_slack_days, 12);
        assert_eq!(config.max_age_gap, Some(5));
        assert_eq!(config.age_class_table().len(), 16);
    }

    #[test]
    fn test_partial_override() {
        let config = InterpolationConfig::from_json(
            r#"{"max_age_gap": null, "age_classes": ["0-17", "18-999"], "infer_countries": false}"#,
        )
        .unwrap();

        assert_eq!(config.max_age_gap, None);
        assert_eq!(config.meet_length_slack_days, 12);
        assert!(!config.infer_countries);
        assert_eq!(config.age_class_table().len(), 2);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"meet_length_slack_days": 3}"#).unwrap();

        let config = InterpolationConfig::from_file(&path).unwrap();

        assert_eq!(config.meet_length_slack_days, 3);
    }

    #[test]
    fn test_bad_json_fails_with_context() {
        let err = InterpolationConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));

        let err = InterpolationConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
