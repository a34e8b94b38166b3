// 🧮 Interpolation Engine - Check, estimate, resolve, write
// Runs the whole batch: groups the entry table by identity, resolves every
// consistent group (in parallel when the `parallel` feature is on) and writes
// the results back serially.

use crate::birth_window::BirthWindowEstimator;
use crate::config::InterpolationConfig;
use crate::consistency::{ConsistencyChecker, Verdict};
use crate::country::interpolate_countries;
use crate::observation::{group_entries, EventCalendar, IdentityGroup};
use crate::resolver::{AgeResolver, Resolution};
use crate::table::EntryRow;
use crate::writer::write_resolutions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// OUTCOMES
// ============================================================================

/// What happened to one identity group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Resolved(Vec<Resolution>),

    /// Inconsistent or ambiguous; the group's entries are left untouched
    Abstained(Verdict),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationReport {
    pub groups: usize,
    pub resolved_groups: usize,
    pub inconsistent_groups: usize,
    pub ambiguous_groups: usize,
    pub entries_written: usize,
    pub countries_filled: usize,
}

impl InterpolationReport {
    pub fn summary(&self) -> String {
        format!(
            "{} identities: {} resolved, {} inconsistent, {} ambiguous | {} entries written, {} countries filled",
            self.groups,
            self.resolved_groups,
            self.inconsistent_groups,
            self.ambiguous_groups,
            self.entries_written,
            self.countries_filled
        )
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct InterpolationEngine {
    pub checker: ConsistencyChecker,
    pub estimator: BirthWindowEstimator,
    pub resolver: AgeResolver,

    /// Run country inference after the age pass (default: true)
    pub infer_countries: bool,
}

impl InterpolationEngine {
    pub fn new() -> Self {
        InterpolationEngine::from_config(&InterpolationConfig::default())
    }

    pub fn from_config(config: &InterpolationConfig) -> Self {
        InterpolationEngine {
            checker: ConsistencyChecker::with_max_age_gap(config.max_age_gap),
            estimator: BirthWindowEstimator::with_slack(config.meet_length_slack_days),
            resolver: AgeResolver::with_age_classes(config.age_class_table()),
            infer_countries: config.infer_countries,
        }
    }

    /// Gate one group on consistency, then resolve it
    pub fn resolve_group(&self, group: &IdentityGroup) -> GroupOutcome {
        let verdict = self.checker.check(group);
        if !verdict.is_consistent() {
            return GroupOutcome::Abstained(verdict);
        }

        let window = self.estimator.estimate(group);
        match self.resolver.resolve(group, window.as_ref()) {
            Ok(resolutions) => GroupOutcome::Resolved(resolutions),
            Err(verdict) => GroupOutcome::Abstained(verdict),
        }
    }

    /// Resolve groups independently; output order follows input order
    #[cfg(feature = "parallel")]
    pub fn resolve_groups(&self, groups: &[IdentityGroup]) -> Vec<GroupOutcome> {
        use rayon::prelude::*;
        groups.par_iter().map(|g| self.resolve_group(g)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    pub fn resolve_groups(&self, groups: &[IdentityGroup]) -> Vec<GroupOutcome> {
        groups.iter().map(|g| self.resolve_group(g)).collect()
    }

    /// Interpolate ages (and countries) across the whole entry table in place
    pub fn interpolate(
        &self,
        entries: &mut [EntryRow],
        calendar: &EventCalendar,
    ) -> InterpolationReport {
        debug!(
            entries = entries.len(),
            events = calendar.len(),
            "Grouping entries by identity"
        );

        let groups = group_entries(entries, calendar);
        let outcomes = self.resolve_groups(&groups);

        let mut report = InterpolationReport {
            groups: groups.len(),
            ..InterpolationReport::default()
        };

        let mut resolutions = Vec::new();
        for outcome in outcomes {
            match outcome {
                GroupOutcome::Resolved(resolved) => {
                    report.resolved_groups += 1;
                    resolutions.extend(resolved);
                }
                GroupOutcome::Abstained(verdict) if verdict.is_ambiguous() => {
                    report.ambiguous_groups += 1;
                }
                GroupOutcome::Abstained(_) => {
                    report.inconsistent_groups += 1;
                }
            }
        }

        report.entries_written = write_resolutions(entries, &resolutions);

        if self.infer_countries {
            report.countries_filled = interpolate_countries(entries);
        }

        info!("{}", report.summary());
        report
    }
}

impl Default for InterpolationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
