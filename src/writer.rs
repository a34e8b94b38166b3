// ✍️ Attribute Writer - Push resolutions back into the entry table
// Only entries with a resolution are touched; everything else passes through.

use crate::resolver::Resolution;
use crate::table::EntryRow;

/// Overwrite Age and AgeClass of every resolved entry.
///
/// An empty class label never erases a division already on the entry. A
/// pinned birth year is filled in where the entry has none. Returns the
/// number of entries written.
pub fn write_resolutions(entries: &mut [EntryRow], resolutions: &[Resolution]) -> usize {
    let mut written = 0;

    for resolution in resolutions {
        let Some(row) = entries.get_mut(resolution.entry) else {
            continue;
        };

        row.age = resolution.age.to_string();
        if !resolution.age_class.is_empty() || row.age_class.trim().is_empty() {
            row.age_class = resolution.age_class.clone();
        }

        if row.birth_year.trim().is_empty() {
            if let Some(year) = resolution.birth_year {
                row.birth_year = year.to_string();
            }
        }

        written += 1;
    }

    written
}

// ============================================================================
// TESTS
// ============================================================================
