// 🌍 Country Inference - Fill missing countries from an identity's other entries
// Same gate-then-fill pattern as age interpolation, without any dates.

use crate::table::EntryRow;
use std::collections::BTreeMap;

/// The one country all non-empty values agree on.
///
/// `None` when no value is present or any two disagree.
pub fn consistent_country<'a, I>(countries: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found: Option<&str> = None;

    for country in countries.into_iter().map(str::trim) {
        if country.is_empty() {
            continue;
        }
        match found {
            Some(existing) if existing != country => return None,
            Some(_) => {}
            None => found = Some(country),
        }
    }

    found
}

/// Fill empty Country fields for identities with at least two entries.
///
/// Returns the number of entries filled.
pub fn interpolate_countries(entries: &mut [EntryRow]) -> usize {
    let mut by_identity: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, row) in entries.iter().enumerate() {
        by_identity
            .entry(row.identity_id.clone())
            .or_default()
            .push(index);
    }

    let mut filled = 0;
    for indices in by_identity.values().filter(|indices| indices.len() >= 2) {
        let countries = indices.iter().map(|&i| entries[i].country.as_str());
        let Some(country) = consistent_country(countries).map(str::to_string) else {
            continue;
        };

        for &index in indices {
            let row = &mut entries[index];
            if row.country.trim().is_empty() {
                row.country = country.clone();
                filled += 1;
            }
        }
    }

    filled
}

// ============================================================================
// TESTS
// ============================================================================
