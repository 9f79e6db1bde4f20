// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-target subsets.

use std::collections::BTreeSet;

use glob::{MatchOptions, Pattern};
use oifits_schema::Kind;
use tracing::{debug, instrument};

use crate::record::normalize_name;
use crate::{Collection, OifitsError, Record, UpdateOptions};

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Identity every selected row is renumbered to.
const SELECTED_ID: i64 = 1;

/// Extract one target and every row observed on it.
///
/// `pattern` is a glob matched case-insensitively against the trimmed
/// target names. The result holds a one-row TARGET table with
/// `target_id = 1`, the matching rows of every data-bearing and INSPOL
/// record (records left without rows are dropped) and only the ARRAY,
/// WAVELENGTH and CORR tables those rows reference. It is linked with
/// `options`.
///
/// # Errors
///
/// [`OifitsError::Dirty`] if `source` needs `update`,
/// [`OifitsError::InvalidPattern`], [`OifitsError::AmbiguousTargetSelection`]
/// unless exactly one target matches, and [`OifitsError::Invalid`] if the
/// result fails to link.
#[instrument(skip(source, options))]
pub fn select_target(
    source: &Collection,
    pattern: &str,
    options: &UpdateOptions,
) -> Result<Collection, OifitsError> {
    let glob = Pattern::new(pattern).map_err(|err| OifitsError::InvalidPattern {
        pattern: pattern.to_owned(),
        message: err.to_string(),
    })?;
    let target = source
        .target()?
        .ok_or(OifitsError::MissingOrDuplicateTarget { count: 0 })?;
    let names = target.texts("target").unwrap_or_default();
    let matches: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| glob.matches_with(name.trim(), MATCH))
        .map(|(row, _)| row)
        .collect();
    let [row] = matches[..] else {
        return Err(OifitsError::AmbiguousTargetSelection {
            pattern: pattern.to_owned(),
            matches: matches.len(),
        });
    };
    let wanted = target
        .integers("target_id")
        .and_then(|ids| ids.get(row).copied())
        .ok_or(OifitsError::MissingOrDuplicateTarget { count: 0 })?;
    debug!(target = %names[row].trim(), target_id = wanted, "target selected");

    // Pass 1: row subsets and the shared tables they reference.
    let mut subsets = Vec::new();
    let mut referenced = BTreeSet::new();
    let mut inspol_insnames = BTreeSet::new();
    for (id, record) in source.iter_chain()? {
        if !(record.is_data() || record.kind() == Kind::Inspol) {
            continue;
        }
        let rows: Vec<usize> = record
            .integers("target_id")
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter(|&(_, &tid)| tid == wanted)
            .map(|(row, _)| row)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let links = source.links(id)?;
        referenced.extend([links.wavelength, links.array, links.corr].into_iter().flatten());
        if record.kind() == Kind::Inspol {
            let insnames = record.texts("insname").unwrap_or_default();
            inspol_insnames.extend(
                rows.iter()
                    .filter_map(|&r| insnames.get(r))
                    .map(|name| normalize_name(name)),
            );
        }
        subsets.push((id, renumbered(record.select_rows(&rows))));
    }

    // Pass 2: emit in traversal order.
    let mut out = Collection::new();
    let mut subsets = subsets.into_iter().peekable();
    for (id, record) in source.iter_chain()? {
        match record.kind() {
            Kind::Target => {
                if record.id() == target.id() {
                    out.insert(renumbered(record.select_rows(&[row])));
                }
            }
            Kind::Array | Kind::Corr => {
                if referenced.contains(&id) {
                    out.insert(record.clone());
                }
            }
            Kind::Wavelength => {
                let by_inspol = record
                    .insname()
                    .is_some_and(|name| inspol_insnames.contains(&normalize_name(name)));
                if referenced.contains(&id) || by_inspol {
                    out.insert(record.clone());
                }
            }
            Kind::Inspol | Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux => {
                if subsets.peek().is_some_and(|(sid, _)| *sid == id) {
                    if let Some((_, subset)) = subsets.next() {
                        out.insert(subset);
                    }
                }
            }
        }
    }
    out.update(options).map_err(OifitsError::Invalid)?;
    Ok(out)
}

/// Copy with every `target_id` set to the selected identity.
fn renumbered(mut record: Record) -> Record {
    let rows = record.row_count();
    record.set_integers("target_id", vec![SELECTED_ID; rows]);
    record
}
