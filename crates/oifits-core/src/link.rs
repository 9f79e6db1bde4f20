// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linking and validation pass.
//!
//! [`Collection::update`] rebuilds the traversal chain, normalises
//! cross-reference names, resolves links and recomputes the collection
//! revision. The whole result is staged first and committed in one step, so
//! a pass halted by [`ErrorPolicy::Stop`] leaves the collection untouched.

use std::collections::{BTreeMap, BTreeSet};

use oifits_schema::{Kind, MAX_REVISION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::collection::Lists;
use crate::diagnostics::{Diagnostics, Halt};
use crate::record::{normalize_name, NAME_FIELDS};
use crate::{Collection, ErrorList, ErrorPolicy, Links, OifitsError, Record, RecordId};

/// Knobs for a single [`Collection::update`] call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// Reaction to data errors.
    pub policy: ErrorPolicy,
    /// Collection revision to use instead of the members' maximum.
    pub force_revision: Option<u32>,
    /// Run even when the collection is clean.
    pub force: bool,
    /// Report ARRAY names that do not resolve as warnings.
    pub warn_unresolved_array: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            force_revision: None,
            force: false,
            warn_unresolved_array: true,
        }
    }
}

/// Result of a linking pass, applied in one step by `commit`.
struct Staged {
    /// Old identity to new identity, in chain order.
    renumber: Vec<(RecordId, RecordId)>,
    /// Normalised name values per (new) identity.
    names: Vec<(RecordId, &'static str, Vec<String>)>,
    links: BTreeMap<RecordId, Links>,
    lists: Lists,
    revision: u32,
}

/// Name tables of the shared kinds.
#[derive(Default)]
struct Names {
    /// Identity and channel count per INSNAME.
    wavelengths: BTreeMap<String, (RecordId, usize)>,
    arrays: BTreeMap<String, RecordId>,
    corrs: BTreeMap<String, RecordId>,
}

impl Collection {
    /// Rebuild chain, names, links and revision.
    ///
    /// A no-op when the collection is clean, `force` is unset and the forced
    /// revision (if any) is already in effect. Errors and warnings of the
    /// pass are attached to the collection; see [`Collection::errors`].
    ///
    /// # Errors
    ///
    /// Every error reported under `options.policy`. With
    /// [`ErrorPolicy::Stop`] nothing is committed and the collection stays
    /// dirty; with [`ErrorPolicy::Accumulate`] the best-effort result is
    /// committed before the errors are returned.
    #[instrument(skip(self), fields(records = self.records.len()))]
    pub fn update(&mut self, options: &UpdateOptions) -> Result<(), ErrorList> {
        let forced_change = options.force_revision.is_some_and(|r| r != self.revision);
        if !self.dirty && !options.force && !forced_change {
            return Ok(());
        }
        let mut diag = Diagnostics::new(options.policy);
        let staged = self.stage(options, &mut diag);
        let (errors, warnings) = diag.into_parts();
        self.errors.clone_from(&errors);
        self.warnings = warnings;
        match staged {
            Ok(staged) => {
                self.commit(staged);
                info!(
                    revision = self.revision,
                    errors = errors.len(),
                    warnings = self.warnings.len(),
                    "collection updated"
                );
            }
            Err(Halt) => debug!("update halted, nothing committed"),
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ErrorList::new(errors))
        }
    }

    fn stage(&self, options: &UpdateOptions, diag: &mut Diagnostics) -> Result<Staged, Halt> {
        // Identities are dense 1..=n in insertion order after the pass.
        let mut renumber = Vec::with_capacity(self.records.len());
        let mut records = Vec::with_capacity(self.records.len());
        for (new, (&old, record)) in (1..).map(RecordId).zip(&self.records) {
            if old != new {
                debug!(%old, %new, "closing identity gap");
            }
            renumber.push((old, new));
            records.push((new, record));
        }

        let mut member_max = 0;
        for &(id, record) in &records {
            let revision = record.revision();
            if revision == 0 || revision > record.kind().max_revision() {
                diag.error(OifitsError::BadRevision {
                    kind: record.kind(),
                    record: id,
                    revision: i64::from(revision),
                    max: record.kind().max_revision(),
                })?;
                continue;
            }
            member_max = member_max.max(revision);
        }
        let revision = match options.force_revision {
            Some(forced) if forced < member_max || forced > MAX_REVISION => {
                diag.error(OifitsError::BadForcedRevision {
                    forced,
                    required: member_max,
                    max: MAX_REVISION,
                })?;
                member_max
            }
            Some(forced) => forced,
            None => member_max,
        };

        let mut names = Vec::new();
        let mut table = Names::default();
        let mut lists = Lists::default();
        let mut normalized = BTreeMap::new();
        for &(id, record) in &records {
            for field in NAME_FIELDS {
                let Some(values) = record.texts(field) else {
                    continue;
                };
                let canon: Vec<String> = values.iter().map(|v| normalize_name(v)).collect();
                if canon != values {
                    names.push((id, field, canon.clone()));
                }
                normalized.insert((id, field), canon);
            }
            let own_name = |field: &'static str| {
                normalized
                    .get(&(id, field))
                    .and_then(|v| v.first())
                    .cloned()
            };
            let duplicate = match record.kind() {
                Kind::Wavelength => register(
                    &mut table.wavelengths,
                    own_name("insname"),
                    (id, record.channel_count()),
                ),
                Kind::Array => register(&mut table.arrays, own_name("arrname"), id),
                Kind::Corr => register(&mut table.corrs, own_name("corrname"), id),
                _ => None,
            };
            if let Some(name) = duplicate {
                diag.error(OifitsError::DuplicateCrossReferenceName {
                    kind: record.kind(),
                    name,
                })?;
            }
            let list = match record.kind() {
                Kind::Target => &mut lists.targets,
                Kind::Array => &mut lists.arrays,
                Kind::Wavelength => &mut lists.wavelengths,
                Kind::Corr => &mut lists.corrs,
                Kind::Inspol => &mut lists.inspols,
                Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux => &mut lists.data,
            };
            list.push(id);
        }

        if lists.targets.len() != 1 {
            diag.error(OifitsError::MissingOrDuplicateTarget {
                count: lists.targets.len(),
            })?;
        }

        let mut links = BTreeMap::new();
        for &(id, record) in &records {
            let name = |field: &'static str| normalized.get(&(id, field));
            let link = resolve(id, record, &table, &name, options, diag)?;
            links.insert(id, link);
        }

        Ok(Staged {
            renumber,
            names,
            links,
            lists,
            revision,
        })
    }

    fn commit(&mut self, staged: Staged) {
        let mut old = std::mem::take(&mut self.records);
        for (from, to) in staged.renumber {
            if let Some(mut record) = old.remove(&from) {
                record.id = Some(to);
                self.records.insert(to, record);
            }
        }
        for (id, field, values) in staged.names {
            if let Some(record) = self.records.get_mut(&id) {
                record.set_texts(field, values);
            }
        }
        for (id, links) in staged.links {
            if let Some(record) = self.records.get_mut(&id) {
                record.links = links;
            }
        }
        self.chain = self.records.keys().copied().collect();
        self.counter = u32::try_from(self.records.len()).unwrap_or(u32::MAX);
        self.lists = staged.lists;
        self.revision = staged.revision;
        self.dirty = false;
    }
}

/// Insert `name` unless taken; returns the name if it was a duplicate.
fn register<V>(map: &mut BTreeMap<String, V>, name: Option<String>, value: V) -> Option<String> {
    let name = name?;
    if map.contains_key(&name) {
        return Some(name);
    }
    map.insert(name, value);
    None
}

/// Resolve the three cross-reference slots of one record.
fn resolve<'n>(
    id: RecordId,
    record: &Record,
    table: &Names,
    name: &dyn Fn(&'static str) -> Option<&'n Vec<String>>,
    options: &UpdateOptions,
    diag: &mut Diagnostics,
) -> Result<Links, Halt> {
    let kind = record.kind();
    let unresolved = |target: Kind, label: &str, detail: String| OifitsError::UnresolvedCrossReference {
        kind,
        record: id,
        target,
        name: label.to_owned(),
        detail,
    };
    let mut links = Links::default();

    match kind {
        Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux => {
            match name("insname").and_then(|v| v.first()) {
                Some(insname) => match table.wavelengths.get(insname) {
                    Some(&(wave, channels)) if channels == record.channel_count() => {
                        links.wavelength = Some(wave);
                    }
                    Some(&(_, channels)) => diag.error(unresolved(
                        Kind::Wavelength,
                        insname,
                        format!(
                            "channel count mismatch: record has {}, OI_WAVELENGTH has {channels}",
                            record.channel_count()
                        ),
                    ))?,
                    None => diag.error(unresolved(
                        Kind::Wavelength,
                        insname,
                        "no OI_WAVELENGTH table with this INSNAME".to_owned(),
                    ))?,
                },
                None => diag.error(unresolved(
                    Kind::Wavelength,
                    "",
                    "record has no INSNAME".to_owned(),
                ))?,
            }
            if let Some(corrname) = name("corrname").and_then(|v| v.first()) {
                match table.corrs.get(corrname) {
                    Some(&corr) => links.corr = Some(corr),
                    None => diag.error(unresolved(
                        Kind::Corr,
                        corrname,
                        "no OI_CORR table with this CORRNAME".to_owned(),
                    ))?,
                }
            }
        }
        Kind::Inspol => {
            let insnames: BTreeSet<&String> = name("insname").into_iter().flatten().collect();
            for insname in insnames {
                if !table.wavelengths.contains_key(insname) {
                    diag.error(unresolved(
                        Kind::Wavelength,
                        insname,
                        "no OI_WAVELENGTH table with this INSNAME".to_owned(),
                    ))?;
                }
            }
        }
        Kind::Wavelength => links.wavelength = Some(id),
        Kind::Target | Kind::Array | Kind::Corr => {}
    }

    if matches!(kind, Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux | Kind::Inspol | Kind::Array) {
        if let Some(arrname) = name("arrname").and_then(|v| v.first()) {
            match table.arrays.get(arrname) {
                Some(&array) => links.array = Some(array),
                None if options.warn_unresolved_array => diag.warning(unresolved(
                    Kind::Array,
                    arrname,
                    "no OI_ARRAY table with this ARRNAME".to_owned(),
                )),
                None => {}
            }
        }
    }
    Ok(links)
}
