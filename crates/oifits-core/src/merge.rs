// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Merging collections.

use std::collections::BTreeMap;

use oifits_port::HduReader;
use oifits_schema::Kind;
use tracing::{debug, info, instrument};

use crate::record::normalize_name;
use crate::{load, Collection, LoadOptions, OifitsError, Record, RecordId, Tolerance, UpdateOptions};

/// One input of [`merge`].
pub enum MergeSource<'a> {
    /// An existing, clean collection.
    Collection(&'a Collection),
    /// A file, loaded with the merge's load options.
    Reader {
        /// Name used in conflict messages.
        label: String,
        /// The file.
        reader: &'a dyn HduReader,
    },
}

/// Knobs for [`merge`].
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct MergeOptions {
    /// Slack allowed when comparing shared tables.
    pub tolerance: Tolerance,
    /// Options for loading [`MergeSource::Reader`] inputs.
    pub load: LoadOptions,
    /// Options for the final linking pass.
    pub update: UpdateOptions,
}

/// Shared tables already present in the destination.
#[derive(Default)]
struct Index {
    target: Option<RecordId>,
    shared: BTreeMap<(Kind, String), RecordId>,
}

impl Index {
    fn of(collection: &Collection) -> Self {
        let mut index = Self::default();
        for (id, record) in collection.records() {
            match dedup_key(record) {
                Some(Key::Target) => {
                    index.target.get_or_insert(id);
                }
                Some(Key::Shared(kind, name)) => {
                    index.shared.entry((kind, name)).or_insert(id);
                }
                None => {}
            }
        }
        index
    }
}

enum Key {
    Target,
    Shared(Kind, String),
}

/// How a record is deduplicated; `None` for records that are always appended.
fn dedup_key(record: &Record) -> Option<Key> {
    let field = match record.kind() {
        Kind::Target => return Some(Key::Target),
        Kind::Array | Kind::Inspol => "arrname",
        Kind::Wavelength => "insname",
        Kind::Corr => "corrname",
        Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux => return None,
    };
    let name = normalize_name(record.text(field).unwrap_or_default());
    Some(Key::Shared(record.kind(), name))
}

/// Combine `sources` into `destination` (or a new collection).
///
/// The TARGET table and the ARRAY, WAVELENGTH, CORR and INSPOL tables are
/// kept once: a later copy must match the kept one within
/// `options.tolerance`. Data-bearing records are always appended. The result
/// is linked with `options.update`.
///
/// # Errors
///
/// [`OifitsError::MergeConflict`] on the first mismatching copy,
/// [`OifitsError::Dirty`] for a borrowed source that needs `update`,
/// [`OifitsError::Invalid`] if loading a file or the final `update` fails.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn merge(
    destination: Option<Collection>,
    sources: &[MergeSource<'_>],
    options: &MergeOptions,
) -> Result<Collection, OifitsError> {
    let mut dest = destination.unwrap_or_default();
    let mut index = Index::of(&dest);

    for (n, source) in sources.iter().enumerate() {
        let loaded;
        let (origin, collection) = match source {
            MergeSource::Collection(collection) => (format!("collection {}", n + 1), *collection),
            MergeSource::Reader { label, reader } => {
                loaded = load(*reader, &options.load).map_err(OifitsError::Invalid)?;
                (label.clone(), &loaded)
            }
        };
        for (_, record) in collection.iter_chain()? {
            absorb(&mut dest, &mut index, record, &origin, options.tolerance)?;
        }
        debug!(%origin, records = dest.len(), "source merged");
    }

    dest.update(&options.update).map_err(OifitsError::Invalid)?;
    info!(records = dest.len(), revision = dest.revision(), "merge complete");
    Ok(dest)
}

fn absorb(
    dest: &mut Collection,
    index: &mut Index,
    record: &Record,
    origin: &str,
    tolerance: Tolerance,
) -> Result<(), OifitsError> {
    let (kept, name) = match dedup_key(record) {
        None => {
            dest.insert(record.clone());
            return Ok(());
        }
        Some(Key::Target) => match index.target {
            Some(id) => (id, record.text("target").unwrap_or_default().trim().to_owned()),
            None => {
                index.target = Some(dest.insert(record.clone()));
                return Ok(());
            }
        },
        Some(Key::Shared(kind, name)) => match index.shared.get(&(kind, name.clone())) {
            Some(&id) => (id, name),
            None => {
                let id = dest.insert(record.clone());
                index.shared.insert((kind, name), id);
                return Ok(());
            }
        },
    };
    let existing = dest.get(kept).ok_or(OifitsError::UnknownRecord(kept))?;
    match existing.first_difference(record, tolerance) {
        Some(field) => Err(OifitsError::MergeConflict {
            origin: origin.to_owned(),
            kind: record.kind(),
            name,
            field,
        }),
        None => {
            debug!(kind = %record.kind(), %name, "identical table deduplicated");
            Ok(())
        }
    }
}
