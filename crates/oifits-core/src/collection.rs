// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Record arena with stable identities.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use oifits_schema::Kind;
use tracing::debug;

use crate::record::CollectionId;
use crate::{Links, OifitsError, Record, RecordId};

static NEXT_COLLECTION: AtomicU64 = AtomicU64::new(1);

fn next_collection_id() -> CollectionId {
    CollectionId(NEXT_COLLECTION.fetch_add(1, Ordering::Relaxed))
}

/// Classification cached by the linking pass.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub(crate) struct Lists {
    pub(crate) targets: Vec<RecordId>,
    pub(crate) arrays: Vec<RecordId>,
    pub(crate) wavelengths: Vec<RecordId>,
    pub(crate) corrs: Vec<RecordId>,
    pub(crate) inspols: Vec<RecordId>,
    pub(crate) data: Vec<RecordId>,
}

/// The records of one OI-FITS file.
///
/// Records are owned by the collection and addressed by [`RecordId`].
/// Structural mutation (insert, remove, `get_mut`) marks the collection
/// dirty; traversal and cross-reference queries fail with
/// [`OifitsError::Dirty`] until [`Collection::update`] has run.
#[derive(Debug)]
pub struct Collection {
    pub(crate) id: CollectionId,
    pub(crate) records: BTreeMap<RecordId, Record>,
    pub(crate) counter: u32,
    pub(crate) chain: Vec<RecordId>,
    pub(crate) revision: u32,
    pub(crate) lists: Lists,
    pub(crate) errors: Vec<OifitsError>,
    pub(crate) warnings: Vec<OifitsError>,
    pub(crate) dirty: bool,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Collection {
    /// Deep copy under a fresh collection identity.
    fn clone(&self) -> Self {
        let id = next_collection_id();
        let records = self
            .records
            .iter()
            .map(|(&rid, record)| {
                let mut record = record.clone();
                record.owner = Some(id);
                (rid, record)
            })
            .collect();
        Self {
            id,
            records,
            counter: self.counter,
            chain: self.chain.clone(),
            revision: self.revision,
            lists: self.lists.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            dirty: self.dirty,
        }
    }
}

impl Collection {
    /// Empty, clean collection.
    pub fn new() -> Self {
        Self {
            id: next_collection_id(),
            records: BTreeMap::new(),
            counter: 0,
            chain: Vec::new(),
            revision: 0,
            lists: Lists::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            dirty: false,
        }
    }

    /// Take ownership of `record` and assign it the next identity.
    ///
    /// A record copied out of a collection (this one or another) loses its
    /// identity and links first.
    pub fn insert(&mut self, mut record: Record) -> RecordId {
        if let Some(owner) = record.owner {
            debug!(from = owner.0, to = self.id.0, "adopting copy of an owned record");
            record.detach();
        }
        self.counter += 1;
        let id = RecordId(self.counter);
        record.id = Some(id);
        record.owner = Some(self.id);
        self.records.insert(id, record);
        self.dirty = true;
        id
    }

    /// Chaining form of [`Collection::insert`].
    #[must_use]
    pub fn with(mut self, record: Record) -> Self {
        self.insert(record);
        self
    }

    /// Deep-copy record `id` of `source` into this collection.
    pub fn insert_copy(&mut self, source: &Collection, id: RecordId) -> Result<RecordId, OifitsError> {
        let record = source.get(id).ok_or(OifitsError::UnknownRecord(id))?.clone();
        Ok(self.insert(record))
    }

    /// Remove a record, handing it back unowned.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let mut record = self.records.remove(&id)?;
        record.detach();
        self.dirty = true;
        Some(record)
    }

    /// A record by identity.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Mutable access to a record; marks the collection dirty.
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        let record = self.records.get_mut(&id)?;
        self.dirty = true;
        Some(record)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the collection holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in identity order; available even when dirty.
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter().map(|(&id, record)| (id, record))
    }

    /// Fail with [`OifitsError::Dirty`] unless `update` has run since the
    /// last mutation.
    pub fn ensure_clean(&self) -> Result<(), OifitsError> {
        if self.dirty {
            Err(OifitsError::Dirty)
        } else {
            Ok(())
        }
    }

    /// Returns `true` if the collection was mutated since the last `update`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resolved format revision (0 until the first `update`).
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Record identities in traversal order.
    pub fn chain(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.chain)
    }

    /// Records in traversal order.
    pub fn iter_chain(&self) -> Result<impl Iterator<Item = (RecordId, &Record)>, OifitsError> {
        let chain = self.chain()?;
        Ok(chain
            .iter()
            .filter_map(|&id| self.records.get(&id).map(|record| (id, record))))
    }

    /// First record in traversal order.
    pub fn first_record(&self) -> Result<Option<RecordId>, OifitsError> {
        Ok(self.chain()?.first().copied())
    }

    /// Last record in traversal order.
    pub fn last_record(&self) -> Result<Option<RecordId>, OifitsError> {
        Ok(self.chain()?.last().copied())
    }

    /// Record following `id` in traversal order.
    pub fn next_record(&self, id: RecordId) -> Result<Option<RecordId>, OifitsError> {
        let chain = self.chain()?;
        let pos = chain
            .iter()
            .position(|&other| other == id)
            .ok_or(OifitsError::UnknownRecord(id))?;
        Ok(chain.get(pos + 1).copied())
    }

    /// Resolved cross-references of `id`.
    pub fn links(&self, id: RecordId) -> Result<Links, OifitsError> {
        self.ensure_clean()?;
        self.get(id)
            .map(|record| record.links)
            .ok_or(OifitsError::UnknownRecord(id))
    }

    /// WAVELENGTH record referenced by `id`.
    pub fn wavelength_of(&self, id: RecordId) -> Result<Option<&Record>, OifitsError> {
        Ok(self.links(id)?.wavelength.and_then(|link| self.get(link)))
    }

    /// ARRAY record referenced by `id`.
    pub fn array_of(&self, id: RecordId) -> Result<Option<&Record>, OifitsError> {
        Ok(self.links(id)?.array.and_then(|link| self.get(link)))
    }

    /// CORR record referenced by `id`.
    pub fn corr_of(&self, id: RecordId) -> Result<Option<&Record>, OifitsError> {
        Ok(self.links(id)?.corr.and_then(|link| self.get(link)))
    }

    /// The TARGET record (the first one if the collection is invalid).
    pub fn target(&self) -> Result<Option<&Record>, OifitsError> {
        Ok(self.targets()?.first().and_then(|&id| self.get(id)))
    }

    /// TARGET records in traversal order.
    pub fn targets(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.targets)
    }

    /// ARRAY records in traversal order.
    pub fn arrays(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.arrays)
    }

    /// WAVELENGTH records in traversal order.
    pub fn wavelengths(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.wavelengths)
    }

    /// CORR records in traversal order.
    pub fn corrs(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.corrs)
    }

    /// INSPOL records in traversal order.
    pub fn inspols(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.inspols)
    }

    /// Data-bearing records (VIS, VIS2, T3, FLUX) in traversal order.
    pub fn data(&self) -> Result<&[RecordId], OifitsError> {
        self.ensure_clean()?;
        Ok(&self.lists.data)
    }

    /// Returns `true` if `id` names a data-bearing record.
    pub fn is_data_record(&self, id: RecordId) -> bool {
        self.get(id).is_some_and(Record::is_data)
    }

    /// Records of one kind in identity order.
    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records().filter(move |(_, record)| record.kind() == kind)
    }

    /// Errors attached by the last `update`.
    pub fn errors(&self) -> &[OifitsError] {
        &self.errors
    }

    /// Warnings attached by the last `update`.
    pub fn warnings(&self) -> &[OifitsError] {
        &self.warnings
    }

    /// Drop attached errors and warnings.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    /// Take the attached errors, leaving none behind.
    pub fn take_errors(&mut self) -> Vec<OifitsError> {
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{build, BuildOptions, Fields};

    fn wavelength(insname: &str) -> Record {
        let fields = Fields::new()
            .with("insname", insname)
            .with("eff_wave", vec![1.6e-6_f64])
            .with("eff_band", vec![1.0e-8_f64]);
        build(Kind::Wavelength, &fields, &BuildOptions::default()).unwrap()
    }

    #[test]
    fn insert_assigns_increasing_ids_and_marks_dirty() {
        let mut coll = Collection::new();
        assert!(!coll.is_dirty());
        let a = coll.insert(wavelength("A"));
        let b = coll.insert(wavelength("B"));
        assert_eq!((a, b), (RecordId(1), RecordId(2)));
        assert!(coll.is_dirty());
        assert_eq!(coll.get(b).unwrap().id(), Some(b));
        assert_eq!(coll.first_record(), Err(OifitsError::Dirty));
    }

    #[test]
    fn foreign_records_are_copied_on_insert() {
        let mut first = Collection::new();
        let id = first.insert(wavelength("A"));
        let mut second = Collection::new();
        second.insert(wavelength("X"));
        let copy = second.insert_copy(&first, id).unwrap();
        assert_eq!(copy, RecordId(2));
        assert_eq!(second.get(copy).unwrap().id(), Some(copy));
        assert_eq!(first.get(id).unwrap().id(), Some(id));

        let clone = first.get(id).unwrap().clone();
        let again = first.insert(clone);
        assert_eq!(again, RecordId(2));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn removed_records_are_unowned() {
        let mut coll = Collection::new();
        let id = coll.insert(wavelength("A"));
        let record = coll.remove(id).unwrap();
        assert_eq!(record.id(), None);
        assert!(coll.is_empty());
        assert!(coll.remove(id).is_none());
    }

    #[test]
    fn cloned_collections_do_not_share_identity() {
        let coll = Collection::new().with(wavelength("A"));
        let copy = coll.clone();
        assert_ne!(coll.id, copy.id);
        let rid = RecordId(1);
        assert_eq!(copy.get(rid).unwrap().owner, Some(copy.id));
    }
}
