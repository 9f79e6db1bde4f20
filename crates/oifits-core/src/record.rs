// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed records (one per OI-FITS table).

use std::collections::BTreeMap;
use std::fmt;

use oifits_port::RawArray;
use oifits_schema::{lookup, Kind, Placement, SchemaTable};

use crate::value::{Field, Value};
use crate::{OifitsError, Tolerance};

/// Collection-scoped record identity, assigned on insertion.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cross-references resolved by [`Collection::update`](crate::Collection::update).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Links {
    /// WAVELENGTH table matching `insname`.
    pub wavelength: Option<RecordId>,
    /// ARRAY table matching `arrname`.
    pub array: Option<RecordId>,
    /// CORR table matching `corrname`.
    pub corr: Option<RecordId>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CollectionId(pub(crate) u64);

/// Field names that carry cross-references.
pub(crate) const NAME_FIELDS: [&str; 3] = ["insname", "arrname", "corrname"];

/// One OI-FITS table: validated fields plus bookkeeping.
///
/// Column fields are stored row-major with shape `[rows, cell axes...]`. For
/// a WAVELENGTH record the table rows are its channels, so
/// [`Record::row_count`] is 0 and [`Record::channel_count`] is the number of
/// table rows.
#[derive(Clone, PartialEq, Debug)]
pub struct Record {
    kind: Kind,
    revision: u32,
    rows: usize,
    channels: usize,
    fields: BTreeMap<&'static str, Field>,
    units: BTreeMap<&'static str, String>,
    pub(crate) id: Option<RecordId>,
    pub(crate) links: Links,
    pub(crate) owner: Option<CollectionId>,
}

impl Record {
    pub(crate) fn from_parts(
        kind: Kind,
        revision: u32,
        rows: usize,
        channels: usize,
        fields: BTreeMap<&'static str, Field>,
        units: BTreeMap<&'static str, String>,
    ) -> Self {
        Self {
            kind,
            revision,
            rows,
            channels,
            fields,
            units,
            id: None,
            links: Links::default(),
            owner: None,
        }
    }

    /// Record kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Format revision of this table.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Override the revision; checked by the next `update`.
    pub fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }

    /// Measurement rows (0 for WAVELENGTH).
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Spectral channels (0 when the kind has no per-channel cells).
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Rows of the underlying binary table.
    pub fn table_rows(&self) -> usize {
        if self.kind == Kind::Wavelength {
            self.channels
        } else {
            self.rows
        }
    }

    /// Returns `true` for VIS, VIS2, T3 and FLUX records.
    pub fn is_data(&self) -> bool {
        self.kind.is_data()
    }

    /// Identity inside the owning collection, if inserted.
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Schema table this record was validated against.
    pub fn schema(&self) -> Result<&'static SchemaTable, OifitsError> {
        Ok(lookup(self.kind, self.revision)?)
    }

    /// A stored field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// All stored fields, by name.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Field)> {
        self.fields.iter().map(|(&name, field)| (name, field))
    }

    /// Returns `true` if the field is stored.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Real values of a field.
    pub fn reals(&self, name: &str) -> Option<&[f64]> {
        match self.field(name)?.value() {
            Value::Real(v) => Some(v),
            _ => None,
        }
    }

    /// Integer values of a field.
    pub fn integers(&self, name: &str) -> Option<&[i64]> {
        match self.field(name)?.value() {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Logical values of a field.
    pub fn logicals(&self, name: &str) -> Option<&[bool]> {
        match self.field(name)?.value() {
            Value::Logical(v) => Some(v),
            _ => None,
        }
    }

    /// Complex values of a field, as `[re, im]`.
    pub fn complexes(&self, name: &str) -> Option<&[[f64; 2]]> {
        match self.field(name)?.value() {
            Value::Complex(v) => Some(v),
            _ => None,
        }
    }

    /// String values of a field.
    pub fn texts(&self, name: &str) -> Option<&[String]> {
        match self.field(name)?.value() {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// First real value of a field.
    pub fn real(&self, name: &str) -> Option<f64> {
        self.reals(name)?.first().copied()
    }

    /// First integer value of a field.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.integers(name)?.first().copied()
    }

    /// First string value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts(name)?.first().map(String::as_str)
    }

    /// Declared unit of a field, falling back to the schema default.
    pub fn unit(&self, name: &str) -> Option<&str> {
        if let Some(unit) = self.units.get(name) {
            return Some(unit.as_str());
        }
        self.schema().ok()?.field(name)?.unit()
    }

    /// Replace a field's values, keeping the record's shape.
    ///
    /// Header fields take a single value; column fields must match the
    /// current row and channel counts exactly.
    pub fn replace(&mut self, name: &str, array: impl Into<RawArray>) -> Result<(), OifitsError> {
        let table = self.schema()?;
        let desc = table.field(name).ok_or_else(|| OifitsError::UnknownField {
            kind: self.kind,
            field: name.to_owned(),
        })?;
        let (data, shape) = array.into().into_parts();
        let dims = match desc.placement() {
            Placement::Header => Vec::new(),
            Placement::Column => {
                let mut dims = vec![self.table_rows()];
                dims.extend(desc.cardinality().cell_dims(self.channels));
                dims
            }
        };
        let matches = shape == dims || (dims.is_empty() && shape == [1]);
        if !matches {
            return Err(OifitsError::BadCellShape {
                kind: self.kind,
                field: desc.name().to_owned(),
                detail: format!("expected shape {dims:?}, got {shape:?}"),
            });
        }
        let value = Value::promote(data, desc.primitive()).map_err(|found| {
            OifitsError::WrongPrimitiveType {
                kind: self.kind,
                field: desc.name().to_owned(),
                expected: desc.primitive(),
                found,
            }
        })?;
        if desc.is_revision() {
            if let Value::Integer(v) = &value {
                self.revision = v
                    .first()
                    .and_then(|&r| u32::try_from(r).ok())
                    .unwrap_or(0);
            }
            return Ok(());
        }
        let name = desc.name();
        self.fields.insert(name, Field::new(value, dims));
        Ok(())
    }

    /// Copy of this record restricted to `rows` (header fields kept).
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Record {
        let fields = self
            .fields
            .iter()
            .map(|(&name, field)| {
                let field = if field.is_scalar() {
                    field.clone()
                } else {
                    field.take_rows(rows)
                };
                (name, field)
            })
            .collect();
        let (row_count, channels) = if self.kind == Kind::Wavelength {
            (0, rows.len())
        } else {
            (rows.len(), self.channels)
        };
        Record::from_parts(
            self.kind,
            self.revision,
            row_count,
            channels,
            fields,
            self.units.clone(),
        )
    }

    /// Overwrite the values of an integer field in place.
    pub(crate) fn set_integers(&mut self, name: &str, values: Vec<i64>) {
        if let Some(field) = self.fields.get_mut(name) {
            *field.value_mut() = Value::Integer(values);
        }
    }

    /// Overwrite the values of a string field in place.
    pub(crate) fn set_texts(&mut self, name: &str, values: Vec<String>) {
        if let Some(field) = self.fields.get_mut(name) {
            *field.value_mut() = Value::Text(values);
        }
    }

    /// Name of the first field that differs from `other`, ignoring identity,
    /// ownership, links and revision.
    ///
    /// Cross-reference names compare after normalisation.
    pub fn first_difference(&self, other: &Record, tolerance: Tolerance) -> Option<String> {
        if self.kind != other.kind {
            return Some("kind".to_owned());
        }
        let names = self
            .fields
            .keys()
            .chain(other.fields.keys())
            .copied()
            .collect::<std::collections::BTreeSet<_>>();
        for name in names {
            let same = match (self.field(name), other.field(name)) {
                (Some(a), Some(b)) if NAME_FIELDS.contains(&name) => {
                    a.dims() == b.dims() && normalized(a.value()) == normalized(b.value())
                }
                (Some(a), Some(b)) => a.approx_eq(b, tolerance),
                (None, None) => true,
                _ => false,
            };
            if !same {
                return Some(name.to_owned());
            }
        }
        None
    }

    /// Drop identity and links so the record can join another collection.
    pub(crate) fn detach(&mut self) {
        self.id = None;
        self.links = Links::default();
        self.owner = None;
    }
}

/// Cross-reference name in canonical form: trimmed and upper case.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn normalized(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Text(v) => Some(v.iter().map(|s| normalize_name(s)).collect()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{build, BuildOptions, Fields};

    fn wavelength(insname: &str, waves: Vec<f64>) -> Record {
        let bands = vec![1.0e-8; waves.len()];
        let fields = Fields::new()
            .with("insname", insname)
            .with("eff_wave", waves)
            .with("eff_band", bands);
        build(Kind::Wavelength, &fields, &BuildOptions::default()).unwrap()
    }

    #[test]
    fn wavelength_rows_are_channels() {
        let rec = wavelength("SPEC", vec![1.6e-6, 1.7e-6]);
        assert_eq!(rec.row_count(), 0);
        assert_eq!(rec.channel_count(), 2);
        assert_eq!(rec.table_rows(), 2);
        assert_eq!(rec.unit("eff_wave"), Some("m"));
        assert_eq!(rec.id(), None);
    }

    #[test]
    fn names_compare_after_normalisation() {
        let a = wavelength("spec ", vec![1.6e-6]);
        let b = wavelength("SPEC", vec![1.6e-6]);
        assert_eq!(a.first_difference(&b, Tolerance::EXACT), None);

        let c = wavelength("SPEC", vec![1.65e-6]);
        assert_eq!(a.first_difference(&c, Tolerance::EXACT), Some("eff_wave".to_owned()));
    }

    #[test]
    fn replace_checks_shape_and_type() {
        let mut rec = wavelength("SPEC", vec![1.6e-6, 1.7e-6]);
        rec.replace("eff_band", vec![2.0e-8_f64, 3.0e-8]).unwrap();
        assert_eq!(rec.reals("eff_band"), Some(&[2.0e-8, 3.0e-8][..]));

        let err = rec.replace("eff_band", vec![1.0_f64]).unwrap_err();
        assert!(matches!(err, OifitsError::BadCellShape { .. }));
        let err = rec.replace("insname", 3_i32).unwrap_err();
        assert!(matches!(err, OifitsError::WrongPrimitiveType { .. }));
        let err = rec.replace("nope", 3_i32).unwrap_err();
        assert!(matches!(err, OifitsError::UnknownField { .. }));
    }

    #[test]
    fn select_rows_keeps_headers() {
        let rec = wavelength("SPEC", vec![1.6e-6, 1.7e-6]);
        let sub = rec.select_rows(&[1]);
        assert_eq!(sub.text("insname"), Some("SPEC"));
        assert_eq!(sub.reals("eff_wave"), Some(&[1.7e-6][..]));
        assert_eq!(sub.channel_count(), 1);
    }
}
