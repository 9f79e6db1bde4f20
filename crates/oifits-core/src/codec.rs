// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema-driven record codec.
//!
//! [`build`] turns any [`FieldSource`] into a validated [`Record`]; [`encode`]
//! turns a record back into the keywords and columns of its binary table.
//! Both are driven entirely by the descriptor tables in `oifits-schema`, so a
//! single code path serves all nine kinds.

use std::collections::BTreeMap;

use oifits_port::{RawArray, RawData};
use oifits_schema::{
    lookup, revision_descriptor, Cardinality, FieldDescriptor, Kind, PrimitiveKind,
    SchemaTable, TypeCode, REVISION_FIELD,
};
use tracing::debug;

use crate::diagnostics::{Diagnostics, Halt};
use crate::value::{Field, Value};
use crate::{ErrorList, ErrorPolicy, FieldSource, OifitsError, RawField, Record};

/// Name of the flag column, the only column with a default and the only one
/// subject to the legacy per-row broadcast.
const FLAG_FIELD: &str = "flag";

/// Knobs for a single [`build`] call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BuildOptions {
    /// Reaction to data errors.
    pub policy: ErrorPolicy,
    /// Revision to build against; wins over any revision in the source.
    pub revision: Option<u32>,
    /// Fill a missing revision with the kind default.
    pub apply_defaults: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            revision: None,
            apply_defaults: true,
        }
    }
}

impl BuildOptions {
    /// Options for decoding a table read from a file: no revision default.
    pub fn for_file(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            revision: None,
            apply_defaults: false,
        }
    }
}

/// Build a record of `kind` from `source`.
///
/// # Errors
///
/// Returns every data error reported under `options.policy`. With
/// [`ErrorPolicy::WarnAndContinue`] the record is built without the offending
/// fields and an error is only returned if no schema table could be chosen.
pub fn build(
    kind: Kind,
    source: &dyn FieldSource,
    options: &BuildOptions,
) -> Result<Record, ErrorList> {
    let mut diag = Diagnostics::new(options.policy);
    let decoded = decode(kind, source, options, &mut diag);
    let (errors, warnings) = diag.into_parts();
    match decoded {
        Ok(Some(record)) if errors.is_empty() => Ok(record),
        _ if errors.is_empty() => Err(ErrorList::new(warnings)),
        _ => Err(ErrorList::new(errors)),
    }
}

/// Decode one record, reporting into `diag`.
///
/// Returns `Ok(None)` when errors were reported and the pass continued.
pub(crate) fn decode(
    kind: Kind,
    source: &dyn FieldSource,
    options: &BuildOptions,
    diag: &mut Diagnostics,
) -> Result<Option<Record>, Halt> {
    let before = diag.error_count();
    let Some(table) = resolve_table(kind, source, options, diag)? else {
        return Ok(None);
    };
    let revision = table.revision();

    for name in source.supplied_names() {
        if table.field(&name).is_none() {
            diag.error(OifitsError::UnknownField { kind, field: name })?;
        }
    }

    let mut decoder = Decoder {
        kind,
        fields: BTreeMap::new(),
        units: BTreeMap::new(),
        rows: None,
        channels: None,
    };
    for desc in table.headers().iter().filter(|d| !d.is_revision()) {
        match source.fetch(desc) {
            Some(raw) => decoder.header(desc, raw, diag)?,
            None if desc.is_optional() => {}
            None => diag.error(missing(kind, desc))?,
        }
    }
    let mut absent = Vec::new();
    for desc in table.columns() {
        match source.fetch(desc) {
            Some(raw) => decoder.column(desc, raw, diag)?,
            None => absent.push(desc),
        }
    }
    for desc in absent {
        if desc.name() == FLAG_FIELD {
            if let (Some(rows), Some(channels)) = (decoder.rows, decoder.channels) {
                let cell = desc.cardinality().cell_size(channels);
                let mut dims = vec![rows];
                dims.extend(desc.cardinality().cell_dims(channels));
                debug!(%kind, rows, channels, "defaulting flag to all-false");
                decoder.fields.insert(
                    FLAG_FIELD,
                    Field::new(Value::Logical(vec![false; rows * cell]), dims),
                );
                continue;
            }
        }
        if !desc.is_optional() {
            diag.error(missing(kind, desc))?;
        }
    }

    if diag.error_count() > before {
        return Ok(None);
    }
    let rows = decoder.rows.unwrap_or(0);
    let channels = decoder.channels.unwrap_or(0);
    let (rows, channels) = if kind == Kind::Wavelength {
        (0, rows)
    } else {
        (rows, channels)
    };
    Ok(Some(Record::from_parts(
        kind,
        revision,
        rows,
        channels,
        decoder.fields,
        decoder.units,
    )))
}

fn missing(kind: Kind, desc: &FieldDescriptor) -> OifitsError {
    OifitsError::MissingMandatoryField {
        kind,
        field: desc.name().to_owned(),
    }
}

/// Pick the schema table: explicit revision, then the source's revision
/// keyword, then the kind default.
fn resolve_table(
    kind: Kind,
    source: &dyn FieldSource,
    options: &BuildOptions,
    diag: &mut Diagnostics,
) -> Result<Option<&'static SchemaTable>, Halt> {
    let declared = match revision_descriptor(kind) {
        Some(desc) if options.revision.is_none() => match source.fetch(desc) {
            Some(raw) => match scalar(kind, desc, raw) {
                Ok(Value::Integer(v)) => v.first().copied(),
                Ok(_) => None,
                Err(err) => {
                    diag.error(err)?;
                    return Ok(None);
                }
            },
            None => None,
        },
        _ => None,
    };
    let revision = match (options.revision, declared) {
        (Some(forced), _) => i64::from(forced),
        (None, Some(declared)) => declared,
        (None, None) if options.apply_defaults => i64::from(kind.default_revision()),
        (None, None) if kind == Kind::Flux => {
            debug!("OI_FLUX without OI_REVN, assuming revision 1");
            1
        }
        (None, None) => {
            diag.error(OifitsError::MissingMandatoryField {
                kind,
                field: REVISION_FIELD.to_owned(),
            })?;
            return Ok(None);
        }
    };
    let table = u32::try_from(revision)
        .ok()
        .and_then(|rev| lookup(kind, rev).ok());
    if table.is_none() {
        diag.error(OifitsError::SchemaViolation { kind, revision })?;
    }
    Ok(table)
}

/// Validate a header value: one element of the declared primitive.
fn scalar(kind: Kind, desc: &FieldDescriptor, raw: RawField) -> Result<Value, OifitsError> {
    if raw.array.len() != 1 {
        return Err(OifitsError::BadCellShape {
            kind,
            field: desc.name().to_owned(),
            detail: format!("expected a single value, got shape {:?}", raw.array.shape()),
        });
    }
    let (data, _) = raw.array.into_parts();
    promote(kind, desc, data)
}

fn promote(kind: Kind, desc: &FieldDescriptor, data: RawData) -> Result<Value, OifitsError> {
    Value::promote(data, desc.primitive()).map_err(|found| OifitsError::WrongPrimitiveType {
        kind,
        field: desc.name().to_owned(),
        expected: desc.primitive(),
        found,
    })
}

fn declared_unit(raw: &RawField) -> Option<String> {
    raw.unit
        .as_deref()
        .map(str::trim)
        .filter(|unit| !unit.is_empty() && *unit != "-")
        .map(str::to_owned)
}

struct Decoder {
    kind: Kind,
    fields: BTreeMap<&'static str, Field>,
    units: BTreeMap<&'static str, String>,
    rows: Option<usize>,
    channels: Option<usize>,
}

impl Decoder {
    fn header(
        &mut self,
        desc: &'static FieldDescriptor,
        raw: RawField,
        diag: &mut Diagnostics,
    ) -> Result<(), Halt> {
        let unit = declared_unit(&raw);
        match scalar(self.kind, desc, raw) {
            Ok(value) => {
                self.store(desc, Field::new(value, Vec::new()), unit);
                Ok(())
            }
            Err(err) => diag.error(err),
        }
    }

    fn column(
        &mut self,
        desc: &'static FieldDescriptor,
        raw: RawField,
        diag: &mut Diagnostics,
    ) -> Result<(), Halt> {
        let kind = self.kind;
        let unit = declared_unit(&raw);
        let (data, shape) = raw.array.into_parts();
        let (rows, cell_dims) = match shape.split_first() {
            Some((&rows, cell)) => (rows, cell.to_vec()),
            None => (1, Vec::new()),
        };
        match self.rows {
            None => self.rows = Some(rows),
            Some(expected) if expected != rows => {
                return diag.error(OifitsError::InconsistentRowCount {
                    kind,
                    field: desc.name().to_owned(),
                    expected,
                    found: rows,
                });
            }
            Some(_) => {}
        }
        let value = match promote(kind, desc, data) {
            Ok(value) => value,
            Err(err) => return diag.error(err),
        };
        let cell: usize = cell_dims.iter().product();
        let shaped = match desc.cardinality() {
            _ if desc.primitive() == PrimitiveKind::String => {
                (cell == 1).then_some((value, Vec::new()))
            }
            Cardinality::Fixed(n) => {
                (cell == n as usize).then_some((value, desc.cardinality().cell_dims(0)))
            }
            Cardinality::PerChannel(n) => self.per_channel(desc, n, value, &cell_dims),
        };
        match shaped {
            Some((value, cell_dims)) => {
                let mut dims = vec![rows];
                dims.extend(cell_dims);
                self.store(desc, Field::new(value, dims), unit);
                Ok(())
            }
            None => diag.error(OifitsError::BadCellShape {
                kind,
                field: desc.name().to_owned(),
                detail: self.expected_cell(desc, &cell_dims),
            }),
        }
    }

    /// Check (and if needed infer) the channel axes of an n-dimensional cell.
    fn per_channel(
        &mut self,
        desc: &FieldDescriptor,
        n: u32,
        value: Value,
        cell_dims: &[usize],
    ) -> Option<(Value, Vec<usize>)> {
        let cell: usize = cell_dims.iter().product();
        let channels = match self.channels {
            Some(channels) => channels,
            None => {
                let channels = infer_channels(cell, n)?;
                debug!(kind = %self.kind, field = desc.name(), channels, "inferred channel count");
                self.channels = Some(channels);
                channels
            }
        };
        let expected = desc.cardinality().cell_dims(channels);
        if cell_dims == expected.as_slice() {
            return Some((value, expected));
        }
        let implicit_axes = channels == 1
            && cell_dims.len() <= expected.len()
            && cell_dims.iter().all(|&d| d == 1);
        if implicit_axes {
            return Some((value, expected));
        }
        // Legacy writers store FLAG as one value per row regardless of the
        // spectral axis.
        if desc.name() == FLAG_FIELD && cell == 1 {
            let times = desc.cardinality().cell_size(channels);
            debug!(kind = %self.kind, channels, "broadcasting per-row flag across channels");
            return Some((value.repeat_each(times), expected));
        }
        None
    }

    fn expected_cell(&self, desc: &FieldDescriptor, cell_dims: &[usize]) -> String {
        match (desc.cardinality(), self.channels) {
            _ if desc.primitive() == PrimitiveKind::String => {
                format!("expected one string per row, got cell {cell_dims:?}")
            }
            (Cardinality::Fixed(n), _) => format!("expected {n} value(s) per row, got cell {cell_dims:?}"),
            (card, Some(channels)) => format!(
                "expected cell {:?} for {channels} channel(s), got {cell_dims:?}",
                card.cell_dims(channels)
            ),
            (_, None) => format!("cannot infer a channel count from cell {cell_dims:?}"),
        }
    }

    fn store(&mut self, desc: &'static FieldDescriptor, field: Field, unit: Option<String>) {
        let name = desc.name();
        if let Some(unit) = unit {
            self.units.insert(name, unit);
        }
        self.fields.insert(name, field);
    }
}

/// `round(cell^(1/n))`, accepted only if it reproduces `cell` exactly.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn infer_channels(cell: usize, n: u32) -> Option<usize> {
    if cell == 0 {
        return None;
    }
    let root = (cell as f64).powf(1.0 / f64::from(n)).round() as usize;
    (root.checked_pow(n) == Some(cell)).then_some(root)
}

/// Wire form of one header keyword.
#[derive(Clone, PartialEq, Debug)]
pub struct EncodedKeyword {
    /// Keyword name.
    pub name: &'static str,
    /// 0-d value.
    pub value: RawArray,
    /// Comment (the unit, if any).
    pub comment: Option<String>,
}

/// Wire form of one table column.
#[derive(Clone, PartialEq, Debug)]
pub struct EncodedColumn {
    /// Column name.
    pub name: &'static str,
    /// FITS `TFORM`, `<repeat><letter>`.
    pub tform: String,
    /// Column unit.
    pub unit: Option<String>,
    /// Values, shape `[rows, cell axes...]`.
    pub array: RawArray,
}

/// Wire form of one record.
#[derive(Clone, PartialEq, Debug)]
pub struct EncodedTable {
    /// `OI_<KIND>`.
    pub extname: &'static str,
    /// Revision keyword first, then headers in schema order.
    pub keywords: Vec<EncodedKeyword>,
    /// Columns in schema order.
    pub columns: Vec<EncodedColumn>,
}

/// Encode a record for writing.
///
/// # Errors
///
/// [`OifitsError::SchemaViolation`] if the record's revision has no table,
/// [`OifitsError::ValueOutOfRange`] if an integer does not fit its wire
/// width.
pub fn encode(record: &Record) -> Result<EncodedTable, OifitsError> {
    let kind = record.kind();
    let table = lookup(kind, record.revision()).map_err(|_| OifitsError::SchemaViolation {
        kind,
        revision: i64::from(record.revision()),
    })?;
    let mut keywords = Vec::with_capacity(table.headers().len());
    for desc in table.headers() {
        let value = if desc.is_revision() {
            Value::Integer(vec![i64::from(record.revision())])
        } else {
            match record.field(desc.name()) {
                Some(field) => field.value().clone(),
                None => continue,
            }
        };
        keywords.push(EncodedKeyword {
            name: desc.wire_name(),
            value: RawArray::new(narrow(kind, desc, &value)?, Vec::new())?,
            comment: record.unit(desc.name()).map(str::to_owned),
        });
    }
    let mut columns = Vec::with_capacity(table.columns().len());
    for desc in table.columns() {
        let Some(field) = record.field(desc.name()) else {
            continue;
        };
        let repeat = match field.value() {
            Value::Text(v) => v.iter().map(String::len).max().unwrap_or(0).max(1),
            _ => field.cell_len(),
        };
        columns.push(EncodedColumn {
            name: desc.wire_name(),
            tform: format!("{repeat}{}", desc.code().letter()),
            unit: record.unit(desc.name()).map(str::to_owned),
            array: RawArray::new(narrow(kind, desc, field.value())?, field.dims().to_vec())?,
        });
    }
    Ok(EncodedTable {
        extname: kind.extname(),
        keywords,
        columns,
    })
}

fn narrow(kind: Kind, desc: &FieldDescriptor, value: &Value) -> Result<RawData, OifitsError> {
    let code: TypeCode = desc.code();
    value.to_raw(code).ok_or_else(|| OifitsError::ValueOutOfRange {
        kind,
        field: desc.name().to_owned(),
        code: code.letter(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Fields;

    fn vis2_fields(cell: &[usize]) -> Fields {
        let rows = 3;
        let size: usize = cell.iter().product();
        let mut shape = vec![rows];
        shape.extend_from_slice(cell);
        let grid = |v: f64| RawArray::new(RawData::Float64(vec![v; rows * size]), shape.clone()).unwrap();
        Fields::new()
            .with("date_obs", "2024-03-01")
            .with("insname", "SPEC")
            .with("target_id", vec![1_i16; rows])
            .with("time", vec![0.0_f64; rows])
            .with("mjd", vec![60_000.0_f64; rows])
            .with("int_time", vec![1.0_f64; rows])
            .with("vis2data", grid(0.5))
            .with("vis2err", grid(0.01))
            .with("ucoord", vec![10.0_f64; rows])
            .with("vcoord", vec![20.0_f64; rows])
            .with(
                "sta_index",
                RawArray::new(RawData::Int16(vec![1, 2, 1, 3, 2, 3]), vec![rows, 2]).unwrap(),
            )
    }

    #[test]
    fn channels_are_inferred_from_the_first_per_channel_column() {
        let rec = build(Kind::Vis2, &vis2_fields(&[2]), &BuildOptions::default()).unwrap();
        assert_eq!(rec.revision(), 2);
        assert_eq!(rec.row_count(), 3);
        assert_eq!(rec.channel_count(), 2);
        assert_eq!(rec.field("vis2data").unwrap().dims(), &[3, 2]);
        assert_eq!(rec.field("flag").unwrap().dims(), &[3, 2]);
        assert!(rec.flag().unwrap().iter().all(|f| !f));
        assert_eq!(rec.integers("target_id"), Some(&[1, 1, 1][..]));
    }

    #[test]
    fn single_channel_cells_may_omit_their_axis() {
        let rec = build(Kind::Vis2, &vis2_fields(&[]), &BuildOptions::default()).unwrap();
        assert_eq!(rec.channel_count(), 1);
        assert_eq!(rec.field("vis2data").unwrap().dims(), &[3, 1]);
    }

    #[test]
    fn later_columns_must_match_the_inferred_channels() {
        let wide = RawArray::new(RawData::Float64(vec![0.1; 9]), vec![3, 3]).unwrap();
        let fields = vis2_fields(&[2]).with("vis2err", wide);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors.errors()[0],
            OifitsError::BadCellShape { field, .. } if field == "vis2err"
        ));
    }

    #[test]
    fn legacy_flag_is_broadcast() {
        let fields = vis2_fields(&[2]).with("flag", vec![true, false, true]);
        let rec = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap();
        assert_eq!(
            rec.flag().unwrap(),
            &[true, true, false, false, true, true][..]
        );
    }

    #[test]
    fn broadcast_is_limited_to_flag() {
        let fields = vis2_fields(&[2]).with("vis2err", vec![0.1_f64; 3]);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap_err();
        assert!(errors.any(|e| matches!(e, OifitsError::BadCellShape { field, .. } if field == "vis2err")));
    }

    #[test]
    fn row_counts_must_agree() {
        let fields = vis2_fields(&[2]).with("mjd", vec![1.0_f64; 4]);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors.errors()[0],
            OifitsError::InconsistentRowCount { expected: 3, found: 4, .. }
        ));
    }

    #[test]
    fn narrowing_is_a_type_error() {
        let fields = vis2_fields(&[2]).with("target_id", vec![1.0_f64; 3]);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap_err();
        assert!(errors.any(|e| matches!(
            e,
            OifitsError::WrongPrimitiveType { expected: PrimitiveKind::Integer, found: "float64", .. }
        )));
    }

    #[test]
    fn stop_reports_only_the_first_error() {
        let mut fields = vis2_fields(&[2]);
        fields.remove("insname");
        fields.remove("date_obs");
        let options = BuildOptions {
            policy: ErrorPolicy::Stop,
            ..BuildOptions::default()
        };
        assert_eq!(build(Kind::Vis2, &fields, &options).unwrap_err().len(), 1);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn warn_and_continue_drops_bad_fields() {
        let fields = vis2_fields(&[2]).with("arrname", 7_i32);
        let options = BuildOptions {
            policy: ErrorPolicy::WarnAndContinue,
            ..BuildOptions::default()
        };
        let rec = build(Kind::Vis2, &fields, &options).unwrap();
        assert_eq!(rec.arrname(), None);
    }

    #[test]
    fn unknown_revision_is_a_schema_violation() {
        let fields = vis2_fields(&[2]);
        let options = BuildOptions {
            revision: Some(3),
            ..BuildOptions::default()
        };
        let errors = build(Kind::Vis2, &fields, &options).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[OifitsError::SchemaViolation { kind: Kind::Vis2, revision: 3 }]
        );
    }

    #[test]
    fn file_decoding_requires_a_revision_except_for_flux() {
        let fields = vis2_fields(&[2]);
        let errors = build(Kind::Vis2, &fields, &BuildOptions::for_file(ErrorPolicy::Accumulate))
            .unwrap_err();
        assert!(errors.any(|e| matches!(e, OifitsError::MissingMandatoryField { field, .. } if field == "revn")));
    }

    #[test]
    fn file_decoding_defaults_a_missing_flag() {
        let options = BuildOptions {
            revision: Some(2),
            ..BuildOptions::for_file(ErrorPolicy::Accumulate)
        };
        let rec = build(Kind::Vis2, &vis2_fields(&[2]), &options).unwrap();
        assert_eq!(rec.field("flag").unwrap().dims(), &[3, 2]);
        assert!(rec.flag().unwrap().iter().all(|f| !f));
    }

    #[test]
    fn encode_emits_tforms_and_units() {
        let fields = vis2_fields(&[2]).with_unit("ucoord", vec![10.0_f64; 3], "km");
        let rec = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap();
        let table = encode(&rec).unwrap();
        assert_eq!(table.extname, "OI_VIS2");
        assert_eq!(table.keywords[0].name, "OI_REVN");
        assert_eq!(table.keywords[0].value.data(), &RawData::Int16(vec![2]));
        let col = |name: &str| table.columns.iter().find(|c| c.name == name).unwrap();
        assert_eq!(col("VIS2DATA").tform, "2D");
        assert_eq!(col("STA_INDEX").tform, "2I");
        assert_eq!(col("FLAG").tform, "2L");
        assert_eq!(col("TIME").unit.as_deref(), Some("s"));
        assert_eq!(col("UCOORD").unit.as_deref(), Some("km"));
        assert_eq!(col("VIS2DATA").array.shape(), &[3, 2]);
    }

    #[test]
    fn encode_rejects_integers_wider_than_the_wire() {
        let fields = vis2_fields(&[2]).with("target_id", vec![40_000_i32; 3]);
        let rec = build(Kind::Vis2, &fields, &BuildOptions::default()).unwrap();
        let err = encode(&rec).unwrap_err();
        assert!(matches!(err, OifitsError::ValueOutOfRange { code: 'I', .. }));
    }

    #[test]
    fn channel_inference_requires_a_perfect_power() {
        assert_eq!(infer_channels(4, 2), Some(2));
        assert_eq!(infer_channels(5, 2), None);
        assert_eq!(infer_channels(7, 1), Some(7));
        assert_eq!(infer_channels(0, 1), None);
    }
}
