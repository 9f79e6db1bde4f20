// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical field values.
//!
//! Every field is stored in the widest type of its primitive family: `i64`
//! for integers, `f64` for reals and `[f64; 2]` for complex numbers. Narrower
//! wire types are promoted on the way in and narrowed again only when a table
//! is encoded for writing.

use oifits_port::RawData;
use oifits_schema::{PrimitiveKind, TypeCode};

use crate::Tolerance;

/// Flat storage of one field in its canonical type.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    /// Logical values.
    Logical(Vec<bool>),
    /// Integers widened to `i64`.
    Integer(Vec<i64>),
    /// Reals widened to `f64`.
    Real(Vec<f64>),
    /// Complex numbers as `[re, im]`.
    Complex(Vec<[f64; 2]>),
    /// Strings without trailing blanks.
    Text(Vec<String>),
}

impl Value {
    /// Number of scalar elements.
    pub fn len(&self) -> usize {
        match self {
            Value::Logical(v) => v.len(),
            Value::Integer(v) => v.len(),
            Value::Real(v) => v.len(),
            Value::Complex(v) => v.len(),
            Value::Text(v) => v.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Primitive family of the stored values.
    pub fn primitive(&self) -> PrimitiveKind {
        match self {
            Value::Logical(_) => PrimitiveKind::Logical,
            Value::Integer(_) => PrimitiveKind::Integer,
            Value::Real(_) => PrimitiveKind::Real,
            Value::Complex(_) => PrimitiveKind::Complex,
            Value::Text(_) => PrimitiveKind::String,
        }
    }

    /// Promote raw wire data into `want`, refusing any narrowing.
    ///
    /// On failure the raw storage type name is returned for diagnostics.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn promote(raw: RawData, want: PrimitiveKind) -> Result<Value, &'static str> {
        let found = raw.type_name();
        let value = match (want, raw) {
            (PrimitiveKind::Logical, RawData::Logical(v)) => Value::Logical(v),
            (PrimitiveKind::Real, RawData::Float32(v)) => {
                Value::Real(v.into_iter().map(f64::from).collect())
            }
            (PrimitiveKind::Real, RawData::Float64(v)) => Value::Real(v),
            (PrimitiveKind::Complex, RawData::Float32(v)) => {
                Value::Complex(v.into_iter().map(|x| [f64::from(x), 0.0]).collect())
            }
            (PrimitiveKind::Complex, RawData::Float64(v)) => {
                Value::Complex(v.into_iter().map(|x| [x, 0.0]).collect())
            }
            (PrimitiveKind::Complex, RawData::Complex32(v)) => Value::Complex(
                v.into_iter()
                    .map(|[re, im]| [f64::from(re), f64::from(im)])
                    .collect(),
            ),
            (PrimitiveKind::Complex, RawData::Complex64(v)) => Value::Complex(v),
            (PrimitiveKind::String, RawData::Text(v)) => Value::Text(
                v.into_iter()
                    .map(|s| s.trim_end().to_owned())
                    .collect(),
            ),
            (want, raw) => match (want, integers(&raw)) {
                (PrimitiveKind::Integer, Some(ints)) => Value::Integer(ints),
                (PrimitiveKind::Real, Some(ints)) => {
                    Value::Real(ints.into_iter().map(|i| i as f64).collect())
                }
                (PrimitiveKind::Complex, Some(ints)) => {
                    Value::Complex(ints.into_iter().map(|i| [i as f64, 0.0]).collect())
                }
                _ => return Err(found),
            },
        };
        Ok(value)
    }

    /// Narrow to the storage type of a wire type letter.
    ///
    /// Returns `None` if the primitive family does not match or an integer
    /// does not fit the wire width.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_raw(&self, code: TypeCode) -> Option<RawData> {
        let raw = match (code, self) {
            (TypeCode::L, Value::Logical(v)) => RawData::Logical(v.clone()),
            (TypeCode::I, Value::Integer(v)) => RawData::Int16(
                v.iter()
                    .map(|&i| i16::try_from(i).ok())
                    .collect::<Option<_>>()?,
            ),
            (TypeCode::J, Value::Integer(v)) => RawData::Int32(
                v.iter()
                    .map(|&i| i32::try_from(i).ok())
                    .collect::<Option<_>>()?,
            ),
            (TypeCode::K, Value::Integer(v)) => RawData::Int64(v.clone()),
            (TypeCode::E, Value::Real(v)) => RawData::Float32(v.iter().map(|&x| x as f32).collect()),
            (TypeCode::D, Value::Real(v)) => RawData::Float64(v.clone()),
            (TypeCode::C, Value::Complex(v)) => RawData::Complex32(
                v.iter()
                    .map(|&[re, im]| [re as f32, im as f32])
                    .collect(),
            ),
            (TypeCode::M, Value::Complex(v)) => RawData::Complex64(v.clone()),
            (TypeCode::A, Value::Text(v)) => RawData::Text(v.clone()),
            _ => return None,
        };
        Some(raw)
    }

    /// Copy the cells of the given rows (each `cell` elements long).
    pub(crate) fn take_rows(&self, rows: &[usize], cell: usize) -> Value {
        match self {
            Value::Logical(v) => Value::Logical(take_rows(v, rows, cell)),
            Value::Integer(v) => Value::Integer(take_rows(v, rows, cell)),
            Value::Real(v) => Value::Real(take_rows(v, rows, cell)),
            Value::Complex(v) => Value::Complex(take_rows(v, rows, cell)),
            Value::Text(v) => Value::Text(take_rows(v, rows, cell)),
        }
    }

    /// Repeat every element `times` times in place.
    pub(crate) fn repeat_each(&self, times: usize) -> Value {
        match self {
            Value::Logical(v) => Value::Logical(repeat_each(v, times)),
            Value::Integer(v) => Value::Integer(repeat_each(v, times)),
            Value::Real(v) => Value::Real(repeat_each(v, times)),
            Value::Complex(v) => Value::Complex(repeat_each(v, times)),
            Value::Text(v) => Value::Text(repeat_each(v, times)),
        }
    }

    /// Element-wise approximate equality.
    ///
    /// Numbers use `tolerance`; logicals and strings must match literally.
    /// Values of different families or lengths are never equal.
    #[allow(clippy::cast_precision_loss)]
    pub fn approx_eq(&self, other: &Value, tolerance: Tolerance) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match (self, other) {
            (Value::Logical(a), Value::Logical(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a
                .iter()
                .zip(b)
                .all(|(&x, &y)| x == y || tolerance.close(x as f64, y as f64)),
            (Value::Real(a), Value::Real(b)) => {
                a.iter().zip(b).all(|(&x, &y)| tolerance.close(x, y))
            }
            (Value::Complex(a), Value::Complex(b)) => a.iter().zip(b).all(|(x, y)| {
                tolerance.close(x[0], y[0]) && tolerance.close(x[1], y[1])
            }),
            _ => false,
        }
    }
}

fn integers(raw: &RawData) -> Option<Vec<i64>> {
    let ints = match raw {
        RawData::UInt8(v) => v.iter().map(|&i| i64::from(i)).collect(),
        RawData::Int16(v) => v.iter().map(|&i| i64::from(i)).collect(),
        RawData::Int32(v) => v.iter().map(|&i| i64::from(i)).collect(),
        RawData::Int64(v) => v.clone(),
        _ => return None,
    };
    Some(ints)
}

fn take_rows<T: Clone>(values: &[T], rows: &[usize], cell: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len() * cell);
    for &row in rows {
        let start = row * cell;
        if let Some(chunk) = values.get(start..start + cell) {
            out.extend_from_slice(chunk);
        }
    }
    out
}

fn repeat_each<T: Clone>(values: &[T], times: usize) -> Vec<T> {
    values
        .iter()
        .flat_map(|v| std::iter::repeat_n(v.clone(), times))
        .collect()
}

/// A stored field: canonical values plus their shape.
///
/// Header fields have an empty shape. Column fields have shape
/// `[rows, cell axes...]`.
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    value: Value,
    dims: Vec<usize>,
}

impl Field {
    pub(crate) fn new(value: Value, dims: Vec<usize>) -> Self {
        Self { value, dims }
    }

    /// Stored values.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Shape; empty for header fields.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns `true` for a header field.
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Elements per row (1 for a header field).
    pub fn cell_len(&self) -> usize {
        self.dims.get(1..).map_or(1, |axes| axes.iter().product())
    }

    /// Same shape and approximately equal values.
    pub fn approx_eq(&self, other: &Field, tolerance: Tolerance) -> bool {
        self.dims == other.dims && self.value.approx_eq(&other.value, tolerance)
    }

    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub(crate) fn take_rows(&self, rows: &[usize]) -> Field {
        let cell = self.cell_len();
        let mut dims = self.dims.clone();
        if let Some(first) = dims.first_mut() {
            *first = rows.len();
        }
        Field {
            value: self.value.take_rows(rows, cell),
            dims,
        }
    }
}
