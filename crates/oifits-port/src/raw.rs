// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed arrays as they cross the FITS boundary.

use crate::PortError;

/// Flat element storage, tagged with the on-disk element type.
#[derive(Clone, PartialEq, Debug)]
pub enum RawData {
    /// `L` elements.
    Logical(Vec<bool>),
    /// `B` elements.
    UInt8(Vec<u8>),
    /// `I` elements.
    Int16(Vec<i16>),
    /// `J` elements.
    Int32(Vec<i32>),
    /// `K` elements.
    Int64(Vec<i64>),
    /// `E` elements.
    Float32(Vec<f32>),
    /// `D` elements.
    Float64(Vec<f64>),
    /// `C` elements as `[re, im]`.
    Complex32(Vec<[f32; 2]>),
    /// `M` elements as `[re, im]`.
    Complex64(Vec<[f64; 2]>),
    /// `A` elements, one string per cell.
    Text(Vec<String>),
}

impl RawData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            RawData::Logical(v) => v.len(),
            RawData::UInt8(v) => v.len(),
            RawData::Int16(v) => v.len(),
            RawData::Int32(v) => v.len(),
            RawData::Int64(v) => v.len(),
            RawData::Float32(v) => v.len(),
            RawData::Float64(v) => v.len(),
            RawData::Complex32(v) => v.len(),
            RawData::Complex64(v) => v.len(),
            RawData::Text(v) => v.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable element type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawData::Logical(_) => "logical",
            RawData::UInt8(_) => "uint8",
            RawData::Int16(_) => "int16",
            RawData::Int32(_) => "int32",
            RawData::Int64(_) => "int64",
            RawData::Float32(_) => "float32",
            RawData::Float64(_) => "float64",
            RawData::Complex32(_) => "complex64",
            RawData::Complex64(_) => "complex128",
            RawData::Text(_) => "string",
        }
    }
}

/// Row-major array with an explicit shape.
///
/// For a column the first axis is the row axis and the remaining axes
/// describe one cell. A 0-d array (empty shape) holds exactly one element.
#[derive(Clone, PartialEq, Debug)]
pub struct RawArray {
    data: RawData,
    shape: Vec<usize>,
}

impl RawArray {
    /// Wrap `data` with `shape`; the shape must account for every element.
    pub fn new(data: RawData, shape: Vec<usize>) -> Result<Self, PortError> {
        let len = data.len();
        if shape.iter().product::<usize>() != len {
            return Err(PortError::ShapeMismatch { shape, len });
        }
        Ok(Self { data, shape })
    }

    /// One-dimensional array over all of `data`.
    pub fn vector(data: RawData) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// Element storage.
    pub fn data(&self) -> &RawData {
        &self.data
    }

    /// Consume the array, returning its storage and shape.
    pub fn into_parts(self) -> (RawData, Vec<usize>) {
        (self.data, self.shape)
    }

    /// Full shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` for a 0-d array.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Length of the row axis (1 for a 0-d array).
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    /// Axes of one cell.
    pub fn cell_dims(&self) -> &[usize] {
        self.shape.get(1..).unwrap_or(&[])
    }

    /// Elements per cell.
    pub fn cell_len(&self) -> usize {
        self.cell_dims().iter().product()
    }
}

macro_rules! raw_from {
    ($($elem:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$elem>> for RawArray {
                fn from(values: Vec<$elem>) -> Self {
                    RawArray::vector(RawData::$variant(values))
                }
            }

            impl From<$elem> for RawArray {
                fn from(value: $elem) -> Self {
                    RawArray {
                        data: RawData::$variant(vec![value]),
                        shape: Vec::new(),
                    }
                }
            }
        )*
    };
}

raw_from! {
    bool => Logical,
    u8 => UInt8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    [f32; 2] => Complex32,
    [f64; 2] => Complex64,
    String => Text,
}

impl From<&str> for RawArray {
    fn from(value: &str) -> Self {
        RawArray::from(value.to_owned())
    }
}

impl From<Vec<&str>> for RawArray {
    fn from(values: Vec<&str>) -> Self {
        RawArray::from(values.into_iter().map(str::to_owned).collect::<Vec<_>>())
    }
}
