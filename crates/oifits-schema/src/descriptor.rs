// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field descriptors and per-(kind, revision) schema tables.

use std::fmt;

use crate::Kind;

/// Wire name of the revision keyword every table starts with.
pub const REVISION_WIRE_NAME: &str = "OI_REVN";

/// Field name of the revision keyword.
pub const REVISION_FIELD: &str = "revn";

/// Primitive value family of a field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PrimitiveKind {
    /// FITS `L`.
    Logical,
    /// FITS `B`, `I`, `J`, `K`.
    Integer,
    /// FITS `E`, `D`.
    Real,
    /// FITS `A`.
    String,
    /// FITS `C`, `M`.
    Complex,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Logical => "logical",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Real => "real",
            PrimitiveKind::String => "string",
            PrimitiveKind::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// FITS binary-table type letter a field is written with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeCode {
    /// Logical.
    L,
    /// 16-bit integer.
    I,
    /// 32-bit integer.
    J,
    /// 64-bit integer.
    K,
    /// 32-bit float.
    E,
    /// 64-bit float.
    D,
    /// Complex of two 32-bit floats.
    C,
    /// Complex of two 64-bit floats.
    M,
    /// Character string.
    A,
}

impl TypeCode {
    /// Parse a single type letter.
    pub fn from_letter(letter: &str) -> Option<TypeCode> {
        let code = match letter {
            "L" => TypeCode::L,
            "I" => TypeCode::I,
            "J" => TypeCode::J,
            "K" => TypeCode::K,
            "E" => TypeCode::E,
            "D" => TypeCode::D,
            "C" => TypeCode::C,
            "M" => TypeCode::M,
            "A" => TypeCode::A,
            _ => return None,
        };
        Some(code)
    }

    /// The type letter as written in `TFORMn`.
    pub fn letter(self) -> char {
        match self {
            TypeCode::L => 'L',
            TypeCode::I => 'I',
            TypeCode::J => 'J',
            TypeCode::K => 'K',
            TypeCode::E => 'E',
            TypeCode::D => 'D',
            TypeCode::C => 'C',
            TypeCode::M => 'M',
            TypeCode::A => 'A',
        }
    }

    /// Primitive family of the letter.
    pub fn primitive(self) -> PrimitiveKind {
        match self {
            TypeCode::L => PrimitiveKind::Logical,
            TypeCode::I | TypeCode::J | TypeCode::K => PrimitiveKind::Integer,
            TypeCode::E | TypeCode::D => PrimitiveKind::Real,
            TypeCode::C | TypeCode::M => PrimitiveKind::Complex,
            TypeCode::A => PrimitiveKind::String,
        }
    }
}

/// Number of scalar values a field holds per cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cardinality {
    /// Exactly `n` values per cell.
    Fixed(u32),
    /// An `n`-dimensional cell whose every axis has the record's channel count.
    PerChannel(u32),
}

impl Cardinality {
    /// Signed encoding: `+n` fixed, `-n` per-channel.
    pub fn from_signed(value: i32) -> Option<Cardinality> {
        match value {
            0 => None,
            n if n > 0 => Some(Cardinality::Fixed(n.unsigned_abs())),
            n => Some(Cardinality::PerChannel(n.unsigned_abs())),
        }
    }

    /// Inverse of [`Cardinality::from_signed`].
    pub fn signed(self) -> i64 {
        match self {
            Cardinality::Fixed(n) => i64::from(n),
            Cardinality::PerChannel(n) => -i64::from(n),
        }
    }

    /// Number of values per cell once the channel count is known.
    pub fn cell_size(self, channels: usize) -> usize {
        match self {
            Cardinality::Fixed(n) => n as usize,
            Cardinality::PerChannel(n) => channels.pow(n),
        }
    }

    /// Cell axes once the channel count is known (empty for a scalar cell).
    pub fn cell_dims(self, channels: usize) -> Vec<usize> {
        match self {
            Cardinality::Fixed(1) => Vec::new(),
            Cardinality::Fixed(n) => vec![n as usize],
            Cardinality::PerChannel(n) => vec![channels; n as usize],
        }
    }
}

/// Where a field lives in a table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Placement {
    /// A header keyword, one value per record.
    Header,
    /// A table column, one cell per row.
    Column,
}

/// Static description of one field of one table.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) wire_name: &'static str,
    pub(crate) code: TypeCode,
    pub(crate) cardinality: Cardinality,
    pub(crate) placement: Placement,
    pub(crate) unit: Option<&'static str>,
    pub(crate) optional: bool,
}

impl FieldDescriptor {
    /// Field name used by accessors and caller-supplied fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keyword or column name on the wire.
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    /// FITS type letter.
    pub fn code(&self) -> TypeCode {
        self.code
    }

    /// Primitive family.
    pub fn primitive(&self) -> PrimitiveKind {
        self.code.primitive()
    }

    /// Cell cardinality.
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Header or column.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Default unit, if the field has one.
    pub fn unit(&self) -> Option<&'static str> {
        self.unit
    }

    /// Whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// True for the reserved revision keyword.
    pub fn is_revision(&self) -> bool {
        self.name == REVISION_FIELD
    }
}

/// Ordered field list of one (kind, revision) pair.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SchemaTable {
    pub(crate) kind: Kind,
    pub(crate) revision: u32,
    pub(crate) headers: Vec<FieldDescriptor>,
    pub(crate) columns: Vec<FieldDescriptor>,
}

impl SchemaTable {
    /// Kind this table describes.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Revision this table describes.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Header descriptors; the revision keyword comes first.
    pub fn headers(&self) -> &[FieldDescriptor] {
        &self.headers
    }

    /// Column descriptors in table order.
    pub fn columns(&self) -> &[FieldDescriptor] {
        &self.columns
    }

    /// All descriptors, headers first.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.headers.iter().chain(self.columns.iter())
    }

    /// Descriptor by field name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|desc| desc.name == name)
    }

    /// Descriptor by wire name (case-insensitive).
    pub fn by_wire_name(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        let wanted = wire_name.trim();
        self.fields()
            .find(|desc| desc.wire_name.eq_ignore_ascii_case(wanted))
    }
}
