// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema registry for OI-FITS tables.
//!
//! Each (kind, revision) pair maps to an ordered list of [`FieldDescriptor`]s,
//! split into header keywords and table columns. The tables are literal text
//! parsed once per process; [`lookup`] is the only query most callers need.
//!
//! # Invariants
//!
//! - Field names and wire names are unique within a table.
//! - Header fields are scalars (cardinality `+1`).
//! - Column fields never have cardinality 0.
//! - The first header of every table is the `OI_REVN` revision keyword.
#![forbid(unsafe_code)]

mod descriptor;
mod error;
mod kind;
mod registry;
mod tables;

pub use descriptor::{
    Cardinality, FieldDescriptor, Placement, PrimitiveKind, SchemaTable, TypeCode,
    REVISION_FIELD, REVISION_WIRE_NAME,
};
pub use error::SchemaError;
pub use kind::{Kind, MAX_REVISION};
pub use registry::{lookup, registry, revision_descriptor, Registry};
