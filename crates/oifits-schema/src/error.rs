// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema registry errors.

use thiserror::Error;

use crate::Kind;

/// Errors raised while building or querying the schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No table exists for the requested pair.
    #[error("[OIFITS_UNKNOWN_SCHEMA] no {kind} table for revision {revision}")]
    UnknownSchema {
        /// Requested kind.
        kind: Kind,
        /// Requested revision.
        revision: i64,
    },
    /// A literal table line could not be parsed.
    #[error("[OIFITS_SCHEMA_MALFORMED] {kind} r{revision}: bad line `{line}`")]
    Malformed {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
        /// Offending line.
        line: String,
    },
    /// Two descriptors share a field name.
    #[error("[OIFITS_SCHEMA_DUPLICATE] {kind} r{revision}: field `{name}` declared twice")]
    DuplicateName {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
        /// Repeated field name.
        name: String,
    },
    /// Two descriptors share a wire name.
    #[error("[OIFITS_SCHEMA_DUPLICATE] {kind} r{revision}: wire name `{wire_name}` declared twice")]
    DuplicateWireName {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
        /// Repeated wire name.
        wire_name: String,
    },
    /// A header descriptor is not a single scalar.
    #[error("[OIFITS_SCHEMA_HEADER] {kind} r{revision}: header `{name}` must have cardinality +1")]
    HeaderCardinality {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
        /// Offending field.
        name: String,
    },
    /// A column descriptor declares cardinality 0.
    #[error("[OIFITS_SCHEMA_CARDINALITY] {kind} r{revision}: column `{name}` has cardinality 0")]
    ZeroCardinality {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
        /// Offending field.
        name: String,
    },
    /// The first header is not the revision keyword.
    #[error("[OIFITS_SCHEMA_REVISION] {kind} r{revision}: first header must be OI_REVN")]
    MissingRevisionKeyword {
        /// Table kind.
        kind: Kind,
        /// Table revision.
        revision: u32,
    },
}
