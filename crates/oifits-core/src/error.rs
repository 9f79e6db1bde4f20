// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types shared by the codec, the linking pass, merge and selection.

use std::fmt;

use oifits_port::PortError;
use oifits_schema::{Kind, PrimitiveKind, SchemaError};
use thiserror::Error;

use crate::RecordId;

/// A single data, linking or usage error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OifitsError {
    /// No schema table exists for the (kind, revision) pair.
    #[error("[OIFITS_SCHEMA] no {kind} table for revision {revision}")]
    SchemaViolation {
        /// Record kind.
        kind: Kind,
        /// Requested revision.
        revision: i64,
    },
    /// A record carries a revision its kind does not support.
    #[error("[OIFITS_REVISION] {kind} record {record}: revision {revision} outside 1..={max}")]
    BadRevision {
        /// Record kind.
        kind: Kind,
        /// Record identity at the time of the check.
        record: RecordId,
        /// Offending revision.
        revision: i64,
        /// Highest allowed revision.
        max: u32,
    },
    /// A forced collection revision is below a member's or above the maximum.
    #[error("[OIFITS_REVISION] cannot force revision {forced}: members need {required}, maximum is {max}")]
    BadForcedRevision {
        /// Requested revision.
        forced: u32,
        /// Highest member revision.
        required: u32,
        /// Highest supported revision.
        max: u32,
    },
    /// A mandatory field is absent.
    #[error("[OIFITS_MISSING_FIELD] {kind}: mandatory field `{field}` is missing")]
    MissingMandatoryField {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
    },
    /// A caller supplied a field the schema does not define.
    #[error("[OIFITS_UNKNOWN_FIELD] {kind}: no field named `{field}`")]
    UnknownField {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
    },
    /// A value has the wrong primitive type (or would need narrowing).
    #[error("[OIFITS_TYPE] {kind}: field `{field}` expects {expected}, got {found}")]
    WrongPrimitiveType {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
        /// Declared primitive.
        expected: PrimitiveKind,
        /// Storage type supplied.
        found: &'static str,
    },
    /// A column disagrees with the row count of the first column.
    #[error("[OIFITS_ROWS] {kind}: column `{field}` has {found} rows, expected {expected}")]
    InconsistentRowCount {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of this column.
        found: usize,
    },
    /// A cell does not have the shape its cardinality requires.
    #[error("[OIFITS_SHAPE] {kind}: field `{field}`: {detail}")]
    BadCellShape {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
        /// What was expected and found.
        detail: String,
    },
    /// A field was supplied twice.
    #[error("[OIFITS_DUPLICATE_FIELD] {kind}: field `{field}` appears more than once")]
    DuplicateField {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
    },
    /// A value does not fit the wire type it must be written as.
    #[error("[OIFITS_RANGE] {kind}: field `{field}` does not fit TFORM `{code}`")]
    ValueOutOfRange {
        /// Record kind.
        kind: Kind,
        /// Field name.
        field: String,
        /// Wire type letter.
        code: char,
    },
    /// Two shared tables of one kind carry the same cross-reference name.
    #[error("[OIFITS_DUPLICATE_NAME] two {kind} tables are named `{name}`")]
    DuplicateCrossReferenceName {
        /// Shared-table kind.
        kind: Kind,
        /// Normalised name.
        name: String,
    },
    /// A cross-reference name does not resolve (or resolves inconsistently).
    #[error("[OIFITS_UNRESOLVED] {kind} record {record}: {target} `{name}`: {detail}")]
    UnresolvedCrossReference {
        /// Kind of the referring record.
        kind: Kind,
        /// Identity of the referring record.
        record: RecordId,
        /// Kind of the referenced table.
        target: Kind,
        /// Normalised name.
        name: String,
        /// Why resolution failed.
        detail: String,
    },
    /// The collection does not hold exactly one TARGET record.
    #[error("[OIFITS_TARGET] expected exactly one OI_TARGET table, found {count}")]
    MissingOrDuplicateTarget {
        /// Number of TARGET records.
        count: usize,
    },
    /// Two tables that must be identical differ.
    #[error("[OIFITS_MERGE_CONFLICT] {origin}: {kind} `{name}` differs in field `{field}`")]
    MergeConflict {
        /// Source being merged.
        origin: String,
        /// Table kind.
        kind: Kind,
        /// Cross-reference or target name.
        name: String,
        /// First differing field.
        field: String,
    },
    /// A target pattern matched zero or several targets.
    #[error("[OIFITS_SELECT] pattern `{pattern}` matches {matches} targets, expected exactly one")]
    AmbiguousTargetSelection {
        /// Pattern as given.
        pattern: String,
        /// Number of matching targets.
        matches: usize,
    },
    /// A target pattern is not a valid glob.
    #[error("[OIFITS_PATTERN] invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Pattern as given.
        pattern: String,
        /// Parser message.
        message: String,
    },
    /// The collection must be updated before this operation.
    #[error("[OIFITS_DIRTY] collection was modified; run update first")]
    Dirty,
    /// No record with this identity.
    #[error("[OIFITS_NO_RECORD] no record {0}")]
    UnknownRecord(RecordId),
    /// The schema registry refused a lookup.
    #[error("[OIFITS_SCHEMA] {0}")]
    Schema(#[from] SchemaError),
    /// The FITS layer failed.
    #[error("[OIFITS_PORT] {0}")]
    Port(#[from] PortError),
    /// A nested pass reported errors.
    #[error("[OIFITS_INVALID] {0}")]
    Invalid(ErrorList),
}

/// Non-empty list of errors reported by one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorList(Vec<OifitsError>);

impl ErrorList {
    /// Wrap a list of errors.
    pub fn new(errors: Vec<OifitsError>) -> Self {
        Self(errors)
    }

    /// List holding one error.
    pub fn single(error: OifitsError) -> Self {
        Self(vec![error])
    }

    /// The errors, in report order.
    pub fn errors(&self) -> &[OifitsError] {
        &self.0
    }

    /// Consume the list.
    pub fn into_vec(self) -> Vec<OifitsError> {
        self.0
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, OifitsError> {
        self.0.iter()
    }

    /// Returns `true` if any error satisfies `pred`.
    pub fn any(&self, pred: impl Fn(&OifitsError) -> bool) -> bool {
        self.0.iter().any(pred)
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s)", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<OifitsError> for ErrorList {
    fn from(error: OifitsError) -> Self {
        Self::single(error)
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a OifitsError;
    type IntoIter = std::slice::Iter<'a, OifitsError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
