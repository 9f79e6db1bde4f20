// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Binary-table port contract for OI-FITS.
//!
//! This crate defines what the OI-FITS core needs from a FITS library and
//! nothing more. It contains NO byte-level encoding; adapters over a real FITS
//! implementation live elsewhere.
//!
//! # Design Principles
//!
//! - **Typed arrays at the boundary**: keywords and columns cross as
//!   [`RawArray`] values carrying their storage type and row-major shape.
//! - **Reader and writer are separate ports**: [`HduReader`] enumerates and
//!   reads units, [`HduWriter`] creates them one table at a time.
//! - **[`MemoryFits`]** implements both for headless tests.
#![forbid(unsafe_code)]

use thiserror::Error;

mod memory;
mod port;
mod raw;

pub use memory::{MemoryColumn, MemoryFits, MemoryHdu, MemoryKeyword};
pub use port::{HduReader, HduWriter, RawColumn};
pub use raw::{RawArray, RawData};

/// Error type for port operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The requested unit does not exist.
    #[error("[PORT_NO_HDU] no header-data unit #{0}")]
    NoSuchHdu(usize),
    /// A keyword or column was written with no table open.
    #[error("[PORT_NO_TABLE] no table is open for writing")]
    NoOpenTable,
    /// Shape does not match the number of elements.
    #[error("[PORT_SHAPE] shape {shape:?} does not hold {len} elements")]
    ShapeMismatch {
        /// Declared shape.
        shape: Vec<usize>,
        /// Element count.
        len: usize,
    },
    /// Committed data does not match the declared columns.
    #[error("[PORT_COLUMNS] declared {declared} columns, committed {committed}")]
    ColumnCountMismatch {
        /// Columns declared with `declare_column`.
        declared: usize,
        /// Arrays handed to `commit`.
        committed: usize,
    },
    /// Committed columns disagree on their row count.
    #[error("[PORT_ROWS] column `{column}` has {found} rows, expected {expected}")]
    RowCountMismatch {
        /// Offending column.
        column: String,
        /// Rows of the first column.
        expected: usize,
        /// Rows of this column.
        found: usize,
    },
    /// A keyword was set twice on the same unit.
    #[error("[PORT_KEYWORD] keyword `{0}` already set")]
    DuplicateKeyword(String),
}
