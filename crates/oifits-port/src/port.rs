// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reader and writer port traits.

use crate::{PortError, RawArray};

/// One table column as read from a unit.
#[derive(Clone, PartialEq, Debug)]
pub struct RawColumn {
    /// `TTYPEn`.
    pub name: String,
    /// Column data, shape `[rows, cell axes...]`.
    pub array: RawArray,
    /// `TUNITn`, if declared.
    pub unit: Option<String>,
}

/// Read side of a FITS file.
///
/// Units are addressed by position; unit 0 is the primary unit.
pub trait HduReader {
    /// Number of header-data units.
    fn hdu_count(&self) -> usize;

    /// `EXTNAME` of a unit, if it has one.
    fn extname(&self, hdu: usize) -> Result<Option<String>, PortError>;

    /// Value of a header keyword. Returns `None` if the keyword is absent.
    fn keyword(&self, hdu: usize, name: &str) -> Result<Option<RawArray>, PortError>;

    /// Every table column of a unit, in table order.
    fn columns(&self, hdu: usize) -> Result<Vec<RawColumn>, PortError>;
}

/// Write side of a FITS file.
///
/// A table is written as `create_table`, any number of `set_keyword` and
/// `declare_column` calls, then one `commit` carrying the column data in
/// declaration order.
pub trait HduWriter {
    /// Start a new binary-table unit.
    fn create_table(&mut self, extname: &str) -> Result<(), PortError>;

    /// Set a header keyword on the open unit.
    fn set_keyword(
        &mut self,
        name: &str,
        value: RawArray,
        comment: Option<&str>,
    ) -> Result<(), PortError>;

    /// Declare the next column of the open unit (`TTYPE`, `TFORM`, `TUNIT`).
    fn declare_column(&mut self, name: &str, tform: &str, unit: Option<&str>)
        -> Result<(), PortError>;

    /// Write the column data and close the unit.
    fn commit(&mut self, data: Vec<RawArray>) -> Result<(), PortError>;
}
