// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory FITS file for headless testing of the codec.
//!
//! [`MemoryFits`] keeps units as plain vectors. It implements both
//! [`HduReader`] and [`HduWriter`], so a saved collection can be loaded back
//! without touching the filesystem.

use crate::{HduReader, HduWriter, PortError, RawArray, RawColumn};

/// A header keyword stored by [`MemoryFits`].
#[derive(Clone, PartialEq, Debug)]
pub struct MemoryKeyword {
    /// Keyword name.
    pub name: String,
    /// Keyword value (0-d array).
    pub value: RawArray,
    /// Optional comment.
    pub comment: Option<String>,
}

/// A column stored by [`MemoryFits`].
#[derive(Clone, PartialEq, Debug)]
pub struct MemoryColumn {
    /// `TTYPEn`.
    pub name: String,
    /// `TFORMn`.
    pub tform: String,
    /// `TUNITn`.
    pub unit: Option<String>,
    /// Column data.
    pub array: RawArray,
}

/// One unit stored by [`MemoryFits`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MemoryHdu {
    /// `EXTNAME`, `None` for the primary unit.
    pub extname: Option<String>,
    /// Header keywords in write order.
    pub keywords: Vec<MemoryKeyword>,
    /// Columns in declaration order.
    pub columns: Vec<MemoryColumn>,
}

impl MemoryHdu {
    /// Empty binary-table unit named `extname`.
    pub fn table(extname: &str) -> Self {
        Self {
            extname: Some(extname.to_owned()),
            ..Self::default()
        }
    }

    /// Add a keyword (builder style).
    pub fn with_keyword(mut self, name: &str, value: impl Into<RawArray>) -> Self {
        self.keywords.push(MemoryKeyword {
            name: name.to_owned(),
            value: value.into(),
            comment: None,
        });
        self
    }

    /// Add a column (builder style); `TFORM` is left empty.
    pub fn with_column(mut self, name: &str, array: RawArray, unit: Option<&str>) -> Self {
        self.columns.push(MemoryColumn {
            name: name.to_owned(),
            tform: String::new(),
            unit: unit.map(str::to_owned),
            array,
        });
        self
    }

    /// Keyword by name (case-insensitive).
    pub fn keyword(&self, name: &str) -> Option<&MemoryKeyword> {
        self.keywords
            .iter()
            .find(|kw| kw.name.eq_ignore_ascii_case(name))
    }

    /// Column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&MemoryColumn> {
        self.columns
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug)]
struct PendingTable {
    hdu: MemoryHdu,
    declared: Vec<(String, String, Option<String>)>,
}

/// In-memory FITS file.
#[derive(Debug)]
pub struct MemoryFits {
    /// Committed units; unit 0 is an empty primary unit.
    pub hdus: Vec<MemoryHdu>,
    pending: Option<PendingTable>,
}

impl MemoryFits {
    /// File holding only an empty primary unit.
    pub fn new() -> Self {
        Self {
            hdus: vec![MemoryHdu::default()],
            pending: None,
        }
    }

    /// Append a fully formed unit.
    pub fn push(&mut self, hdu: MemoryHdu) {
        self.hdus.push(hdu);
    }

    /// Units with the given `EXTNAME`, in file order.
    pub fn tables<'a>(&'a self, extname: &'a str) -> impl Iterator<Item = &'a MemoryHdu> + 'a {
        self.hdus.iter().filter(move |hdu| {
            hdu.extname
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(extname))
        })
    }

    /// `EXTNAME`s of every unit after the primary one.
    pub fn extnames(&self) -> Vec<&str> {
        self.hdus
            .iter()
            .filter_map(|hdu| hdu.extname.as_deref())
            .collect()
    }

    /// Returns `true` if a table was created but not committed.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn hdu(&self, hdu: usize) -> Result<&MemoryHdu, PortError> {
        self.hdus.get(hdu).ok_or(PortError::NoSuchHdu(hdu))
    }

    fn pending_mut(&mut self) -> Result<&mut PendingTable, PortError> {
        self.pending.as_mut().ok_or(PortError::NoOpenTable)
    }
}

impl Default for MemoryFits {
    fn default() -> Self {
        Self::new()
    }
}

impl HduReader for MemoryFits {
    fn hdu_count(&self) -> usize {
        self.hdus.len()
    }

    fn extname(&self, hdu: usize) -> Result<Option<String>, PortError> {
        Ok(self.hdu(hdu)?.extname.clone())
    }

    fn keyword(&self, hdu: usize, name: &str) -> Result<Option<RawArray>, PortError> {
        Ok(self.hdu(hdu)?.keyword(name).map(|kw| kw.value.clone()))
    }

    fn columns(&self, hdu: usize) -> Result<Vec<RawColumn>, PortError> {
        Ok(self
            .hdu(hdu)?
            .columns
            .iter()
            .map(|col| RawColumn {
                name: col.name.clone(),
                array: col.array.clone(),
                unit: col.unit.clone(),
            })
            .collect())
    }
}

impl HduWriter for MemoryFits {
    fn create_table(&mut self, extname: &str) -> Result<(), PortError> {
        if let Some(previous) = self.pending.take() {
            if !previous.declared.is_empty() {
                let declared = previous.declared.len();
                self.pending = Some(previous);
                return Err(PortError::ColumnCountMismatch {
                    declared,
                    committed: 0,
                });
            }
            self.hdus.push(previous.hdu);
        }
        self.pending = Some(PendingTable {
            hdu: MemoryHdu::table(extname),
            declared: Vec::new(),
        });
        Ok(())
    }

    fn set_keyword(
        &mut self,
        name: &str,
        value: RawArray,
        comment: Option<&str>,
    ) -> Result<(), PortError> {
        let pending = self.pending_mut()?;
        if pending.hdu.keyword(name).is_some() {
            return Err(PortError::DuplicateKeyword(name.to_owned()));
        }
        pending.hdu.keywords.push(MemoryKeyword {
            name: name.to_owned(),
            value,
            comment: comment.map(str::to_owned),
        });
        Ok(())
    }

    fn declare_column(
        &mut self,
        name: &str,
        tform: &str,
        unit: Option<&str>,
    ) -> Result<(), PortError> {
        let pending = self.pending_mut()?;
        pending
            .declared
            .push((name.to_owned(), tform.to_owned(), unit.map(str::to_owned)));
        Ok(())
    }

    fn commit(&mut self, data: Vec<RawArray>) -> Result<(), PortError> {
        let pending = self.pending_mut()?;
        if pending.declared.len() != data.len() {
            return Err(PortError::ColumnCountMismatch {
                declared: pending.declared.len(),
                committed: data.len(),
            });
        }
        let expected = data.first().map_or(0, RawArray::rows);
        for ((name, _, _), array) in pending.declared.iter().zip(&data) {
            if array.rows() != expected {
                return Err(PortError::RowCountMismatch {
                    column: name.clone(),
                    expected,
                    found: array.rows(),
                });
            }
        }
        let PendingTable { mut hdu, declared } = self.pending.take().ok_or(PortError::NoOpenTable)?;
        hdu.columns = declared
            .into_iter()
            .zip(data)
            .map(|((name, tform, unit), array)| MemoryColumn {
                name,
                tform,
                unit,
                array,
            })
            .collect();
        self.hdus.push(hdu);
        Ok(())
    }
}
