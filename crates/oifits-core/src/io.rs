// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Loading collections from, and saving them to, the FITS port.

use std::collections::BTreeMap;

use oifits_port::{HduReader, HduWriter, PortError, RawArray};
use oifits_schema::{registry, FieldDescriptor, Kind, Placement};
use tracing::{debug, info, info_span, instrument};

use crate::codec::{decode, encode, EncodedTable};
use crate::diagnostics::{Diagnostics, Halt};
use crate::{
    BuildOptions, Collection, ErrorList, ErrorPolicy, FieldSource, OifitsError, RawField,
    UpdateOptions,
};

/// Knobs for [`load`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LoadOptions {
    /// Reaction to data errors while decoding tables.
    pub policy: ErrorPolicy,
    /// Options for the final linking pass.
    pub update: UpdateOptions,
}

/// Field source over one header-data unit.
///
/// Keywords are looked up by wire name; every keyword any revision of the
/// kind defines is read up front so that decoding never touches the port.
#[derive(Clone, Debug, Default)]
pub struct HduFields {
    keywords: BTreeMap<&'static str, RawArray>,
    columns: BTreeMap<String, RawField>,
    duplicates: Vec<String>,
}

impl HduFields {
    /// Read the keywords and columns of unit `hdu` for a table of `kind`.
    pub fn read(reader: &dyn HduReader, hdu: usize, kind: Kind) -> Result<Self, PortError> {
        let mut fields = Self::default();
        for table in registry().tables_for(kind) {
            for desc in table.headers() {
                let wire = desc.wire_name();
                if fields.keywords.contains_key(wire) {
                    continue;
                }
                if let Some(value) = reader.keyword(hdu, wire)? {
                    fields.keywords.insert(wire, value);
                }
            }
        }
        for column in reader.columns(hdu)? {
            let name = column.name.trim().to_ascii_uppercase();
            if fields.columns.contains_key(&name) {
                fields.duplicates.push(name);
                continue;
            }
            fields.columns.insert(
                name,
                RawField {
                    array: column.array,
                    unit: column.unit,
                },
            );
        }
        Ok(fields)
    }

    /// Column names that appeared more than once.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

impl FieldSource for HduFields {
    fn fetch(&self, descriptor: &FieldDescriptor) -> Option<RawField> {
        match descriptor.placement() {
            Placement::Header => self.keywords.get(descriptor.wire_name()).map(|value| RawField {
                array: value.clone(),
                unit: None,
            }),
            Placement::Column => self.columns.get(descriptor.wire_name()).cloned(),
        }
    }
}

/// Decode every OI table of a file into a linked collection.
///
/// Units whose `EXTNAME` is not an OI table are skipped.
///
/// # Errors
///
/// All decoding errors across all units, reported once the whole file has
/// been read; otherwise the errors of the final `update`.
#[instrument(skip_all, fields(hdus = reader.hdu_count()))]
pub fn load(reader: &dyn HduReader, options: &LoadOptions) -> Result<Collection, ErrorList> {
    let mut diag = Diagnostics::new(options.policy);
    let build = BuildOptions::for_file(options.policy);
    let mut collection = Collection::new();
    for hdu in 0..reader.hdu_count() {
        match load_hdu(reader, hdu, &build, &mut diag) {
            Ok(Some(record)) => {
                collection.insert(record);
            }
            Ok(None) => {}
            Err(Halt) => break,
        }
    }
    if diag.has_errors() {
        let (errors, _) = diag.into_parts();
        return Err(ErrorList::new(errors));
    }
    collection.update(&options.update)?;
    info!(records = collection.len(), revision = collection.revision(), "loaded");
    Ok(collection)
}

fn load_hdu(
    reader: &dyn HduReader,
    hdu: usize,
    build: &BuildOptions,
    diag: &mut Diagnostics,
) -> Result<Option<crate::Record>, Halt> {
    let extname = match reader.extname(hdu) {
        Ok(extname) => extname,
        Err(err) => {
            diag.error(err.into())?;
            return Ok(None);
        }
    };
    let Some(kind) = extname.as_deref().and_then(Kind::from_extname) else {
        debug!(hdu, ?extname, "skipping non-OI unit");
        return Ok(None);
    };
    let _span = info_span!("hdu", hdu, %kind).entered();
    let fields = match HduFields::read(reader, hdu, kind) {
        Ok(fields) => fields,
        Err(err) => {
            diag.error(err.into())?;
            return Ok(None);
        }
    };
    for name in fields.duplicates() {
        diag.error(OifitsError::DuplicateField {
            kind,
            field: name.clone(),
        })?;
    }
    decode(kind, &fields, build, diag)
}

/// Write a clean collection, one binary table per record.
///
/// Order: TARGET, ARRAY, WAVELENGTH, CORR, INSPOL, then the data-bearing
/// records in traversal order.
///
/// # Errors
///
/// [`OifitsError::Dirty`] if `update` has not run, encoding errors and
/// port failures.
#[instrument(skip_all, fields(records = collection.len()))]
pub fn save(collection: &Collection, writer: &mut dyn HduWriter) -> Result<(), OifitsError> {
    let records: Vec<_> = collection.iter_chain()?.collect();
    let shared = [Kind::Target, Kind::Array, Kind::Wavelength, Kind::Corr, Kind::Inspol];
    let ordered = shared
        .iter()
        .flat_map(|&kind| records.iter().filter(move |(_, r)| r.kind() == kind))
        .chain(records.iter().filter(|(_, r)| r.is_data()));
    let mut written = 0_usize;
    for (id, record) in ordered {
        debug!(%id, kind = %record.kind(), "writing table");
        write_table(encode(record)?, writer)?;
        written += 1;
    }
    info!(tables = written, "saved");
    Ok(())
}

fn write_table(table: EncodedTable, writer: &mut dyn HduWriter) -> Result<(), PortError> {
    writer.create_table(table.extname)?;
    for keyword in table.keywords {
        writer.set_keyword(keyword.name, keyword.value, keyword.comment.as_deref())?;
    }
    let mut data = Vec::with_capacity(table.columns.len());
    for column in table.columns {
        writer.declare_column(column.name, &column.tform, column.unit.as_deref())?;
        data.push(column.array);
    }
    writer.commit(data)
}
