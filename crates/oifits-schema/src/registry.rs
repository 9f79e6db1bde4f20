// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process-wide schema registry built from the literal tables.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use crate::descriptor::{REVISION_FIELD, REVISION_WIRE_NAME};
use crate::tables::TABLES;
use crate::{Cardinality, FieldDescriptor, Kind, Placement, SchemaError, SchemaTable, TypeCode};

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::global);

/// Every schema table, keyed by (kind, revision).
#[derive(Debug)]
pub struct Registry {
    tables: BTreeMap<(Kind, u32), SchemaTable>,
}

impl Registry {
    /// Parse and validate the built-in tables.
    pub fn parse() -> Result<Self, SchemaError> {
        Self::from_fragments(TABLES)
    }

    /// Parse and validate an arbitrary fragment list.
    pub fn from_fragments(entries: &[(Kind, u32, &[&'static str])]) -> Result<Self, SchemaError> {
        let mut tables = BTreeMap::new();
        for &(kind, revision, fragments) in entries {
            let table = parse_table(kind, revision, fragments)?;
            validate(&table)?;
            tables.insert((kind, revision), table);
        }
        Ok(Self { tables })
    }

    // The literal tables are fixed at compile time; a failure here is a
    // programming error caught by the `builtin_tables_parse` test.
    #[allow(clippy::panic)]
    fn global() -> Self {
        match Self::parse() {
            Ok(registry) => registry,
            Err(err) => panic!("built-in OI-FITS schema tables are invalid: {err}"),
        }
    }

    /// Table for one (kind, revision) pair.
    pub fn lookup(&self, kind: Kind, revision: u32) -> Result<&SchemaTable, SchemaError> {
        self.tables
            .get(&(kind, revision))
            .ok_or(SchemaError::UnknownSchema {
                kind,
                revision: i64::from(revision),
            })
    }

    /// All tables of one kind, lowest revision first.
    pub fn tables_for(&self, kind: Kind) -> impl Iterator<Item = &SchemaTable> {
        self.tables
            .range((kind, 0)..=(kind, u32::MAX))
            .map(|(_, table)| table)
    }

    /// All tables.
    pub fn tables(&self) -> impl Iterator<Item = &SchemaTable> {
        self.tables.values()
    }
}

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Shorthand for `registry().lookup(kind, revision)`.
pub fn lookup(kind: Kind, revision: u32) -> Result<&'static SchemaTable, SchemaError> {
    registry().lookup(kind, revision)
}

/// Descriptor of the revision keyword shared by every table of `kind`.
pub fn revision_descriptor(kind: Kind) -> Option<&'static FieldDescriptor> {
    registry()
        .tables_for(kind)
        .next()
        .and_then(|table| table.headers().first())
}

fn field_name(wire_name: &str) -> String {
    if wire_name == REVISION_WIRE_NAME {
        return REVISION_FIELD.to_owned();
    }
    wire_name.to_ascii_lowercase().replace('-', "_")
}

fn parse_table(
    kind: Kind,
    revision: u32,
    fragments: &[&'static str],
) -> Result<SchemaTable, SchemaError> {
    let mut headers = Vec::new();
    let mut columns = Vec::new();
    for fragment in fragments {
        for line in fragment.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let desc = parse_line(line).ok_or_else(|| SchemaError::Malformed {
                kind,
                revision,
                line: line.to_owned(),
            })?;
            match desc.placement {
                Placement::Header => headers.push(desc),
                Placement::Column => columns.push(desc),
            }
        }
    }
    Ok(SchemaTable {
        kind,
        revision,
        headers,
        columns,
    })
}

fn parse_line(line: &'static str) -> Option<FieldDescriptor> {
    let mut tokens = line.split_whitespace();
    let placement = match tokens.next()? {
        "H" => Placement::Header,
        "C" => Placement::Column,
        _ => return None,
    };
    let wire_name = tokens.next()?;
    let code = TypeCode::from_letter(tokens.next()?)?;
    let signed: i32 = tokens.next()?.parse().ok()?;
    // Zero is kept as a sentinel so validation can report it by name.
    let cardinality = Cardinality::from_signed(signed).unwrap_or(Cardinality::Fixed(0));
    let unit = match tokens.next()? {
        "-" => None,
        unit => Some(unit),
    };
    let optional = match tokens.next() {
        None => false,
        Some("opt") => true,
        Some(_) => return None,
    };
    if tokens.next().is_some() {
        return None;
    }
    Some(FieldDescriptor {
        name: field_name(wire_name),
        wire_name,
        code,
        cardinality,
        placement,
        unit,
        optional,
    })
}

fn validate(table: &SchemaTable) -> Result<(), SchemaError> {
    let (kind, revision) = (table.kind, table.revision);
    if table.headers.first().map(|desc| desc.wire_name) != Some(REVISION_WIRE_NAME) {
        return Err(SchemaError::MissingRevisionKeyword { kind, revision });
    }
    let mut names = HashSet::new();
    let mut wire_names = HashSet::new();
    for desc in table.fields() {
        if !names.insert(desc.name.as_str()) {
            return Err(SchemaError::DuplicateName {
                kind,
                revision,
                name: desc.name.clone(),
            });
        }
        if !wire_names.insert(desc.wire_name) {
            return Err(SchemaError::DuplicateWireName {
                kind,
                revision,
                wire_name: desc.wire_name.to_owned(),
            });
        }
    }
    for desc in &table.headers {
        if desc.cardinality != Cardinality::Fixed(1) {
            return Err(SchemaError::HeaderCardinality {
                kind,
                revision,
                name: desc.name.clone(),
            });
        }
    }
    for desc in &table.columns {
        if matches!(
            desc.cardinality,
            Cardinality::Fixed(0) | Cardinality::PerChannel(0)
        ) {
            return Err(SchemaError::ZeroCardinality {
                kind,
                revision,
                name: desc.name.clone(),
            });
        }
    }
    Ok(())
}
