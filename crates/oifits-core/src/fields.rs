// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field sources consumed by the record codec.

use std::collections::BTreeMap;

use oifits_port::RawArray;
use oifits_schema::FieldDescriptor;

/// One raw value handed to the codec.
#[derive(Clone, PartialEq, Debug)]
pub struct RawField {
    /// Values with their shape; `[rows, cell axes...]` for a column.
    pub array: RawArray,
    /// Declared unit, if any.
    pub unit: Option<String>,
}

/// Capability that yields raw values by descriptor.
pub trait FieldSource {
    /// Value for `descriptor`, or `None` when the source lacks it.
    fn fetch(&self, descriptor: &FieldDescriptor) -> Option<RawField>;

    /// Every field name the caller supplied, for rejecting unknown names.
    ///
    /// Sources that cannot enumerate their contents return an empty list.
    fn supplied_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Caller-supplied fields keyed by field name.
///
/// Names are normalised the way schema field names are: lower case, `-`
/// replaced by `_`. Both `"DATE-OBS"` and `"date_obs"` address the same field.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Fields {
    entries: BTreeMap<String, RawField>,
}

impl Fields {
    /// Empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Fields::set`].
    #[must_use]
    pub fn with(mut self, name: &str, array: impl Into<RawArray>) -> Self {
        self.set(name, array);
        self
    }

    /// Builder form of [`Fields::set`] with an explicit unit.
    #[must_use]
    pub fn with_unit(mut self, name: &str, array: impl Into<RawArray>, unit: &str) -> Self {
        self.entries.insert(
            normalize(name),
            RawField {
                array: array.into(),
                unit: Some(unit.to_owned()),
            },
        );
        self
    }

    /// Set or replace a field.
    pub fn set(&mut self, name: &str, array: impl Into<RawArray>) {
        self.entries.insert(
            normalize(name),
            RawField {
                array: array.into(),
                unit: None,
            },
        );
    }

    /// Remove a field, returning it.
    pub fn remove(&mut self, name: &str) -> Option<RawField> {
        self.entries.remove(&normalize(name))
    }

    /// Look a field up by name.
    pub fn get(&self, name: &str) -> Option<&RawField> {
        self.entries.get(&normalize(name))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FieldSource for Fields {
    fn fetch(&self, descriptor: &FieldDescriptor) -> Option<RawField> {
        self.entries.get(descriptor.name()).cloned()
    }

    fn supplied_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use oifits_schema::{lookup, Kind};

    #[test]
    fn names_are_normalised() {
        let fields = Fields::new().with("DATE-OBS", "2024-01-01");
        assert!(fields.get("date_obs").is_some());
        assert_eq!(fields.supplied_names(), vec!["date_obs".to_owned()]);
    }

    #[test]
    fn fetch_uses_the_descriptor_name() {
        let table = lookup(Kind::Wavelength, 2).unwrap();
        let desc = table.field("eff_wave").unwrap();
        let fields = Fields::new().with_unit("EFF_WAVE", vec![1.0e-6_f64], "m");
        let raw = fields.fetch(desc).unwrap();
        assert_eq!(raw.unit.as_deref(), Some("m"));
        assert_eq!(raw.array.len(), 1);
    }
}
