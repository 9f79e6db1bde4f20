// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! OI-FITS domain model.
//!
//! A [`Collection`] owns the [`Record`]s of one OI-FITS file. Records are
//! built from any [`FieldSource`] by the schema-driven codec ([`build`],
//! or the typed `Record::new_<kind>` constructors), inserted, then linked by
//! [`Collection::update`]. [`merge`] combines collections and
//! [`select_target`] extracts a single-target subset. [`load`] and [`save`]
//! talk to a FITS library through the `oifits-port` traits.
//!
//! # Error handling
//!
//! Data errors never panic. Each pass takes an explicit [`ErrorPolicy`]:
//! stop on the first error, accumulate every error, or log and continue.
//! Accumulating passes return an [`ErrorList`].
#![forbid(unsafe_code)]

mod accessors;
mod codec;
mod collection;
mod config;
mod constructors;
mod diagnostics;
mod error;
mod fields;
mod io;
mod link;
mod merge;
mod record;
mod select;
mod tolerance;
mod value;

pub use codec::{build, encode, BuildOptions, EncodedColumn, EncodedKeyword, EncodedTable};
pub use collection::Collection;
pub use config::{ConfigError, OifitsConfig};
pub use diagnostics::ErrorPolicy;
pub use error::{ErrorList, OifitsError};
pub use fields::{FieldSource, Fields, RawField};
pub use io::{load, save, HduFields, LoadOptions};
pub use link::UpdateOptions;
pub use merge::{merge, MergeOptions, MergeSource};
pub use record::{Links, Record, RecordId};
pub use select::select_target;
pub use tolerance::Tolerance;
pub use value::{Field, Value};

pub use oifits_port::{RawArray, RawData};
pub use oifits_schema::{Kind, MAX_REVISION};
