// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed constructors, one per record kind.
//!
//! `Record::new_<kind>` builds with default options (latest revision for the
//! kind unless `revn` is supplied, all-false flags when absent);
//! `Collection::add_<kind>` also inserts the result.

use oifits_schema::Kind;

use crate::{build, BuildOptions, Collection, ErrorList, Fields, Record, RecordId};

macro_rules! constructors {
    ($($new:ident, $add:ident => $kind:ident;)+) => {
        impl Record {
            $(
                #[doc = concat!("Build a `", stringify!($kind), "` record from caller-supplied fields.")]
                ///
                /// # Errors
                ///
                /// Every data error found while validating `fields`.
                pub fn $new(fields: &Fields) -> Result<Record, ErrorList> {
                    build(Kind::$kind, fields, &BuildOptions::default())
                }
            )+
        }

        impl Collection {
            $(
                #[doc = concat!("Build a `", stringify!($kind), "` record and insert it.")]
                ///
                /// # Errors
                ///
                /// Every data error found while validating `fields`; nothing is
                /// inserted in that case.
                pub fn $add(&mut self, fields: &Fields) -> Result<RecordId, ErrorList> {
                    Ok(self.insert(Record::$new(fields)?))
                }
            )+
        }
    };
}

constructors! {
    new_target, add_target => Target;
    new_wavelength, add_wavelength => Wavelength;
    new_array, add_array => Array;
    new_vis, add_vis => Vis;
    new_vis2, add_vis2 => Vis2;
    new_t3, add_t3 => T3;
    new_flux, add_flux => Flux;
    new_inspol, add_inspol => Inspol;
    new_corr, add_corr => Corr;
}
