// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Record kinds and their revision ranges.

use std::fmt;

/// Highest format revision any record kind supports.
pub const MAX_REVISION: u32 = 2;

/// The nine OI-FITS table kinds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Kind {
    /// `OI_TARGET`: the target list.
    Target,
    /// `OI_WAVELENGTH`: spectral channels of one instrument.
    Wavelength,
    /// `OI_ARRAY`: station layout of one array.
    Array,
    /// `OI_VIS`: complex visibilities.
    Vis,
    /// `OI_VIS2`: squared visibilities.
    Vis2,
    /// `OI_T3`: triple products (closure phases).
    T3,
    /// `OI_FLUX`: spectra.
    Flux,
    /// `OI_INSPOL`: instrumental polarisation.
    Inspol,
    /// `OI_CORR`: correlation matrix between data points.
    Corr,
}

impl Kind {
    /// Every kind, in canonical write order.
    pub const ALL: [Kind; 9] = [
        Kind::Target,
        Kind::Array,
        Kind::Wavelength,
        Kind::Corr,
        Kind::Inspol,
        Kind::Vis,
        Kind::Vis2,
        Kind::T3,
        Kind::Flux,
    ];

    /// FITS `EXTNAME` of tables of this kind.
    pub fn extname(self) -> &'static str {
        match self {
            Kind::Target => "OI_TARGET",
            Kind::Wavelength => "OI_WAVELENGTH",
            Kind::Array => "OI_ARRAY",
            Kind::Vis => "OI_VIS",
            Kind::Vis2 => "OI_VIS2",
            Kind::T3 => "OI_T3",
            Kind::Flux => "OI_FLUX",
            Kind::Inspol => "OI_INSPOL",
            Kind::Corr => "OI_CORR",
        }
    }

    /// Parse an `EXTNAME` (case-insensitive, surrounding blanks ignored).
    pub fn from_extname(extname: &str) -> Option<Kind> {
        let wanted = extname.trim();
        Kind::ALL
            .into_iter()
            .find(|kind| kind.extname().eq_ignore_ascii_case(wanted))
    }

    /// Revision assumed when a caller does not declare one.
    pub fn default_revision(self) -> u32 {
        match self {
            Kind::Flux | Kind::Inspol | Kind::Corr => 1,
            _ => 2,
        }
    }

    /// Highest revision with a schema table for this kind.
    pub fn max_revision(self) -> u32 {
        match self {
            Kind::Flux | Kind::Inspol | Kind::Corr => 1,
            _ => MAX_REVISION,
        }
    }

    /// True for the measurement kinds (VIS, VIS2, T3, FLUX).
    pub fn is_data(self) -> bool {
        matches!(self, Kind::Vis | Kind::Vis2 | Kind::T3 | Kind::Flux)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extname())
    }
}
