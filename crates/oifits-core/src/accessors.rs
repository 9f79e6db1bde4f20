// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed per-field accessors on [`Record`].
//!
//! Each accessor returns `None` when the field is absent from the record
//! (optional field not supplied, or not defined for the record's kind and
//! revision).

use crate::Record;

macro_rules! accessors {
    ($via:ident -> $ret:ty : $($name:ident),+ $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($name), "` field.")]
            pub fn $name(&self) -> Option<$ret> {
                self.$via(stringify!($name))
            }
        )+
    };
}

/// Header keywords.
impl Record {
    accessors!(text -> &str:
        date_obs, arrname, insname, corrname, frame, calstat, amptyp, phityp,
        orient, model, fovtype,
    );
    accessors!(integer -> i64: amporder, phiorder, npol, ndata);
    accessors!(real -> f64: arrayx, arrayy, arrayz, fov);
}

/// Table columns.
impl Record {
    accessors!(integers -> &[i64]:
        target_id, sta_index, corrindx_visamp, corrindx_visphi, corrindx_rvis,
        corrindx_ivis, corrindx_vis2data, corrindx_t3amp, corrindx_t3phi,
        corrindx_fluxdata, iindx, jindx,
    );
    accessors!(reals -> &[f64]:
        raep0, decep0, equinox, ra_err, dec_err, sysvel, pmra, pmdec, pmra_err,
        pmdec_err, parallax, para_err, diameter, staxyz, eff_wave, eff_band,
        time, mjd, int_time, visamp, visamperr, visphi, visphierr, rvis,
        rviserr, ivis, iviserr, vis2data, vis2err, t3amp, t3amperr, t3phi,
        t3phierr, ucoord, vcoord, u1coord, v1coord, u2coord, v2coord,
        fluxdata, fluxerr, mjd_obs, mjd_end, corr,
    );
    accessors!(texts -> &[String]:
        target, veltyp, veldef, spectyp, category, tel_name, sta_name,
    );
    accessors!(logicals -> &[bool]: flag, visrefmap);
    accessors!(complexes -> &[[f64; 2]]: jxx, jyy, jxy, jyx);

    /// `fov` column of an ARRAY table (a header keyword in FLUX).
    pub fn fov_column(&self) -> Option<&[f64]> {
        self.reals("fov")
    }

    /// `fovtype` column of an ARRAY table (a header keyword in FLUX).
    pub fn fovtype_column(&self) -> Option<&[String]> {
        self.texts("fovtype")
    }

    /// Per-row instrument names of an INSPOL table.
    pub fn insname_column(&self) -> Option<&[String]> {
        self.texts("insname")
    }
}
