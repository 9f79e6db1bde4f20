// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Literal field tables, one fragment list per (kind, revision).
//!
//! Line format: `<H|C> <WIRE-NAME> <TYPE> <CARDINALITY> <UNIT|-> [opt]`.
//! A negative cardinality `-n` is an n-dimensional per-channel cell.

use crate::Kind;

const TARGET_1: &str = "
H OI_REVN    I  1  -
C TARGET_ID  I  1  -
C TARGET     A  1  -
C RAEP0      D  1  deg
C DECEP0     D  1  deg
C EQUINOX    E  1  yr
C RA_ERR     D  1  deg
C DEC_ERR    D  1  deg
C SYSVEL     D  1  m/s
C VELTYP     A  1  -
C VELDEF     A  1  -
C PMRA       D  1  deg/yr
C PMDEC      D  1  deg/yr
C PMRA_ERR   D  1  deg/yr
C PMDEC_ERR  D  1  deg/yr
C PARALLAX   E  1  deg
C PARA_ERR   E  1  deg
C SPECTYP    A  1  -
";

const TARGET_2: &str = "
C CATEGORY   A  1  -  opt
";

const ARRAY_1: &str = "
H OI_REVN    I  1  -
H ARRNAME    A  1  -
H FRAME      A  1  -
H ARRAYX     D  1  m
H ARRAYY     D  1  m
H ARRAYZ     D  1  m
C TEL_NAME   A  1  -
C STA_NAME   A  1  -
C STA_INDEX  I  1  -
C DIAMETER   E  1  m
C STAXYZ     D  3  m
";

const ARRAY_2: &str = "
C FOV        D  1  arcsec
C FOVTYPE    A  1  -
";

const WAVELENGTH_1: &str = "
H OI_REVN    I  1  -
H INSNAME    A  1  -
C EFF_WAVE   E  1  m
C EFF_BAND   E  1  m
";

/// Header shared by VIS, VIS2 and T3.
const DATA_HEADER_1: &str = "
H OI_REVN    I  1  -
H DATE-OBS   A  1  -
H ARRNAME    A  1  -  opt
H INSNAME    A  1  -
";

const DATA_HEADER_2: &str = "
H CORRNAME   A  1  -  opt
";

/// Leading columns shared by VIS, VIS2 and T3.
const DATA_TIMING: &str = "
C TARGET_ID  I  1  -
C TIME       D  1  s
C MJD        D  1  day
C INT_TIME   D  1  s
";

const VIS_1: &str = "
C VISAMP     D -1  -
C VISAMPERR  D -1  -
C VISPHI     D -1  deg
C VISPHIERR  D -1  deg
C UCOORD     D  1  m
C VCOORD     D  1  m
C STA_INDEX  I  2  -
C FLAG       L -1  -
";

const VIS_2: &str = "
H AMPTYP     A  1  -  opt
H PHITYP     A  1  -  opt
H AMPORDER   J  1  -  opt
H PHIORDER   J  1  -  opt
C CORRINDX_VISAMP  J  1  -  opt
C CORRINDX_VISPHI  J  1  -  opt
C VISREFMAP  L -2  -  opt
C RVIS       D -1  -  opt
C RVISERR    D -1  -  opt
C IVIS       D -1  -  opt
C IVISERR    D -1  -  opt
C CORRINDX_RVIS    J  1  -  opt
C CORRINDX_IVIS    J  1  -  opt
";

const VIS2_1: &str = "
C VIS2DATA   D -1  -
C VIS2ERR    D -1  -
C UCOORD     D  1  m
C VCOORD     D  1  m
C STA_INDEX  I  2  -
C FLAG       L -1  -
";

const VIS2_2: &str = "
C CORRINDX_VIS2DATA  J  1  -  opt
";

const T3_1: &str = "
C T3AMP      D -1  -
C T3AMPERR   D -1  -
C T3PHI      D -1  deg
C T3PHIERR   D -1  deg
C U1COORD    D  1  m
C V1COORD    D  1  m
C U2COORD    D  1  m
C V2COORD    D  1  m
C STA_INDEX  I  3  -
C FLAG       L -1  -
";

const T3_2: &str = "
C CORRINDX_T3AMP  J  1  -  opt
C CORRINDX_T3PHI  J  1  -  opt
";

const FLUX_1: &str = "
H OI_REVN    I  1  -
H DATE-OBS   A  1  -
H INSNAME    A  1  -
H ARRNAME    A  1  -  opt
H CORRNAME   A  1  -  opt
H FOV        D  1  arcsec  opt
H FOVTYPE    A  1  -  opt
H CALSTAT    A  1  -
C TARGET_ID  I  1  -
C MJD        D  1  day
C INT_TIME   D  1  s
C FLUXDATA   D -1  -
C FLUXERR    D -1  -
C CORRINDX_FLUXDATA  J  1  -  opt
C STA_INDEX  I  1  -  opt
C FLAG       L -1  -
";

const INSPOL_1: &str = "
H OI_REVN    I  1  -
H DATE-OBS   A  1  -
H NPOL       J  1  -
H ARRNAME    A  1  -
H ORIENT     A  1  -
H MODEL      A  1  -
C TARGET_ID  I  1  -
C INSNAME    A  1  -
C MJD_OBS    D  1  day
C MJD_END    D  1  day
C JXX        C -1  -
C JYY        C -1  -
C JXY        C -1  -
C JYX        C -1  -
C STA_INDEX  I  1  -
";

const CORR_1: &str = "
H OI_REVN    I  1  -
H CORRNAME   A  1  -
H NDATA      J  1  -
C IINDX      J  1  -
C JINDX      J  1  -
C CORR       D  1  -
";

/// Every (kind, revision) pair with the fragments making up its table.
pub(crate) const TABLES: &[(Kind, u32, &[&str])] = &[
    (Kind::Target, 1, &[TARGET_1]),
    (Kind::Target, 2, &[TARGET_1, TARGET_2]),
    (Kind::Array, 1, &[ARRAY_1]),
    (Kind::Array, 2, &[ARRAY_1, ARRAY_2]),
    (Kind::Wavelength, 1, &[WAVELENGTH_1]),
    (Kind::Wavelength, 2, &[WAVELENGTH_1]),
    (Kind::Vis, 1, &[DATA_HEADER_1, DATA_TIMING, VIS_1]),
    (Kind::Vis, 2, &[DATA_HEADER_1, DATA_HEADER_2, DATA_TIMING, VIS_1, VIS_2]),
    (Kind::Vis2, 1, &[DATA_HEADER_1, DATA_TIMING, VIS2_1]),
    (Kind::Vis2, 2, &[DATA_HEADER_1, DATA_HEADER_2, DATA_TIMING, VIS2_1, VIS2_2]),
    (Kind::T3, 1, &[DATA_HEADER_1, DATA_TIMING, T3_1]),
    (Kind::T3, 2, &[DATA_HEADER_1, DATA_HEADER_2, DATA_TIMING, T3_1, T3_2]),
    (Kind::Flux, 1, &[FLUX_1]),
    (Kind::Inspol, 1, &[INSPOL_1]),
    (Kind::Corr, 1, &[CORR_1]),
];
