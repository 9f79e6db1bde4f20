// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared fixtures: complete field sets for every record kind.
#![allow(clippy::unwrap_used, dead_code)]

use oifits_core::{Collection, Fields, RawArray, RawData, UpdateOptions};

/// Column of `rows` copies of `value`.
pub fn reals(value: f64, rows: usize) -> Vec<f64> {
    vec![value; rows]
}

/// `[rows, channels]` grid filled with `value`.
pub fn grid(value: f64, rows: usize, channels: usize) -> RawArray {
    RawArray::new(RawData::Float64(vec![value; rows * channels]), vec![rows, channels]).unwrap()
}

/// `[rows, n]` integer cells.
pub fn stations(rows: usize, n: usize) -> RawArray {
    let data = (0..rows * n).map(|i| i16::try_from(i % n + 1).unwrap()).collect();
    RawArray::new(RawData::Int16(data), vec![rows, n]).unwrap()
}

pub fn target_fields(names: &[&str]) -> Fields {
    let rows = names.len();
    let ids: Vec<i16> = (1..=rows).map(|i| i16::try_from(i).unwrap()).collect();
    Fields::new()
        .with("target_id", ids)
        .with("target", names.to_vec())
        .with("raep0", reals(279.23, rows))
        .with("decep0", reals(38.78, rows))
        .with("equinox", vec![2000.0_f32; rows])
        .with("ra_err", reals(0.0, rows))
        .with("dec_err", reals(0.0, rows))
        .with("sysvel", reals(0.0, rows))
        .with("veltyp", vec!["LSR"; rows])
        .with("veldef", vec!["OPTICAL"; rows])
        .with("pmra", reals(0.0, rows))
        .with("pmdec", reals(0.0, rows))
        .with("pmra_err", reals(0.0, rows))
        .with("pmdec_err", reals(0.0, rows))
        .with("parallax", vec![0.0_f32; rows])
        .with("para_err", vec![0.0_f32; rows])
        .with("spectyp", vec!["A0V"; rows])
}

pub fn wavelength_fields(insname: &str, waves: &[f64]) -> Fields {
    Fields::new()
        .with("insname", insname)
        .with("eff_wave", waves.to_vec())
        .with("eff_band", reals(1.0e-8, waves.len()))
}

pub fn array_fields(arrname: &str, diameters: &[f32]) -> Fields {
    let rows = diameters.len();
    let names: Vec<String> = (1..=rows).map(|i| format!("AT{i}")).collect();
    let stations: Vec<String> = (1..=rows).map(|i| format!("A{i}")).collect();
    let index: Vec<i16> = (1..=rows).map(|i| i16::try_from(i).unwrap()).collect();
    let xyz = RawArray::new(RawData::Float64(vec![1.0; rows * 3]), vec![rows, 3]).unwrap();
    Fields::new()
        .with("arrname", arrname)
        .with("frame", "GEOCENTRIC")
        .with("arrayx", 1_942_014.0_f64)
        .with("arrayy", -5_455_311.0_f64)
        .with("arrayz", -2_654_895.0_f64)
        .with("tel_name", names)
        .with("sta_name", stations)
        .with("sta_index", index)
        .with("diameter", diameters.to_vec())
        .with("staxyz", xyz)
        .with("fov", reals(0.5, rows))
        .with("fovtype", vec!["FWHM"; rows])
}

/// VIS2 record with one row per entry of `target_ids`.
pub fn vis2_fields(insname: &str, target_ids: &[i16], channels: usize) -> Fields {
    let rows = target_ids.len();
    Fields::new()
        .with("date_obs", "2024-03-01")
        .with("insname", insname)
        .with("target_id", target_ids.to_vec())
        .with("time", reals(0.0, rows))
        .with("mjd", reals(60_370.0, rows))
        .with("int_time", reals(10.0, rows))
        .with("vis2data", grid(0.8, rows, channels))
        .with("vis2err", grid(0.02, rows, channels))
        .with("ucoord", reals(30.0, rows))
        .with("vcoord", reals(-12.0, rows))
        .with("sta_index", stations(rows, 2))
}

pub fn vis_fields(insname: &str, rows: usize, channels: usize) -> Fields {
    Fields::new()
        .with("date_obs", "2024-03-01")
        .with("insname", insname)
        .with("target_id", vec![1_i16; rows])
        .with("time", reals(0.0, rows))
        .with("mjd", reals(60_370.0, rows))
        .with("int_time", reals(10.0, rows))
        .with("visamp", grid(0.9, rows, channels))
        .with("visamperr", grid(0.01, rows, channels))
        .with("visphi", grid(1.5, rows, channels))
        .with("visphierr", grid(0.1, rows, channels))
        .with("ucoord", reals(30.0, rows))
        .with("vcoord", reals(-12.0, rows))
        .with("sta_index", stations(rows, 2))
}

pub fn t3_fields(insname: &str, rows: usize, channels: usize) -> Fields {
    Fields::new()
        .with("date_obs", "2024-03-01")
        .with("insname", insname)
        .with("target_id", vec![1_i16; rows])
        .with("time", reals(0.0, rows))
        .with("mjd", reals(60_370.0, rows))
        .with("int_time", reals(10.0, rows))
        .with("t3amp", grid(0.5, rows, channels))
        .with("t3amperr", grid(0.05, rows, channels))
        .with("t3phi", grid(12.0, rows, channels))
        .with("t3phierr", grid(1.0, rows, channels))
        .with("u1coord", reals(10.0, rows))
        .with("v1coord", reals(20.0, rows))
        .with("u2coord", reals(-5.0, rows))
        .with("v2coord", reals(7.0, rows))
        .with("sta_index", stations(rows, 3))
}

pub fn flux_fields(insname: &str, rows: usize, channels: usize) -> Fields {
    Fields::new()
        .with("date_obs", "2024-03-01")
        .with("insname", insname)
        .with("calstat", "C")
        .with("target_id", vec![1_i16; rows])
        .with("mjd", reals(60_370.0, rows))
        .with("int_time", reals(10.0, rows))
        .with("fluxdata", grid(3.2, rows, channels))
        .with("fluxerr", grid(0.3, rows, channels))
}

pub fn corr_fields(corrname: &str) -> Fields {
    Fields::new()
        .with("corrname", corrname)
        .with("ndata", 4_i32)
        .with("iindx", vec![1_i32, 2])
        .with("jindx", vec![2_i32, 3])
        .with("corr", vec![0.1_f64, 0.2])
}

pub fn inspol_fields(arrname: &str, insname: &str, target_ids: &[i16], channels: usize) -> Fields {
    let rows = target_ids.len();
    let jones = |re: f64| {
        RawArray::new(
            RawData::Complex64(vec![[re, 0.0]; rows * channels]),
            vec![rows, channels],
        )
        .unwrap()
    };
    Fields::new()
        .with("date_obs", "2024-03-01")
        .with("npol", 2_i32)
        .with("arrname", arrname)
        .with("orient", "NORTH")
        .with("model", "Jones")
        .with("target_id", target_ids.to_vec())
        .with("insname", vec![insname; rows])
        .with("mjd_obs", reals(60_370.0, rows))
        .with("mjd_end", reals(60_370.1, rows))
        .with("jxx", jones(1.0))
        .with("jyy", jones(1.0))
        .with("jxy", jones(0.0))
        .with("jyx", jones(0.0))
        .with("sta_index", vec![1_i16; rows])
}

/// TARGET "Vega", WAVELENGTH "SPEC" (2 channels), ARRAY "VLTI" and one
/// 3-row VIS2 table, linked.
pub fn linked_collection() -> Collection {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6, 1.7e-6]))
        .unwrap();
    coll.add_array(&array_fields("VLTI", &[1.8, 1.8])).unwrap();
    coll.add_vis2(&vis2_fields("SPEC", &[1, 1, 1], 2).with("arrname", "VLTI"))
        .unwrap();
    coll.update(&UpdateOptions::default()).unwrap();
    coll
}
