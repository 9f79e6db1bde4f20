// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linking pass: cross-reference resolution, uniqueness and traversal.
#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use oifits_core::{
    Collection, ErrorPolicy, Kind, Links, OifitsError, Record, RecordId, UpdateOptions,
};

fn snapshot(coll: &Collection) -> (Vec<RecordId>, Vec<Links>, Vec<RecordId>, u32) {
    let chain = coll.chain().unwrap().to_vec();
    let links = chain.iter().map(|&id| coll.links(id).unwrap()).collect();
    let data = coll.data().unwrap().to_vec();
    (chain, links, data, coll.revision())
}

#[test]
fn scenario_a_links_vis2_to_its_wavelength_table() {
    let target = Record::new_target(&target_fields(&["Vega"])).unwrap();
    let wave = Record::new_wavelength(&wavelength_fields("SPEC", &[1.6e-6, 1.7e-6])).unwrap();
    let vis2 = Record::new_vis2(&vis2_fields("SPEC", &[1, 1, 1], 2)).unwrap();
    assert_eq!(wave.channel_count(), 2);
    assert_eq!(vis2.row_count(), 3);

    let mut coll = Collection::new().with(target).with(wave).with(vis2);
    coll.update(&UpdateOptions::default()).unwrap();

    assert_eq!(coll.revision(), 2);
    assert!(coll.errors().is_empty());
    let vis2_id = coll.data().unwrap()[0];
    let wave_id = coll.wavelengths().unwrap()[0];
    assert_eq!(coll.links(vis2_id).unwrap().wavelength, Some(wave_id));
    assert_eq!(
        coll.wavelength_of(vis2_id).unwrap().unwrap().insname(),
        Some("SPEC")
    );
}

#[test]
fn scenario_b_channel_mismatch_clears_the_link() {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6, 1.7e-6]))
        .unwrap();
    let vis2 = coll.add_vis2(&vis2_fields("SPEC", &[1, 1, 1], 3)).unwrap();

    let errors = coll.update(&UpdateOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors.errors()[0],
        OifitsError::UnresolvedCrossReference { kind: Kind::Vis2, target: Kind::Wavelength, name, .. }
            if name == "SPEC"
    ));
    assert!(!coll.is_dirty());
    assert_eq!(coll.links(vis2).unwrap().wavelength, None);
    assert_eq!(coll.errors().len(), 1);
}

#[test]
fn duplicate_array_names_are_reported() {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_array(&array_fields("VLTI", &[1.8])).unwrap();
    coll.add_array(&array_fields("vlti ", &[8.2])).unwrap();

    let errors = coll.update(&UpdateOptions::default()).unwrap_err();
    assert_eq!(
        errors.errors(),
        &[OifitsError::DuplicateCrossReferenceName {
            kind: Kind::Array,
            name: "VLTI".to_owned(),
        }]
    );
}

#[test]
fn second_target_table_is_reported_and_still_linked() {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_target(&target_fields(&["Altair"])).unwrap();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6, 1.7e-6]))
        .unwrap();
    let vis2 = coll.add_vis2(&vis2_fields("SPEC", &[1], 2)).unwrap();

    let errors = coll.update(&UpdateOptions::default()).unwrap_err();
    assert_eq!(
        errors.errors(),
        &[OifitsError::MissingOrDuplicateTarget { count: 2 }]
    );
    assert!(!coll.is_dirty());
    assert_eq!(coll.targets().unwrap().len(), 2);
    assert!(coll.links(vis2).unwrap().wavelength.is_some());
    assert_eq!(coll.errors().len(), 1);
}

#[test]
fn update_is_idempotent() {
    let mut coll = linked_collection();
    let before = snapshot(&coll);
    coll.update(&UpdateOptions::default()).unwrap();
    assert_eq!(snapshot(&coll), before);

    let force = UpdateOptions {
        force: true,
        ..UpdateOptions::default()
    };
    coll.update(&force).unwrap();
    assert_eq!(snapshot(&coll), before);
}

#[test]
fn traversal_follows_insertion_order() {
    let coll = linked_collection();
    let first = coll.first_record().unwrap().unwrap();
    assert_eq!(coll.get(first).unwrap().kind(), Kind::Target);
    let second = coll.next_record(first).unwrap().unwrap();
    assert_eq!(coll.get(second).unwrap().kind(), Kind::Wavelength);
    let last = coll.last_record().unwrap().unwrap();
    assert_eq!(coll.get(last).unwrap().kind(), Kind::Vis2);
    assert_eq!(coll.next_record(last).unwrap(), None);
    assert!(coll.is_data_record(last));
    assert!(!coll.is_data_record(first));
}

#[test]
fn mutation_requires_a_new_update() {
    let mut coll = linked_collection();
    let vis2 = coll.data().unwrap()[0];
    coll.get_mut(vis2).unwrap();
    assert_eq!(coll.links(vis2), Err(OifitsError::Dirty));
    assert_eq!(coll.first_record(), Err(OifitsError::Dirty));
    coll.update(&UpdateOptions::default()).unwrap();
    assert!(coll.links(vis2).unwrap().array.is_some());
}

#[test]
fn unresolved_array_is_only_a_warning() {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6])).unwrap();
    coll.add_vis2(&vis2_fields("SPEC", &[1], 1).with("arrname", "NOPE"))
        .unwrap();

    coll.update(&UpdateOptions::default()).unwrap();
    assert_eq!(coll.warnings().len(), 1);

    let quiet = UpdateOptions {
        force: true,
        warn_unresolved_array: false,
        ..UpdateOptions::default()
    };
    coll.update(&quiet).unwrap();
    assert!(coll.warnings().is_empty());
}

#[test]
fn correlation_tables_resolve_by_name() {
    let mut coll = Collection::new();
    coll.add_target(&target_fields(&["Vega"])).unwrap();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6, 1.7e-6]))
        .unwrap();
    let vis2 = coll
        .add_vis2(&vis2_fields("SPEC", &[1, 1], 2).with("corrname", "c1"))
        .unwrap();

    let errors = coll.update(&UpdateOptions::default()).unwrap_err();
    assert!(errors.any(|e| matches!(e, OifitsError::UnresolvedCrossReference { target: Kind::Corr, .. })));

    let corr = coll.add_corr(&corr_fields("C1")).unwrap();
    coll.update(&UpdateOptions::default()).unwrap();
    assert_eq!(coll.links(vis2).unwrap().corr, Some(corr));
    assert_eq!(coll.corr_of(vis2).unwrap().unwrap().ndata(), Some(4));
    assert_eq!(coll.get(vis2).unwrap().corrname(), Some("C1"));
}

#[test]
fn inspol_is_classified_separately() {
    let mut coll = linked_collection();
    let inspol = coll
        .add_inspol(&inspol_fields("VLTI", "SPEC", &[1, 1], 2))
        .unwrap();
    coll.update(&UpdateOptions::default()).unwrap();
    assert_eq!(coll.inspols().unwrap(), &[inspol]);
    assert_eq!(coll.data().unwrap().len(), 1);
    assert!(coll.array_of(inspol).unwrap().is_some());
    assert_eq!(coll.get(inspol).unwrap().jxx().unwrap().len(), 4);
}

#[test]
fn warn_and_continue_commits_and_succeeds() {
    let mut coll = Collection::new();
    coll.add_wavelength(&wavelength_fields("SPEC", &[1.6e-6])).unwrap();
    let lenient = UpdateOptions {
        policy: ErrorPolicy::WarnAndContinue,
        ..UpdateOptions::default()
    };
    coll.update(&lenient).unwrap();
    assert!(!coll.is_dirty());
    assert!(coll.errors().is_empty());
    assert!(coll
        .warnings()
        .iter()
        .any(|w| matches!(w, OifitsError::MissingOrDuplicateTarget { count: 0 })));
    assert_eq!(coll.revision(), 2);
}

#[test]
fn every_kind_has_a_constructor() {
    let mut coll = linked_collection();
    coll.add_vis(&vis_fields("SPEC", 2, 2)).unwrap();
    coll.add_t3(&t3_fields("SPEC", 2, 2)).unwrap();
    let flux = coll.add_flux(&flux_fields("SPEC", 2, 2)).unwrap();
    coll.update(&UpdateOptions::default()).unwrap();

    assert_eq!(coll.data().unwrap().len(), 4);
    let flux = coll.get(flux).unwrap();
    assert_eq!(flux.revision(), 1);
    assert_eq!(flux.calstat(), Some("C"));
    assert_eq!(flux.flag().unwrap().len(), 4);
}
