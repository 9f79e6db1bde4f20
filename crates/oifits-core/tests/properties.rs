// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property tests for cell cardinality and tolerance comparison.
#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use common::*;
use oifits_core::{OifitsError, Record, Tolerance};
use proptest::prelude::*;

proptest! {
    #[test]
    fn per_channel_fields_take_the_inferred_width(rows in 1usize..6, channels in 1usize..9) {
        let ids = vec![1_i16; rows];
        let rec = Record::new_vis2(&vis2_fields("SPEC", &ids, channels)).unwrap();
        prop_assert_eq!(rec.row_count(), rows);
        prop_assert_eq!(rec.channel_count(), channels);
        for name in ["vis2data", "vis2err", "flag"] {
            prop_assert_eq!(rec.field(name).unwrap().dims(), &[rows, channels][..]);
        }
        prop_assert_eq!(rec.field("sta_index").unwrap().dims(), &[rows, 2][..]);
    }

    #[test]
    fn mismatched_cells_are_rejected(rows in 1usize..6, channels in 2usize..9, extra in 1usize..4) {
        let ids = vec![1_i16; rows];
        let fields = vis2_fields("SPEC", &ids, channels)
            .with("vis2err", grid(0.02, rows, channels + extra));
        let errors = Record::new_vis2(&fields).unwrap_err();
        let rejected = errors.any(|e| matches!(
            e,
            OifitsError::BadCellShape { field, .. } if field == "vis2err"
        ));
        prop_assert!(rejected);
    }

    #[test]
    fn tolerance_is_symmetric(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6, rel in 0.0f64..0.1) {
        let tol = Tolerance::new(0.0, rel);
        prop_assert_eq!(tol.close(a, b), tol.close(b, a));
        prop_assert!(tol.close(a, a));
    }

    #[test]
    fn exact_tolerance_only_accepts_equal_values(a in any::<f64>(), b in any::<f64>()) {
        let equal = a == b || (a.is_nan() && b.is_nan());
        prop_assert_eq!(Tolerance::EXACT.close(a, b), equal);
    }
}
