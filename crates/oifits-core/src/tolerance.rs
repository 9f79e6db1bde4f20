// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Approximate equality used when deduplicating shared tables.

use serde::{Deserialize, Serialize};

/// Absolute and relative tolerance; both zero means exact comparison.
///
/// Two numbers `a` and `b` are equal when
/// `|a - b| <= absolute + relative * max(|a|, |b|)`. Two NaNs compare equal so
/// that identical tables with undefined entries still deduplicate; an infinity
/// only matches itself.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Absolute slack.
    pub absolute: f64,
    /// Slack relative to the larger magnitude.
    pub relative: f64,
}

impl Tolerance {
    /// Exact comparison.
    pub const EXACT: Tolerance = Tolerance {
        absolute: 0.0,
        relative: 0.0,
    };

    /// Tolerance with the given slacks (negative values are treated as zero).
    pub fn new(absolute: f64, relative: f64) -> Self {
        Self {
            absolute: absolute.max(0.0),
            relative: relative.max(0.0),
        }
    }

    /// Compare two reals.
    #[allow(clippy::float_cmp)]
    pub fn close(self, a: f64, b: f64) -> bool {
        if a == b || (a.is_nan() && b.is_nan()) {
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() <= self.absolute + self.relative * a.abs().max(b.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_only_accepts_identical_values() {
        assert!(Tolerance::EXACT.close(1.0, 1.0));
        assert!(!Tolerance::EXACT.close(1.0, 1.0 + f64::EPSILON));
        assert!(Tolerance::EXACT.close(f64::NAN, f64::NAN));
        assert!(!Tolerance::EXACT.close(f64::NAN, 0.0));
    }

    #[test]
    fn absolute_and_relative_slack_add_up() {
        let tol = Tolerance::new(0.1, 0.01);
        assert!(tol.close(100.0, 101.1));
        assert!(!tol.close(100.0, 101.2));
        assert!(tol.close(0.0, 0.1));
        assert!(!tol.close(0.0, 0.11));
    }

    #[test]
    fn infinities_match_themselves() {
        assert!(Tolerance::EXACT.close(f64::INFINITY, f64::INFINITY));
        assert!(!Tolerance::new(1.0, 1.0).close(f64::INFINITY, f64::NEG_INFINITY));
    }
}
