// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-call error sink.
//!
//! Every pass that can hit data errors (`build`, `update`, `load`) owns one
//! [`Diagnostics`] created from the caller's [`ErrorPolicy`]. Reporting an
//! error returns `Err(Halt)` when the policy says the pass must stop, so the
//! pass unwinds with `?`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::OifitsError;

/// How a pass reacts to a data error.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the pass on the first error.
    Stop,
    /// Record every error, finish the pass, then fail.
    #[default]
    Accumulate,
    /// Log errors as warnings and carry on as if the field were absent.
    WarnAndContinue,
}

/// Returned when the active policy aborts the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Halt;

#[derive(Debug)]
pub(crate) struct Diagnostics {
    policy: ErrorPolicy,
    errors: Vec<OifitsError>,
    warnings: Vec<OifitsError>,
}

impl Diagnostics {
    pub(crate) fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Report a data error under the active policy.
    pub(crate) fn error(&mut self, error: OifitsError) -> Result<(), Halt> {
        match self.policy {
            ErrorPolicy::Stop => {
                debug!(%error, "stopping on first error");
                self.errors.push(error);
                Err(Halt)
            }
            ErrorPolicy::Accumulate => {
                debug!(%error, "error recorded");
                self.errors.push(error);
                Ok(())
            }
            ErrorPolicy::WarnAndContinue => {
                warn!(%error, "continuing past error");
                self.warnings.push(error);
                Ok(())
            }
        }
    }

    /// Report a condition that never aborts.
    pub(crate) fn warning(&mut self, warning: OifitsError) {
        warn!(%warning, "oifits warning");
        self.warnings.push(warning);
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<OifitsError>, Vec<OifitsError>) {
        (self.errors, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_halts_on_first_error() {
        let mut diag = Diagnostics::new(ErrorPolicy::Stop);
        assert_eq!(diag.error(OifitsError::Dirty), Err(Halt));
        assert!(diag.has_errors());
    }

    #[test]
    fn accumulate_keeps_going() {
        let mut diag = Diagnostics::new(ErrorPolicy::Accumulate);
        assert_eq!(diag.error(OifitsError::Dirty), Ok(()));
        assert_eq!(diag.error(OifitsError::Dirty), Ok(()));
        assert_eq!(diag.error_count(), 2);
    }

    #[test]
    fn warn_and_continue_demotes_errors() {
        let mut diag = Diagnostics::new(ErrorPolicy::WarnAndContinue);
        assert_eq!(diag.error(OifitsError::Dirty), Ok(()));
        diag.warning(OifitsError::Dirty);
        let (errors, warnings) = diag.into_parts();
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn policy_names_are_snake_case() {
        let json = serde_json::to_string(&ErrorPolicy::WarnAndContinue).unwrap_or_default();
        assert_eq!(json, "\"warn_and_continue\"");
    }
}
