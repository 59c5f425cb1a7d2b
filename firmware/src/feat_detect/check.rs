//! Validation engine: the two ways a feature's build state is reconciled
//! with what the hardware reports.

use core::fmt;

use heapless::Vec;

use super::registry::{Feature, FEATURE_COUNT};
use super::state::FeatureState;

/// Why a versioned feature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Built as `Always` but the ID field is below the first supported value.
    NotSupported,
    /// The ID field is newer than anything this firmware knows how to handle.
    UnknownVersion { found: u64, max: u64 },
}

/// A recorded range-check failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub feature: Feature,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::NotSupported => write!(f, "{} not supported by the PE", self.feature),
            MismatchKind::UnknownVersion { found, max } => write!(
                f,
                "{} is version {}, but is only known up to version {}",
                self.feature, found, max
            ),
        }
    }
}

/// Outcome of a failed detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// An `Always` presence feature is missing. Nothing after it was checked.
    Missing(Feature),
    /// One or more versioned features failed their range check.
    Incompatible(Vec<Mismatch, FEATURE_COUNT>),
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::Missing(feature) => write!(f, "{} not supported by the PE", feature),
            DetectError::Incompatible(mismatches) => write!(
                f,
                "{} architecture feature(s) incompatible with this build",
                mismatches.len()
            ),
        }
    }
}

/// Presence check for boolean features.
///
/// The probe only runs for `Always` features. If it reports absence the
/// error is logged and returned at once: there is nothing more to learn
/// about a missing mandatory feature, and the caller must not carry on.
#[inline(always)]
pub fn check_presence(
    feature: Feature,
    state: FeatureState,
    present: impl FnOnce() -> bool,
) -> Result<(), DetectError> {
    if state == FeatureState::Always && !present() {
        log::error!("{} not supported by the PE", feature);
        return Err(DetectError::Missing(feature));
    }
    Ok(())
}

/// State of one detection pass.
///
/// Holds the `tainted` flag and the mismatches behind it. Range failures
/// are collected here so one boot log lists every incompatible feature;
/// the verdict is taken by [`DetectionSession::finish`].
#[derive(Debug, Default)]
pub struct DetectionSession {
    tainted: bool,
    mismatches: Vec<Mismatch, FEATURE_COUNT>,
}

impl DetectionSession {
    pub const fn new() -> Self {
        DetectionSession {
            tainted: false,
            mismatches: Vec::new(),
        }
    }

    /// Range check for versioned features.
    ///
    /// `Disabled` features are skipped without reading the field. An
    /// `Always` feature below `min` and any enabled feature above `max`
    /// taint the pass; neither stops it.
    #[inline(always)]
    pub fn check_feature(
        &mut self,
        feature: Feature,
        state: FeatureState,
        field: impl FnOnce() -> u64,
        min: u64,
        max: u64,
    ) {
        if state == FeatureState::Disabled {
            return;
        }
        debug_assert!(min <= max);

        let value = field();
        if state == FeatureState::Always && value < min {
            self.record(Mismatch {
                feature,
                kind: MismatchKind::NotSupported,
            });
        }
        if value > max {
            self.record(Mismatch {
                feature,
                kind: MismatchKind::UnknownVersion { found: value, max },
            });
        }
    }

    fn record(&mut self, mismatch: Mismatch) {
        log::error!("{}", mismatch);
        self.tainted = true;
        // One slot per feature; with min <= max a feature fails at most once.
        let _ = self.mismatches.push(mismatch);
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// End the pass: `Ok` if nothing was recorded.
    pub fn finish(self) -> Result<(), DetectError> {
        if self.tainted {
            Err(DetectError::Incompatible(self.mismatches))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_presence_disabled_and_check_never_probe() {
        let calls = Cell::new(0);
        let probe = || {
            calls.set(calls.get() + 1);
            false
        };
        assert!(check_presence(Feature::Sb, FeatureState::Disabled, probe).is_ok());
        assert!(check_presence(Feature::Sb, FeatureState::Check, probe).is_ok());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_presence_always() {
        assert_eq!(check_presence(Feature::Pan, FeatureState::Always, || true), Ok(()));
        assert_eq!(
            check_presence(Feature::Pan, FeatureState::Always, || false),
            Err(DetectError::Missing(Feature::Pan))
        );
    }

    #[test]
    fn test_range_disabled_skips_probe() {
        let mut session = DetectionSession::new();
        let read = Cell::new(false);
        session.check_feature(
            Feature::Hcx,
            FeatureState::Disabled,
            || {
                read.set(true);
                99
            },
            1,
            1,
        );
        assert!(!read.get());
        assert!(!session.is_tainted());
        assert!(session.finish().is_ok());
    }

    #[test]
    fn test_range_below_min() {
        let mut session = DetectionSession::new();
        session.check_feature(Feature::AmuV1, FeatureState::Always, || 0, 1, 2);
        assert!(session.is_tainted());
        assert_eq!(
            session.mismatches(),
            &[Mismatch {
                feature: Feature::AmuV1,
                kind: MismatchKind::NotSupported
            }]
        );
    }

    #[test]
    fn test_range_below_min_is_fine_for_check() {
        let mut session = DetectionSession::new();
        session.check_feature(Feature::AmuV1, FeatureState::Check, || 0, 1, 2);
        assert!(!session.is_tainted());
    }

    #[test]
    fn test_range_above_max_for_always_and_check() {
        for state in [FeatureState::Always, FeatureState::Check] {
            let mut session = DetectionSession::new();
            session.check_feature(Feature::Brbe, state, || 3, 1, 2);
            assert!(session.is_tainted());
            assert_eq!(
                session.mismatches()[0].kind,
                MismatchKind::UnknownVersion { found: 3, max: 2 }
            );
        }
    }

    #[test]
    fn test_range_inside_bounds() {
        let mut session = DetectionSession::new();
        for value in 1..=2 {
            session.check_feature(Feature::Ecv, FeatureState::Always, || value, 1, 2);
            session.check_feature(Feature::Ecv, FeatureState::Check, || value, 1, 2);
        }
        assert!(!session.is_tainted());
        assert!(session.mismatches().is_empty());
    }

    #[test]
    fn test_failures_accumulate() {
        let mut session = DetectionSession::new();
        session.check_feature(Feature::Trf, FeatureState::Always, || 0, 1, 1);
        session.check_feature(Feature::Fgt, FeatureState::Always, || 1, 1, 1);
        session.check_feature(Feature::Trbe, FeatureState::Check, || 2, 1, 1);

        match session.finish() {
            Err(DetectError::Incompatible(mismatches)) => {
                assert_eq!(mismatches.len(), 2);
                assert_eq!(mismatches[0].feature, Feature::Trf);
                assert_eq!(mismatches[1].feature, Feature::Trbe);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_diagnostic_text() {
        let missing = Mismatch {
            feature: Feature::Hcx,
            kind: MismatchKind::NotSupported,
        };
        assert_eq!(format!("{}", missing), "FEAT_HCX not supported by the PE");

        let newer = Mismatch {
            feature: Feature::AmuV1,
            kind: MismatchKind::UnknownVersion { found: 3, max: 2 },
        };
        assert_eq!(
            format!("{}", newer),
            "FEAT_AMUv1 is version 3, but is only known up to version 2"
        );

        assert_eq!(
            format!("{}", DetectError::Missing(Feature::Bti)),
            "FEAT_BTI not supported by the PE"
        );
    }
}
