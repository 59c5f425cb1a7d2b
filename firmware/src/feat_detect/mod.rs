//! Architecture feature detection.
//!
//! The firmware is built assuming a set of architecture extensions, each with
//! a build state (see [`FeatureState`]):
//!
//! - `Disabled`: not used, never probed.
//! - `Always`: used unconditionally. The PE must implement it, otherwise
//!   context save/restore and register setup later in boot would fault.
//! - `Check`: used when the PE reports it.
//!
//! [`detect_arch_features`] runs once at cold boot, before any of that setup,
//! and stops the boot when the build and the hardware disagree.
//!
//! # Failure policy
//!
//! There are two kinds of check and they fail differently:
//!
//! 1. **Presence** (boolean features): a missing `Always` feature is logged
//!    and the pass ends right there. No later feature is probed.
//! 2. **Range** (versioned ID fields): an `Always` feature below its minimum,
//!    or any enabled feature above the newest version the firmware knows,
//!    is logged and taints the pass. The remaining features are still
//!    checked so the log lists every problem, then the pass fails.
//!
//! A failed pass ends in `panic!`; the image's panic handler owns what
//! happens next. There is no recovery path.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Early platform setup, before touching any feature-dependent register:
//! firmware::feat_detect::detect_arch_features();
//!
//! // Later, gating optional code on a `Check` feature:
//! if is_feature_supported::<BuildConfig, _>(Feature::Trf, &SystemRegisters) {
//!     enable_trace_filter();
//! }
//! ```

mod check;
mod registry;
mod state;

pub use check::{check_presence, DetectError, DetectionSession, Mismatch, MismatchKind};
pub use registry::{registry, ArchVersion, Feature, FeatureDescriptor, Probe, FEATURE_COUNT};
pub use state::{FeatureConfig, FeatureState};

use crate::arch_impl::traits::FeatureProbe;

/// Run one detection pass and return the verdict.
///
/// Features are checked in registry order. A missing mandatory boolean
/// feature returns immediately; range failures are aggregated and returned
/// after every feature has been checked.
pub fn run_detection<C: FeatureConfig, P: FeatureProbe>(hw: &P) -> Result<(), DetectError> {
    let mut session = DetectionSession::new();

    for descriptor in registry::<C, P>() {
        if descriptor.state.is_enabled() {
            log::debug!(
                "feat_detect: {} {} ({:?})",
                descriptor.feature.arch(),
                descriptor.feature,
                descriptor.state
            );
        }
        descriptor.validate(hw, &mut session)?;
    }

    session.finish()
}

/// Validate the build configuration `C` against `hw`.
///
/// Returns only if the pass succeeded. On failure the diagnostics have
/// already been logged and this panics.
pub fn detect_arch_features_with<C: FeatureConfig, P: FeatureProbe>(hw: &P) {
    match run_detection::<C, P>(hw) {
        Ok(()) => log::info!("feat_detect: enabled architecture features present"),
        Err(err) => panic!("feat_detect: {}", err),
    }
}

/// Validate this build's feature flags against the running PE.
#[cfg(target_arch = "aarch64")]
pub fn detect_arch_features() {
    use crate::arch_impl::aarch64::SystemRegisters;
    use crate::platform_config::BuildConfig;

    detect_arch_features_with::<BuildConfig, SystemRegisters>(&SystemRegisters);
}

/// Whether code gated on `feature` may use it under build configuration `C`.
///
/// `Disabled` is always false and `Always` always true (the boot pass has
/// already validated it); only `Check` features consult the hardware.
pub fn is_feature_supported<C: FeatureConfig, P: FeatureProbe>(feature: Feature, hw: &P) -> bool {
    feature.descriptor::<C, P>().is_supported(hw)
}
