//! EL3 boot firmware library.
//!
//! Runs on the boot CPU before any other core, MMU or interrupt controller is
//! brought up. The main job of this crate at that point is to make sure the
//! architecture extensions the image was built to assume are actually
//! implemented by the PE, see [`feat_detect`].
//!
//! Boot sequence (as seen from this crate):
//! 1. Platform assembly sets up a stack and calls `bl31_early_platform_setup` (see [`boot`])
//! 2. Serial port and logger come up
//! 3. [`feat_detect`] validates the build flags
//! 4. Control returns to the platform, which continues with feature-dependent setup

#![cfg_attr(not(test), no_std)]

pub mod arch_impl;
pub mod boot;
pub mod feat_detect;
pub mod logger;
pub mod platform_config;

#[cfg(target_arch = "aarch64")]
#[macro_use]
pub mod serial_aarch64;

pub use feat_detect::{
    detect_arch_features_with, is_feature_supported, run_detection, DetectError, Feature,
    FeatureState,
};

#[cfg(target_arch = "aarch64")]
pub use feat_detect::detect_arch_features;

/// Park the CPU forever.
///
/// Intended for the image's `#[panic_handler]`, which is where a failed
/// detection pass ends up.
pub fn halt() -> ! {
    loop {
        #[cfg(target_arch = "aarch64")]
        aarch64_cpu::asm::wfe();
        #[cfg(not(target_arch = "aarch64"))]
        core::hint::spin_loop();
    }
}
