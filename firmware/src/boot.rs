//! Early platform setup.
//!
//! First Rust code the platform runs at EL3 on the boot CPU. Brings up the
//! console and, in builds with `feature_detection`, refuses to continue on a
//! PE that doesn't match the build's feature flags. Everything the platform
//! does after this (page tables, GIC, next-stage handoff) may rely on the
//! enabled features being present.

use crate::arch_impl::traits::FeatureProbe;
use crate::feat_detect::{self, FeatureConfig};
use crate::{logger, platform_config};

/// Early setup against an explicit configuration and probe.
pub fn early_platform_setup_with<C: FeatureConfig, P: FeatureProbe>(uart_base: u64, hw: &P) {
    platform_config::set_uart_base_phys(uart_base);
    logger::init_early();

    #[cfg(target_arch = "aarch64")]
    crate::serial_aarch64::init_serial();
    logger::serial_ready();

    log::info!("boot: early platform setup, console at {:#x}", uart_base);

    if platform_config::FEATURE_DETECTION {
        feat_detect::detect_arch_features_with::<C, P>(hw);
    } else {
        log::debug!("boot: feature detection not built in");
    }
}

/// Entry from the platform's reset assembly.
///
/// `uart_base` is the physical address of the PL011 console.
#[cfg(target_arch = "aarch64")]
#[no_mangle]
pub extern "C" fn bl31_early_platform_setup(uart_base: u64) {
    use crate::arch_impl::aarch64::SystemRegisters;
    use crate::platform_config::BuildConfig;

    early_platform_setup_with::<BuildConfig, SystemRegisters>(uart_base, &SystemRegisters);
}
