//! Platform configuration for the boot firmware.
//!
//! Two kinds of settings live here:
//! - Build-time architecture feature flags, selected with Cargo features and
//!   exposed to the detection pass as [`BuildConfig`].
//! - Runtime hardware addresses that the platform entry code may override
//!   before the console comes up. Defaults are the QEMU virt addresses.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::feat_detect::{FeatureConfig, FeatureState};

// =============================================================================
// Hardware addresses
// =============================================================================

static UART_BASE_PHYS: AtomicU64 = AtomicU64::new(0x0900_0000);

/// PL011 UART physical base address.
/// QEMU virt: 0x0900_0000
#[inline]
pub fn uart_base_phys() -> usize {
    UART_BASE_PHYS.load(Ordering::Relaxed) as usize
}

/// Override the UART base. Only meaningful before the console is initialised.
pub fn set_uart_base_phys(base: u64) {
    UART_BASE_PHYS.store(base, Ordering::Relaxed);
}

// =============================================================================
// Build-time feature flags
// =============================================================================

/// Whether cold boot validates the feature flags against the hardware.
pub const FEATURE_DETECTION: bool = cfg!(feature = "feature_detection");

/// Feature states selected by this build's Cargo features.
///
/// `feat_x` selects [`FeatureState::Always`], `feat_x_check` selects
/// [`FeatureState::Check`]. Enabling both keeps `Always`.
pub struct BuildConfig;

macro_rules! build_flag {
    ($always:literal, $check:literal) => {
        FeatureState::from_flags(cfg!(feature = $always), cfg!(feature = $check))
    };
}

impl FeatureConfig for BuildConfig {
    const SB: FeatureState = build_flag!("feat_sb", "feat_sb_check");
    const CSV2_2: FeatureState = build_flag!("feat_csv2_2", "feat_csv2_2_check");
    const PAN: FeatureState = build_flag!("feat_pan", "feat_pan_check");
    const VHE: FeatureState = build_flag!("feat_vhe", "feat_vhe_check");
    const RAS: FeatureState = build_flag!("feat_ras", "feat_ras_check");
    const PAUTH: FeatureState = build_flag!("feat_pauth", "feat_pauth_check");
    const CTX_PAUTH_REGS: FeatureState = build_flag!("ctx_pauth_regs", "ctx_pauth_regs_check");
    const DIT: FeatureState = build_flag!("feat_dit", "feat_dit_check");
    const AMUV1: FeatureState = build_flag!("feat_amuv1", "feat_amuv1_check");
    const MPAM: FeatureState = build_flag!("feat_mpam", "feat_mpam_check");
    const NV2: FeatureState = build_flag!("feat_nv2", "feat_nv2_check");
    const SEL2: FeatureState = build_flag!("feat_sel2", "feat_sel2_check");
    const TRF: FeatureState = build_flag!("feat_trf", "feat_trf_check");
    const MTE: FeatureState = build_flag!("feat_mte", "feat_mte_check");
    const RNG: FeatureState = build_flag!("feat_rng", "feat_rng_check");
    const BTI: FeatureState = build_flag!("feat_bti", "feat_bti_check");
    const RNG_TRAP: FeatureState = build_flag!("feat_rng_trap", "feat_rng_trap_check");
    const AMUV1P1: FeatureState = build_flag!("feat_amuv1p1", "feat_amuv1p1_check");
    const FGT: FeatureState = build_flag!("feat_fgt", "feat_fgt_check");
    const ECV: FeatureState = build_flag!("feat_ecv", "feat_ecv_check");
    const TWED: FeatureState = build_flag!("feat_twed", "feat_twed_check");
    const HCX: FeatureState = build_flag!("feat_hcx", "feat_hcx_check");
    const BRBE: FeatureState = build_flag!("feat_brbe", "feat_brbe_check");
    const TRBE: FeatureState = build_flag!("feat_trbe", "feat_trbe_check");
    const RME: FeatureState = build_flag!("feat_rme", "feat_rme_check");
}
