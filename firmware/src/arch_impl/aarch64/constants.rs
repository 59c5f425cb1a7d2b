//! Known ID-register field values.
//!
//! Only the values the feature probes compare against are listed here. Field
//! positions live with the bitfield definitions in `id_regs`.

/// ID_AA64PFR0_EL1.CSV2: FEAT_CSV2_2 implemented.
pub const CSV2_2_SUPPORTED: u64 = 2;

/// ID_AA64PFR0_EL1.AMU: FEAT_AMUv1 implemented.
pub const AMU_V1: u64 = 1;

/// ID_AA64PFR0_EL1.AMU: FEAT_AMUv1p1 implemented.
pub const AMU_V1P1: u64 = 2;

/// ID_AA64MMFR2_EL1.NV: FEAT_NV2 implemented.
pub const NV2_SUPPORTED: u64 = 2;

/// ID_AA64MMFR0_EL1.ECV: FEAT_ECV implemented.
pub const ECV_SUPPORTED: u64 = 1;

/// ID_AA64MMFR0_EL1.ECV: FEAT_ECV plus CNTPOFF_EL2 and self-synchronized counter views.
pub const ECV_SELF_SYNCH: u64 = 2;

/// ID_AA64MMFR1_EL1.TWED: FEAT_TWED implemented.
pub const TWED_SUPPORTED: u64 = 1;

/// ID_AA64MMFR1_EL1.HCX: HCRX_EL2 implemented.
pub const HCX_SUPPORTED: u64 = 1;

/// ID_AA64MMFR0_EL1.FGT: fine-grained trap registers implemented.
pub const FGT_SUPPORTED: u64 = 1;

/// ID_AA64DFR0_EL1.TraceFilt: TRFCR_ELx implemented.
pub const TRF_SUPPORTED: u64 = 1;

/// ID_AA64DFR0_EL1.BRBE: branch record buffer implemented.
pub const BRBE_SUPPORTED: u64 = 1;

/// ID_AA64DFR0_EL1.BRBE: FEAT_BRBEv1p1.
pub const BRBE_V1P1: u64 = 2;

/// ID_AA64DFR0_EL1.TraceBuffer: trace buffer implemented.
pub const TRBE_SUPPORTED: u64 = 1;
