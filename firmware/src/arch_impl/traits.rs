//! Architecture-agnostic traits for hardware feature probing.

/// Hardware query for every architecture feature the firmware knows about.
///
/// Boolean probes report whether the PE implements the feature at all.
/// Field probes return the raw ID-register field so the caller can compare
/// it against the versions it knows how to handle.
///
/// Probes only read identification state; they never fail and never change
/// anything.
pub trait FeatureProbe {
    // v8.0

    /// FEAT_SB: speculation barrier instruction.
    fn sb_present(&self) -> bool;

    /// FEAT_CSV2_2: cache speculation variant 2, version 2.
    fn csv2_2_present(&self) -> bool;

    // v8.1

    /// FEAT_PAN: privileged access never.
    fn pan_present(&self) -> bool;

    /// FEAT_VHE: virtualization host extensions.
    fn vhe_present(&self) -> bool;

    // v8.2

    /// FEAT_RAS: reliability, availability and serviceability.
    fn ras_present(&self) -> bool;

    // v8.3

    /// FEAT_PAuth: any address or generic pointer authentication algorithm.
    fn pauth_present(&self) -> bool;

    // v8.4

    /// FEAT_DIT: data independent timing.
    fn dit_present(&self) -> bool;

    /// FEAT_AMUv1: activity monitors version field.
    fn amu_id_field(&self) -> u64;

    /// FEAT_MPAM: memory partitioning and monitoring, any version.
    fn mpam_present(&self) -> bool;

    /// FEAT_NV2: enhanced nested virtualization.
    fn nv2_present(&self) -> bool;

    /// FEAT_SEL2: secure EL2.
    fn sel2_present(&self) -> bool;

    /// FEAT_TRF: self-hosted trace filter control field.
    fn trf_id_field(&self) -> u64;

    // v8.5

    /// FEAT_MTE: memory tagging, any level.
    fn mte_present(&self) -> bool;

    /// FEAT_RNG: RNDR/RNDRRS instructions.
    fn rng_present(&self) -> bool;

    /// FEAT_BTI: branch target identification.
    fn bti_present(&self) -> bool;

    /// FEAT_RNG_TRAP: trapping of RNDR/RNDRRS to EL3.
    fn rng_trap_present(&self) -> bool;

    // v8.6

    /// FEAT_AMUv1p1: activity monitors version 1.1.
    fn amuv1p1_present(&self) -> bool;

    /// FEAT_FGT: fine-grained traps field.
    fn fgt_id_field(&self) -> u64;

    /// FEAT_ECV: enhanced counter virtualization field.
    fn ecv_id_field(&self) -> u64;

    /// FEAT_TWED: delayed trapping of WFE field.
    fn twed_id_field(&self) -> u64;

    // v8.7

    /// FEAT_HCX: extended hypervisor configuration field.
    fn hcx_id_field(&self) -> u64;

    // v9.0

    /// FEAT_BRBE: branch record buffer field.
    fn brbe_id_field(&self) -> u64;

    /// FEAT_TRBE: trace buffer field.
    fn trbe_id_field(&self) -> u64;

    // v9.2

    /// FEAT_RME: realm management extension.
    fn rme_present(&self) -> bool;
}
