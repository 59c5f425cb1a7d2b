//! The feature registry: every architecture extension the firmware knows,
//! in the order the detection pass checks them.

use core::fmt;

use super::check::{check_presence, DetectError, DetectionSession};
use super::state::{FeatureConfig, FeatureState};
use crate::arch_impl::aarch64::constants::*;
use crate::arch_impl::traits::FeatureProbe;

/// Architecture version that introduced a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArchVersion {
    V8_0,
    V8_1,
    V8_2,
    V8_3,
    V8_4,
    V8_5,
    V8_6,
    V8_7,
    V9_0,
    V9_2,
}

impl fmt::Display for ArchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArchVersion::V8_0 => "v8.0",
            ArchVersion::V8_1 => "v8.1",
            ArchVersion::V8_2 => "v8.2",
            ArchVersion::V8_3 => "v8.3",
            ArchVersion::V8_4 => "v8.4",
            ArchVersion::V8_5 => "v8.5",
            ArchVersion::V8_6 => "v8.6",
            ArchVersion::V8_7 => "v8.7",
            ArchVersion::V9_0 => "v9.0",
            ArchVersion::V9_2 => "v9.2",
        };
        f.write_str(s)
    }
}

/// Number of features in the registry.
pub const FEATURE_COUNT: usize = 24;

/// An architecture feature the firmware can be built to assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Sb,
    Csv2_2,
    Pan,
    Vhe,
    Ras,
    Pauth,
    Dit,
    AmuV1,
    Mpam,
    Nv2,
    Sel2,
    Trf,
    Mte,
    Rng,
    Bti,
    RngTrap,
    AmuV1p1,
    Fgt,
    Ecv,
    Twed,
    Hcx,
    Brbe,
    Trbe,
    Rme,
}

impl Feature {
    /// Registry order: grouped by architecture version, oldest first.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        // v8.0
        Feature::Sb,
        Feature::Csv2_2,
        // v8.1
        Feature::Pan,
        Feature::Vhe,
        // v8.2
        Feature::Ras,
        // v8.3
        Feature::Pauth,
        // v8.4
        Feature::Dit,
        Feature::AmuV1,
        Feature::Mpam,
        Feature::Nv2,
        Feature::Sel2,
        Feature::Trf,
        // v8.5
        Feature::Mte,
        Feature::Rng,
        Feature::Bti,
        Feature::RngTrap,
        // v8.6
        Feature::AmuV1p1,
        Feature::Fgt,
        Feature::Ecv,
        Feature::Twed,
        // v8.7
        Feature::Hcx,
        // v9.0
        Feature::Brbe,
        Feature::Trbe,
        // v9.2
        Feature::Rme,
    ];

    /// Short name used in diagnostics, without the `FEAT_` prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Sb => "SB",
            Feature::Csv2_2 => "CSV2_2",
            Feature::Pan => "PAN",
            Feature::Vhe => "VHE",
            Feature::Ras => "RAS",
            Feature::Pauth => "PAUTH",
            Feature::Dit => "DIT",
            Feature::AmuV1 => "AMUv1",
            Feature::Mpam => "MPAM",
            Feature::Nv2 => "NV2",
            Feature::Sel2 => "SEL2",
            Feature::Trf => "TRF",
            Feature::Mte => "MTE",
            Feature::Rng => "RNG",
            Feature::Bti => "BTI",
            Feature::RngTrap => "RNG_TRAP",
            Feature::AmuV1p1 => "AMUv1p1",
            Feature::Fgt => "FGT",
            Feature::Ecv => "ECV",
            Feature::Twed => "TWED",
            Feature::Hcx => "HCX",
            Feature::Brbe => "BRBE",
            Feature::Trbe => "TRBE",
            Feature::Rme => "RME",
        }
    }

    pub const fn arch(self) -> ArchVersion {
        match self {
            Feature::Sb | Feature::Csv2_2 => ArchVersion::V8_0,
            Feature::Pan | Feature::Vhe => ArchVersion::V8_1,
            Feature::Ras => ArchVersion::V8_2,
            Feature::Pauth => ArchVersion::V8_3,
            Feature::Dit
            | Feature::AmuV1
            | Feature::Mpam
            | Feature::Nv2
            | Feature::Sel2
            | Feature::Trf => ArchVersion::V8_4,
            Feature::Mte | Feature::Rng | Feature::Bti | Feature::RngTrap => ArchVersion::V8_5,
            Feature::AmuV1p1 | Feature::Fgt | Feature::Ecv | Feature::Twed => ArchVersion::V8_6,
            Feature::Hcx => ArchVersion::V8_7,
            Feature::Brbe | Feature::Trbe => ArchVersion::V9_0,
            Feature::Rme => ArchVersion::V9_2,
        }
    }

    /// Build state of this feature under `C`.
    pub const fn state<C: FeatureConfig>(self) -> FeatureState {
        match self {
            Feature::Sb => C::SB,
            Feature::Csv2_2 => C::CSV2_2,
            Feature::Pan => C::PAN,
            Feature::Vhe => C::VHE,
            Feature::Ras => C::RAS,
            // Either flag makes the keys part of the firmware's state.
            Feature::Pauth => FeatureState::strictest(C::PAUTH, C::CTX_PAUTH_REGS),
            Feature::Dit => C::DIT,
            Feature::AmuV1 => C::AMUV1,
            Feature::Mpam => C::MPAM,
            Feature::Nv2 => C::NV2,
            Feature::Sel2 => C::SEL2,
            Feature::Trf => C::TRF,
            Feature::Mte => C::MTE,
            Feature::Rng => C::RNG,
            Feature::Bti => C::BTI,
            Feature::RngTrap => C::RNG_TRAP,
            Feature::AmuV1p1 => C::AMUV1P1,
            Feature::Fgt => C::FGT,
            Feature::Ecv => C::ECV,
            Feature::Twed => C::TWED,
            Feature::Hcx => C::HCX,
            Feature::Brbe => C::BRBE,
            Feature::Trbe => C::TRBE,
            Feature::Rme => C::RME,
        }
    }

    /// How the hardware is asked about this feature.
    pub fn probe<P: FeatureProbe>(self) -> Probe<P> {
        match self {
            Feature::Sb => Probe::Presence(P::sb_present),
            Feature::Csv2_2 => Probe::Presence(P::csv2_2_present),
            Feature::Pan => Probe::Presence(P::pan_present),
            Feature::Vhe => Probe::Presence(P::vhe_present),
            Feature::Ras => Probe::Presence(P::ras_present),
            Feature::Pauth => Probe::Presence(P::pauth_present),
            Feature::Dit => Probe::Presence(P::dit_present),
            Feature::AmuV1 => Probe::id_field(P::amu_id_field, AMU_V1, AMU_V1P1),
            Feature::Mpam => Probe::Presence(P::mpam_present),
            Feature::Nv2 => Probe::Presence(P::nv2_present),
            Feature::Sel2 => Probe::Presence(P::sel2_present),
            Feature::Trf => Probe::id_field(P::trf_id_field, TRF_SUPPORTED, TRF_SUPPORTED),
            Feature::Mte => Probe::Presence(P::mte_present),
            Feature::Rng => Probe::Presence(P::rng_present),
            Feature::Bti => Probe::Presence(P::bti_present),
            Feature::RngTrap => Probe::Presence(P::rng_trap_present),
            Feature::AmuV1p1 => Probe::Presence(P::amuv1p1_present),
            Feature::Fgt => Probe::id_field(P::fgt_id_field, FGT_SUPPORTED, FGT_SUPPORTED),
            Feature::Ecv => Probe::id_field(P::ecv_id_field, ECV_SUPPORTED, ECV_SELF_SYNCH),
            Feature::Twed => Probe::id_field(P::twed_id_field, TWED_SUPPORTED, TWED_SUPPORTED),
            Feature::Hcx => Probe::id_field(P::hcx_id_field, HCX_SUPPORTED, HCX_SUPPORTED),
            Feature::Brbe => Probe::id_field(P::brbe_id_field, BRBE_SUPPORTED, BRBE_V1P1),
            Feature::Trbe => Probe::id_field(P::trbe_id_field, TRBE_SUPPORTED, TRBE_SUPPORTED),
            Feature::Rme => Probe::Presence(P::rme_present),
        }
    }

    #[inline(always)]
    pub fn descriptor<C: FeatureConfig, P: FeatureProbe>(self) -> FeatureDescriptor<P> {
        FeatureDescriptor {
            feature: self,
            state: self.state::<C>(),
            probe: self.probe::<P>(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FEAT_{}", self.name())
    }
}

/// The hardware query behind a feature.
pub enum Probe<P> {
    /// Implemented or not. Absence of an `Always` feature stops the boot on the spot.
    Presence(fn(&P) -> bool),
    /// Versioned ID field, accepted when it lies in `[min, max]`.
    ///
    /// `min` is the first value meaning "present"; `max` is the newest
    /// version this firmware knows how to drive.
    IdField { read: fn(&P) -> u64, min: u64, max: u64 },
}

impl<P> Probe<P> {
    pub const fn id_field(read: fn(&P) -> u64, min: u64, max: u64) -> Self {
        assert!(min <= max);
        Probe::IdField { read, min, max }
    }
}

/// One registry entry: a feature, its build state and its probe.
pub struct FeatureDescriptor<P> {
    pub feature: Feature,
    pub state: FeatureState,
    pub probe: Probe<P>,
}

impl<P: FeatureProbe> FeatureDescriptor<P> {
    /// Run this feature's check as part of a detection pass.
    ///
    /// A missing `Always` presence feature returns `Err` straight away; range
    /// failures are recorded in `session` and reported when it finishes.
    #[inline(always)]
    pub fn validate(&self, hw: &P, session: &mut DetectionSession) -> Result<(), DetectError> {
        match self.probe {
            Probe::Presence(present) => check_presence(self.feature, self.state, || present(hw)),
            Probe::IdField { read, min, max } => {
                session.check_feature(self.feature, self.state, || read(hw), min, max);
                Ok(())
            }
        }
    }

    /// Whether code gated on this feature may use it.
    ///
    /// `Always` features were validated at cold boot and are not probed again.
    pub fn is_supported(&self, hw: &P) -> bool {
        match self.state {
            FeatureState::Disabled => false,
            FeatureState::Always => true,
            FeatureState::Check => match self.probe {
                Probe::Presence(present) => present(hw),
                Probe::IdField { read, min, .. } => read(hw) >= min,
            },
        }
    }
}

/// All registry entries under build configuration `C`, in check order.
#[inline(always)]
pub fn registry<C: FeatureConfig, P: FeatureProbe>() -> [FeatureDescriptor<P>; FEATURE_COUNT] {
    Feature::ALL.map(|feature| feature.descriptor::<C, P>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch_impl::aarch64::IdRegisters;

    struct Nothing;
    impl FeatureConfig for Nothing {}

    #[test]
    fn test_registry_is_grouped_by_arch_version() {
        for pair in Feature::ALL.windows(2) {
            assert!(
                pair[0].arch() <= pair[1].arch(),
                "{} ({}) listed before {} ({})",
                pair[0],
                pair[0].arch(),
                pair[1],
                pair[1].arch()
            );
        }
        assert_eq!(Feature::ALL[0], Feature::Sb);
        assert_eq!(Feature::ALL[FEATURE_COUNT - 1], Feature::Rme);
    }

    #[test]
    fn test_registry_has_no_duplicates() {
        for (i, a) in Feature::ALL.iter().enumerate() {
            for b in &Feature::ALL[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_versioned_features_and_ranges() {
        let expected: [(Feature, u64, u64); 8] = [
            (Feature::AmuV1, 1, 2),
            (Feature::Trf, 1, 1),
            (Feature::Fgt, 1, 1),
            (Feature::Ecv, 1, 2),
            (Feature::Twed, 1, 1),
            (Feature::Hcx, 1, 1),
            (Feature::Brbe, 1, 2),
            (Feature::Trbe, 1, 1),
        ];
        let mut versioned = 0;
        for feature in Feature::ALL {
            if let Probe::IdField { min, max, .. } = feature.probe::<IdRegisters>() {
                versioned += 1;
                let (_, want_min, want_max) = expected
                    .iter()
                    .find(|(f, _, _)| *f == feature)
                    .copied()
                    .unwrap_or_else(|| panic!("{} should not be versioned", feature));
                assert_eq!((min, max), (want_min, want_max), "{}", feature);
            }
        }
        assert_eq!(versioned, expected.len());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(format!("{}", Feature::Sb), "FEAT_SB");
        assert_eq!(format!("{}", Feature::AmuV1p1), "FEAT_AMUv1p1");
        assert_eq!(format!("{}", Feature::RngTrap), "FEAT_RNG_TRAP");
        assert_eq!(format!("{}", ArchVersion::V9_2), "v9.2");
    }

    #[test]
    fn test_pauth_state_combines_both_flags() {
        struct KeysOnly;
        impl FeatureConfig for KeysOnly {
            const CTX_PAUTH_REGS: FeatureState = FeatureState::Always;
        }
        struct CheckOnly;
        impl FeatureConfig for CheckOnly {
            const PAUTH: FeatureState = FeatureState::Check;
        }

        assert_eq!(Feature::Pauth.state::<Nothing>(), FeatureState::Disabled);
        assert_eq!(Feature::Pauth.state::<KeysOnly>(), FeatureState::Always);
        assert_eq!(Feature::Pauth.state::<CheckOnly>(), FeatureState::Check);
    }

    #[test]
    fn test_is_supported_by_state() {
        struct Gated;
        impl FeatureConfig for Gated {
            const SB: FeatureState = FeatureState::Always;
            const PAN: FeatureState = FeatureState::Check;
            const TRF: FeatureState = FeatureState::Check;
        }
        let hw = IdRegisters::default();

        // Always is trusted without asking the hardware again
        assert!(Feature::Sb.descriptor::<Gated, _>().is_supported(&hw));
        assert!(!Feature::Pan.descriptor::<Gated, _>().is_supported(&hw));
        assert!(!Feature::Trf.descriptor::<Gated, _>().is_supported(&hw));
        assert!(!Feature::Vhe.descriptor::<Gated, _>().is_supported(&hw));

        let hw = IdRegisters {
            mmfr1: 1 << 20,
            dfr0: 1 << 40,
            ..Default::default()
        };
        assert!(Feature::Pan.descriptor::<Gated, _>().is_supported(&hw));
        assert!(Feature::Trf.descriptor::<Gated, _>().is_supported(&hw));
        assert!(!Feature::Vhe.descriptor::<Gated, _>().is_supported(&hw));
    }
}
