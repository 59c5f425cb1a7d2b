//! Build-time feature states.

/// How a build treats one architecture feature.
///
/// The discriminants match the numeric build-flag values (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FeatureState {
    /// Not used by this build. Never probed.
    Disabled = 0,
    /// Used unconditionally. The PE must implement it.
    Always = 1,
    /// Used only when the PE reports it.
    Check = 2,
}

impl FeatureState {
    /// State selected by the pair of Cargo features for one build flag.
    pub const fn from_flags(always: bool, check: bool) -> Self {
        if always {
            FeatureState::Always
        } else if check {
            FeatureState::Check
        } else {
            FeatureState::Disabled
        }
    }

    /// Combine two flags that gate the same feature. `Always` wins over
    /// `Check`, which wins over `Disabled`.
    pub const fn strictest(a: Self, b: Self) -> Self {
        match (a, b) {
            (FeatureState::Always, _) | (_, FeatureState::Always) => FeatureState::Always,
            (FeatureState::Check, _) | (_, FeatureState::Check) => FeatureState::Check,
            _ => FeatureState::Disabled,
        }
    }

    #[inline]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, FeatureState::Disabled)
    }
}

/// Per-feature build flags.
///
/// Every flag is an associated constant, so each check is compiled against a
/// constant and the code for disabled features folds away. Flags default to
/// [`FeatureState::Disabled`]; an implementor only names what it enables.
pub trait FeatureConfig {
    // v8.0
    const SB: FeatureState = FeatureState::Disabled;
    const CSV2_2: FeatureState = FeatureState::Disabled;
    // v8.1
    const PAN: FeatureState = FeatureState::Disabled;
    const VHE: FeatureState = FeatureState::Disabled;
    // v8.2
    const RAS: FeatureState = FeatureState::Disabled;
    // v8.3
    const PAUTH: FeatureState = FeatureState::Disabled;
    /// Save/restore pointer authentication keys across worlds.
    const CTX_PAUTH_REGS: FeatureState = FeatureState::Disabled;
    // v8.4
    const DIT: FeatureState = FeatureState::Disabled;
    const AMUV1: FeatureState = FeatureState::Disabled;
    const MPAM: FeatureState = FeatureState::Disabled;
    /// Save/restore the NV2 (VNCR_EL2) context.
    const NV2: FeatureState = FeatureState::Disabled;
    const SEL2: FeatureState = FeatureState::Disabled;
    const TRF: FeatureState = FeatureState::Disabled;
    // v8.5
    /// Save/restore the MTE context.
    const MTE: FeatureState = FeatureState::Disabled;
    const RNG: FeatureState = FeatureState::Disabled;
    const BTI: FeatureState = FeatureState::Disabled;
    const RNG_TRAP: FeatureState = FeatureState::Disabled;
    // v8.6
    const AMUV1P1: FeatureState = FeatureState::Disabled;
    const FGT: FeatureState = FeatureState::Disabled;
    const ECV: FeatureState = FeatureState::Disabled;
    const TWED: FeatureState = FeatureState::Disabled;
    // v8.7
    const HCX: FeatureState = FeatureState::Disabled;
    // v9.0
    const BRBE: FeatureState = FeatureState::Disabled;
    const TRBE: FeatureState = FeatureState::Disabled;
    // v9.2
    const RME: FeatureState = FeatureState::Disabled;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(FeatureState::Disabled as u8, 0);
        assert_eq!(FeatureState::Always as u8, 1);
        assert_eq!(FeatureState::Check as u8, 2);
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(FeatureState::from_flags(false, false), FeatureState::Disabled);
        assert_eq!(FeatureState::from_flags(true, false), FeatureState::Always);
        assert_eq!(FeatureState::from_flags(false, true), FeatureState::Check);
        assert_eq!(FeatureState::from_flags(true, true), FeatureState::Always);
    }

    #[test]
    fn test_strictest() {
        use FeatureState::*;
        assert_eq!(FeatureState::strictest(Disabled, Disabled), Disabled);
        assert_eq!(FeatureState::strictest(Disabled, Check), Check);
        assert_eq!(FeatureState::strictest(Check, Always), Always);
        assert_eq!(FeatureState::strictest(Always, Disabled), Always);
    }

    #[test]
    fn test_defaults_are_disabled() {
        struct Nothing;
        impl FeatureConfig for Nothing {}

        assert!(!Nothing::SB.is_enabled());
        assert!(!Nothing::TRBE.is_enabled());
        assert!(!Nothing::RME.is_enabled());
    }
}
