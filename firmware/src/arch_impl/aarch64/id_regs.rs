//! AArch64 ID-register decoding.
//!
//! Field layouts follow the Arm ARM (DDI 0487). Every [`IdRegisterSource`]
//! is a [`FeatureProbe`]: the probes pull the one register they need and
//! isolate the field, so a probe that is never called never reads hardware.

use tock_registers::register_bitfields;

use super::constants::*;
use crate::arch_impl::traits::FeatureProbe;

register_bitfields! {u64,
    pub ID_AA64PFR0_EL1 [
        RAS OFFSET(28) NUMBITS(4) [],
        SEL2 OFFSET(36) NUMBITS(4) [],
        MPAM OFFSET(40) NUMBITS(4) [],
        AMU OFFSET(44) NUMBITS(4) [],
        DIT OFFSET(48) NUMBITS(4) [],
        RME OFFSET(52) NUMBITS(4) [],
        CSV2 OFFSET(56) NUMBITS(4) []
    ],

    pub ID_AA64PFR1_EL1 [
        BT OFFSET(0) NUMBITS(4) [],
        MTE OFFSET(8) NUMBITS(4) [],
        MPAM_FRAC OFFSET(16) NUMBITS(4) [],
        RNDR_TRAP OFFSET(28) NUMBITS(4) []
    ],

    pub ID_AA64ISAR0_EL1 [
        RNDR OFFSET(60) NUMBITS(4) []
    ],

    pub ID_AA64ISAR1_EL1 [
        APA OFFSET(4) NUMBITS(4) [],
        API OFFSET(8) NUMBITS(4) [],
        GPA OFFSET(24) NUMBITS(4) [],
        GPI OFFSET(28) NUMBITS(4) [],
        SB OFFSET(36) NUMBITS(4) []
    ],

    pub ID_AA64ISAR2_EL1 [
        GPA3 OFFSET(8) NUMBITS(4) [],
        APA3 OFFSET(12) NUMBITS(4) []
    ],

    pub ID_AA64MMFR0_EL1 [
        FGT OFFSET(56) NUMBITS(4) [],
        ECV OFFSET(60) NUMBITS(4) []
    ],

    pub ID_AA64MMFR1_EL1 [
        VH OFFSET(8) NUMBITS(4) [],
        PAN OFFSET(20) NUMBITS(4) [],
        TWED OFFSET(32) NUMBITS(4) [],
        HCX OFFSET(40) NUMBITS(4) []
    ],

    pub ID_AA64MMFR2_EL1 [
        NV OFFSET(24) NUMBITS(4) []
    ],

    pub ID_AA64DFR0_EL1 [
        TRACE_FILT OFFSET(40) NUMBITS(4) [],
        TRACE_BUFFER OFFSET(44) NUMBITS(4) [],
        BRBE OFFSET(52) NUMBITS(4) []
    ]
}

/// Raw access to the identification registers the feature probes decode.
pub trait IdRegisterSource {
    /// ID_AA64PFR0_EL1: Processor Feature Register 0
    fn pfr0(&self) -> u64;
    /// ID_AA64PFR1_EL1: Processor Feature Register 1
    fn pfr1(&self) -> u64;
    /// ID_AA64ISAR0_EL1: Instruction Set Attribute Register 0
    fn isar0(&self) -> u64;
    /// ID_AA64ISAR1_EL1: Instruction Set Attribute Register 1
    fn isar1(&self) -> u64;
    /// ID_AA64ISAR2_EL1: Instruction Set Attribute Register 2
    fn isar2(&self) -> u64;
    /// ID_AA64MMFR0_EL1: Memory Model Feature Register 0
    fn mmfr0(&self) -> u64;
    /// ID_AA64MMFR1_EL1: Memory Model Feature Register 1
    fn mmfr1(&self) -> u64;
    /// ID_AA64MMFR2_EL1: Memory Model Feature Register 2
    fn mmfr2(&self) -> u64;
    /// ID_AA64DFR0_EL1: Debug Feature Register 0
    fn dfr0(&self) -> u64;
}

/// MPAM version as `major << 4 | minor`, zero when MPAM is not implemented.
#[inline]
pub fn mpam_version<S: IdRegisterSource + ?Sized>(regs: &S) -> u64 {
    (ID_AA64PFR0_EL1::MPAM.read(regs.pfr0()) << 4) | ID_AA64PFR1_EL1::MPAM_FRAC.read(regs.pfr1())
}

impl<S: IdRegisterSource> FeatureProbe for S {
    #[inline]
    fn sb_present(&self) -> bool {
        ID_AA64ISAR1_EL1::SB.read(self.isar1()) != 0
    }

    #[inline]
    fn csv2_2_present(&self) -> bool {
        ID_AA64PFR0_EL1::CSV2.read(self.pfr0()) >= CSV2_2_SUPPORTED
    }

    #[inline]
    fn pan_present(&self) -> bool {
        ID_AA64MMFR1_EL1::PAN.read(self.mmfr1()) != 0
    }

    #[inline]
    fn vhe_present(&self) -> bool {
        ID_AA64MMFR1_EL1::VH.read(self.mmfr1()) != 0
    }

    #[inline]
    fn ras_present(&self) -> bool {
        ID_AA64PFR0_EL1::RAS.read(self.pfr0()) != 0
    }

    #[inline]
    fn pauth_present(&self) -> bool {
        let isar1 = self.isar1();
        if ID_AA64ISAR1_EL1::APA.read(isar1) != 0
            || ID_AA64ISAR1_EL1::API.read(isar1) != 0
            || ID_AA64ISAR1_EL1::GPA.read(isar1) != 0
            || ID_AA64ISAR1_EL1::GPI.read(isar1) != 0
        {
            return true;
        }
        // QARMA3 is only advertised in ISAR2
        let isar2 = self.isar2();
        ID_AA64ISAR2_EL1::APA3.read(isar2) != 0 || ID_AA64ISAR2_EL1::GPA3.read(isar2) != 0
    }

    #[inline]
    fn dit_present(&self) -> bool {
        ID_AA64PFR0_EL1::DIT.read(self.pfr0()) != 0
    }

    #[inline]
    fn amu_id_field(&self) -> u64 {
        ID_AA64PFR0_EL1::AMU.read(self.pfr0())
    }

    #[inline]
    fn mpam_present(&self) -> bool {
        mpam_version(self) != 0
    }

    #[inline]
    fn nv2_present(&self) -> bool {
        ID_AA64MMFR2_EL1::NV.read(self.mmfr2()) == NV2_SUPPORTED
    }

    #[inline]
    fn sel2_present(&self) -> bool {
        ID_AA64PFR0_EL1::SEL2.read(self.pfr0()) != 0
    }

    #[inline]
    fn trf_id_field(&self) -> u64 {
        ID_AA64DFR0_EL1::TRACE_FILT.read(self.dfr0())
    }

    #[inline]
    fn mte_present(&self) -> bool {
        ID_AA64PFR1_EL1::MTE.read(self.pfr1()) != 0
    }

    #[inline]
    fn rng_present(&self) -> bool {
        ID_AA64ISAR0_EL1::RNDR.read(self.isar0()) != 0
    }

    #[inline]
    fn bti_present(&self) -> bool {
        ID_AA64PFR1_EL1::BT.read(self.pfr1()) != 0
    }

    #[inline]
    fn rng_trap_present(&self) -> bool {
        ID_AA64PFR1_EL1::RNDR_TRAP.read(self.pfr1()) != 0
    }

    #[inline]
    fn amuv1p1_present(&self) -> bool {
        ID_AA64PFR0_EL1::AMU.read(self.pfr0()) >= AMU_V1P1
    }

    #[inline]
    fn fgt_id_field(&self) -> u64 {
        ID_AA64MMFR0_EL1::FGT.read(self.mmfr0())
    }

    #[inline]
    fn ecv_id_field(&self) -> u64 {
        ID_AA64MMFR0_EL1::ECV.read(self.mmfr0())
    }

    #[inline]
    fn twed_id_field(&self) -> u64 {
        ID_AA64MMFR1_EL1::TWED.read(self.mmfr1())
    }

    #[inline]
    fn hcx_id_field(&self) -> u64 {
        ID_AA64MMFR1_EL1::HCX.read(self.mmfr1())
    }

    #[inline]
    fn brbe_id_field(&self) -> u64 {
        ID_AA64DFR0_EL1::BRBE.read(self.dfr0())
    }

    #[inline]
    fn trbe_id_field(&self) -> u64 {
        ID_AA64DFR0_EL1::TRACE_BUFFER.read(self.dfr0())
    }

    #[inline]
    fn rme_present(&self) -> bool {
        ID_AA64PFR0_EL1::RME.read(self.pfr0()) != 0
    }
}

/// Snapshot of the identification registers.
///
/// Captured once with [`IdRegisters::read`] on hardware, or built by hand to
/// describe a PE that isn't the one we're running on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdRegisters {
    pub pfr0: u64,
    pub pfr1: u64,
    pub isar0: u64,
    pub isar1: u64,
    pub isar2: u64,
    pub mmfr0: u64,
    pub mmfr1: u64,
    pub mmfr2: u64,
    pub dfr0: u64,
}

impl IdRegisters {
    /// Capture the current PE's identification registers.
    #[cfg(target_arch = "aarch64")]
    pub fn read() -> Self {
        let live = SystemRegisters;
        IdRegisters {
            pfr0: live.pfr0(),
            pfr1: live.pfr1(),
            isar0: live.isar0(),
            isar1: live.isar1(),
            isar2: live.isar2(),
            mmfr0: live.mmfr0(),
            mmfr1: live.mmfr1(),
            mmfr2: live.mmfr2(),
            dfr0: live.dfr0(),
        }
    }
}

impl IdRegisterSource for IdRegisters {
    fn pfr0(&self) -> u64 {
        self.pfr0
    }
    fn pfr1(&self) -> u64 {
        self.pfr1
    }
    fn isar0(&self) -> u64 {
        self.isar0
    }
    fn isar1(&self) -> u64 {
        self.isar1
    }
    fn isar2(&self) -> u64 {
        self.isar2
    }
    fn mmfr0(&self) -> u64 {
        self.mmfr0
    }
    fn mmfr1(&self) -> u64 {
        self.mmfr1
    }
    fn mmfr2(&self) -> u64 {
        self.mmfr2
    }
    fn dfr0(&self) -> u64 {
        self.dfr0
    }
}

/// The running PE's identification registers, read on every access.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRegisters;

#[cfg(target_arch = "aarch64")]
macro_rules! read_id_reg {
    ($reg:literal) => {{
        let value: u64;
        // ID registers are read-only and readable from EL1 upwards.
        unsafe {
            core::arch::asm!(
                concat!("mrs {}, ", $reg),
                out(reg) value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }};
}

#[cfg(target_arch = "aarch64")]
impl IdRegisterSource for SystemRegisters {
    #[inline]
    fn pfr0(&self) -> u64 {
        read_id_reg!("id_aa64pfr0_el1")
    }
    #[inline]
    fn pfr1(&self) -> u64 {
        read_id_reg!("id_aa64pfr1_el1")
    }
    #[inline]
    fn isar0(&self) -> u64 {
        read_id_reg!("id_aa64isar0_el1")
    }
    #[inline]
    fn isar1(&self) -> u64 {
        read_id_reg!("id_aa64isar1_el1")
    }
    #[inline]
    fn isar2(&self) -> u64 {
        // ID_AA64ISAR2_EL1, by encoding for older assemblers
        read_id_reg!("S3_0_C0_C6_2")
    }
    #[inline]
    fn mmfr0(&self) -> u64 {
        read_id_reg!("id_aa64mmfr0_el1")
    }
    #[inline]
    fn mmfr1(&self) -> u64 {
        read_id_reg!("id_aa64mmfr1_el1")
    }
    #[inline]
    fn mmfr2(&self) -> u64 {
        read_id_reg!("id_aa64mmfr2_el1")
    }
    #[inline]
    fn dfr0(&self) -> u64 {
        read_id_reg!("id_aa64dfr0_el1")
    }
}
