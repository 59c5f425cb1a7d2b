//! AArch64 architecture support.
//!
//! ID-register field layout and the probes decoded from it.

pub mod constants;
pub mod id_regs;

pub use id_regs::{IdRegisterSource, IdRegisters};

#[cfg(target_arch = "aarch64")]
pub use id_regs::SystemRegisters;
