//! Architecture abstraction layer.
//!
//! The detection pass only talks to [`traits::FeatureProbe`]. The AArch64
//! module supplies the ID-register decoding behind it; register field layout
//! is portable so it builds (and is tested) on the host too, while the live
//! `mrs` readers only exist on aarch64.

pub mod aarch64;
pub mod traits;

pub use traits::*;
