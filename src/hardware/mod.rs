//! Hardware detection module
//!
//! Resolves the host platform and, on ARM Linux, the CPU variant read from
//! the kernel's /proc/cpuinfo.

pub mod cpu;
pub mod cpuinfo;
mod system;

pub use cpu::{cpu_variant, detect_variant, init_variant, init_variant_with, normalize_variant};
pub use cpuinfo::{CpuInfoError, CpuInfoSource};
pub use system::{is_arm_arch, is_linux_os, normalize_arch, Platform};
