//! Platform descriptor
//!
//! Describes the host as an `os/arch[/variant]` triple using the
//! architecture vocabulary container images are published under.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system, architecture and (for ARM) CPU variant of a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system (e.g., "linux")
    pub os: String,
    /// Normalized architecture (e.g., "amd64", "arm64", "arm")
    pub architecture: String,
    /// ARM variant (e.g., "v7"); empty when unknown or not ARM
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
}

impl Platform {
    /// Build a descriptor, normalizing the architecture name
    pub fn new(os: impl Into<String>, architecture: &str) -> Self {
        Self {
            os: os.into().to_ascii_lowercase(),
            architecture: normalize_arch(architecture),
            variant: String::new(),
        }
    }

    /// Descriptor for the running process
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn is_arm(&self) -> bool {
        is_arm_arch(&self.architecture)
    }

    pub fn is_linux(&self) -> bool {
        is_linux_os(&self.os)
    }

    /// Render as `os/arch` or `os/arch/variant`
    pub fn specifier(&self) -> String {
        if self.variant.is_empty() {
            format!("{}/{}", self.os, self.architecture)
        } else {
            format!("{}/{}/{}", self.os, self.architecture, self.variant)
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.specifier())
    }
}

/// Map toolchain and kernel architecture names onto image architecture names
pub fn normalize_arch(arch: &str) -> String {
    let arch = arch.trim().to_ascii_lowercase();
    match arch.as_str() {
        "x86_64" | "x86-64" | "amd64" => "amd64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        "arm" | "armhf" | "armel" | "armv7l" | "armv6l" => "arm".to_string(),
        "x86" | "i386" | "i686" | "386" => "386".to_string(),
        _ => arch,
    }
}

/// True for 32-bit and 64-bit ARM
pub fn is_arm_arch(arch: &str) -> bool {
    matches!(normalize_arch(arch).as_str(), "arm" | "arm64")
}

pub fn is_linux_os(os: &str) -> bool {
    os.trim().eq_ignore_ascii_case("linux")
}
