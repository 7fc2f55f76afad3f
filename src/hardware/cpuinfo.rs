//! /proc/cpuinfo field lookup
//!
//! On Linux the kernel has already decoded the ISA revision, so there is no
//! need to read ARM registers ourselves. The info file is a list of
//! `key : value` lines, repeated once per logical core; only the first
//! occurrence of a field is used.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::system::Platform;

/// Default location of the kernel's CPU info pseudo-file
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// Errors from a cpuinfo field lookup
#[derive(Error, Debug)]
pub enum CpuInfoError {
    #[error("cpuinfo lookup not implemented for OS {os}")]
    NotImplemented { os: String },

    #[error("failed to read cpuinfo: {0}")]
    Io(#[from] io::Error),

    #[error("cpuinfo field not found: {field}")]
    NotFound { field: String },
}

/// Scan `key : value` lines and return the trimmed value of the first line
/// whose key equals `field`, ignoring case.
pub fn lookup_field<R: BufRead>(reader: R, field: &str) -> Result<String, CpuInfoError> {
    // Vendor strings are not always UTF-8; only the matched line needs to be text.
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        if key.trim().eq_ignore_ascii_case(field) {
            return Ok(value.trim().to_string());
        }
    }

    Err(CpuInfoError::NotFound {
        field: field.to_string(),
    })
}

/// A cpuinfo pseudo-file to read fields from
#[derive(Debug, Clone)]
pub struct CpuInfoSource {
    path: PathBuf,
}

impl Default for CpuInfoSource {
    fn default() -> Self {
        Self::new(PROC_CPUINFO)
    }
}

impl CpuInfoSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `field` on `platform`. Only Linux exposes cpuinfo.
    pub fn lookup(&self, platform: &Platform, field: &str) -> Result<String, CpuInfoError> {
        if !platform.is_linux() {
            return Err(CpuInfoError::NotImplemented {
                os: platform.os.clone(),
            });
        }

        let file = File::open(&self.path)?;
        tracing::debug!(path = %self.path.display(), field, "scanning cpuinfo");

        lookup_field(BufReader::new(file), field)
    }
}
