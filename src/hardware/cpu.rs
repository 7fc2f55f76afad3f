//! ARM CPU variant detection
//!
//! The variant is resolved once per process by [`init_variant`] and read
//! through [`cpu_variant`]. Detection is best effort: any failure is logged
//! and leaves the variant empty.

use once_cell::sync::OnceCell;

use super::cpuinfo::CpuInfoSource;
use super::system::Platform;

/// cpuinfo label carrying the ARM ISA revision
pub const ARCHITECTURE_FIELD: &str = "Cpu architecture";

/// Variant of the running host, e.g. "v7", "v8"
static CPU_VARIANT: OnceCell<String> = OnceCell::new();

/// Map a raw "CPU architecture" value to a variant name
pub fn normalize_variant(raw: &str) -> &'static str {
    match raw {
        "8" => "v8",
        "7" | "7M" | "?(12)" | "?(13)" | "?(14)" | "?(15)" | "?(16)" | "?(17)" => "v7",
        "6" | "6TEJ" => "v6",
        "5" | "5T" | "5TE" | "5TEJ" => "v5",
        "4" | "4T" => "v4",
        "3" => "v3",
        _ => "unknown",
    }
}

/// Resolve the variant for `platform` without touching the process cache.
///
/// Returns an empty string for non-ARM platforms and when the lookup fails.
pub fn detect_variant(platform: &Platform, source: &CpuInfoSource) -> String {
    if !platform.is_arm() {
        return String::new();
    }

    match source.lookup(platform, ARCHITECTURE_FIELD) {
        Ok(raw) => {
            let variant = normalize_variant(&raw);
            tracing::debug!(raw = %raw, variant, "detected cpu variant");
            variant.to_string()
        }
        Err(err) => {
            tracing::error!(error = %err, "failure getting variant");
            String::new()
        }
    }
}

/// Detect and cache the variant of the running host from `/proc/cpuinfo`
pub fn init_variant() -> &'static str {
    init_variant_with(&Platform::current(), &CpuInfoSource::default())
}

/// Detect and cache the variant using the given platform and source.
///
/// Only the first call in a process scans; later calls return the cached value.
pub fn init_variant_with(platform: &Platform, source: &CpuInfoSource) -> &'static str {
    CPU_VARIANT
        .get_or_init(|| detect_variant(platform, source))
        .as_str()
}

/// Cached variant, or an empty string if [`init_variant`] has not run
pub fn cpu_variant() -> &'static str {
    cached_variant(&CPU_VARIANT)
}

fn cached_variant(cell: &OnceCell<String>) -> &str {
    cell.get().map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn detect_with_error_logs(platform: &Platform, source: &CpuInfoSource) -> (String, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .finish();

        let variant =
            tracing::subscriber::with_default(subscriber, || detect_variant(platform, source));
        (variant, logs.contents())
    }

    fn cpuinfo_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_normalize_known_values() {
        let table = [
            ("8", "v8"),
            ("7", "v7"),
            ("7M", "v7"),
            ("?(12)", "v7"),
            ("?(13)", "v7"),
            ("?(14)", "v7"),
            ("?(15)", "v7"),
            ("?(16)", "v7"),
            ("?(17)", "v7"),
            ("6", "v6"),
            ("6TEJ", "v6"),
            ("5", "v5"),
            ("5T", "v5"),
            ("5TE", "v5"),
            ("5TEJ", "v5"),
            ("4", "v4"),
            ("4T", "v4"),
            ("3", "v3"),
        ];

        for (raw, expected) in table {
            assert_eq!(normalize_variant(raw), expected, "raw value {raw:?}");
        }
    }

    #[test]
    fn test_normalize_unknown_values() {
        for raw in ["", "9", "AArch64", "7m", "6tej", " 7", "?(18)", "v7"] {
            assert_eq!(normalize_variant(raw), "unknown", "raw value {raw:?}");
        }
    }

    #[test]
    fn test_detect_arm_v7() {
        let file = cpuinfo_fixture("processor\t: 0\nCPU architecture   : 7\n");
        let platform = Platform::new("linux", "arm");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "v7");
    }

    #[test]
    fn test_detect_arm64_first_block() {
        let file = cpuinfo_fixture(
            "processor\t: 0\nCPU architecture: 8\n\nprocessor\t: 1\nCPU architecture: 7\n",
        );
        let platform = Platform::new("linux", "aarch64");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "v8");
    }

    #[test]
    fn test_detect_non_arm_ignores_file() {
        let file = cpuinfo_fixture("CPU architecture: 8\n");
        let platform = Platform::new("linux", "x86_64");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "");
    }

    #[test]
    fn test_detect_non_linux_is_empty() {
        let file = cpuinfo_fixture("CPU architecture: 8\n");
        let platform = Platform::new("macos", "aarch64");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "");
    }

    #[test]
    fn test_detect_missing_field_is_empty() {
        let file = cpuinfo_fixture("processor\t: 0\nHardware\t: BCM2835\n");
        let platform = Platform::new("linux", "arm");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "");
    }

    #[test]
    fn test_detect_unrecognized_value_is_unknown() {
        let file = cpuinfo_fixture("CPU architecture: AArch64\n");
        let platform = Platform::new("linux", "arm64");
        let variant = detect_variant(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "unknown");
    }

    #[test]
    fn test_detect_is_repeatable() {
        let file = cpuinfo_fixture("CPU architecture: 5TEJ\n");
        let platform = Platform::new("linux", "arm");
        let source = CpuInfoSource::new(file.path());
        assert_eq!(detect_variant(&platform, &source), "v5");
        assert_eq!(detect_variant(&platform, &source), "v5");
    }

    #[test]
    fn test_init_variant_caches_first_result() {
        let first = cpuinfo_fixture("CPU architecture: 6\n");
        let second = cpuinfo_fixture("CPU architecture: 8\n");
        let platform = Platform::new("linux", "arm");

        let variant = init_variant_with(&platform, &CpuInfoSource::new(first.path()));
        assert_eq!(variant, "v6");
        assert_eq!(cpu_variant(), "v6");

        let again = init_variant_with(&platform, &CpuInfoSource::new(second.path()));
        assert_eq!(again, "v6");
        assert_eq!(cpu_variant(), "v6");
    }

    #[test]
    fn test_cached_variant_empty_before_init() {
        let cell = OnceCell::new();
        assert_eq!(cached_variant(&cell), "");

        cell.set("v7".to_string()).unwrap();
        assert_eq!(cached_variant(&cell), "v7");
    }

    #[test]
    fn test_failed_lookup_on_arm_logs_error() {
        let file = cpuinfo_fixture("processor\t: 0\nHardware\t: BCM2835\n");
        let platform = Platform::new("linux", "arm");

        let (variant, logs) = detect_with_error_logs(&platform, &CpuInfoSource::new(file.path()));
        assert_eq!(variant, "");
        assert!(logs.contains("ERROR"), "logs: {logs}");
        assert!(logs.contains("failure getting variant"), "logs: {logs}");
        assert!(logs.contains("cpuinfo field not found"), "logs: {logs}");
    }

    #[test]
    fn test_successful_or_non_arm_detection_is_silent() {
        let file = cpuinfo_fixture("CPU architecture: 7\n");
        let source = CpuInfoSource::new(file.path());

        let (variant, logs) = detect_with_error_logs(&Platform::new("linux", "arm"), &source);
        assert_eq!(variant, "v7");
        assert!(logs.is_empty(), "logs: {logs}");

        let (variant, logs) = detect_with_error_logs(&Platform::new("linux", "x86_64"), &source);
        assert_eq!(variant, "");
        assert!(logs.is_empty(), "logs: {logs}");
    }
}
