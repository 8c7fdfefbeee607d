//! # File I/O Module
//!
//! Saving and loading analysis reports:
//! - **Atomic saves**: Write to a `.tmp` sibling, sync, rename over the target
//! - **Version validation**: Reports from an incompatible schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use cpt_core::analysis::analyze;
//! use cpt_core::file_io::{load_report, save_report};
//! use cpt_core::report::AnalysisReport;
//! use cpt_core::sample::{sample_parameters, sample_rows};
//! use std::path::Path;
//!
//! let analysis = analyze(&sample_rows(), &sample_parameters()).unwrap();
//! let report = AnalysisReport::new("S-01", analysis);
//!
//! save_report(&report, Path::new("s01.json")).unwrap();
//! let loaded = load_report(Path::new("s01.json")).unwrap();
//! assert_eq!(loaded.meta.id, report.meta.id);
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{CptError, CptResult};
use crate::report::{AnalysisReport, SCHEMA_VERSION};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Save a report with atomic write semantics.
///
/// The report is written to `<path>.tmp`, synced to disk, then renamed over
/// `path`, so an interrupted save never leaves a truncated report behind.
pub fn save_report(report: &AnalysisReport, path: &Path) -> CptResult<()> {
    let json = report.to_json()?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CptError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CptError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CptError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CptError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "report saved");
    Ok(())
}

/// Load a report from a file.
///
/// # Returns
///
/// * `Ok(AnalysisReport)` - Successfully loaded report
/// * `Err(CptError::VersionMismatch)` - Report schema is incompatible
/// * `Err(CptError::SerializationError)` - Invalid JSON
/// * `Err(CptError::FileError)` - I/O error
pub fn load_report(path: &Path) -> CptResult<AnalysisReport> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CptError::file_error("read", path.display().to_string(), e.to_string()))?;

    let report: AnalysisReport =
        serde_json::from_str(&contents).map_err(|e| CptError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&report.meta.version)?;
    Ok(report)
}

/// Check a report version against the current schema.
///
/// Major versions must match. While the schema is 0.x, a newer minor version
/// is also refused.
pub fn validate_version(file_version: &str) -> CptResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CptError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::sample::{sample_parameters, sample_rows};
    use std::env::temp_dir;

    fn temp_report_path(name: &str) -> PathBuf {
        temp_dir().join(format!("cpt_core_test_{}_{}.json", name, std::process::id()))
    }

    fn sample_report() -> AnalysisReport {
        AnalysisReport::new("S-01", analyze(&sample_rows(), &sample_parameters()).unwrap())
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_report_path("roundtrip");
        let report = sample_report();
        save_report(&report, &path).unwrap();

        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded.meta, report.meta);
        assert_eq!(loaded.summary, report.summary);
        assert_eq!(loaded.records, report.records);
        assert_eq!(loaded.findings, report.findings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_report_path("atomic");
        save_report(&sample_report(), &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_report(&temp_report_path("missing")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_report_path("newer");
        let mut report = sample_report();
        report.meta.version = "0.9.0".to_string();
        save_report(&report, &path).unwrap();

        let err = load_report(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_rules() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        assert_eq!(
            tmp_path_for(Path::new("/data/s01.json")),
            PathBuf::from("/data/s01.json.tmp")
        );
    }
}
