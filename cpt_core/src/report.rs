//! # Analysis Report
//!
//! The `AnalysisReport` is the self-contained artifact of one run: metadata,
//! the site parameters, every derived record, the rejected rows and the
//! findings. Reports serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! AnalysisReport
//! ├── meta: ReportMetadata (version, id, label, timestamp)
//! ├── params: SiteParameters
//! ├── summary: ReportSummary (counts, critical depth)
//! ├── records: Vec<DepthRecord>
//! ├── rejected: Vec<RejectedRow>
//! └── findings: Vec<Finding>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::analysis::analyze;
//! use cpt_core::report::AnalysisReport;
//! use cpt_core::sample::{sample_parameters, sample_rows};
//!
//! let analysis = analyze(&sample_rows(), &sample_parameters()).unwrap();
//! let report = AnalysisReport::new("S-01", analysis);
//!
//! assert_eq!(report.summary.accepted_rows, 100);
//! let json = report.to_json().unwrap();
//! assert!(json.contains("\"label\": \"S-01\""));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{Analysis, DepthRecord, RejectedRow};
use crate::errors::CptResult;
use crate::recommendation::Finding;
use crate::site::SiteParameters;

/// Current schema version for report files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Schema version for compatibility checking
    pub version: String,
    /// Unique report id
    pub id: Uuid,
    /// Sounding label, e.g. "S-01" or the source file name
    pub label: String,
    /// When the analysis ran
    pub created: DateTime<Utc>,
}

/// Headline numbers for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    /// Records with FS < 1.0 in liquefiable soil
    pub triggered_records: usize,
    /// Lowest factor of safety in the series
    pub min_factor_of_safety: Option<f64>,
    /// Depth where the lowest factor of safety occurs (first one on ties)
    pub critical_depth_m: Option<f64>,
    /// Deepest accepted record
    pub max_depth_m: Option<f64>,
}

impl ReportSummary {
    /// Summarize an analysis
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let critical = analysis.critical_record();
        ReportSummary {
            accepted_rows: analysis.records.len(),
            rejected_rows: analysis.rejected.len(),
            triggered_records: analysis.records.iter().filter(|r| r.is_triggered()).count(),
            min_factor_of_safety: critical.map(|r| r.factor_of_safety),
            critical_depth_m: critical.map(|r| r.depth_m),
            max_depth_m: analysis
                .records
                .iter()
                .map(|r| r.depth_m)
                .max_by(f64::total_cmp),
        }
    }
}

/// Serializable artifact of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub meta: ReportMetadata,
    pub params: SiteParameters,
    pub summary: ReportSummary,
    pub records: Vec<DepthRecord>,
    pub rejected: Vec<RejectedRow>,
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    /// Build a report from a finished analysis.
    ///
    /// Runs the recommendation engine and stamps a fresh id and timestamp.
    pub fn new(label: impl Into<String>, analysis: Analysis) -> Self {
        let summary = ReportSummary::from_analysis(&analysis);
        let findings = analysis.recommendations();
        AnalysisReport {
            meta: ReportMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                label: label.into(),
                created: Utc::now(),
            },
            params: analysis.params,
            summary,
            records: analysis.records,
            rejected: analysis.rejected,
            findings,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> CptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report from JSON
    pub fn from_json(json: &str) -> CptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether any finding calls for remediation
    pub fn has_hazards(&self) -> bool {
        self.findings.iter().any(Finding::is_hazard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::ingest::RawRow;
    use crate::site::UnitMode;

    fn params() -> SiteParameters {
        SiteParameters {
            groundwater_depth_m: 100.0,
            magnitude: 7.5,
            pga_g: 0.4,
            unit_weight_kn_m3: 18.0,
            unit: UnitMode::Mpa,
        }
    }

    fn rows() -> Vec<RawRow> {
        let mut rows: Vec<RawRow> = (1..=10)
            .map(|i| {
                RawRow::new()
                    .with("depth", i as f64 * 0.2)
                    .with("qc", 10.0)
                    .with("fs", 0.1)
            })
            .collect();
        rows.push(RawRow::new().with("depth", "n/a"));
        rows
    }

    #[test]
    fn test_summary_counts() {
        let report = AnalysisReport::new("fixture", analyze(&rows(), &params()).unwrap());
        let s = &report.summary;
        assert_eq!(s.accepted_rows, 10);
        assert_eq!(s.rejected_rows, 1);
        // 0.8 m to 1.4 m in the uniform sand fixture
        assert_eq!(s.triggered_records, 4);
        assert!((s.critical_depth_m.unwrap() - 0.8).abs() < 1e-9);
        assert!((s.min_factor_of_safety.unwrap() - 0.224_649).abs() < 1e-4);
        assert!((s.max_depth_m.unwrap() - 2.0).abs() < 1e-9);
        assert!(report.has_hazards());
    }

    #[test]
    fn test_empty_report() {
        let report = AnalysisReport::new("empty", analyze(&[], &params()).unwrap());
        assert_eq!(report.summary.accepted_rows, 0);
        assert_eq!(report.summary.min_factor_of_safety, None);
        assert_eq!(report.findings, vec![Finding::Acceptable]);
        assert!(!report.has_hazards());
    }

    #[test]
    fn test_metadata() {
        let a = AnalysisReport::new("S-01", analyze(&rows(), &params()).unwrap());
        let b = AnalysisReport::new("S-01", analyze(&rows(), &params()).unwrap());
        assert_eq!(a.meta.version, SCHEMA_VERSION);
        assert_ne!(a.meta.id, b.meta.id);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_json_roundtrip() {
        let report = AnalysisReport::new("S-02", analyze(&rows(), &params()).unwrap());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"LiquefactionPotential\""));
        assert!(json.contains("\"kind\": \"NotNumeric\""));

        let loaded = AnalysisReport::from_json(&json).unwrap();
        assert_eq!(loaded.meta, report.meta);
        assert_eq!(loaded.findings, report.findings);
        assert_eq!(loaded.rejected, report.rejected);
    }

    #[test]
    fn test_invalid_json() {
        let err = AnalysisReport::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
