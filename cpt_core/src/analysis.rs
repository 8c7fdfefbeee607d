//! # Sounding Analysis Pipeline
//!
//! Drives a depth-ordered series of raw rows through normalization, stress
//! integration, classification and liquefaction triggering, producing one
//! [`DepthRecord`] per usable row.
//!
//! ```text
//! RawRow ──normalize──► NormalizedRow ──advance──► StressPoint
//!                                                     │
//!                    DepthRecord ◄──evaluate──◄──classify
//! ```
//!
//! Site parameters are validated before the first row. After that the run
//! never fails: rows that can't be used are kept as [`RejectedRow`]s next to
//! the records. [`ProfileBuilder`] takes rows one at a time, so a host that
//! wants to stop early can do so between any two rows; [`analyze`] is the
//! all-at-once form.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::analysis::analyze;
//! use cpt_core::ingest::RawRow;
//! use cpt_core::site::{SiteParameters, UnitMode};
//!
//! let params = SiteParameters {
//!     groundwater_depth_m: 1.0,
//!     magnitude: 7.5,
//!     pga_g: 0.4,
//!     unit_weight_kn_m3: 18.0,
//!     unit: UnitMode::Mpa,
//! };
//! let rows = vec![
//!     RawRow::new().with("Depth", "1.0").with("qc", "4.0").with("fs", "0.03"),
//!     RawRow::new().with("Depth", "2.0").with("qc", "oops").with("fs", "0.03"),
//!     RawRow::new().with("Depth", "3.0").with("qc", "4.0").with("fs", "0.03"),
//! ];
//!
//! let analysis = analyze(&rows, &params).unwrap();
//! assert_eq!(analysis.records.len(), 2);
//! assert_eq!(analysis.rejected[0].index, 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classification::{classify, SoilZone};
use crate::errors::{CptError, CptResult};
use crate::ingest::{normalize_row, NormalizedRow, RawRow, RejectReason, RowOutcome};
use crate::liquefaction::{evaluate, LiquefactionInput};
use crate::recommendation::{recommend, Finding, LIQUEFACTION_FS_THRESHOLD};
use crate::site::SiteParameters;
use crate::stress::{StressPoint, StressState};
use crate::units::{Kpa, Mpa};

/// Derived engineering values at one depth.
///
/// ## JSON Example
///
/// ```json
/// {
///   "depth_m": 2.0, "qc_raw": 10.0, "fs_raw": 0.1,
///   "qc_kpa": 10000.0, "fs_kpa": 100.0,
///   "total_stress_kpa": 36.0, "pore_pressure_kpa": 0.0, "effective_stress_kpa": 36.0,
///   "qtn": 276.78, "friction_ratio_pct": 1.0036, "ic": 1.5965, "zone": "Sands",
///   "fines_content_pct": 4.30, "qc1n": 166.67, "qc1n_cs": 167.11,
///   "rd": 0.991, "msf": 1.0001, "csr": 0.2577, "crr": 0.3803,
///   "factor_of_safety": 1.476
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRecord {
    /// Depth below ground surface (m)
    pub depth_m: f64,
    /// Cone resistance as logged (input unit)
    pub qc_raw: f64,
    /// Sleeve friction as logged (input unit)
    pub fs_raw: f64,
    /// Cone resistance (kPa)
    pub qc_kpa: f64,
    /// Sleeve friction (kPa)
    pub fs_kpa: f64,

    /// Total vertical stress σv (kPa)
    pub total_stress_kpa: f64,
    /// Hydrostatic pore pressure u (kPa)
    pub pore_pressure_kpa: f64,
    /// Effective vertical stress σ'v (kPa), never below 1 kPa
    pub effective_stress_kpa: f64,

    /// Normalized cone resistance Qtn
    pub qtn: f64,
    /// Friction ratio Fr (%)
    pub friction_ratio_pct: f64,
    /// Soil behavior type index Ic. +∞ when the sleeve friction is zero;
    /// JSON carries that as `null`.
    #[serde(with = "unbounded")]
    pub ic: f64,
    /// Soil behavior zone
    pub zone: SoilZone,

    /// Estimated fines content (%)
    pub fines_content_pct: f64,
    /// Overburden-normalized cone resistance
    pub qc1n: f64,
    /// Clean-sand equivalent normalized resistance
    pub qc1n_cs: f64,
    /// Stress reduction coefficient
    pub rd: f64,
    /// Magnitude scaling factor
    pub msf: f64,
    /// Cyclic stress ratio at the design magnitude
    pub csr: f64,
    /// Cyclic resistance ratio at the design magnitude. Overflows to +∞ in
    /// very dense shallow layers; JSON carries that as `null`.
    #[serde(with = "unbounded")]
    pub crr: f64,
    /// Factor of safety against liquefaction
    pub factor_of_safety: f64,
}

mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

impl DepthRecord {
    /// Cone resistance in MPa, whatever unit it was logged in
    pub fn qc_mpa(&self) -> f64 {
        Mpa::from(Kpa(self.qc_kpa)).value()
    }

    /// Liquefiable soil with FS below 1.0
    pub fn is_triggered(&self) -> bool {
        self.factor_of_safety < LIQUEFACTION_FS_THRESHOLD && self.zone.is_liquefiable()
    }
}

/// Build the derived record for one normalized row at its stress point.
///
/// # Returns
///
/// * `Ok(DepthRecord)` - Fully derived record
/// * `Err(CptError::DegenerateInput)` - Soil behavior index undefined here
pub fn derive_record(
    row: &NormalizedRow,
    stress: &StressPoint,
    params: &SiteParameters,
) -> CptResult<DepthRecord> {
    let class = classify(row.qc_kpa, row.fs_kpa, stress.total_kpa, stress.effective_kpa)?;

    let liq = evaluate(
        &LiquefactionInput {
            depth_m: row.depth_m,
            qc_kpa: row.qc_kpa,
            total_stress_kpa: stress.total_kpa,
            effective_stress_kpa: stress.effective_kpa,
            ic: class.ic,
            zone: class.zone,
        },
        params.magnitude,
        params.pga_g,
    );

    Ok(DepthRecord {
        depth_m: row.depth_m,
        qc_raw: row.qc_raw,
        fs_raw: row.fs_raw,
        qc_kpa: row.qc_kpa,
        fs_kpa: row.fs_kpa,
        total_stress_kpa: stress.total_kpa,
        pore_pressure_kpa: stress.pore_kpa,
        effective_stress_kpa: stress.effective_kpa,
        qtn: class.qtn,
        friction_ratio_pct: class.friction_ratio_pct,
        ic: class.ic,
        zone: class.zone,
        fines_content_pct: liq.fines_content_pct,
        qc1n: liq.qc1n,
        qc1n_cs: liq.qc1n_cs,
        rd: liq.rd,
        msf: liq.msf,
        csr: liq.csr,
        crr: liq.crr,
        factor_of_safety: liq.factor_of_safety,
    })
}

/// An input row left out of the derived series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based position in the input series
    pub index: usize,
    /// Why the row was rejected
    pub reason: RejectReason,
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Parameters the run used
    pub params: SiteParameters,
    /// Derived records, in input order
    pub records: Vec<DepthRecord>,
    /// Rows that were skipped, in input order
    pub rejected: Vec<RejectedRow>,
}

impl Analysis {
    /// Remediation findings for the derived series
    pub fn recommendations(&self) -> Vec<Finding> {
        recommend(&self.records)
    }

    /// Record with the lowest factor of safety
    pub fn critical_record(&self) -> Option<&DepthRecord> {
        self.records
            .iter()
            .min_by(|a, b| a.factor_of_safety.total_cmp(&b.factor_of_safety))
    }
}

/// Row-at-a-time analysis driver.
///
/// Holds the stress fold state for one run. Every call to [`push`](Self::push)
/// fully processes one row, so the accumulated state is consistent between
/// calls.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    params: SiteParameters,
    state: StressState,
    next_index: usize,
    records: Vec<DepthRecord>,
    rejected: Vec<RejectedRow>,
}

impl ProfileBuilder {
    /// Start a run. Fails if the site parameters are invalid.
    pub fn new(params: SiteParameters) -> CptResult<Self> {
        params.validate()?;
        Ok(ProfileBuilder {
            params,
            state: StressState::default(),
            next_index: 0,
            records: Vec::new(),
            rejected: Vec::new(),
        })
    }

    /// Process the next row of the series.
    ///
    /// Returns the derived record, or the reason the row was skipped.
    pub fn push(&mut self, row: &RawRow) -> Result<&DepthRecord, &RejectReason> {
        let index = self.next_index;
        self.next_index += 1;

        match self.process(row) {
            Ok(record) => {
                self.records.push(record);
                Ok(&self.records[self.records.len() - 1])
            }
            Err(reason) => {
                debug!(index, %reason, "row rejected");
                self.rejected.push(RejectedRow { index, reason });
                Err(&self.rejected[self.rejected.len() - 1].reason)
            }
        }
    }

    fn process(&mut self, row: &RawRow) -> Result<DepthRecord, RejectReason> {
        let normalized = match normalize_row(row, self.params.unit) {
            RowOutcome::Accepted(normalized) => normalized,
            RowOutcome::Rejected(reason) => return Err(reason),
        };

        if normalized.depth_m < self.state.previous_depth_m {
            warn!(
                depth_m = normalized.depth_m,
                previous_depth_m = self.state.previous_depth_m,
                "depth decreased; rows are expected in increasing depth order"
            );
        }

        // The soil column exists at this depth even if the reading turns out
        // to be unusable, so the fold advances before classification.
        let (next, stress) = self.state.advance(
            normalized.depth_m,
            self.params.unit_weight_kn_m3,
            self.params.groundwater_depth_m,
        );
        self.state = next;

        derive_record(&normalized, &stress, &self.params).map_err(|e| {
            let reason = match e {
                CptError::DegenerateInput { reason } => reason,
                other => other.to_string(),
            };
            warn!(depth_m = normalized.depth_m, %reason, "soil behavior index undefined");
            RejectReason::Degenerate {
                depth_m: normalized.depth_m,
                reason,
            }
        })
    }

    /// Records derived so far
    pub fn records(&self) -> &[DepthRecord] {
        &self.records
    }

    /// Current stress fold state
    pub fn state(&self) -> StressState {
        self.state
    }

    /// Finish the run.
    pub fn finish(self) -> Analysis {
        info!(
            accepted = self.records.len(),
            rejected = self.rejected.len(),
            "sounding analyzed"
        );
        Analysis {
            params: self.params,
            records: self.records,
            rejected: self.rejected,
        }
    }
}

/// Analyze a full depth-ordered series.
///
/// # Returns
///
/// * `Ok(Analysis)` - Records and rejected rows
/// * `Err(CptError)` - Site parameters are invalid; no row was processed
pub fn analyze(rows: &[RawRow], params: &SiteParameters) -> CptResult<Analysis> {
    let mut builder = ProfileBuilder::new(*params)?;
    for row in rows {
        // Rejections are kept on the builder
        let _ = builder.push(row);
    }
    Ok(builder.finish())
}
