//! # Remediation Recommendations
//!
//! Scans the derived depth series for conditions that call for ground
//! improvement and attaches candidate methods to each one.
//!
//! | Condition | Trigger | Methods |
//! |-----------|---------|---------|
//! | Liquefaction | FS < 1.0 in a liquefiable zone | by interval depth |
//! | Soft soil | clay or silt mixture with qc < 1.0 MPa | PVD + preloading, deep soil mixing |
//! | Peat | any record in the peat zone | relocation, replacement, piles |
//!
//! Detectors are independent [`Detector`] functions; [`recommend`] runs the
//! standard set in order and falls back to [`Finding::Acceptable`] when none
//! of them fires.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::DepthRecord;
use crate::classification::SoilZone;

/// Factor of safety below which a liquefiable layer is flagged
pub const LIQUEFACTION_FS_THRESHOLD: f64 = 1.0;

/// Cone resistance below which soil is treated as soft (MPa)
pub const SOFT_SOIL_QC_MPA: f64 = 1.0;

/// Intervals ending deeper than this need deep densification (m)
pub const SHALLOW_TREATMENT_LIMIT_M: f64 = 5.0;

/// A contiguous run of triggered depths, from the first to the last triggered
/// record (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthInterval {
    pub top_m: f64,
    pub bottom_m: f64,
}

impl fmt::Display for DepthInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} m - {:.1} m", self.top_m, self.bottom_m)
    }
}

/// Ground improvement methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Remediation {
    ExcavationReplacement,
    DynamicCompaction,
    VibroCompaction,
    StoneColumns,
    VerticalDrainPreloading,
    DeepSoilMixing,
    Relocation,
    SoilReplacement,
    PileFoundation,
}

impl Remediation {
    pub fn description(&self) -> &'static str {
        match self {
            Remediation::ExcavationReplacement => "Excavation & Replacement",
            Remediation::DynamicCompaction => "Dynamic Compaction",
            Remediation::VibroCompaction => "Vibro Compaction / Vibroflotation",
            Remediation::StoneColumns => "Stone Columns",
            Remediation::VerticalDrainPreloading => {
                "PVD (Prefabricated Vertical Drain) + Preloading to accelerate consolidation"
            }
            Remediation::DeepSoilMixing => {
                "Deep Soil Mixing (DSM) where rapid bearing capacity improvement is needed"
            }
            Remediation::Relocation => "Relocate the structure",
            Remediation::SoilReplacement => "Soil replacement",
            Remediation::PileFoundation => "Pile foundation",
        }
    }

    /// Densification methods suited to an interval's depth
    pub fn for_interval(interval: &DepthInterval) -> [Remediation; 2] {
        if interval.bottom_m <= SHALLOW_TREATMENT_LIMIT_M {
            [Remediation::ExcavationReplacement, Remediation::DynamicCompaction]
        } else {
            [Remediation::VibroCompaction, Remediation::StoneColumns]
        }
    }
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One condition found in the sounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Finding {
    LiquefactionPotential {
        intervals: Vec<DepthInterval>,
        methods: Vec<Remediation>,
    },
    SoftSoil {
        min_qc_mpa: f64,
        methods: Vec<Remediation>,
    },
    Peat {
        methods: Vec<Remediation>,
    },
    /// Nothing flagged
    Acceptable,
}

impl Finding {
    pub fn title(&self) -> &'static str {
        match self {
            Finding::LiquefactionPotential { .. } => "Liquefaction potential detected",
            Finding::SoftSoil { .. } => "Soft soil (soft clay) detected",
            Finding::Peat { .. } => "Peat layer detected",
            Finding::Acceptable => "Soil condition relatively good",
        }
    }

    /// Suggested methods, empty for [`Finding::Acceptable`]
    pub fn methods(&self) -> &[Remediation] {
        match self {
            Finding::LiquefactionPotential { methods, .. }
            | Finding::SoftSoil { methods, .. }
            | Finding::Peat { methods } => methods,
            Finding::Acceptable => &[],
        }
    }

    /// Whether the finding asks for action
    pub fn is_hazard(&self) -> bool {
        !matches!(self, Finding::Acceptable)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title())?;
        match self {
            Finding::LiquefactionPotential { intervals, .. } => {
                for interval in intervals {
                    writeln!(f, "  Depth {interval}")?;
                }
            }
            Finding::SoftSoil { min_qc_mpa, .. } => {
                writeln!(f, "  Soft clay layer found with minimum qc {min_qc_mpa:.2} MPa.")?;
            }
            Finding::Peat { .. } => writeln!(f, "  Organic soil is highly compressible.")?,
            Finding::Acceptable => {
                writeln!(
                    f,
                    "  No liquefaction potential found (FS < {LIQUEFACTION_FS_THRESHOLD:.1})."
                )?;
            }
        }
        if !self.methods().is_empty() {
            writeln!(f, "  Suggested remediation:")?;
            for method in self.methods() {
                writeln!(f, "  - {method}")?;
            }
        }
        Ok(())
    }
}

/// A detector inspects the series and reports at most one finding.
pub type Detector = fn(&[DepthRecord]) -> Option<Finding>;

/// Detectors run by [`recommend`], in reporting order
pub const STANDARD_DETECTORS: [Detector; 3] = [detect_liquefaction, detect_soft_soil, detect_peat];

/// Group triggered records into contiguous intervals.
///
/// An interval opens at the first triggered record and closes at the last
/// triggered record before a non-triggered one. A run still open at the end of
/// the series closes at the final record.
pub fn liquefaction_intervals(records: &[DepthRecord]) -> Vec<DepthInterval> {
    let mut intervals = Vec::new();
    let mut open: Option<DepthInterval> = None;

    for record in records {
        if record.is_triggered() {
            if let Some(interval) = open.as_mut() {
                interval.bottom_m = record.depth_m;
            } else {
                open = Some(DepthInterval {
                    top_m: record.depth_m,
                    bottom_m: record.depth_m,
                });
            }
        } else if let Some(interval) = open.take() {
            intervals.push(interval);
        }
    }
    intervals.extend(open);
    intervals
}

fn push_unique(methods: &mut Vec<Remediation>, method: Remediation) {
    if !methods.contains(&method) {
        methods.push(method);
    }
}

/// Liquefaction intervals with depth-appropriate densification methods.
pub fn detect_liquefaction(records: &[DepthRecord]) -> Option<Finding> {
    let intervals = liquefaction_intervals(records);
    if intervals.is_empty() {
        return None;
    }

    let mut methods = Vec::new();
    for interval in &intervals {
        for method in Remediation::for_interval(interval) {
            push_unique(&mut methods, method);
        }
    }
    Some(Finding::LiquefactionPotential { intervals, methods })
}

/// Soft cohesive soil anywhere in the series, reported with its lowest qc.
pub fn detect_soft_soil(records: &[DepthRecord]) -> Option<Finding> {
    let min_qc_mpa = records
        .iter()
        .filter(|r| matches!(r.zone, SoilZone::Clays | SoilZone::SiltMixtures))
        .map(DepthRecord::qc_mpa)
        .filter(|&qc| qc < SOFT_SOIL_QC_MPA)
        .min_by(f64::total_cmp)?;

    Some(Finding::SoftSoil {
        min_qc_mpa,
        methods: vec![Remediation::VerticalDrainPreloading, Remediation::DeepSoilMixing],
    })
}

/// Any record classified as peat.
pub fn detect_peat(records: &[DepthRecord]) -> Option<Finding> {
    records.iter().any(|r| r.zone == SoilZone::Peat).then(|| Finding::Peat {
        methods: vec![
            Remediation::Relocation,
            Remediation::SoilReplacement,
            Remediation::PileFoundation,
        ],
    })
}

/// Run a set of detectors, falling back to [`Finding::Acceptable`].
pub fn recommend_with(records: &[DepthRecord], detectors: &[Detector]) -> Vec<Finding> {
    let findings: Vec<Finding> = detectors.iter().filter_map(|detect| detect(records)).collect();
    if findings.is_empty() {
        vec![Finding::Acceptable]
    } else {
        findings
    }
}

/// Findings for a derived series using the standard detectors.
pub fn recommend(records: &[DepthRecord]) -> Vec<Finding> {
    recommend_with(records, &STANDARD_DETECTORS)
}
