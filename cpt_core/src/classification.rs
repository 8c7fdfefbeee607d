//! # Soil Behavior Type Classification
//!
//! Robertson soil behavior type (SBT) from the normalized cone resistance and
//! friction ratio, summarized by the index Ic.
//!
//! ```text
//! Cn  = (Pa / σ'v)^n                      n = 1.0, Pa = 100 kPa
//! Qtn = ((qc - σv) / Pa) · Cn
//! Fr  = fs / (qc - σv) · 100              (%)
//! Ic  = √((3.47 - log Qtn)² + (1.22 + log Fr)²)
//! ```
//!
//! Ic is undefined when the net cone resistance `qc - σv` is not positive or
//! the sleeve friction is negative. [`classify`] reports those depths as
//! [`CptError::DegenerateInput`] rather than handing back a NaN. Zero sleeve
//! friction gives Fr = 0 and Ic = +∞, which classifies as peat.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::classification::{classify, SoilZone};
//!
//! // 10 MPa cone, 100 kPa sleeve at 2 m in dry sand
//! let c = classify(10_000.0, 100.0, 36.0, 36.0).unwrap();
//! assert_eq!(c.zone, SoilZone::Sands);
//! assert!((c.ic - 1.5965).abs() < 1e-3);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CptError, CptResult};
use crate::units::ATMOSPHERIC_PRESSURE_KPA;

/// Stress exponent n (fixed, not iterated with Ic)
pub const STRESS_EXPONENT: f64 = 1.0;

/// Soil behavior type zones, from coarsest to most organic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilZone {
    /// Zone 7 - gravelly sand to dense sand
    GravellySand,
    /// Zone 6 - clean sand to silty sand
    Sands,
    /// Zone 5 - silty sand to sandy silt
    SandMixtures,
    /// Zone 4 - clayey silt to silty clay
    SiltMixtures,
    /// Zone 3 - silty clay to clay
    Clays,
    /// Zone 2 - organic soils, peat
    Peat,
}

impl SoilZone {
    /// All zones in order of increasing Ic
    pub const ALL: [SoilZone; 6] = [
        SoilZone::GravellySand,
        SoilZone::Sands,
        SoilZone::SandMixtures,
        SoilZone::SiltMixtures,
        SoilZone::Clays,
        SoilZone::Peat,
    ];

    /// Lower Ic bounds, highest first. A zone applies when Ic is strictly above
    /// its bound; anything at or below 1.31 is gravelly sand.
    const THRESHOLDS: [(f64, SoilZone); 5] = [
        (3.60, SoilZone::Peat),
        (2.95, SoilZone::Clays),
        (2.60, SoilZone::SiltMixtures),
        (2.05, SoilZone::SandMixtures),
        (1.31, SoilZone::Sands),
    ];

    /// Zone for a soil behavior index.
    ///
    /// ```rust
    /// use cpt_core::classification::SoilZone;
    ///
    /// assert_eq!(SoilZone::from_ic(2.95), SoilZone::SiltMixtures);
    /// assert_eq!(SoilZone::from_ic(2.9501), SoilZone::Clays);
    /// ```
    pub fn from_ic(ic: f64) -> SoilZone {
        Self::THRESHOLDS
            .iter()
            .find(|(bound, _)| ic > *bound)
            .map(|(_, zone)| *zone)
            .unwrap_or(SoilZone::GravellySand)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SoilZone::GravellySand => "Gravelly Sand",
            SoilZone::Sands => "Sands",
            SoilZone::SandMixtures => "Sand Mixtures",
            SoilZone::SiltMixtures => "Silt Mixtures",
            SoilZone::Clays => "Clays",
            SoilZone::Peat => "Peat",
        }
    }

    /// Robertson SBT zone number
    pub fn robertson_zone(&self) -> u8 {
        match self {
            SoilZone::GravellySand => 7,
            SoilZone::Sands => 6,
            SoilZone::SandMixtures => 5,
            SoilZone::SiltMixtures => 4,
            SoilZone::Clays => 3,
            SoilZone::Peat => 2,
        }
    }

    /// Clays and peat are treated as non-liquefiable by the CPT triggering method
    pub fn is_liquefiable(&self) -> bool {
        !matches!(self, SoilZone::Clays | SoilZone::Peat)
    }
}

impl std::fmt::Display for SoilZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification results at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Normalized cone resistance Qtn
    pub qtn: f64,
    /// Friction ratio Fr (%)
    pub friction_ratio_pct: f64,
    /// Soil behavior type index Ic
    pub ic: f64,
    /// Soil behavior zone
    pub zone: SoilZone,
}

/// Soil behavior type index from normalized resistance and friction ratio.
pub fn soil_behavior_index(qtn: f64, friction_ratio_pct: f64) -> f64 {
    ((3.47 - qtn.log10()).powi(2) + (1.22 + friction_ratio_pct.log10()).powi(2)).sqrt()
}

/// Classify one depth.
///
/// # Arguments
///
/// * `qc_kpa` - Cone resistance (kPa)
/// * `fs_kpa` - Sleeve friction (kPa)
/// * `total_stress_kpa` - Total vertical stress σv (kPa)
/// * `effective_stress_kpa` - Effective vertical stress σ'v (kPa)
///
/// # Returns
///
/// * `Ok(Classification)` - Qtn, Fr, Ic and zone
/// * `Err(CptError::DegenerateInput)` - Net resistance not positive or friction negative
pub fn classify(
    qc_kpa: f64,
    fs_kpa: f64,
    total_stress_kpa: f64,
    effective_stress_kpa: f64,
) -> CptResult<Classification> {
    let pa = ATMOSPHERIC_PRESSURE_KPA;
    let net_kpa = qc_kpa - total_stress_kpa;

    if net_kpa <= 0.0 {
        return Err(CptError::degenerate(
            format!("cone resistance {qc_kpa:.1} kPa does not exceed overburden {total_stress_kpa:.1} kPa"),
        ));
    }
    if fs_kpa < 0.0 {
        return Err(CptError::degenerate(
            format!("sleeve friction {fs_kpa:.1} kPa is negative"),
        ));
    }

    let cn = (pa / effective_stress_kpa).powf(STRESS_EXPONENT);
    let qtn = (net_kpa / pa) * cn;
    let friction_ratio_pct = fs_kpa / net_kpa * 100.0;
    let ic = soil_behavior_index(qtn, friction_ratio_pct);

    Ok(Classification {
        qtn,
        friction_ratio_pct,
        ic,
        zone: SoilZone::from_ic(ic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_boundaries() {
        let boundaries = [
            (1.31, SoilZone::GravellySand, SoilZone::Sands),
            (2.05, SoilZone::Sands, SoilZone::SandMixtures),
            (2.60, SoilZone::SandMixtures, SoilZone::SiltMixtures),
            (2.95, SoilZone::SiltMixtures, SoilZone::Clays),
            (3.60, SoilZone::Clays, SoilZone::Peat),
        ];
        for (bound, at_or_below, above) in boundaries {
            assert_eq!(SoilZone::from_ic(bound), at_or_below, "Ic = {bound}");
            assert_eq!(SoilZone::from_ic(bound + 1e-9), above, "Ic just above {bound}");
        }
    }

    #[test]
    fn test_zone_changes_only_at_boundaries() {
        let mut changes = Vec::new();
        let mut previous = SoilZone::from_ic(0.0);
        for i in 1..=4000 {
            let ic = i as f64 / 1000.0;
            let zone = SoilZone::from_ic(ic);
            if zone != previous {
                changes.push(((ic * 1000.0).round() / 1000.0, zone));
                previous = zone;
            }
        }
        assert_eq!(
            changes,
            vec![
                (1.311, SoilZone::Sands),
                (2.051, SoilZone::SandMixtures),
                (2.601, SoilZone::SiltMixtures),
                (2.951, SoilZone::Clays),
                (3.601, SoilZone::Peat),
            ]
        );
    }

    #[test]
    fn test_zone_order_follows_ic() {
        let order: Vec<_> = [0.5, 1.5, 2.3, 2.8, 3.2, 3.9].iter().map(|&ic| SoilZone::from_ic(ic)).collect();
        assert_eq!(order, SoilZone::ALL.to_vec());
    }

    #[test]
    fn test_clean_sand_classification() {
        // Hand calc at 2 m, γ = 18, dry: σv = σ'v = 36 kPa
        // Qtn = (10000 - 36)/100 × 100/36 = 276.78
        // Fr  = 100 / 9964 × 100 = 1.0036 %
        let c = classify(10_000.0, 100.0, 36.0, 36.0).unwrap();
        assert!((c.qtn - 276.778).abs() < 1e-3);
        assert!((c.friction_ratio_pct - 1.0036).abs() < 1e-4);
        assert!((c.ic - 1.5965).abs() < 1e-4);
        assert_eq!(c.zone, SoilZone::Sands);
    }

    #[test]
    fn test_soft_clay_classification() {
        // 0.4 MPa cone, 30 kPa sleeve at 2 m below a 0.5 m water table
        let c = classify(400.0, 30.0, 34.0, 19.285).unwrap();
        assert!((c.ic - 3.0588).abs() < 1e-3);
        assert_eq!(c.zone, SoilZone::Clays);
        assert!(!c.zone.is_liquefiable());
    }

    #[test]
    fn test_resistance_below_overburden_is_degenerate() {
        let err = classify(50.0, 5.0, 60.0, 40.0).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_INPUT");

        let err = classify(60.0, 5.0, 60.0, 40.0).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_INPUT");
    }

    #[test]
    fn test_zero_friction_classifies_as_peat() {
        let c = classify(500.0, 0.0, 36.0, 36.0).unwrap();
        assert_eq!(c.friction_ratio_pct, 0.0);
        assert_eq!(c.ic, f64::INFINITY);
        assert_eq!(c.zone, SoilZone::Peat);
        assert_eq!(SoilZone::from_ic(f64::INFINITY), SoilZone::Peat);
    }

    #[test]
    fn test_negative_friction_is_degenerate() {
        let err = classify(5000.0, -1.0, 20.0, 20.0).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_INPUT");
    }

    #[test]
    fn test_labels_and_zone_numbers() {
        assert_eq!(SoilZone::SiltMixtures.label(), "Silt Mixtures");
        assert_eq!(SoilZone::GravellySand.to_string(), "Gravelly Sand");
        assert_eq!(SoilZone::Clays.robertson_zone(), 3);
        assert!(SoilZone::SandMixtures.is_liquefiable());
        assert!(!SoilZone::Peat.is_liquefiable());
    }
}
