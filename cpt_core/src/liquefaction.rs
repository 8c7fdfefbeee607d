//! # Liquefaction Triggering
//!
//! CPT-based liquefaction triggering after Idriss & Boulanger: seismic demand
//! (CSR) against soil capacity (CRR), reported as a factor of safety.
//!
//! ## Demand
//!
//! ```text
//! MSF = min(6.9·exp(-M/4) - 0.058, 1.8)
//! α   = -1.012 - 1.126·sin(z/11.73 + 5.133)
//! β   =  0.106 + 0.118·sin(z/11.28 + 5.142)
//! rd  = exp(α + β·M)
//! CSR = 0.65 · amax · (σv/σ'v) · rd
//! ```
//!
//! ## Capacity
//!
//! ```text
//! qc1N    = min(1.7, (Pa/σ'v)^0.5) · qc/Pa
//! FC      = 1.75·Ic^3.25 - 3.7          (0 below Ic 1.26, 100 above 3.5)
//! Δqc1N   = (11.9 + qc1N/14.6)·exp(1.63 - 9.7/(FC+0.1)) - (15.7/(FC+0.1))²
//! qc1Ncs  = qc1N + Δqc1N
//! CRR7.5  = exp(qc1Ncs/540 + (qc1Ncs/67)² - (qc1Ncs/80)³ + (qc1Ncs/114)⁴ - 3)
//! CRR     = CRR7.5 · MSF
//! ```
//!
//! FS = CRR / CSR, never reported above 2. Clays and peat are outside the
//! method and always report FS = 5, which takes precedence over the cap.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::classification::SoilZone;
//! use cpt_core::liquefaction::{evaluate, LiquefactionInput};
//!
//! let input = LiquefactionInput {
//!     depth_m: 2.0,
//!     qc_kpa: 10_000.0,
//!     total_stress_kpa: 36.0,
//!     effective_stress_kpa: 36.0,
//!     ic: 1.5965,
//!     zone: SoilZone::Sands,
//! };
//! let result = evaluate(&input, 7.5, 0.4);
//! assert!(result.factor_of_safety > 1.0 && result.factor_of_safety < 2.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::classification::SoilZone;
use crate::units::ATMOSPHERIC_PRESSURE_KPA;

/// Upper limit on the magnitude scaling factor
pub const MAX_MSF: f64 = 1.8;

/// Upper limit on the overburden correction for qc1N
pub const MAX_CN_LIQ: f64 = 1.7;

/// Largest factor of safety ever reported for liquefiable soils
pub const MAX_FACTOR_OF_SAFETY: f64 = 2.0;

/// Factor of safety reported for clays and peat
pub const NON_LIQUEFIABLE_FACTOR_OF_SAFETY: f64 = 5.0;

/// Per-depth inputs to the triggering evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquefactionInput {
    /// Depth below ground surface (m)
    pub depth_m: f64,
    /// Cone resistance (kPa)
    pub qc_kpa: f64,
    /// Total vertical stress σv (kPa)
    pub total_stress_kpa: f64,
    /// Effective vertical stress σ'v (kPa)
    pub effective_stress_kpa: f64,
    /// Soil behavior type index
    pub ic: f64,
    /// Soil behavior zone
    pub zone: SoilZone,
}

/// Triggering results at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquefactionResult {
    /// Magnitude scaling factor
    pub msf: f64,
    /// Shear stress reduction coefficient
    pub rd: f64,
    /// Cyclic stress ratio at the design magnitude
    pub csr: f64,
    /// Cyclic stress ratio normalized to M7.5 (CSR / MSF)
    pub csr_m75: f64,
    /// Overburden-normalized cone resistance
    pub qc1n: f64,
    /// Estimated fines content (%)
    pub fines_content_pct: f64,
    /// Clean-sand equivalent normalized resistance
    pub qc1n_cs: f64,
    /// Cyclic resistance ratio at M7.5, σ'v = 1 atm
    pub crr_m75: f64,
    /// Cyclic resistance ratio at the design magnitude
    pub crr: f64,
    /// Reported factor of safety (capped, with the cohesive-soil override)
    pub factor_of_safety: f64,
}

/// Magnitude scaling factor, capped at 1.8.
pub fn magnitude_scaling_factor(magnitude: f64) -> f64 {
    (6.9 * (-magnitude / 4.0).exp() - 0.058).min(MAX_MSF)
}

/// Depth-dependent shear stress reduction coefficient rd.
pub fn stress_reduction(depth_m: f64, magnitude: f64) -> f64 {
    let alpha = -1.012 - 1.126 * (depth_m / 11.73 + 5.133).sin();
    let beta = 0.106 + 0.118 * (depth_m / 11.28 + 5.142).sin();
    (alpha + beta * magnitude).exp()
}

/// Cyclic stress ratio induced by the design earthquake.
pub fn cyclic_stress_ratio(
    pga_g: f64,
    total_stress_kpa: f64,
    effective_stress_kpa: f64,
    rd: f64,
) -> f64 {
    0.65 * pga_g * (total_stress_kpa / effective_stress_kpa) * rd
}

/// Overburden-normalized cone resistance qc1N (dimensionless).
pub fn normalized_resistance(qc_kpa: f64, effective_stress_kpa: f64) -> f64 {
    let pa = ATMOSPHERIC_PRESSURE_KPA;
    let cn = (pa / effective_stress_kpa).powf(0.5).min(MAX_CN_LIQ);
    cn * (qc_kpa / pa)
}

/// Fines content estimated from Ic (%), clipped to [0, 100].
pub fn fines_content(ic: f64) -> f64 {
    let fc = if ic < 1.26 {
        0.0
    } else if ic <= 3.5 {
        1.75 * ic.powf(3.25) - 3.7
    } else {
        100.0
    };
    fc.clamp(0.0, 100.0)
}

/// Fines correction Δqc1N added to qc1N to get the clean-sand equivalent.
pub fn fines_correction(qc1n: f64, fines_content_pct: f64) -> f64 {
    let fc = fines_content_pct + 0.1;
    (11.9 + qc1n / 14.6) * (1.63 - 9.7 / fc).exp() - (15.7 / fc).powi(2)
}

/// Cyclic resistance ratio at M7.5 and 1 atm from qc1Ncs.
///
/// Very negative qc1Ncs values overflow to `+∞`, which the factor-of-safety
/// cap turns into 2.
pub fn cyclic_resistance_ratio_m75(qc1n_cs: f64) -> f64 {
    (qc1n_cs / 540.0 + (qc1n_cs / 67.0).powi(2) - (qc1n_cs / 80.0).powi(3) + (qc1n_cs / 114.0).powi(4) - 3.0)
        .exp()
}

/// Reported factor of safety: capped at 2, forced to 5 for clays and peat.
pub fn factor_of_safety(crr: f64, csr: f64, zone: SoilZone) -> f64 {
    if !zone.is_liquefiable() {
        return NON_LIQUEFIABLE_FACTOR_OF_SAFETY;
    }
    // f64::min also maps a NaN ratio (0/0) onto the cap
    (crr / csr).min(MAX_FACTOR_OF_SAFETY)
}

/// Evaluate liquefaction triggering at one depth.
///
/// # Arguments
///
/// * `input` - Depth, stresses, cone resistance and classification
/// * `magnitude` - Design earthquake magnitude Mw
/// * `pga_g` - Peak ground acceleration (g)
pub fn evaluate(input: &LiquefactionInput, magnitude: f64, pga_g: f64) -> LiquefactionResult {
    let msf = magnitude_scaling_factor(magnitude);
    let rd = stress_reduction(input.depth_m, magnitude);
    let csr = cyclic_stress_ratio(pga_g, input.total_stress_kpa, input.effective_stress_kpa, rd);

    let qc1n = normalized_resistance(input.qc_kpa, input.effective_stress_kpa);
    let fines_content_pct = fines_content(input.ic);
    let qc1n_cs = qc1n + fines_correction(qc1n, fines_content_pct);

    let crr_m75 = cyclic_resistance_ratio_m75(qc1n_cs);
    let crr = crr_m75 * msf;

    LiquefactionResult {
        msf,
        rd,
        csr,
        csr_m75: csr / msf,
        qc1n,
        fines_content_pct,
        qc1n_cs,
        crr_m75,
        crr,
        factor_of_safety: factor_of_safety(crr, csr, input.zone),
    }
}
