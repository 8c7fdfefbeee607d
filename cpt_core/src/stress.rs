//! # Stress Column Integration
//!
//! Vertical stresses down the sounding, built up one row at a time.
//!
//! The integrator is a strict left fold: each step needs the total stress
//! accumulated so far and the previous depth, so rows must be fed in order
//! of increasing depth. The accumulator is the explicit [`StressState`] value;
//! [`StressState::advance`] returns the next state together with the
//! [`StressPoint`] for the current depth, and nothing is shared between runs.
//!
//! ```text
//! Δz  = z - z_prev
//! σv  = σv_prev + γ·Δz
//! u   = 0                    if z ≤ z_w
//!       (z - z_w)·γ_w        otherwise
//! σ'v = max(σv - u, 1 kPa)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::stress::StressState;
//!
//! let state = StressState::default();
//! let (state, at_1m) = state.advance(1.0, 18.0, 0.5);
//! assert_eq!(at_1m.total_kpa, 18.0);
//! assert!((at_1m.pore_kpa - 4.905).abs() < 1e-9);
//!
//! let (_, at_2m) = state.advance(2.0, 18.0, 0.5);
//! assert_eq!(at_2m.total_kpa, 36.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{KnPerM3, Kpa, Meters, WATER_UNIT_WEIGHT_KN_M3};

/// Lower bound on effective stress (kPa). Keeps the later `Pa/σ'v` terms
/// and logarithms defined at the surface and below a shallow water table.
pub const MIN_EFFECTIVE_STRESS_KPA: f64 = 1.0;

/// Running state of the stress fold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressState {
    /// Total vertical stress accumulated down to `previous_depth_m` (kPa)
    pub total_kpa: f64,
    /// Depth of the last row folded in (m)
    pub previous_depth_m: f64,
}

/// Stresses at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPoint {
    /// Total vertical stress σv (kPa)
    pub total_kpa: f64,
    /// Hydrostatic pore pressure u (kPa)
    pub pore_kpa: f64,
    /// Effective vertical stress σ'v (kPa), floored at 1 kPa
    pub effective_kpa: f64,
}

impl StressState {
    /// Fold one depth into the column.
    ///
    /// # Arguments
    ///
    /// * `depth_m` - Depth of the current row (m)
    /// * `unit_weight_kn_m3` - Soil unit weight γ (kN/m³)
    /// * `groundwater_depth_m` - Depth of the water table z_w (m)
    pub fn advance(
        self,
        depth_m: f64,
        unit_weight_kn_m3: f64,
        groundwater_depth_m: f64,
    ) -> (StressState, StressPoint) {
        let thickness = Meters(depth_m) - Meters(self.previous_depth_m);
        let total = Kpa(self.total_kpa) + KnPerM3(unit_weight_kn_m3) * thickness;

        let pore = pore_pressure(depth_m, groundwater_depth_m);
        let effective = (total - pore).value().max(MIN_EFFECTIVE_STRESS_KPA);

        let next = StressState {
            total_kpa: total.value(),
            previous_depth_m: depth_m,
        };
        let point = StressPoint {
            total_kpa: total.value(),
            pore_kpa: pore.value(),
            effective_kpa: effective,
        };
        (next, point)
    }
}

/// Hydrostatic pore pressure at a depth (zero at or above the water table).
pub fn pore_pressure(depth_m: f64, groundwater_depth_m: f64) -> Kpa {
    if depth_m <= groundwater_depth_m {
        Kpa(0.0)
    } else {
        KnPerM3(WATER_UNIT_WEIGHT_KN_M3) * Meters(depth_m - groundwater_depth_m)
    }
}

/// Fold a whole depth series, returning the stress point for each depth.
pub fn integrate(depths_m: &[f64], unit_weight_kn_m3: f64, groundwater_depth_m: f64) -> Vec<StressPoint> {
    depths_m
        .iter()
        .scan(StressState::default(), |state, &z| {
            let (next, point) = state.advance(z, unit_weight_kn_m3, groundwater_depth_m);
            *state = next;
            Some(point)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_column() {
        let points = integrate(&[1.0, 2.0, 3.5], 18.0, 10.0);
        assert_eq!(points.len(), 3);
        assert!((points[2].total_kpa - 63.0).abs() < 1e-9);
        assert_eq!(points[2].pore_kpa, 0.0);
        assert!((points[2].effective_kpa - 63.0).abs() < 1e-9);
    }

    #[test]
    fn test_uneven_spacing() {
        let points = integrate(&[0.5, 0.7, 3.0], 20.0, 100.0);
        assert!((points[0].total_kpa - 10.0).abs() < 1e-9);
        assert!((points[1].total_kpa - 14.0).abs() < 1e-9);
        assert!((points[2].total_kpa - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_below_water_table() {
        let points = integrate(&[1.0, 3.0], 18.0, 1.0);
        // At the water table exactly: no pore pressure
        assert_eq!(points[0].pore_kpa, 0.0);
        // u = 2 m × 9.81 = 19.62 kPa, σ'v = 54 - 19.62
        assert!((points[1].pore_kpa - 19.62).abs() < 1e-9);
        assert!((points[1].effective_kpa - 34.38).abs() < 1e-9);
    }

    #[test]
    fn test_effective_stress_floor() {
        // Surface reading and a water table at the surface under a light soil
        let points = integrate(&[0.0, 0.5, 1.0], 9.0, 0.0);
        for p in &points {
            assert!(p.effective_kpa >= MIN_EFFECTIVE_STRESS_KPA);
        }
        assert_eq!(points[0].effective_kpa, 1.0);
        assert_eq!(points[2].effective_kpa, 1.0);
    }

    #[test]
    fn test_state_is_threaded_not_shared() {
        let start = StressState::default();
        let (a, _) = start.advance(2.0, 18.0, 5.0);
        let (b, _) = start.advance(2.0, 18.0, 5.0);
        assert_eq!(a, b);
        assert_eq!(start, StressState::default());
        assert_eq!(a.previous_depth_m, 2.0);
    }
}
