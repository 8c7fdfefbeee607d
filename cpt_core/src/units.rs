//! # Unit Types
//!
//! Type-safe wrappers for the handful of units a CPT sounding moves through.
//! They stay lightweight (just f64 wrappers) and serialize as bare numbers.
//!
//! ## Canonical Units
//!
//! Field data arrives in MPa or kg/cm². Everything downstream of ingestion
//! works in SI paired units:
//! - Length: meters (m)
//! - Pressure / stress: kilopascals (kPa)
//! - Unit weight: kilonewtons per cubic meter (kN/m³)
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::units::{KgPerCm2, Kpa, Mpa};
//!
//! let qc = Mpa(10.0);
//! let qc_kpa: Kpa = qc.into();
//! assert_eq!(qc_kpa.0, 10_000.0);
//!
//! let fs: Kpa = KgPerCm2(2.0).into();
//! assert!((fs.0 - 196.2).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Standard kgf/cm² to kPa factor
pub const KPA_PER_KG_CM2: f64 = 98.1;

/// kPa per MPa
pub const KPA_PER_MPA: f64 = 1000.0;

/// Unit weight of water (kN/m³), the hydrostatic gradient in kPa per meter
pub const WATER_UNIT_WEIGHT_KN_M3: f64 = 9.81;

/// Atmospheric reference pressure Pa (kPa)
pub const ATMOSPHERIC_PRESSURE_KPA: f64 = 100.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in kilopascals (the canonical pressure unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kpa(pub f64);

/// Pressure in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

/// Pressure in kilogram-force per square centimeter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerCm2(pub f64);

impl From<Mpa> for Kpa {
    fn from(mpa: Mpa) -> Self {
        Kpa(mpa.0 * KPA_PER_MPA)
    }
}

impl From<Kpa> for Mpa {
    fn from(kpa: Kpa) -> Self {
        Mpa(kpa.0 / KPA_PER_MPA)
    }
}

impl From<KgPerCm2> for Kpa {
    fn from(kg: KgPerCm2) -> Self {
        Kpa(kg.0 * KPA_PER_KG_CM2)
    }
}

// ============================================================================
// Unit Weight
// ============================================================================

/// Unit weight in kilonewtons per cubic meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM3(pub f64);

impl Mul<Meters> for KnPerM3 {
    type Output = Kpa;
    fn mul(self, rhs: Meters) -> Kpa {
        Kpa(self.0 * rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Kpa);
impl_arithmetic!(Mpa);
impl_arithmetic!(KgPerCm2);
impl_arithmetic!(KnPerM3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpa_to_kpa() {
        let kpa: Kpa = Mpa(1.5).into();
        assert_eq!(kpa.0, 1500.0);

        let back: Mpa = kpa.into();
        assert_eq!(back.0, 1.5);
    }

    #[test]
    fn test_kg_cm2_to_kpa() {
        let kpa: Kpa = KgPerCm2(10.0).into();
        assert!((kpa.0 - 981.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_weight_times_thickness() {
        let sigma = KnPerM3(18.0) * Meters(2.5);
        assert!((sigma.0 - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = Kpa(10.0);
        let b = Kpa(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let depth = Meters(12.5);
        let json = serde_json::to_string(&depth).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Meters = serde_json::from_str(&json).unwrap();
        assert_eq!(depth, roundtrip);
    }
}
