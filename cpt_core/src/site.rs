//! # Site Parameters
//!
//! The per-run configuration of an analysis: where the water table sits, the
//! design earthquake, the soil unit weight, and which pressure unit the field
//! data was logged in. One [`SiteParameters`] value is fixed for a whole run.
//!
//! Hosts that collect parameters as text (form fields, CLI flags) go through
//! [`SiteParameterInput::parse`], which rejects the first bad field with a
//! descriptive [`CptError`] instead of letting a non-number leak into the
//! derived series.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "groundwater_depth_m": 1.0,
//!   "magnitude": 7.5,
//!   "pga_g": 0.4,
//!   "unit_weight_kn_m3": 18.0,
//!   "unit": "MPa"
//! }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CptError, CptResult};
use crate::units::{KgPerCm2, Kpa, Mpa};

/// Pressure unit the cone resistance and sleeve friction were logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitMode {
    /// Megapascals
    #[serde(rename = "MPa")]
    Mpa,
    /// Kilogram-force per square centimeter
    #[serde(rename = "kg/cm2")]
    KgPerCm2,
}

impl UnitMode {
    /// All supported unit modes
    pub const ALL: [UnitMode; 2] = [UnitMode::Mpa, UnitMode::KgPerCm2];

    /// Short label used in tables and reports
    pub fn code(&self) -> &'static str {
        match self {
            UnitMode::Mpa => "MPa",
            UnitMode::KgPerCm2 => "kg/cm²",
        }
    }

    /// Convert a value logged in this unit to kPa.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cpt_core::site::UnitMode;
    ///
    /// assert_eq!(UnitMode::Mpa.to_kpa(2.0).0, 2000.0);
    /// assert!((UnitMode::KgPerCm2.to_kpa(2.0).0 - 196.2).abs() < 1e-9);
    /// ```
    pub fn to_kpa(&self, value: f64) -> Kpa {
        match self {
            UnitMode::Mpa => Mpa(value).into(),
            UnitMode::KgPerCm2 => KgPerCm2(value).into(),
        }
    }
}

impl std::fmt::Display for UnitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for UnitMode {
    type Err = CptError;

    /// Accepts `mpa`, `kgcm2`, `kg/cm2` and `kg/cm²` (case-insensitive).
    /// Anything else is an error; there is no fallback unit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mpa" => Ok(UnitMode::Mpa),
            "kgcm2" | "kg/cm2" | "kg/cm²" => Ok(UnitMode::KgPerCm2),
            _ => {
                let codes: Vec<&str> = UnitMode::ALL.iter().map(UnitMode::code).collect();
                Err(CptError::invalid_input(
                    "unit",
                    s,
                    format!("Unit must be one of: {}", codes.join(", ")),
                ))
            }
        }
    }
}

/// Validated site parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Depth of the groundwater table below the ground surface (m)
    pub groundwater_depth_m: f64,

    /// Design earthquake moment magnitude Mw
    pub magnitude: f64,

    /// Peak ground acceleration as a fraction of g
    pub pga_g: f64,

    /// Soil unit weight (kN/m³), applied uniformly over the sounding
    pub unit_weight_kn_m3: f64,

    /// Unit the qc/fs columns were logged in
    pub unit: UnitMode,
}

impl SiteParameters {
    /// Validate parameter ranges.
    pub fn validate(&self) -> CptResult<()> {
        check_finite("groundwater_depth_m", self.groundwater_depth_m)?;
        check_finite("magnitude", self.magnitude)?;
        check_finite("pga_g", self.pga_g)?;
        check_finite("unit_weight_kn_m3", self.unit_weight_kn_m3)?;

        if self.groundwater_depth_m < 0.0 {
            return Err(CptError::invalid_input(
                "groundwater_depth_m",
                self.groundwater_depth_m.to_string(),
                "Groundwater depth cannot be negative",
            ));
        }
        if self.magnitude <= 0.0 || self.magnitude > 10.0 {
            return Err(CptError::invalid_input(
                "magnitude",
                self.magnitude.to_string(),
                "Magnitude must be between 0 and 10",
            ));
        }
        if !(0.0..=1.0).contains(&self.pga_g) {
            return Err(CptError::invalid_input(
                "pga_g",
                self.pga_g.to_string(),
                "Peak ground acceleration must be between 0 and 1 g",
            ));
        }
        if self.unit_weight_kn_m3 <= 0.0 {
            return Err(CptError::invalid_input(
                "unit_weight_kn_m3",
                self.unit_weight_kn_m3.to_string(),
                "Unit weight must be positive",
            ));
        }
        Ok(())
    }
}

fn check_finite(field: &str, value: f64) -> CptResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CptError::invalid_input(field, value.to_string(), "Value must be a finite number"))
    }
}

/// Site parameters as raw text, the way a form or command line supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteParameterInput {
    pub groundwater_depth: String,
    pub magnitude: String,
    pub pga: String,
    pub unit_weight: String,
    pub unit: String,
}

impl SiteParameterInput {
    /// Parse and validate every field, failing on the first bad one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cpt_core::site::{SiteParameterInput, UnitMode};
    ///
    /// let input = SiteParameterInput {
    ///     groundwater_depth: "1.0".into(),
    ///     magnitude: "7.5".into(),
    ///     pga: "0.4".into(),
    ///     unit_weight: "18".into(),
    ///     unit: "MPa".into(),
    /// };
    /// let params = input.parse().unwrap();
    /// assert_eq!(params.unit, UnitMode::Mpa);
    ///
    /// let bad = SiteParameterInput { pga: "strong".into(), ..input };
    /// assert_eq!(bad.parse().unwrap_err().error_code(), "INVALID_INPUT");
    /// ```
    pub fn parse(&self) -> CptResult<SiteParameters> {
        let groundwater_depth_m = parse_number("groundwater_depth_m", &self.groundwater_depth)?;
        let magnitude = parse_number("magnitude", &self.magnitude)?;
        let pga_g = parse_number("pga_g", &self.pga)?;
        let unit_weight_kn_m3 = parse_number("unit_weight_kn_m3", &self.unit_weight)?;
        if self.unit.trim().is_empty() {
            return Err(CptError::missing_field("unit"));
        }
        let unit: UnitMode = self.unit.parse()?;

        let params = SiteParameters {
            groundwater_depth_m,
            magnitude,
            pga_g,
            unit_weight_kn_m3,
            unit,
        };
        params.validate()?;
        Ok(params)
    }
}

fn parse_number(field: &str, text: &str) -> CptResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CptError::missing_field(field));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| CptError::invalid_input(field, text, "Not a number"))
}
