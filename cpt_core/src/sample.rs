//! # Sample Sounding
//!
//! A deterministic 20 m demonstration profile, logged every 0.2 m in MPa:
//!
//! | Depth (m) | qc (MPa) | fs (MPa) | Layer |
//! |-----------|----------|----------|-------|
//! | < 5       | 12.5     | 0.12     | medium dense sand |
//! | 5 - 10    | 3.0      | 0.17     | silty layer |
//! | 10 - 15   | 17.5     | 0.14     | dense sand |
//! | ≥ 15      | 27.5     | 0.25     | very dense sand |
//!
//! Cells are text with two decimals, the way a spreadsheet export hands them
//! over, so the sample also exercises the normalizer's parsing path.

use crate::ingest::RawRow;
use crate::site::{SiteParameters, UnitMode};

/// Number of rows in the sample
pub const SAMPLE_ROWS: usize = 100;

/// Depth step between readings (m)
pub const SAMPLE_STEP_M: f64 = 0.2;

fn layer(depth_m: f64) -> (f64, f64) {
    match depth_m {
        z if z < 5.0 => (12.5, 0.12),
        z if z < 10.0 => (3.0, 0.17),
        z if z < 15.0 => (17.5, 0.14),
        _ => (27.5, 0.25),
    }
}

/// Raw rows of the sample sounding, shallowest first.
pub fn sample_rows() -> Vec<RawRow> {
    (1..=SAMPLE_ROWS)
        .map(|i| {
            let depth_m = i as f64 / 5.0;
            let (qc, fs) = layer(depth_m);
            RawRow::new()
                .with("Depth (m)", format!("{depth_m:.2}"))
                .with("qc (MPa)", format!("{qc:.2}"))
                .with("fs (MPa)", format!("{fs:.2}"))
        })
        .collect()
}

/// Site parameters that go with the sample.
pub fn sample_parameters() -> SiteParameters {
    SiteParameters {
        groundwater_depth_m: 1.0,
        magnitude: 7.5,
        pga_g: 0.4,
        unit_weight_kn_m3: 18.0,
        unit: UnitMode::Mpa,
    }
}
