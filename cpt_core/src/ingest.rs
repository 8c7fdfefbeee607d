//! # Row Normalization
//!
//! Turns one loosely-typed input row into a [`NormalizedRow`] in canonical
//! units, or explains why the row can't be used.
//!
//! Whatever parses the field file (CSV reader, spreadsheet import, JSON API)
//! hands the core a [`RawRow`]: ordered column-name/value pairs where values
//! may be text or numbers. Column names don't need to be exact. Each required
//! field is found by a case-insensitive substring match against the
//! [`FIELD_SYNONYMS`] table, scanning the row's columns in order; the first
//! matching column wins.
//!
//! Ingestion is best-effort: a row with a missing column or a value that
//! isn't a finite number is rejected with a [`RejectReason`] and the run goes
//! on with the remaining rows.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::ingest::{normalize_row, RawRow, RowOutcome};
//! use cpt_core::site::UnitMode;
//!
//! let row = RawRow::new()
//!     .with("Kedalaman (m)", "1.20")
//!     .with("qc (MPa)", 4.5)
//!     .with("fs (MPa)", "0.05");
//!
//! match normalize_row(&row, UnitMode::Mpa) {
//!     RowOutcome::Accepted(n) => assert_eq!(n.qc_kpa, 4500.0),
//!     RowOutcome::Rejected(reason) => panic!("{reason}"),
//! }
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::site::UnitMode;

// ============================================================================
// Field vocabulary
// ============================================================================

/// The three measurements every sounding row must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Penetration depth (m)
    Depth,
    /// Cone tip resistance qc
    ConeResistance,
    /// Sleeve friction fs
    SleeveFriction,
}

/// Recognized column-name fragments for each required field (lowercase).
pub const FIELD_SYNONYMS: [(FieldKind, &[&str]); 3] = [
    (FieldKind::Depth, &["depth", "kedalaman", "z"]),
    (FieldKind::ConeResistance, &["qc", "coneresistance", "q_c"]),
    (FieldKind::SleeveFriction, &["fs", "sleevefriction", "f_s"]),
];

impl FieldKind {
    /// All required fields, in resolution order
    pub const ALL: [FieldKind; 3] = [
        FieldKind::Depth,
        FieldKind::ConeResistance,
        FieldKind::SleeveFriction,
    ];

    /// Column-name fragments that identify this field
    pub fn synonyms(&self) -> &'static [&'static str] {
        FIELD_SYNONYMS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, synonyms)| *synonyms)
            .unwrap_or(&[])
    }

    /// Whether a column name refers to this field.
    ///
    /// ```rust
    /// use cpt_core::ingest::FieldKind;
    ///
    /// assert!(FieldKind::ConeResistance.matches("Cone Tip qc [MPa]"));
    /// assert!(FieldKind::Depth.matches("KEDALAMAN"));
    /// assert!(!FieldKind::SleeveFriction.matches("qc"));
    /// ```
    pub fn matches(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        self.synonyms().iter().any(|s| column.contains(s))
    }

    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Depth => "depth",
            FieldKind::ConeResistance => "qc",
            FieldKind::SleeveFriction => "fs",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Raw rows
// ============================================================================

/// A loosely-typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Empty,
}

impl RawValue {
    /// Interpret the cell as a finite number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Bool(_) | RawValue::Empty => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

/// One input row: column names paired with values, in source column order.
///
/// Serializes as a JSON object. Deserializing keeps the object's key order,
/// since field resolution is first-match-wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub fields: Vec<(String, RawValue)>,
}

impl RawRow {
    /// Create an empty row
    pub fn new() -> Self {
        RawRow { fields: Vec::new() }
    }

    /// Builder: append a column
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    /// First column whose name matches the given field
    pub fn find(&self, kind: FieldKind) -> Option<(&str, &RawValue)> {
        self.fields
            .iter()
            .find(|(column, _)| kind.matches(column))
            .map(|(column, value)| (column.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRow {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RawRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((column, value)) = access.next_entry::<String, RawValue>()? {
                    fields.push((column, value));
                }
                Ok(RawRow { fields })
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// A usable measurement row in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
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
}

/// Why a row was left out of the derived series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RejectReason {
    /// No column name matched the field
    MissingField { field: FieldKind },
    /// The matched column did not hold a finite number
    NotNumeric {
        field: FieldKind,
        column: String,
        value: String,
    },
    /// The measurements leave the soil behavior index undefined
    Degenerate { depth_m: f64, reason: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingField { field } => write!(f, "no column for {field}"),
            RejectReason::NotNumeric { field, column, value } => {
                write!(f, "{field} column '{column}' is not a number: '{value}'")
            }
            RejectReason::Degenerate { depth_m, reason } => {
                write!(f, "undefined soil index at {depth_m} m: {reason}")
            }
        }
    }
}

/// Outcome of normalizing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(NormalizedRow),
    Rejected(RejectReason),
}

impl RowOutcome {
    /// The normalized row, if accepted
    pub fn accepted(self) -> Option<NormalizedRow> {
        match self {
            RowOutcome::Accepted(row) => Some(row),
            RowOutcome::Rejected(_) => None,
        }
    }
}

fn resolve(row: &RawRow, field: FieldKind) -> Result<f64, RejectReason> {
    let (column, value) = row.find(field).ok_or(RejectReason::MissingField { field })?;
    value.as_number().ok_or_else(|| RejectReason::NotNumeric {
        field,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Values for every field in [`FieldKind::ALL`] order, stopping at the first
/// one that can't be resolved.
fn resolve_all(row: &RawRow) -> Result<[f64; 3], RejectReason> {
    let mut values = [0.0; 3];
    for (slot, field) in values.iter_mut().zip(FieldKind::ALL) {
        *slot = resolve(row, field)?;
    }
    Ok(values)
}

/// Normalize one raw row into canonical units.
///
/// qc and fs are converted to kPa (×1000 from MPa, ×98.1 from kg/cm²); depth
/// is taken as meters.
pub fn normalize_row(row: &RawRow, unit: UnitMode) -> RowOutcome {
    match resolve_all(row) {
        Ok([depth_m, qc_raw, fs_raw]) => RowOutcome::Accepted(NormalizedRow {
            depth_m,
            qc_raw,
            fs_raw,
            qc_kpa: unit.to_kpa(qc_raw).value(),
            fs_kpa: unit.to_kpa(fs_raw).value(),
        }),
        Err(reason) => RowOutcome::Rejected(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> RawRow {
        RawRow::new()
            .with("Depth (m)", "2.40")
            .with("qc (MPa)", "3.5")
            .with("fs (MPa)", "0.04")
    }

    #[test]
    fn test_synonym_matching_is_case_insensitive() {
        assert!(FieldKind::Depth.matches("DEPTH"));
        assert!(FieldKind::Depth.matches("Kedalaman (m)"));
        assert!(FieldKind::Depth.matches("z"));
        assert!(FieldKind::ConeResistance.matches("ConeResistance_MPa"));
        assert!(FieldKind::ConeResistance.matches("Q_C"));
        assert!(FieldKind::SleeveFriction.matches("SleeveFriction"));
        assert!(FieldKind::SleeveFriction.matches("f_s [kg/cm2]"));
        assert!(!FieldKind::ConeResistance.matches("fs (MPa)"));
    }

    #[test]
    fn test_first_matching_column_wins() {
        let row = RawRow::new()
            .with("qc corrected", "9.0")
            .with("qc (MPa)", "3.0");
        let (column, value) = row.find(FieldKind::ConeResistance).unwrap();
        assert_eq!(column, "qc corrected");
        assert_eq!(value.as_number(), Some(9.0));
    }

    #[test]
    fn test_mpa_conversion() {
        let row = normalize_row(&sample_row(), UnitMode::Mpa).accepted().unwrap();
        assert_eq!(row.depth_m, 2.4);
        assert_eq!(row.qc_raw, 3.5);
        assert!((row.qc_kpa - 3500.0).abs() < 1e-9);
        assert!((row.fs_kpa - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_kg_cm2_conversion() {
        let row = normalize_row(&sample_row(), UnitMode::KgPerCm2).accepted().unwrap();
        assert!((row.qc_kpa - 3.5 * 98.1).abs() < 1e-9);
        assert!((row.fs_kpa - 0.04 * 98.1).abs() < 1e-9);
        assert_eq!(row.fs_raw, 0.04);
    }

    #[test]
    fn test_missing_column_rejects_row() {
        let row = RawRow::new().with("Depth (m)", "1.0").with("qc", "3.0");
        assert_eq!(
            normalize_row(&row, UnitMode::Mpa),
            RowOutcome::Rejected(RejectReason::MissingField { field: FieldKind::SleeveFriction })
        );
    }

    #[test]
    fn test_non_numeric_value_rejects_row() {
        let row = RawRow::new()
            .with("Depth (m)", "1.0")
            .with("qc", "n/a")
            .with("fs", "0.1");
        match normalize_row(&row, UnitMode::Mpa) {
            RowOutcome::Rejected(RejectReason::NotNumeric { field, value, .. }) => {
                assert_eq!(field, FieldKind::ConeResistance);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_nan_values_reject_row() {
        let empty = RawRow::new()
            .with("depth", RawValue::Empty)
            .with("qc", 1.0)
            .with("fs", 0.1);
        assert!(normalize_row(&empty, UnitMode::Mpa).accepted().is_none());

        let nan = RawRow::new().with("depth", "NaN").with("qc", 1.0).with("fs", 0.1);
        assert!(normalize_row(&nan, UnitMode::Mpa).accepted().is_none());
    }

    #[test]
    fn test_numeric_cells_accepted() {
        let row = RawRow::new().with("z", 0.2).with("qc", 10.0).with("fs", 0.1);
        let row = normalize_row(&row, UnitMode::Mpa).accepted().unwrap();
        assert_eq!(row.depth_m, 0.2);
        assert_eq!(row.qc_kpa, 10_000.0);
    }

    #[test]
    fn test_deserialize_keeps_column_order() {
        let json = r#"{"qc_b": 2.0, "qc_a": "1.0", "depth": 1, "fs": null}"#;
        let row: RawRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.fields[0].0, "qc_b");
        assert_eq!(row.fields[2].1, RawValue::Number(1.0));
        assert_eq!(row.fields[3].1, RawValue::Empty);
        assert_eq!(row.find(FieldKind::ConeResistance).unwrap().0, "qc_b");
    }

    #[test]
    fn test_serialize_as_object() {
        let json = serde_json::to_string(&sample_row()).unwrap();
        assert_eq!(json, r#"{"Depth (m)":"2.40","qc (MPa)":"3.5","fs (MPa)":"0.04"}"#);
    }

    #[test]
    fn test_first_missing_field_reported_in_order() {
        let row = RawRow::new().with("note", "none");
        assert_eq!(
            normalize_row(&row, UnitMode::Mpa),
            RowOutcome::Rejected(RejectReason::MissingField { field: FieldKind::Depth })
        );

        let row = RawRow::new().with("depth", 1.0).with("fs", "x");
        assert_eq!(
            normalize_row(&row, UnitMode::Mpa),
            RowOutcome::Rejected(RejectReason::MissingField { field: FieldKind::ConeResistance })
        );
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::MissingField { field: FieldKind::Depth };
        assert_eq!(reason.to_string(), "no column for depth");
    }
}
