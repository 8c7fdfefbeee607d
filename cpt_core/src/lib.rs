//! # cpt_core - CPT Soil Behavior & Liquefaction Engine
//!
//! `cpt_core` turns a Cone Penetration Test sounding into a per-depth
//! engineering series and a set of remediation findings. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: One run is a pure function of rows and site parameters
//! - **Best-effort rows**: Bad rows are skipped and reported, never fatal
//! - **Rich Errors**: Structured error types, not just strings
//! - **One method each**: Robertson SBT classification, Idriss & Boulanger
//!   CPT triggering, fixed empirical constants
//!
//! ## Quick Start
//!
//! ```rust
//! use cpt_core::analysis::analyze;
//! use cpt_core::report::AnalysisReport;
//! use cpt_core::sample::{sample_parameters, sample_rows};
//!
//! let analysis = analyze(&sample_rows(), &sample_parameters()).unwrap();
//! for finding in analysis.recommendations() {
//!     println!("{finding}");
//! }
//!
//! let report = AnalysisReport::new("S-01", analysis);
//! let json = report.to_json().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`site`] - Site parameters and the input unit system
//! - [`ingest`] - Loosely-typed rows and normalization to kPa
//! - [`stress`] - Total, pore and effective stress down the column
//! - [`classification`] - Soil behavior type index and zones
//! - [`liquefaction`] - CSR, CRR and factor of safety
//! - [`analysis`] - Row-at-a-time pipeline producing depth records
//! - [`recommendation`] - Findings and remediation methods
//! - [`report`] - Report artifact with metadata and summary
//! - [`file_io`] - Atomic report saves and versioned loads
//! - [`sample`] - Built-in demonstration sounding
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod classification;
pub mod errors;
pub mod file_io;
pub mod ingest;
pub mod liquefaction;
pub mod recommendation;
pub mod report;
pub mod sample;
pub mod site;
pub mod stress;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, Analysis, DepthRecord, ProfileBuilder, RejectedRow};
pub use classification::SoilZone;
pub use errors::{CptError, CptResult};
pub use file_io::{load_report, save_report};
pub use ingest::{RawRow, RawValue, RejectReason};
pub use recommendation::{recommend, Finding, Remediation};
pub use report::AnalysisReport;
pub use site::{SiteParameterInput, SiteParameters, UnitMode};
