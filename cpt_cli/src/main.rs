//! # Sondir CLI
//!
//! Terminal front end for cpt_core. Reads a CPT sounding from CSV, hands the
//! rows to the analysis engine as text cells and prints the derived series and
//! findings.
//!
//! Usage:
//!   cpt_cli analyze sounding.csv --gwl 1.0 --magnitude 7.5 --pga 0.4 --unit-weight 18 --unit mpa
//!   cpt_cli sample --json
//!   cpt_cli show report.json
//!
//! Logging goes to stderr; set `RUST_LOG=debug` to see every rejected row.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cpt_core::analysis::analyze;
use cpt_core::file_io::{load_report, save_report};
use cpt_core::ingest::{RawRow, RawValue};
use cpt_core::report::AnalysisReport;
use cpt_core::sample::{sample_parameters, sample_rows};
use cpt_core::site::SiteParameterInput;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cpt_cli", version)]
#[command(about = "CPT soil behavior and liquefaction assessment")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a sounding from a CSV file with a header row
    Analyze {
        /// CSV file with depth, qc and fs columns
        file: PathBuf,

        /// Groundwater depth below ground surface (m)
        #[arg(long)]
        gwl: String,

        /// Design earthquake magnitude Mw
        #[arg(long)]
        magnitude: String,

        /// Peak ground acceleration (g)
        #[arg(long)]
        pga: String,

        /// Soil unit weight (kN/m³)
        #[arg(long)]
        unit_weight: String,

        /// Unit of the qc/fs columns (mpa or kgcm2)
        #[arg(long)]
        unit: String,

        /// Sounding label for the report (defaults to the file name)
        #[arg(long)]
        label: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze the built-in sample sounding
    Sample {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print a saved report
    Show {
        /// Report file written with --output
        file: PathBuf,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also save the report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            file,
            gwl,
            magnitude,
            pga,
            unit_weight,
            unit,
            label,
            output,
        } => {
            let params = SiteParameterInput {
                groundwater_depth: gwl,
                magnitude,
                pga,
                unit_weight,
                unit,
            }
            .parse()
            .context("invalid site parameters")?;

            let rows = read_rows(&file)?;
            info!(file = %file.display(), rows = rows.len(), "sounding loaded");

            let analysis = analyze(&rows, &params).context("analysis failed")?;
            let label = label.unwrap_or_else(|| file_label(&file));
            emit(&AnalysisReport::new(label, analysis), &output)
        }
        Command::Sample { output } => {
            let analysis = analyze(&sample_rows(), &sample_parameters()).context("analysis failed")?;
            emit(&AnalysisReport::new("sample", analysis), &output)
        }
        Command::Show { file, json } => {
            let report = load_report(&file)
                .with_context(|| format!("failed to load report {}", file.display()))?;
            print_report(&report, json)
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a CSV file into raw rows. Every cell is handed over as text; the
/// analysis engine decides what is numeric.
fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV record {}", i + 1))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column, RawValue::Text(cell.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn emit(report: &AnalysisReport, output: &OutputArgs) -> Result<()> {
    if let Some(path) = &output.output {
        save_report(report, path).with_context(|| format!("failed to save report to {}", path.display()))?;
        info!(path = %path.display(), "report saved");
    }
    print_report(report, output.json)
}

fn print_report(report: &AnalysisReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json().context("failed to serialize report")?);
        return Ok(());
    }

    let p = &report.params;
    println!("═══════════════════════════════════════════════════════════════════════════════════════");
    println!("  CPT ANALYSIS: {}", report.meta.label);
    println!("═══════════════════════════════════════════════════════════════════════════════════════");
    println!(
        "  GWL {:.2} m | Mw {:.1} | PGA {:.2} g | γ {:.1} kN/m³ | unit {}",
        p.groundwater_depth_m, p.magnitude, p.pga_g, p.unit_weight_kn_m3, p.unit
    );
    println!();
    println!(
        "{:>7} {:>8} {:>7} {:>8} {:>7} {:>8} {:>6}  {:<14} {:>6} {:>6} {:>5}",
        "z (m)", "qc", "fs", "σv", "u", "σ'v", "Ic", "Zone", "CSR", "CRR", "FS"
    );
    for r in &report.records {
        println!(
            "{:>7.2} {:>8.2} {:>7.3} {:>8.1} {:>7.1} {:>8.1} {:>6.2}  {:<14} {:>6.3} {:>6.3} {:>5.2}{}",
            r.depth_m,
            r.qc_raw,
            r.fs_raw,
            r.total_stress_kpa,
            r.pore_pressure_kpa,
            r.effective_stress_kpa,
            r.ic,
            r.zone.label(),
            r.csr,
            r.crr,
            r.factor_of_safety,
            if r.is_triggered() { "  *" } else { "" }
        );
    }

    if !report.rejected.is_empty() {
        println!();
        println!("Skipped rows:");
        for rejected in &report.rejected {
            println!("  row {}: {}", rejected.index + 1, rejected.reason);
        }
    }

    let s = &report.summary;
    println!();
    println!(
        "Rows: {} analyzed, {} skipped, {} below FS 1.0",
        s.accepted_rows, s.rejected_rows, s.triggered_records
    );
    if let (Some(fs), Some(depth)) = (s.min_factor_of_safety, s.critical_depth_m) {
        println!("Lowest FS: {fs:.2} at {depth:.2} m");
    }

    println!();
    println!("───────────────────────────────────────────────────────────────────────────────────────");
    println!("  RECOMMENDATIONS");
    println!("───────────────────────────────────────────────────────────────────────────────────────");
    for finding in &report.findings {
        print!("{finding}");
        println!();
    }
    Ok(())
}
