//! At-exit report for Pang programs
//!
//! Dumps machine KPIs when a program finishes, controlled by the
//! `PANG_REPORT` env var:
//! - Unset or `0` → no report, zero cost
//! - `1` → human-readable to stderr
//! - `json` → JSON to stderr
//! - `json:/path` → JSON to file
//!
//! ## Feature Flag
//!
//! JSON output requires the `report-json` feature (enabled by default).
//! Without it, JSON requests fall back to the human format.

use crate::machine::Machine;
use pang_core::ArenaStats;
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

pub const REPORT_ENV: &str = "PANG_REPORT";

// =============================================================================
// Report Configuration (parsed from PANG_REPORT env var)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stderr,
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub destination: ReportDestination,
}

impl ReportConfig {
    /// Parse a `PANG_REPORT` value; None means no report
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "" | "0" => None,
            "1" => Some(ReportConfig {
                format: ReportFormat::Human,
                destination: ReportDestination::Stderr,
            }),
            "json" => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::Stderr,
            }),
            s if s.starts_with("json:") => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::File(s[5..].to_string()),
            }),
            _ => {
                warn!("{}='{}' not recognized, ignoring", REPORT_ENV, val);
                None
            }
        }
    }

    pub fn from_env() -> Option<Self> {
        Self::parse(&std::env::var(REPORT_ENV).ok()?)
    }
}

// =============================================================================
// Report Data
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub ops_executed: u64,
    pub stack_depth: usize,
    /// Exit code of the fault that ended the run, if any
    pub fault: Option<i32>,
    pub arena: ArenaStats,
}

impl ReportData {
    pub fn collect(machine: &Machine) -> Self {
        ReportData {
            ops_executed: machine.ops_executed(),
            stack_depth: machine.depth(),
            fault: machine.fault(),
            arena: machine.stats(),
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

pub fn format_human(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str("=== PANG REPORT ===\n");
    out.push_str(&format!("Ops executed:    {}\n", data.ops_executed));
    out.push_str(&format!("Stack depth:     {}\n", data.stack_depth));
    match data.fault {
        Some(code) => out.push_str(&format!("Fault:           {:#x}\n", code)),
        None => out.push_str("Fault:           none\n"),
    }
    out.push_str(&format!(
        "Arena cursor:    {} / {}\n",
        data.arena.bump_cursor, data.arena.capacity
    ));
    out.push_str(&format!("Arena peak:      {}\n", data.arena.peak_cursor));
    out.push_str(&format!(
        "Free list:       {} blocks, {} cells\n",
        data.arena.free_blocks, data.arena.free_slots
    ));
    out.push_str(&format!("Tracked spans:   {}\n", data.arena.tracked_spans));
    out.push_str("===================\n");
    out
}

#[cfg(feature = "report-json")]
pub fn format_json(data: &ReportData) -> String {
    serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(not(feature = "report-json"))]
pub fn format_json(data: &ReportData) -> String {
    warn!("PANG_REPORT=json requires the 'report-json' feature. Falling back to human format.");
    format_human(data)
}

// =============================================================================
// Emission
// =============================================================================

/// Write a report for `machine` as configured by `PANG_REPORT`
pub fn emit(machine: &Machine) {
    let Some(config) = ReportConfig::from_env() else {
        return;
    };
    if let Err(e) = emit_with(&config, machine) {
        warn!("failed to write report: {}", e);
    }
}

pub fn emit_with(config: &ReportConfig, machine: &Machine) -> io::Result<()> {
    let data = ReportData::collect(machine);
    let output = match config.format {
        ReportFormat::Human => format_human(&data),
        ReportFormat::Json => format_json(&data),
    };

    match &config.destination {
        ReportDestination::Stderr => {
            let mut stderr = io::stderr().lock();
            stderr.write_all(output.as_bytes())?;
            if !output.ends_with('\n') {
                stderr.write_all(b"\n")?;
            }
            Ok(())
        }
        ReportDestination::File(path) => std::fs::write(path, output),
    }
}
