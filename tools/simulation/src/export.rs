//! Report export
//!
//! Serializes run reports to JSON for external consumption.

use std::path::Path;

use crate::engine::Report;

/// Pretty JSON for a report.
pub fn export_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Write a report to `path`.
pub fn write_to_file(report: &Report, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = export_json(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Read back a report written by [`write_to_file`].
pub fn read_from_file(path: impl AsRef<Path>) -> std::io::Result<Report> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(std::io::Error::other)
}
