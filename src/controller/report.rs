use std::fmt::Write;

use tracing::{debug, warn};

use crate::entity::{Diagnostic, Level};
use crate::usecase::OutdatedPackage;

/// Forward use case findings to the log.
pub fn forward(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.level {
            Level::Debug => debug!("{}", diagnostic),
            Level::Warn => warn!("{}", diagnostic),
        }
    }
}

/// The table printed when no package was requested.
pub fn render_outdated(rows: &[OutdatedPackage]) -> String {
    if rows.is_empty() {
        return "We analyzed your package.json and everything seems to be in order. Good work!\n"
            .to_string();
    }

    let name_width = rows
        .iter()
        .map(|row| row.name.len())
        .chain([4])
        .max()
        .unwrap_or_default();
    let versions: Vec<String> = rows
        .iter()
        .map(|row| format!("{} -> {}", row.installed, row.available))
        .collect();
    let version_width = versions.iter().map(String::len).chain([7]).max().unwrap_or_default();

    let mut out = String::from(
        "We analyzed your package.json, there are some packages to update:\n\n",
    );
    let _ = writeln!(
        out,
        "  {:<name_width$}  {:<version_width$}  Command to update",
        "Name", "Version"
    );
    let _ = writeln!(
        out,
        "  {}",
        "-".repeat(name_width + version_width + 4 + "Command to update".len())
    );
    for (row, version) in rows.iter().zip(&versions) {
        let _ = writeln!(
            out,
            "  {:<name_width$}  {:<version_width$}  {}",
            row.name, version, row.command
        );
    }
    out
}
