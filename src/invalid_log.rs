// Invalid message log: `<ISO timestamp>: <raw body>` entries separated by a blank line.
// Bodies are written verbatim, embedded newlines included.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::db::format_instant;
use crate::parser::Rejection;

pub fn format_invalid_log(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(|r| format!("{}: {}", format_instant(&r.timestamp), r.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Overwrite the log with the given rejections. Writes nothing when the list is empty.
pub fn write_invalid_log(path: &Path, rejections: &[Rejection]) -> Result<()> {
    if rejections.is_empty() {
        return Ok(());
    }

    fs::write(path, format_invalid_log(rejections))
        .with_context(|| format!("Failed to write invalid log: {}", path.display()))?;

    info!(
        count = rejections.len(),
        path = %path.display(),
        "logged invalid messages"
    );
    Ok(())
}
