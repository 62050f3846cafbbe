//! Writes rendered month images to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File name for a rendered month, e.g. `calendar_2025_09.png`
pub fn output_file_name(year: i32, month: u32, extension: &str) -> String {
    format!("calendar_{}_{:02}.{}", year, month, extension)
}

/// Write `bytes` into `dir` (created if needed) and return the file path.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so a watcher never sees a half-written image.
pub fn write_output(
    dir: &Path,
    year: i32,
    month: u32,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let path = dir.join(output_file_name(year, month, extension));
    let partial = path.with_extension(format!("{}.part", extension));

    fs::write(&partial, bytes)
        .with_context(|| format!("Failed to write {:?}", partial))?;
    fs::rename(&partial, &path)
        .with_context(|| format!("Failed to move {:?} into place", path))?;

    log::info!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(path)
}
