pub mod completion;
pub mod config;
pub mod demo;
pub mod init;

use std::path::Path;

use anyhow::{Context, Result};

/// Write `contents` to a new file at `file`, creating parent directories.
/// Existing files are left alone.
fn write_new(file: &Path, contents: &str) -> Result<()> {
    if file.exists() {
        anyhow::bail!("{} already exists, not overwriting", file.display());
    }
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(file, contents).with_context(|| format!("Failed to write {}", file.display()))
}
