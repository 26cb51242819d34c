use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::demo::SAMPLE_MARKDOWN;

/// Write the sample deck to `file`. Existing files are left alone.
pub fn run(file: &Path) -> Result<()> {
    write_sample(file)?;
    println!("{} {}", "Created".green().bold(), file.display());
    println!("Present it with: {}", format!("tdeck {}", file.display()).cyan());
    Ok(())
}

fn write_sample(file: &Path) -> Result<()> {
    super::write_new(file, SAMPLE_MARKDOWN)?;
    tracing::info!(path = %file.display(), "sample deck written");
    Ok(())
}
