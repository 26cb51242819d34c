use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::demo;

/// Print the demo deck's Rust source.
pub fn source() {
    print!("{}", demo::source());
}

/// Copy the demo deck's source to `path` to start a deck in Rust from it.
pub fn copy(path: &Path) -> Result<()> {
    write_source(path)?;
    println!("{} {}", "Copied demo deck to".green().bold(), path.display());
    println!(
        "Present it with {} from your own binary",
        "tdeck::present(deck(), Default::default())".cyan()
    );
    Ok(())
}

fn write_source(path: &Path) -> Result<()> {
    super::write_new(path, &demo::source())?;
    tracing::info!(path = %path.display(), "demo source written");
    Ok(())
}
