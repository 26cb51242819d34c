use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    for (key, value, explicit) in rows(&config) {
        let marker = if explicit { "" } else { " (default)" };
        println!("  {:<26} {}{}", key.cyan(), value, marker.dimmed());
    }
    Ok(())
}

/// `(key, effective value, set in the file)` for every known key.
fn rows(config: &Config) -> Vec<(&'static str, String, bool)> {
    let defaults = config.defaults.clone().unwrap_or_default();
    vec![
        ("defaults.theme", config.theme().name.to_string(), defaults.theme.is_some()),
        (
            "defaults.transition",
            config.transition().to_string(),
            defaults.transition.is_some(),
        ),
        (
            "defaults.refresh_rate",
            config.refresh_rate().to_string(),
            defaults.refresh_rate.is_some(),
        ),
        (
            "defaults.message_timeout",
            config.message_timeout().to_string(),
            defaults.message_timeout.is_some(),
        ),
        ("defaults.watch", config.watch().to_string(), defaults.watch.is_some()),
    ]
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    tracing::info!(key, value, path = %path.display(), "config updated");
    println!("{} {} = {}", "Set".green().bold(), key, value);
    println!("Saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_mark_explicit_values() {
        let mut config = Config::default();
        config.set("defaults.theme", "light").unwrap();
        let rows = rows(&config);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], ("defaults.theme", "light".to_string(), true));
        assert_eq!(rows[1], ("defaults.transition", "swipe".to_string(), false));
        assert_eq!(rows[4], ("defaults.watch", "true".to_string(), false));
    }
}
