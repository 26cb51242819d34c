use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;
use crate::deck::Deck;
use crate::loader::{DeckLoader, MarkdownLoader};
use crate::state::StateOptions;
use crate::theme::Theme;
use crate::tui::{self, PresentOptions};

#[derive(Parser)]
#[command(name = "tdeck")]
#[command(author, version, about)]
#[command(long_about = "Presentations in the terminal.\n\n\
    Write slides in markdown (or in Rust) and present them with live reload.\n\n\
    Examples:\n  \
    tdeck talk.md                 Present a deck, reloading when it changes\n  \
    tdeck talk.md --slide 4       Start on the fourth slide\n  \
    tdeck demo                    Present the built-in demo deck\n  \
    tdeck demo copy deck.rs       Start a deck in Rust from the demo\n  \
    tdeck init talk.md            Write a sample deck to start from")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Watch this file or directory instead of the deck file
    #[arg(long, value_name = "PATH", conflicts_with = "no_watch")]
    pub watch: Option<PathBuf>,

    /// Do not reload when the deck changes
    #[arg(long)]
    pub no_watch: bool,

    /// Switch slides without animation
    #[arg(long)]
    pub no_transitions: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, value_name = "N")]
    pub slide: Option<usize>,

    /// Start in the deck overview
    #[arg(long)]
    pub overview: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Present, print or copy the built-in demo deck
    Demo {
        #[command(subcommand)]
        command: Option<DemoCommands>,
    },

    /// Write a sample markdown deck to start from
    Init {
        /// Where to write the deck
        #[arg(default_value = "slides.md")]
        file: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Present the demo deck (the default)
    Present,

    /// Print the demo deck's Rust source
    Source,

    /// Copy the demo deck's Rust source to a new file
    Copy {
        /// Where to write the source
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.transition, defaults.watch)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(mut self) -> anyhow::Result<()> {
        match self.command.take() {
            Some(Commands::Demo { command }) => match command.unwrap_or(DemoCommands::Present) {
                DemoCommands::Present => {
                    let config = Config::load_or_default();
                    let options = self.present_options(&config, None);
                    tui::present(crate::demo::deck(), options)
                }
                DemoCommands::Source => {
                    crate::commands::demo::source();
                    Ok(())
                }
                DemoCommands::Copy { path } => crate::commands::demo::copy(&path),
            },
            Some(Commands::Init { file }) => crate::commands::init::run(&file),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!(
                    "{} {}",
                    env!("CARGO_PKG_NAME").bold(),
                    env!("CARGO_PKG_VERSION")
                );
                Ok(())
            }
            None => match self.file.clone() {
                Some(file) => self.present_file(file),
                None => {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            },
        }
    }

    fn present_file(self, file: PathBuf) -> anyhow::Result<()> {
        if !file.exists() {
            anyhow::bail!("File not found: {}", file.display());
        }
        let config = Config::load_or_default();
        let loader = MarkdownLoader::new(&file).with_default_transition(config.transition());
        let deck = loader
            .load()
            .with_context(|| format!("Failed to load {}", file.display()))?;

        let mut options = self.present_options(&config, Some(&deck));
        options.watch = self.watch_target(&config, &file);
        options.loader = Some(Box::new(loader));
        tui::present(deck, options)
    }

    /// What to watch, if anything. An explicit `--watch` wins over the
    /// config; `--no-watch` turns watching off.
    fn watch_target(&self, config: &Config, file: &std::path::Path) -> Option<PathBuf> {
        if self.no_watch {
            return None;
        }
        match &self.watch {
            Some(path) => Some(path.clone()),
            None if config.watch() => Some(file.to_path_buf()),
            None => None,
        }
    }

    fn present_options(&self, config: &Config, deck: Option<&Deck>) -> PresentOptions {
        let theme = if self.no_color {
            Theme::plain()
        } else {
            deck.and_then(|d| d.theme.as_deref())
                .and_then(Theme::from_name)
                .unwrap_or_else(|| config.theme())
        };
        PresentOptions {
            theme,
            refresh_rate: config.refresh_rate(),
            state: StateOptions {
                transitions: !self.no_transitions,
                message_timeout: config.message_timeout(),
                ..StateOptions::default()
            },
            start_slide: self.slide.map_or(0, |n| n.saturating_sub(1)),
            overview: self.overview,
            watch: None,
            loader: None,
        }
    }
}
