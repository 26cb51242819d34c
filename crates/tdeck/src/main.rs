use clap::Parser;
use tdeck::cli::Cli;
use tdeck::logging::{self, Verbosity};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Without a usable cache dir the deck still runs, just without a log file.
    let _guard = match logging::init(Verbosity::from_flags(cli.verbose, cli.quiet)) {
        Ok(guard) => Some(guard),
        Err(err) => {
            if !cli.quiet {
                eprintln!("warning: logging disabled: {err:#}");
            }
            None
        }
    };

    cli.run()
}
