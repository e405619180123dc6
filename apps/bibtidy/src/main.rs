//! bibtidy CLI entry point

use bibtidy::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so the summary on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let summary = bibtidy::run(&cli)?;
    println!("{}", summary);

    Ok(())
}
