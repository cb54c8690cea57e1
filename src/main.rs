//! Command-line interface for browsing, validating and exporting patient
//! education content.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
