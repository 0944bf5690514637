//! Fixtureflow CLI - compile and load YAML test fixtures

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::exit_code_for;
use commands::{apply, build, identify, lookup, ls};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Build(args) => build::execute(args, &cli.global).await,
        cli::Commands::Apply(args) => apply::execute(args, &cli.global).await,
        cli::Commands::Lookup(args) => lookup::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Identify(args) => identify::execute(args, &cli.global),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}
