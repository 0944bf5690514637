//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Fixtureflow - compile YAML fixtures into SQL and load them
#[derive(Parser, Debug)]
#[command(name = "fx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (also read from FX_DATABASE)
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile fixtures and print the generated SQL or a summary
    Build(BuildArgs),

    /// Compile fixtures and load them into the database
    Apply(ApplyArgs),

    /// Print the identifiers of labelled fixture rows
    Lookup(LookupArgs),

    /// List fixtures with their tables and row counts
    Ls(LsArgs),

    /// Print the identifier generated for a label
    Identify(IdentifyArgs),
}

/// Output formats shared by several commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// What to print
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: BuildOutput,

    /// SQL file executed before introspecting the schema
    #[arg(short, long)]
    pub schema: Option<String>,
}

/// Build output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutput {
    /// Tables with row and statement counts
    Summary,
    /// Every generated statement
    Sql,
    /// Tables and statements as JSON
    Json,
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// SQL file executed before applying fixtures
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Also clear tables without fixtures (overrides config)
    #[arg(long)]
    pub clear_other_tables: bool,
}

/// Arguments for the lookup command
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Logical fixture name, e.g. `users` or `admin_users`
    pub fixture: String,

    /// Row labels (default: every label of the fixture)
    pub labels: Vec<String>,

    /// SQL file executed before introspecting the schema
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// SQL file executed before introspecting the schema
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the identify command
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Labels to hash
    #[arg(required = true)]
    pub labels: Vec<String>,

    /// Generate UUIDs instead of integers
    #[arg(short, long)]
    pub uuid: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
