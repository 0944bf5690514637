//! List command implementation

use anyhow::Result;
use serde::Serialize;

use crate::cli::{GlobalArgs, LsArgs, OutputFormat};
use crate::commands::common::{build_fixture_set, connect, load_project, run_schema_file};

/// Fixture information for display
#[derive(Debug, Serialize)]
struct FixtureInfo {
    name: String,
    table: String,
    model: Option<String>,
    rows: usize,
    path: String,
}

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = connect(&project, global)?;
    run_schema_file(&db, args.schema.as_deref()).await?;

    let set = build_fixture_set(&project, &db).await?;
    let fixtures: Vec<FixtureInfo> = set
        .definitions()
        .map(|d| FixtureInfo {
            name: d.name().to_string(),
            table: d.table_name().to_string(),
            model: d.model().map(|m| m.class_name.clone()),
            rows: d.row_count(),
            path: d.file().path.display().to_string(),
        })
        .collect();

    match args.output {
        OutputFormat::Text => print_table(&fixtures),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fixtures)?),
    }
    Ok(())
}

/// Print fixtures in table format
fn print_table(fixtures: &[FixtureInfo]) {
    let name_width = fixtures.iter().map(|f| f.name.len()).max().unwrap_or(4).max(4);
    let table_width = fixtures.iter().map(|f| f.table.len()).max().unwrap_or(5).max(5);
    let model_width = fixtures
        .iter()
        .map(|f| f.model.as_ref().map_or(1, String::len))
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:<name_width$}  {:<table_width$}  {:<model_width$}  {:>5}  PATH",
        "NAME", "TABLE", "MODEL", "ROWS"
    );
    println!(
        "{:-<name_width$}  {:-<table_width$}  {:-<model_width$}  {:->5}  {}",
        "",
        "",
        "",
        "",
        "-".repeat(40)
    );
    for fixture in fixtures {
        println!(
            "{:<name_width$}  {:<table_width$}  {:<model_width$}  {:>5}  {}",
            fixture.name,
            fixture.table,
            fixture.model.as_deref().unwrap_or("-"),
            fixture.rows,
            fixture.path
        );
    }
    println!();
    println!("{} fixtures", fixtures.len());
}
