//! Build command implementation

use anyhow::Result;
use fx_fixtures::FixtureSet;
use serde::Serialize;

use crate::cli::{BuildArgs, BuildOutput, GlobalArgs};
use crate::commands::common::{build_fixture_set, connect, load_project, run_schema_file};

/// One compiled table in JSON output
#[derive(Debug, Serialize)]
struct TableReport<'a> {
    table: &'a str,
    rows: usize,
    statements: &'a [String],
}

/// Execute the build command
pub async fn execute(args: &BuildArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = connect(&project, global)?;
    run_schema_file(&db, args.schema.as_deref()).await?;

    let set = build_fixture_set(&project, &db).await?;

    match args.output {
        BuildOutput::Summary => print_summary(&set),
        BuildOutput::Sql => print_sql(&set)?,
        BuildOutput::Json => print_json(&set)?,
    }
    Ok(())
}

fn print_summary(set: &FixtureSet) {
    let name_width = set
        .tables()
        .map(|t| t.table_name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<name_width$}  {:>6}  {:>10}", "TABLE", "ROWS", "STATEMENTS");
    println!("{:-<name_width$}  {:->6}  {:->10}", "", "", "");
    let mut total_rows = 0;
    for table in set.tables() {
        total_rows += table.row_count();
        println!(
            "{:<name_width$}  {:>6}  {:>10}",
            table.table_name,
            table.row_count(),
            table.statements.len()
        );
    }
    println!();
    println!(
        "Built fixtures for {} tables ({} rows)",
        set.tables().count(),
        total_rows
    );
}

fn print_sql(set: &FixtureSet) -> Result<()> {
    for statement in set.statements()? {
        println!("{};", statement);
    }
    Ok(())
}

fn print_json(set: &FixtureSet) -> Result<()> {
    let reports: Vec<TableReport<'_>> = set
        .tables()
        .map(|t| TableReport {
            table: &t.table_name,
            rows: t.row_count(),
            statements: &t.statements,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
