//! Apply command implementation

use anyhow::{Context, Result};
use fx_fixtures::{FixtureOptions, FixtureSet};

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{connect, load_project, run_schema_file};

/// Execute the apply command
pub async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = connect(&project, global)?;
    run_schema_file(&db, args.schema.as_deref()).await?;

    let mut options = FixtureOptions::from_config(&project.config, &project.root);
    options.clear_other_tables |= args.clear_other_tables;
    let mut set = FixtureSet::new(options, project.config.model_registry());

    set.apply(&db).await.context("Failed to apply fixtures")?;

    let mut total_rows = 0;
    for table in set.tables() {
        total_rows += table.row_count();
        println!("  ✓ {} ({} rows)", table.table_name, table.row_count());
    }
    println!();
    println!(
        "Applied {} tables ({} total rows)",
        set.tables().count(),
        total_rows
    );
    Ok(())
}
