//! Lookup command implementation

use anyhow::Result;
use fx_core::Identifier;
use std::collections::BTreeMap;

use crate::cli::{GlobalArgs, LookupArgs, OutputFormat};
use crate::commands::common::{build_fixture_set, connect, load_project, run_schema_file};

/// Execute the lookup command
pub async fn execute(args: &LookupArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = connect(&project, global)?;
    run_schema_file(&db, args.schema.as_deref()).await?;

    let set = build_fixture_set(&project, &db).await?;

    let mut found: Vec<(&str, &Identifier)> = Vec::new();
    if args.labels.is_empty() {
        for (label, id) in set.identifiers(&args.fixture)? {
            found.push((label.as_str(), id));
        }
    } else {
        for label in &args.labels {
            found.push((label.as_str(), set.lookup(&args.fixture, label)?));
        }
    }

    match args.output {
        OutputFormat::Text => {
            let width = found.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
            for (label, id) in &found {
                println!("{:<width$}  {}", label, id);
            }
        }
        OutputFormat::Json => {
            let map: BTreeMap<&str, &Identifier> = found.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(())
}
