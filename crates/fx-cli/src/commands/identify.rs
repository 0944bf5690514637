//! Identify command implementation

use anyhow::Result;
use fx_core::{identify, IdKind};

use crate::cli::{GlobalArgs, IdentifyArgs};
use crate::commands::common::init_logging;

/// Execute the identify command
pub fn execute(args: &IdentifyArgs, global: &GlobalArgs) -> Result<()> {
    init_logging(global.verbose);
    let kind = if args.uuid {
        IdKind::Uuid
    } else {
        IdKind::Integer
    };

    if let [label] = args.labels.as_slice() {
        println!("{}", identify(label, kind));
        return Ok(());
    }

    let width = args.labels.iter().map(String::len).max().unwrap_or(0);
    for label in &args.labels {
        println!("{:<width$}  {}", label, identify(label, kind));
    }
    Ok(())
}
