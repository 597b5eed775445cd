//! Target-field binding listing.
//!
//! Shows, for every target field, the column it was bound to when the file was
//! parsed and the column it is bound to after the requested edits.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{ErrorTally, cli::MappingsArgs, open_session, table, target::TargetSchema};

pub fn execute(args: &MappingsArgs) -> Result<()> {
    let schema = TargetSchema::load(&args.schema)
        .with_context(|| format!("Loading target schema from {:?}", args.schema))?;
    let mut tally = ErrorTally::default();
    let session = open_session(&args.source, schema, None, &args.edits, &mut tally)?;
    let mappings = session.mappings();

    if args.json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, mappings).context("Writing mappings JSON")?;
        writeln!(stdout)?;
        return Ok(());
    }

    let headers = ["label", "value", "required", "original", "current"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = session
        .schema()
        .fields()
        .iter()
        .map(|field| {
            let original = mappings
                .original_binding(&field.value)
                .map(ToString::to_string)
                .unwrap_or_default();
            let current = mappings
                .current_binding(&field.value)
                .map(ToString::to_string)
                .unwrap_or_default();
            vec![
                field.label.clone(),
                field.value.clone(),
                if field.required { "yes" } else { "" }.to_string(),
                original,
                current,
            ]
        })
        .collect::<Vec<_>>();
    print!(
        "{}",
        table::render_table(&headers, &rows, table::DEFAULT_CELL_WIDTH)
    );
    println!();
    println!("Source columns: {}", session.headers().join(", "));
    if mappings.is_modified() {
        println!("Current bindings differ from the parsed defaults");
    }
    info!(
        "Listed {} target field(s) against {} source column(s)",
        rows.len(),
        session.headers().len()
    );
    Ok(())
}
