use anyhow::{Context, Result};
use log::info;

use crate::{
    ErrorTally, cli::PreviewArgs, mapping::Binding, open_session, table, target::TargetSchema,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let schema = match &args.schema {
        Some(path) => TargetSchema::load(path)
            .with_context(|| format!("Loading target schema from {path:?}"))?,
        None => TargetSchema::new(Vec::new())?,
    };
    let with_targets = args.schema.is_some();

    let mut tally = ErrorTally::default();
    let session = open_session(&args.source, schema, args.limit, &args.edits, &mut tally)?;

    let columns: Vec<String> = if with_targets {
        session
            .mappings()
            .current()
            .iter()
            .filter(|(_, binding)| binding.is_included())
            .map(|(target, _)| target.clone())
            .collect()
    } else {
        session.headers().to_vec()
    };

    println!("File: {}", session.file_name());
    println!("Rows: {}", session.row_count());
    if let Some(error) = session.error() {
        println!("Error: {error}");
    }
    if with_targets {
        let excluded = session
            .mappings()
            .current()
            .iter()
            .filter(|(_, binding)| *binding == Binding::Excluded)
            .count();
        if excluded > 0 {
            println!("Excluded fields: {excluded}");
        }
    }
    println!();

    let shown = args.rows.min(session.mapped().len());
    print!(
        "{}",
        table::render_rows(&columns, &session.mapped()[..shown], args.cell_width)
    );
    info!(
        "Displayed {} of {} row(s) from {:?}",
        shown,
        session.row_count(),
        args.source.input
    );
    Ok(())
}
