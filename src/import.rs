//! Final import: sanitize the mapped rows and write them out.

use std::io::Write;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    ErrorTally,
    cli::{ImportArgs, OutputFormat},
    io_utils, open_session,
    row::Row,
    target::TargetSchema,
};

pub fn execute(args: &ImportArgs) -> Result<()> {
    let schema = TargetSchema::load(&args.schema)
        .with_context(|| format!("Loading target schema from {:?}", args.schema))?;
    let limit = (!args.no_limit).then_some(args.limit);

    let mut tally = ErrorTally::default();
    let session = open_session(&args.source, schema, limit, &args.edits, &mut tally)?;

    let missing = session
        .missing_required()
        .iter()
        .map(|field| field.label.as_str())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        let message = format!("Required field(s) not mapped: {}", missing.join(", "));
        if args.strict {
            bail!(message);
        }
        warn!("{message}");
    }
    if let Some(error) = session.error() {
        if args.strict {
            bail!("{} parse error(s); last: {error}", tally.errors);
        }
    }

    let file_name = session.file_name().to_string();
    let rows = session.finalize();
    let writer = io_utils::open_output(args.output.as_deref())?;
    match args.format {
        OutputFormat::Json => write_json(writer, &rows)?,
        OutputFormat::Csv => write_csv(writer, &rows)?,
    }
    info!(
        "Imported {} of {} parsed row(s) from '{}'",
        rows.len(),
        tally.rows,
        file_name
    );
    Ok(())
}

pub fn write_json<W: Write>(mut writer: W, rows: &[Row]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows).context("Writing JSON output")?;
    writeln!(writer)?;
    writer.flush().context("Flushing JSON output")
}

/// Writes rows as CSV. The header is the union of row keys in first-seen
/// order; keys a row lacks are written as empty fields.
pub fn write_csv<W: Write>(writer: W, rows: &[Row]) -> Result<()> {
    let columns = rows
        .iter()
        .flat_map(|row| row.keys())
        .unique()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer
        .write_record(&columns)
        .context("Writing CSV header")?;
    for row in rows {
        let record = columns
            .iter()
            .map(|column| row.get(column).map(|v| v.as_field()).unwrap_or_default());
        csv_writer.write_record(record).context("Writing CSV row")?;
    }
    csv_writer.flush().context("Flushing CSV output")?;
    Ok(())
}
