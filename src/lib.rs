pub mod cli;
pub mod error;
pub mod headers;
pub mod import;
pub mod io_utils;
pub mod mapping;
pub mod mappings_cmd;
pub mod parser;
pub mod preview;
pub mod projection;
pub mod row;
pub mod sanitize;
pub mod session;
pub mod table;
pub mod target;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, EditArgs, SourceArgs},
    parser::ParseOptions,
    row::Row,
    session::{ImportObserver, ImportSession},
    target::TargetSchema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_importer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Mappings(args) => mappings_cmd::execute(&args),
        Commands::Import(args) => import::execute(&args),
    }
}

/// Counts the errors a load reports, for `--strict` handling.
#[derive(Debug, Default)]
pub(crate) struct ErrorTally {
    pub errors: usize,
    pub rows: usize,
}

impl ImportObserver for ErrorTally {
    fn on_success(&mut self, rows: &[Row]) {
        self.rows = rows.len();
    }

    fn on_error(&mut self, _message: &str) {
        self.errors += 1;
    }
}

pub(crate) fn parse_options(source: &SourceArgs, limit: Option<usize>) -> Result<ParseOptions> {
    Ok(ParseOptions {
        delimiter: io_utils::resolve_input_delimiter(&source.input, source.delimiter),
        limit,
        show_empty_fields: source.show_empty_fields,
        dynamic_typing: !source.no_dynamic_typing,
        skip_empty_lines: !source.keep_empty_lines,
        encoding: io_utils::resolve_encoding(source.input_encoding.as_deref())?,
    })
}

/// Opens the input, parses it into a fresh session, and applies `edits`.
pub(crate) fn open_session(
    source: &SourceArgs,
    schema: TargetSchema,
    limit: Option<usize>,
    edits: &EditArgs,
    tally: &mut ErrorTally,
) -> Result<ImportSession> {
    let options = parse_options(source, limit)?;
    info!(
        "Reading '{}' with delimiter '{}'",
        source.input.display(),
        io_utils::printable_delimiter(options.delimiter)
    );
    let reader = io_utils::open_source(&source.input)?;
    let file_name = io_utils::source_file_name(&source.input);

    let mut session = ImportSession::new(schema);
    let summary = session.load(reader, file_name.as_deref(), &options, tally);
    debug!("Parse summary: {summary:?}");
    apply_edits(&mut session, edits)?;
    Ok(session)
}

/// Applies excludes, then includes, then `target=source` bindings.
pub(crate) fn apply_edits(session: &mut ImportSession, edits: &EditArgs) -> Result<()> {
    for target in edits.excludes.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        session
            .toggle(target, false)
            .with_context(|| format!("Excluding '{target}'"))?;
    }
    for target in edits.includes.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        session
            .toggle(target, true)
            .with_context(|| format!("Including '{target}'"))?;
    }
    for (target, source) in &edits.maps {
        session
            .rename(source, target)
            .with_context(|| format!("Mapping '{target}' to '{source}'"))?;
    }
    Ok(())
}
