use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Row cap applied by `import` unless overridden, matching the import dialog.
pub const DEFAULT_IMPORT_LIMIT: usize = 1001;

#[derive(Debug, Parser)]
#[command(author, version, about = "Preview, remap, and import CSV files against a target schema", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a CSV file and show the mapped rows as a table
    Preview(PreviewArgs),
    /// Show how each target field is bound to the file's columns
    Mappings(MappingsArgs),
    /// Emit the sanitized, schema-mapped rows as JSON or CSV
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Keep blank-named columns even when they hold no data
    #[arg(long = "show-empty-fields")]
    pub show_empty_fields: bool,
    /// Keep every cell as text instead of inferring numbers, booleans, and nulls
    #[arg(long = "no-dynamic-typing")]
    pub no_dynamic_typing: bool,
    /// Keep records whose fields are all blank
    #[arg(long = "keep-empty-lines")]
    pub keep_empty_lines: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Bind a target field to a source column, as `target=source`
    #[arg(long = "map", value_parser = parse_mapping, action = clap::ArgAction::Append)]
    pub maps: Vec<(String, String)>,
    /// Include a target field without binding it to a column
    #[arg(long = "include", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub includes: Vec<String>,
    /// Leave a target field out of the output
    #[arg(long = "exclude", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub edits: EditArgs,
    /// Target schema (.yaml/.yml or .json); without it the parsed columns are shown
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Maximum number of data rows to accept
    #[arg(long)]
    pub limit: Option<usize>,
    /// Maximum display width of a single cell
    #[arg(long = "cell-width", default_value_t = crate::table::DEFAULT_CELL_WIDTH)]
    pub cell_width: usize,
}

#[derive(Debug, Args)]
pub struct MappingsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub edits: EditArgs,
    /// Target schema (.yaml/.yml or .json)
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Print the mapping snapshots as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub edits: EditArgs,
    /// Target schema (.yaml/.yml or .json)
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
    /// Maximum number of data rows to accept
    #[arg(long, default_value_t = DEFAULT_IMPORT_LIMIT)]
    pub limit: usize,
    /// Accept any number of rows
    #[arg(long = "no-limit", conflicts_with = "limit")]
    pub no_limit: bool,
    /// Fail instead of warning when required fields are unbound or a parse error occurred
    #[arg(long)]
    pub strict: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

/// Parses `target=source` into `(target, source)`.
pub fn parse_mapping(value: &str) -> Result<(String, String), String> {
    let (target, source) = value
        .split_once('=')
        .ok_or_else(|| format!("Mapping '{value}' must look like target=source"))?;
    let target = target.trim();
    if target.is_empty() {
        return Err(format!("Mapping '{value}' is missing a target field"));
    }
    Ok((target.to_string(), source.trim().to_string()))
}
