//! Import session: the explicit owner of one file's parse and mapping state.
//!
//! A session is created for a target schema, populated by [`ImportSession::load`],
//! edited through rename/toggle/reset, and consumed by
//! [`ImportSession::finalize`]. Loading another file replaces every piece of
//! state, including the last error.

use std::{
    io::{Read, Seek},
    sync::LazyLock,
};

use log::{debug, info, warn};
use regex::Regex;

use crate::{
    error::{ImportError, ImportResult},
    headers::NormalizedHeaders,
    mapping::{Binding, FieldMappings},
    parser::{self, ParseOptions, ParseSummary, RowSink},
    projection,
    row::Row,
    sanitize,
    target::{TargetField, TargetSchema},
};

pub const UNTITLED: &str = "Untitled";

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("extension pattern compiles"));

/// Strips the trailing extension; a missing or empty name becomes `Untitled`.
pub fn display_file_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => EXTENSION.replace(name, "").into_owned(),
        _ => UNTITLED.to_string(),
    }
}

/// Completion and error notifications for a load.
pub trait ImportObserver {
    fn on_success(&mut self, _rows: &[Row]) {}
    fn on_error(&mut self, _message: &str) {}
}

impl ImportObserver for () {}

/// Adapts a pair of closures into an [`ImportObserver`].
pub struct Callbacks<S, E> {
    pub on_success: S,
    pub on_error: E,
}

impl<S, E> ImportObserver for Callbacks<S, E>
where
    S: FnMut(&[Row]),
    E: FnMut(&str),
{
    fn on_success(&mut self, rows: &[Row]) {
        (self.on_success)(rows)
    }

    fn on_error(&mut self, message: &str) {
        (self.on_error)(message)
    }
}

#[derive(Debug, Clone)]
pub struct ImportSession {
    schema: TargetSchema,
    file_name: String,
    headers: Vec<String>,
    parsed: Vec<Row>,
    mapped: Vec<Row>,
    mappings: FieldMappings,
    error: Option<String>,
}

struct SessionSink<'a, O: ?Sized> {
    headers: Vec<String>,
    rows: Vec<Row>,
    error: &'a mut Option<String>,
    observer: &'a mut O,
}

impl<O: ImportObserver + ?Sized> RowSink for SessionSink<'_, O> {
    fn on_headers(&mut self, headers: &NormalizedHeaders) {
        self.headers = headers.names().to_vec();
    }

    fn on_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    fn on_error(&mut self, error: ImportError) {
        let message = error.to_string();
        self.observer.on_error(&message);
        *self.error = Some(message);
    }
}

impl ImportSession {
    pub fn new(schema: TargetSchema) -> Self {
        let mappings = FieldMappings::seed(&schema, &[]);
        Self {
            schema,
            file_name: String::new(),
            headers: Vec::new(),
            parsed: Vec::new(),
            mapped: Vec::new(),
            mappings,
            error: None,
        }
    }

    /// Parses `source` into this session, replacing any previous state.
    ///
    /// Row limit and row-level problems land in [`error`](Self::error) and are
    /// passed to `observer`; accepted rows are kept either way. Success is
    /// signalled once the stream ends, including after a row-limit abort.
    pub fn load<R>(
        &mut self,
        source: R,
        file_name: Option<&str>,
        options: &ParseOptions,
        observer: &mut dyn ImportObserver,
    ) -> ParseSummary
    where
        R: Read + Seek,
    {
        *self = Self::new(self.schema.clone());

        let mut sink = SessionSink {
            headers: Vec::new(),
            rows: Vec::new(),
            error: &mut self.error,
            observer: &mut *observer,
        };
        let result = parser::parse(source, options, &mut sink);
        let SessionSink { headers, rows, .. } = sink;

        self.mappings = FieldMappings::seed(&self.schema, &headers);
        self.headers = headers;
        self.mapped = rows.clone();
        self.parsed = rows;
        self.file_name = display_file_name(file_name);

        match result {
            Ok(summary) => {
                info!(
                    "Parsed {} row(s) from '{}' across {} column(s)",
                    summary.accepted,
                    self.file_name,
                    self.headers.len()
                );
                observer.on_success(&self.parsed);
                summary
            }
            Err(err) => {
                let message = err.to_string();
                warn!("Parsing stopped: {message}");
                observer.on_error(&message);
                self.error = Some(message);
                ParseSummary {
                    accepted: self.parsed.len(),
                    aborted: true,
                }
            }
        }
    }

    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Normalized source column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn parsed(&self) -> &[Row] {
        &self.parsed
    }

    pub fn mapped(&self) -> &[Row] {
        &self.mapped
    }

    pub fn mappings(&self) -> &FieldMappings {
        &self.mappings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.parsed.len()
    }

    /// Binds `target` to `source_column` and re-projects.
    pub fn rename(&mut self, source_column: &str, target: &str) -> ImportResult<()> {
        if !self.headers.iter().any(|header| header == source_column) {
            return Err(ImportError::UnknownSourceColumn(source_column.to_string()));
        }
        self.mappings.rename(source_column, target)?;
        self.reproject();
        Ok(())
    }

    /// Includes (`checked`) or excludes `target` and re-projects. Required
    /// fields are not protected here; that is up to the caller.
    pub fn toggle(&mut self, target: &str, checked: bool) -> ImportResult<()> {
        self.mappings.toggle(target, checked)?;
        self.reproject();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.mappings.reset();
        self.mapped.clone_from(&self.parsed);
        debug!("Field mappings reset");
    }

    /// Required targets that are not currently fed from a source column.
    pub fn missing_required(&self) -> Vec<&TargetField> {
        self.schema
            .fields()
            .iter()
            .filter(|field| field.required)
            .filter(|field| {
                !matches!(
                    self.mappings.current_binding(&field.value),
                    Some(Binding::Bound(_))
                )
            })
            .collect()
    }

    /// Null-free copy of the current projection.
    pub fn sanitized(&self) -> Vec<Row> {
        sanitize::sanitize(&self.mapped)
    }

    /// Consumes the session and returns the final null-free rows.
    pub fn finalize(self) -> Vec<Row> {
        let mut rows = self.mapped;
        rows.iter_mut().for_each(sanitize::sanitize_row);
        rows
    }

    fn reproject(&mut self) {
        self.mapped = projection::project(&self.parsed, self.mappings.current());
    }
}
