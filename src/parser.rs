//! Streaming row parser.
//!
//! [`RowStream`] is a lazy, finite, non-restartable sequence of decoded rows.
//! Opening a stream reads the header row, normalizes it (see [`crate::headers`])
//! and rewinds the source; iteration then decodes one record at a time.
//! [`drive`] pushes the same rows into a consumer callback that can stop the
//! stream early, and [`parse`] layers the row cap on top of it.

use std::{
    io::{Read, Seek, SeekFrom},
    ops::ControlFlow,
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};

use crate::{
    error::{ImportError, ImportResult},
    headers::{ColumnOccupancy, NormalizedHeaders, normalize_headers},
    io_utils,
    row::Row,
    value::infer_value,
};

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub delimiter: u8,
    /// Maximum number of data rows to accept; `None` means unbounded.
    pub limit: Option<usize>,
    pub show_empty_fields: bool,
    pub dynamic_typing: bool,
    pub skip_empty_lines: bool,
    pub encoding: &'static Encoding,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            limit: None,
            show_empty_fields: false,
            dynamic_typing: true,
            skip_empty_lines: true,
            encoding: UTF_8,
        }
    }
}

/// What the decoder produced for one physical record.
#[derive(Debug)]
pub enum RowOutcome {
    Accepted(Row),
    /// Delivered, but the record had a different field count than the header.
    Flagged(Row, ImportError),
    /// Not delivered: the record could not be decoded.
    Rejected(ImportError),
}

impl RowOutcome {
    pub fn into_parts(self) -> (Option<Row>, Option<ImportError>) {
        match self {
            RowOutcome::Accepted(row) => (Some(row), None),
            RowOutcome::Flagged(row, issue) => (Some(row), Some(issue)),
            RowOutcome::Rejected(issue) => (None, Some(issue)),
        }
    }
}

pub struct RowStream<R> {
    reader: csv::Reader<R>,
    headers: NormalizedHeaders,
    raw_width: usize,
    options: ParseOptions,
    record: csv::ByteRecord,
    finished: bool,
}

impl<R: Read + Seek> RowStream<R> {
    /// Reads and normalizes the header row.
    ///
    /// When the header has blank names that might be dropped, the data rows
    /// that can still be accepted under `options.limit` are scanned once to
    /// learn which blank columns carry values, then the source is rewound.
    pub fn open(mut source: R, options: ParseOptions) -> ImportResult<Self> {
        let start = source.stream_position()?;
        let mut reader = io_utils::open_csv_reader(source, options.delimiter);
        let mut record = csv::ByteRecord::new();

        if !reader.read_byte_record(&mut record)? {
            debug!("Input is empty; no header row found");
            return Ok(Self {
                reader,
                headers: normalize_headers(&[], &ColumnOccupancy::default(), false),
                raw_width: 0,
                options,
                record,
                finished: true,
            });
        }
        let raw_headers = io_utils::decode_headers(&record, options.encoding).map_err(|err| {
            ImportError::Decode {
                row: record_line(&record),
                message: err.to_string(),
            }
        })?;

        let needs_scan =
            !options.show_empty_fields && raw_headers.iter().any(|h| h.trim().is_empty());
        let mut occupancy = ColumnOccupancy::new(raw_headers.len());
        if needs_scan {
            let window = options.limit.unwrap_or(usize::MAX);
            let mut scanned = 0usize;
            while scanned < window && reader.read_byte_record(&mut record)? {
                let Ok(decoded) = io_utils::decode_record(&record, options.encoding) else {
                    continue;
                };
                if options.skip_empty_lines && is_empty_line(&decoded) {
                    continue;
                }
                occupancy.observe(decoded.iter().map(String::as_str));
                scanned += 1;
            }
            debug!("Scanned {scanned} row(s) for blank-named column content");

            let mut source = reader.into_inner();
            source.seek(SeekFrom::Start(start))?;
            reader = io_utils::open_csv_reader(source, options.delimiter);
            reader.read_byte_record(&mut record)?;
        }

        let headers = normalize_headers(&raw_headers, &occupancy, options.show_empty_fields);
        debug!("Normalized headers: {:?}", headers.names());
        Ok(Self {
            reader,
            headers,
            raw_width: raw_headers.len(),
            options,
            record,
            finished: false,
        })
    }
}

impl<R: Read> RowStream<R> {
    pub fn headers(&self) -> &NormalizedHeaders {
        &self.headers
    }

    /// Stops the stream; no further rows are decoded.
    pub fn abort(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn build_row(&self, decoded: &[String]) -> Row {
        let mut row = Row::with_capacity(self.headers.len());
        for (name, cell) in self.headers.names().iter().zip(self.headers.select(decoded)) {
            if let Some(cell) = cell {
                row.insert(name.as_str(), infer_value(cell, self.options.dynamic_typing));
            }
        }
        row
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = ImportResult<RowOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            match self.reader.read_byte_record(&mut self.record) {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
            }

            let line = record_line(&self.record);
            let decoded = match io_utils::decode_record(&self.record, self.options.encoding) {
                Ok(decoded) => decoded,
                Err(err) => {
                    return Some(Ok(RowOutcome::Rejected(ImportError::Decode {
                        row: line,
                        message: err.to_string(),
                    })));
                }
            };
            if self.options.skip_empty_lines && is_empty_line(&decoded) {
                continue;
            }

            let row = self.build_row(&decoded);
            if decoded.len() != self.raw_width {
                let issue = ImportError::FieldCount {
                    row: line,
                    expected: self.raw_width,
                    found: decoded.len(),
                };
                return Some(Ok(RowOutcome::Flagged(row, issue)));
            }
            return Some(Ok(RowOutcome::Accepted(row)));
        }
    }
}

/// Pushes every decoded record into `step` until the input ends or `step`
/// breaks. Returns the number of outcomes delivered.
pub fn drive<R, F>(stream: &mut RowStream<R>, mut step: F) -> ImportResult<usize>
where
    R: Read,
    F: FnMut(RowOutcome) -> ControlFlow<()>,
{
    let mut delivered = 0usize;
    while let Some(item) = stream.next() {
        delivered += 1;
        if step(item?).is_break() {
            stream.abort();
            break;
        }
    }
    Ok(delivered)
}

/// Receives the results of [`parse`].
pub trait RowSink {
    fn on_headers(&mut self, headers: &NormalizedHeaders);
    fn on_row(&mut self, row: Row);
    fn on_error(&mut self, error: ImportError);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub accepted: usize,
    pub aborted: bool,
}

/// Parses `source` into `sink`, enforcing `options.limit`.
///
/// The first row past the limit aborts the stream and reports
/// [`ImportError::RowLimitExceeded`]; rows accepted before it stay in the sink.
/// Row-level problems are reported and parsing continues. An `Err` return
/// means the source itself failed; rows delivered so far are kept.
pub fn parse<R, S>(source: R, options: &ParseOptions, sink: &mut S) -> ImportResult<ParseSummary>
where
    R: Read + Seek,
    S: RowSink + ?Sized,
{
    let mut stream = RowStream::open(source, *options)?;
    sink.on_headers(stream.headers());

    let limit = options.limit.unwrap_or(usize::MAX);
    let mut summary = ParseSummary::default();
    drive(&mut stream, |outcome| {
        let (row, issue) = outcome.into_parts();
        if let Some(row) = row {
            if summary.accepted >= limit {
                summary.aborted = true;
                warn!("Row limit of {limit} reached; aborting parse");
                sink.on_error(ImportError::RowLimitExceeded { limit });
                return ControlFlow::Break(());
            }
            summary.accepted += 1;
            sink.on_row(row);
        }
        if let Some(issue) = issue {
            warn!("{issue}");
            sink.on_error(issue);
        }
        ControlFlow::Continue(())
    })?;
    Ok(summary)
}

fn record_line(record: &csv::ByteRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or(0)
}

// A record holding one empty field; records of empty or whitespace cells
// such as `,,` are data.
fn is_empty_line(fields: &[String]) -> bool {
    matches!(fields, [only] if only.is_empty())
}
