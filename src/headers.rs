//! Header normalization.
//!
//! Turns the raw first row of a file into a clean, unique, ordered list of
//! column names:
//!
//! - Names are trimmed.
//! - A blank-named column is dropped entirely when `show_empty_fields` is off
//!   and no data row carries a value at that position; otherwise it is named
//!   `Field {n}` where `n` is its 1-based position in the raw header.
//! - Repeated names get a ` (2)`, ` (3)`, ... suffix so that keyed rows never
//!   shadow one another.

use std::collections::HashSet;

use log::debug;

/// Tracks, per raw column position, whether any data row held a value there.
#[derive(Debug, Clone, Default)]
pub struct ColumnOccupancy {
    occupied: Vec<bool>,
}

impl ColumnOccupancy {
    pub fn new(width: usize) -> Self {
        Self {
            occupied: vec![false; width],
        }
    }

    /// Records one data row. Cells past the header width are ignored; an
    /// absent cell counts as empty.
    pub fn observe<'a, I>(&mut self, row: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for (slot, cell) in self.occupied.iter_mut().zip(row) {
            if !cell.is_empty() {
                *slot = true;
            }
        }
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.occupied.get(index).copied().unwrap_or(false)
    }
}

/// Finalized header: kept column names and the raw positions they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHeaders {
    names: Vec<String>,
    positions: Vec<usize>,
}

impl NormalizedHeaders {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Re-encodes a raw row against the finalized header, dropping removed
    /// columns. Positions missing from a short row yield `None`.
    pub fn select<'r>(&self, raw: &'r [String]) -> Vec<Option<&'r str>> {
        self.positions
            .iter()
            .map(|&pos| raw.get(pos).map(String::as_str))
            .collect()
    }
}

pub fn normalize_headers(
    raw: &[String],
    occupancy: &ColumnOccupancy,
    show_empty_fields: bool,
) -> NormalizedHeaders {
    let mut names = Vec::with_capacity(raw.len());
    let mut positions = Vec::with_capacity(raw.len());

    for (idx, column) in raw.iter().enumerate() {
        let trimmed = column.trim();
        if trimmed.is_empty() {
            if !show_empty_fields && !occupancy.is_occupied(idx) {
                debug!("Dropping blank, empty column at position {}", idx + 1);
                continue;
            }
            names.push(format!("Field {}", idx + 1));
        } else {
            names.push(trimmed.to_string());
        }
        positions.push(idx);
    }

    NormalizedHeaders {
        names: dedupe_names(names),
        positions,
    }
}

/// Convenience form operating on fully decoded data rows.
pub fn normalize_with_rows(
    raw: &[String],
    rows: &[Vec<String>],
    show_empty_fields: bool,
) -> NormalizedHeaders {
    let mut occupancy = ColumnOccupancy::new(raw.len());
    for row in rows {
        occupancy.observe(row.iter().map(String::as_str));
    }
    normalize_headers(raw, &occupancy, show_empty_fields)
}

fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        if seen.insert(name.clone()) {
            result.push(name);
            continue;
        }
        let mut counter = 2usize;
        let unique = loop {
            let candidate = format!("{name} ({counter})");
            if !taken.contains(&candidate) {
                break candidate;
            }
            counter += 1;
        };
        debug!("Renaming duplicate column '{name}' to '{unique}'");
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        result.push(unique);
    }
    result
}
