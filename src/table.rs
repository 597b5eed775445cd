//! Plain-text table rendering for previews.
//!
//! Cells are flattened to one line and clamped to a maximum width so wide
//! free-text columns do not push the rest of the preview off screen.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::row::Row;

pub const DEFAULT_CELL_WIDTH: usize = 32;
const ELLIPSIS: char = '…';
const GAP: &str = "  ";

/// Renders `rows` under `columns`, one line per row. Absent keys render as
/// blank cells; `null` values render literally.
pub fn render_rows(columns: &[String], rows: &[Row], max_cell_width: usize) -> String {
    let body = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    row.get(column)
                        .map(|value| value.as_display())
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_table(columns, &body, max_cell_width)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>], max_cell_width: usize) -> String {
    let max_cell_width = max_cell_width.max(1);
    let clamp_row = |cells: &[String]| -> Vec<String> {
        cells
            .iter()
            .take(headers.len())
            .map(|cell| clamp(&flatten(cell), max_cell_width))
            .collect()
    };
    let header_cells = clamp_row(headers);
    let body = rows.iter().map(|row| clamp_row(row)).collect::<Vec<_>>();

    let mut widths = header_cells
        .iter()
        .map(|cell| cell.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", line(&header_cells, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", line(&rule, &widths));
    for row in &body {
        let _ = writeln!(output, "{}", line(row, &widths));
    }
    output
}

fn line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .join(GAP)
        .trim_end()
        .to_string()
}

fn flatten(value: &str) -> String {
    value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect()
}

fn clamp(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut clamped: String = value.chars().take(max - 1).collect();
    clamped.push(ELLIPSIS);
    clamped
}
