use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::infra::import::SheetGrid;

/// Renders a spreadsheet cell the way it reads on screen. Whole floats lose
/// their fraction, so unit `101` stays `101`.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.clone(),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.clone(),
        Data::DurationIso(v) => v.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// The first worksheet; its first row is the header.
pub fn read_first_sheet(path: &Path) -> Result<SheetGrid> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no sheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read sheet: {sheet}"))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();

    Ok(SheetGrid {
        headers,
        rows: rows.collect(),
    })
}
