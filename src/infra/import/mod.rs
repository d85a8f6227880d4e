use std::collections::HashSet;
use std::path::Path;

use crate::domain::entities::table::{RawRow, RawTable};
use crate::usecase::ports::store::StoreError;

pub mod csv;
pub mod xlsx;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("file has no header row")]
    MissingHeader,
    #[error("file has no data rows")]
    Empty,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cells as read from the file: the header row, then every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads a delimited text file or the first worksheet of a workbook.
pub fn read_table(path: &Path) -> Result<RawTable, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let grid = match extension.as_str() {
        "csv" | "txt" => self::csv::read_csv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => self::xlsx::read_first_sheet(path),
        _ => return Err(ImportError::Unsupported(path.display().to_string())),
    }
    .map_err(|err| ImportError::Read {
        path: path.display().to_string(),
        message: format!("{err:#}"),
    })?;

    let table = build_table(grid)?;
    tracing::info!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.rows.len(),
        "read table"
    );
    Ok(table)
}

/// Header names are trimmed; blank and repeated (case-insensitive) names are
/// dropped along with their cells.
pub fn build_table(grid: SheetGrid) -> Result<RawTable, ImportError> {
    let mut seen = HashSet::new();
    let kept: Vec<(usize, String)> = grid
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let name = name.trim_start_matches('\u{feff}').trim();
            if name.is_empty() || !seen.insert(name.to_lowercase()) {
                return None;
            }
            Some((idx, name.to_string()))
        })
        .collect();

    if kept.is_empty() {
        return Err(ImportError::MissingHeader);
    }
    if grid.rows.is_empty() {
        return Err(ImportError::Empty);
    }

    let rows = grid
        .rows
        .iter()
        .map(|cells| {
            RawRow::from_pairs(kept.iter().map(|(idx, name)| {
                let value = cells.get(*idx).map(String::as_str).unwrap_or("");
                (name.clone(), value.to_string())
            }))
        })
        .collect();
    let columns = kept.into_iter().map(|(_, name)| name).collect();

    Ok(RawTable::new(columns, rows))
}
