use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::infra::import::SheetGrid;

pub fn read_csv(csv_path: &Path) -> Result<SheetGrid> {
    let file = File::open(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    read_csv_from(file).with_context(|| format!("failed to parse csv: {}", csv_path.display()))
}

/// Rows may be shorter or longer than the header; fully empty lines are
/// skipped by the reader.
pub fn read_csv_from<R: Read>(input: R) -> Result<SheetGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .context("failed to read csv header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(SheetGrid { headers, rows })
}
