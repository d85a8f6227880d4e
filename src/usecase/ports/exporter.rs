use std::io::Write;

use crate::domain::entities::report::ReportDocument;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render report: {0}")]
    Render(String),
}

/// Lays out a reconciled report. Failures leave the caller's state untouched,
/// so an export can simply be retried.
pub trait ReportExporter {
    fn export(&self, document: &ReportDocument, out: &mut dyn Write) -> Result<(), ExportError>;
}
