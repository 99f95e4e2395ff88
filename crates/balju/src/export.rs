//! Export dispatch: a new xlsx file or an existing binary workbook

use std::path::{Path, PathBuf};

use balju_core::{
    order_form_header, order_form_rows, AppendRequest, AppendSummary, ExportError, ExportTarget,
    OrderLineItem, WorkbookAppender, ORDER_HISTORY_SHEET,
};
use balju_xlsx::{SheetData, XlsxWriter};
use tracing::info;

/// What an export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportReport {
    /// A new xlsx file was written
    Written { path: PathBuf, rows: usize },
    /// Rows were written into an existing binary workbook
    Appended {
        path: PathBuf,
        summary: AppendSummary,
    },
}

impl ExportReport {
    /// Destination of the export
    pub fn path(&self) -> &Path {
        match self {
            ExportReport::Written { path, .. } => path,
            ExportReport::Appended { path, .. } => path,
        }
    }

    /// Number of item rows written
    pub fn rows(&self) -> usize {
        match self {
            ExportReport::Written { rows, .. } => *rows,
            ExportReport::Appended { summary, .. } => summary.rows_written,
        }
    }
}

/// Export `items` to `target`.
///
/// An empty list is rejected before anything is written. Binary targets need
/// an `appender`; without one the export fails with
/// [`ExportError::AutomationUnavailable`].
pub fn export(
    items: &[OrderLineItem],
    target: &ExportTarget,
    appender: Option<&mut dyn WorkbookAppender>,
) -> Result<ExportReport, ExportError> {
    if items.is_empty() {
        return Err(ExportError::EmptyOrderList);
    }

    match target {
        ExportTarget::NewWorkbook(path) => {
            XlsxWriter::write_file(&[SheetData::order_form(items)], path)?;
            info!(path = %path.display(), rows = items.len(), "order form written");
            Ok(ExportReport::Written {
                path: path.clone(),
                rows: items.len(),
            })
        }
        ExportTarget::ExistingBinary { path, mode } => {
            if !path.exists() {
                return Err(ExportError::TargetMissing(path.clone()));
            }
            let appender = appender.ok_or_else(|| {
                ExportError::AutomationUnavailable(
                    "no workbook automation is configured for .xlsb export".to_string(),
                )
            })?;

            let header = order_form_header();
            let rows = order_form_rows(items);
            let summary = appender.append_rows(&AppendRequest {
                path,
                sheet: ORDER_HISTORY_SHEET,
                header: &header,
                rows: &rows,
                mode: *mode,
            })?;

            Ok(ExportReport::Appended {
                path: path.clone(),
                summary,
            })
        }
    }
}
