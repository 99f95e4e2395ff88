//! [`WorkbookAppender`] backed by Excel over COM

use balju_core::{AppendMode, AppendRequest, AppendSummary, ExportError, WorkbookAppender};
use tracing::{info, warn};

use crate::bridge::{BridgeError, ExcelBridge, ExcelComConfig};
use crate::workbook::Workbook;

/// First data row; row 1 holds the header
const FIRST_DATA_ROW: u32 = 2;

/// Writes order rows into an existing workbook by driving Excel.
///
/// Each call starts a fresh bridge, opens the workbook, writes, saves, closes
/// the workbook and quits Excel. The workbook is closed and Excel quit on
/// every path, including failures.
#[derive(Debug, Clone, Default)]
pub struct ExcelComAppender {
    config: ExcelComConfig,
}

impl ExcelComAppender {
    /// Create an appender with the given bridge configuration
    pub fn new(config: ExcelComConfig) -> Self {
        Self { config }
    }
}

impl WorkbookAppender for ExcelComAppender {
    fn append_rows(&mut self, request: &AppendRequest<'_>) -> Result<AppendSummary, ExportError> {
        if !request.path.exists() {
            return Err(ExportError::TargetMissing(request.path.to_path_buf()));
        }

        let bridge = ExcelBridge::start(&self.config)?;
        let host_path = self.config.host_path(request.path);

        let result = append_with(&bridge, &host_path, request);
        let shutdown = bridge.shutdown();

        let summary = result?;
        if let Err(e) = shutdown {
            warn!(error = %e, "Excel did not shut down cleanly after export");
        }

        info!(
            path = %request.path.display(),
            sheet = request.sheet,
            first_row = summary.first_row,
            rows = summary.rows_written,
            "rows written to workbook"
        );
        Ok(summary)
    }
}

/// Open `host_path`, write the request and save. The workbook is closed
/// whether or not writing succeeds.
pub(crate) fn append_with(
    bridge: &ExcelBridge,
    host_path: &str,
    request: &AppendRequest<'_>,
) -> Result<AppendSummary, BridgeError> {
    let workbook = bridge.open_workbook(host_path)?;

    let result = fill(&workbook, request).and_then(|summary| {
        workbook.save()?;
        Ok(summary)
    });
    let closed = workbook.close();

    let summary = result?;
    closed?;
    Ok(summary)
}

fn fill(
    workbook: &Workbook<'_>,
    request: &AppendRequest<'_>,
) -> Result<AppendSummary, BridgeError> {
    let header: Vec<String> = request.header.iter().map(|h| h.to_string()).collect();
    let sheet_created = workbook.ensure_sheet(request.sheet, &header)?;

    let first_row = match request.mode {
        AppendMode::Overwrite => {
            workbook.clear_rows(request.sheet, FIRST_DATA_ROW)?;
            FIRST_DATA_ROW
        }
        AppendMode::Append => workbook.last_used_row(request.sheet)?.max(1) + 1,
    };

    let rows_written = workbook.write_rows(request.sheet, first_row, request.rows)?;

    Ok(AppendSummary {
        first_row,
        rows_written,
        sheet_created,
    })
}
