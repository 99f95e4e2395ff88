//! Workbook handle for a workbook opened through the bridge.

use crate::bridge::{BridgeError, ExcelBridge};

/// A handle to an open workbook in the Excel COM bridge.
///
/// Operations on this workbook are forwarded to the bridge process. Rows are
/// 1-based.
pub struct Workbook<'a> {
    bridge: &'a ExcelBridge,
    handle: u64,
}

impl<'a> Workbook<'a> {
    pub(crate) fn new(bridge: &'a ExcelBridge, handle: u64) -> Self {
        Self { bridge, handle }
    }

    /// Get the internal handle ID.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Make sure `sheet` exists. Returns `true` when the sheet was added, in
    /// which case `header` was written to row 1.
    pub fn ensure_sheet(&self, sheet: &str, header: &[String]) -> Result<bool, BridgeError> {
        self.bridge.ensure_sheet(self.handle, sheet, header)
    }

    /// Last used row of a sheet, 0 when it is empty.
    pub fn last_used_row(&self, sheet: &str) -> Result<u32, BridgeError> {
        self.bridge.last_used_row(self.handle, sheet)
    }

    /// Clear every row from `from_row` down.
    pub fn clear_rows(&self, sheet: &str, from_row: u32) -> Result<(), BridgeError> {
        self.bridge.clear_rows(self.handle, sheet, from_row)
    }

    /// Write rows as text starting at column A of `start_row`. Returns the
    /// number of rows written.
    pub fn write_rows(
        &self,
        sheet: &str,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<usize, BridgeError> {
        self.bridge.write_rows(self.handle, sheet, start_row, rows)
    }

    /// Save the workbook in place.
    pub fn save(&self) -> Result<(), BridgeError> {
        self.bridge.save_workbook(self.handle)
    }

    /// Close the workbook without saving.
    pub fn close(self) -> Result<(), BridgeError> {
        self.bridge.close_workbook(self.handle)
    }
}
