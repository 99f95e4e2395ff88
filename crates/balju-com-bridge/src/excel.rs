//! Excel operations used by binary-append export.

#![cfg(windows)]

use std::collections::HashMap;

use crate::dispatch::{
    variant_bool, variant_get_f64, variant_i32, variant_missing, variant_object, variant_str,
    DispatchObject,
};

/// Manages an Excel.Application COM instance and its open workbooks.
pub struct ExcelApp {
    app: DispatchObject,
    workbooks_collection: DispatchObject,
    /// Map from our handle IDs to workbook dispatch objects.
    workbooks: HashMap<u64, DispatchObject>,
    next_handle: u64,
}

impl ExcelApp {
    /// Start a hidden Excel.Application with alerts disabled.
    pub fn new() -> Result<Self, String> {
        let app = DispatchObject::create_from_progid("Excel.Application")?;

        app.put("Visible", variant_bool(false))?;
        app.put("DisplayAlerts", variant_bool(false))?;
        app.put("ScreenUpdating", variant_bool(false))?;

        let workbooks_collection = app.child("Workbooks")?;

        Ok(Self {
            app,
            workbooks_collection,
            workbooks: HashMap::new(),
            next_handle: 1,
        })
    }

    /// Open a workbook from a file path. Returns the handle ID.
    pub fn open_workbook(&mut self, path: &str) -> Result<u64, String> {
        let wb = self
            .workbooks_collection
            .invoke_object("Open", &[variant_str(path)])?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.workbooks.insert(handle, wb);
        Ok(handle)
    }

    fn workbook(&self, handle: u64) -> Result<&DispatchObject, String> {
        self.workbooks
            .get(&handle)
            .ok_or_else(|| format!("Unknown workbook handle: {handle}"))
    }

    fn sheet(&self, handle: u64, name: &str) -> Result<DispatchObject, String> {
        self.workbook(handle)?
            .child("Worksheets")?
            .item("Item", variant_str(name))
            .map_err(|e| format!("Sheet '{name}' not found: {e}"))
    }

    /// Add `name` after the last sheet unless it exists. A new sheet gets
    /// `header` in row 1. Returns whether the sheet was added.
    pub fn ensure_sheet(
        &self,
        handle: u64,
        name: &str,
        header: &[String],
    ) -> Result<bool, String> {
        if self.sheet(handle, name).is_ok() {
            return Ok(false);
        }

        let sheets = self.workbook(handle)?.child("Worksheets")?;
        let count = sheets.get_number("Count")?;
        let last = sheets.item("Item", variant_i32(count as i32))?;
        let sheet = sheets.invoke_object("Add", &[variant_missing(), variant_object(&last)])?;
        sheet.put("Name", variant_str(name))?;

        if !header.is_empty() {
            write_block(&sheet, 1, &[header.to_vec()])?;
        }
        Ok(true)
    }

    /// Last used row of a sheet, 0 when the sheet has no values.
    pub fn last_used_row(&self, handle: u64, name: &str) -> Result<u32, String> {
        let sheet = self.sheet(handle, name)?;
        last_row(&self.app, &sheet)
    }

    /// Clear contents from `from_row` to the last used row.
    pub fn clear_rows(&self, handle: u64, name: &str, from_row: u32) -> Result<(), String> {
        let sheet = self.sheet(handle, name)?;
        let last = last_row(&self.app, &sheet)?;
        if last >= from_row {
            let rows = sheet.item("Range", variant_str(&format!("{from_row}:{last}")))?;
            rows.invoke("ClearContents", &[])?;
        }
        Ok(())
    }

    /// Write rows as text starting at column A of `start_row`.
    pub fn write_rows(
        &self,
        handle: u64,
        name: &str,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<usize, String> {
        let sheet = self.sheet(handle, name)?;
        write_block(&sheet, start_row, rows)?;
        Ok(rows.len())
    }

    /// Save a workbook in place.
    pub fn save_workbook(&self, handle: u64) -> Result<(), String> {
        self.workbook(handle)?.invoke("Save", &[])?;
        Ok(())
    }

    /// Close a workbook without saving.
    pub fn close_workbook(&mut self, handle: u64) -> Result<(), String> {
        let wb = self
            .workbooks
            .remove(&handle)
            .ok_or_else(|| format!("Unknown workbook handle: {handle}"))?;
        wb.invoke("Close", &[variant_bool(false)])?;
        Ok(())
    }

    /// Close all workbooks and quit Excel.
    pub fn shutdown(mut self) -> Result<(), String> {
        let handles: Vec<u64> = self.workbooks.keys().copied().collect();
        for h in handles {
            let _ = self.close_workbook(h);
        }
        self.app.invoke("Quit", &[])?;
        Ok(())
    }
}

fn last_row(app: &DispatchObject, sheet: &DispatchObject) -> Result<u32, String> {
    let used = sheet.child("UsedRange")?;
    let first = used.get_number("Row")?;
    let count = used.child("Rows")?.get_number("Count")?;
    let last = first + count - 1;

    // An empty sheet still reports A1 as its used range
    if last <= 1 {
        let filled = app
            .child("WorksheetFunction")?
            .invoke("CountA", &[variant_object(&used)])?;
        if variant_get_f64(&filled).unwrap_or(0.0) == 0.0 {
            return Ok(0);
        }
    }
    Ok(last.max(0) as u32)
}

/// Mark the block as text, then set each non-empty cell.
fn write_block(
    sheet: &DispatchObject,
    start_row: u32,
    rows: &[Vec<String>],
) -> Result<(), String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.is_empty() || width == 0 {
        return Ok(());
    }

    let end_row = start_row as usize + rows.len() - 1;
    let block = format!("A{start_row}:{}{end_row}", column_letters(width - 1));
    sheet
        .item("Range", variant_str(&block))?
        .put("NumberFormat", variant_str("@"))?;

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let address = format!("{}{}", column_letters(c), start_row as usize + r);
            sheet
                .item("Range", variant_str(&address))?
                .put("Value", variant_str(value))?;
        }
    }
    Ok(())
}

fn column_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}
