//! Master catalog loader

use std::io::{Read, Seek};
use std::path::Path;

use balju_core::{AddressTable, Catalog, ProductTable, SchemaError, Table};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use tracing::{debug, info};

use crate::error::CatalogLoadError;

/// Where the catalog tables sit inside the master workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    /// Sheet holding product codes, names and gift slots
    pub product_sheet: String,
    /// 0-based absolute row of the product header
    pub product_header_row: u32,
    /// Sheet holding store addresses
    pub address_sheet: String,
    /// 0-based absolute row of the address header
    pub address_header_row: u32,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            product_sheet: "코드".to_string(),
            product_header_row: 4,
            address_sheet: "25.12 주소".to_string(),
            address_header_row: 1,
        }
    }
}

/// Master workbook reader
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the catalog using the default layout
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogLoadError> {
        Self::load_with(path, &CatalogLayout::default())
    }

    /// Load the catalog with an explicit layout
    pub fn load_with<P: AsRef<Path>>(
        path: P,
        layout: &CatalogLayout,
    ) -> Result<Catalog, CatalogLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogLoadError::NotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "loading master data");
        let mut workbook = open_workbook_auto(path).map_err(|source| CatalogLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let product_sheet =
            read_table(&mut workbook, &layout.product_sheet, layout.product_header_row)?;
        let products = ProductTable::from_table(&product_sheet).map_err(|e| match e {
            SchemaError::MissingColumn(column) => CatalogLoadError::MissingColumn {
                sheet: layout.product_sheet.clone(),
                column,
            },
        })?;

        let address_sheet =
            read_table(&mut workbook, &layout.address_sheet, layout.address_header_row)?;
        let addresses = AddressTable::from_table(address_sheet);

        info!(
            products = products.len(),
            addresses = addresses.len(),
            "master data loaded"
        );
        Ok(Catalog {
            products,
            addresses,
        })
    }
}

fn read_table<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: &str,
    header_row: u32,
) -> Result<Table, CatalogLoadError> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(CatalogLoadError::MissingSheet(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| CatalogLoadError::Sheet {
            sheet: sheet.to_string(),
            source,
        })?;

    let table = range_to_table(&range, header_row);
    debug!(
        sheet,
        columns = table.headers().len(),
        rows = table.row_count(),
        "sheet read"
    );
    Ok(table)
}

/// Convert a sheet range into a [`Table`] whose header is the absolute row
/// `header_row`.
///
/// Columns are counted from column A so that blank leading columns keep their
/// `Unnamed: N` position. Rows with no values are skipped.
pub fn range_to_table(range: &Range<Data>, header_row: u32) -> Table {
    let Some((end_row, end_col)) = range.end() else {
        return Table::default();
    };
    if header_row > end_row {
        return Table::default();
    }

    let cell = |row: u32, col: u32| range.get_value((row, col)).and_then(cell_text);

    let mut table = Table::new((0..=end_col).map(|col| cell(header_row, col)));
    for row in header_row + 1..=end_row {
        let cells: Vec<Option<String>> = (0..=end_col).map(|col| cell(row, col)).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        table.push_row(cells);
    }
    table
}

/// Text of a cell, or `None` for empty and error cells
pub fn cell_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integral values print without a fractional part so numeric codes match
/// their typed form.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
