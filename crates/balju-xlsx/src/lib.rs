//! # balju-xlsx
//!
//! Spreadsheet I/O for balju:
//! - [`CatalogLoader`] reads the product and address sheets of the master
//!   workbook (xlsx, xlsb, xls or ods)
//! - [`XlsxWriter`] writes the order form as a new xlsx file
//! - [`inspect`] previews the sheets of any workbook

pub mod catalog;
pub mod error;
pub mod inspect;
pub mod writer;

pub use catalog::{CatalogLayout, CatalogLoader};
pub use error::{CatalogLoadError, XlsxError, XlsxResult};
pub use inspect::{inspect, SheetPreview};
pub use writer::{SheetData, XlsxWriter};
