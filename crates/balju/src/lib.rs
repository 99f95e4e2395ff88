//! # balju
//!
//! Order-entry desk for a sales team working from a master order workbook.
//!
//! The clerk enters an order header and a product code; the code is looked up
//! in the master catalog, expanded into its main product and gift lines, and
//! appended to an order list. The list is exported either as a fresh xlsx
//! order form or into the history sheet of an existing `.xlsb` workbook.
//!
//! ## Features
//!
//! - Master catalog loading (product and address sheets)
//! - Product lookup with up to five gift codes per product
//! - Clipboard paste parsing, single line or batch
//! - xlsx export of the order form
//! - `.xlsb` append via Excel COM automation (`excel-com` feature)
//!
//! ## Example
//!
//! ```rust
//! use balju::prelude::*;
//!
//! let products = ProductTable::from_rows(vec![
//!     ProductRow::new("B2504240301", "DUALFIXPRO-TEAK").with_gift(1, "G001"),
//!     ProductRow::new("G001", "Gift Set"),
//! ]);
//! let mut desk = Desk::new(Catalog {
//!     products,
//!     addresses: AddressTable::empty(),
//! });
//!
//! desk.set_field(FormField::Partner, "Acme");
//! desk.set_field(FormField::Barcode, "B2504240301");
//! let outcome = desk.add(&mut |_: &str| false).unwrap();
//!
//! assert_eq!(outcome.items(), 2);
//! assert!(desk.form().barcode.is_empty());
//! // desk.export("orders.xlsx", AppendMode::Append).unwrap();
//! ```

pub mod desk;
pub mod export;
pub mod master;
pub mod prelude;

pub use desk::{Desk, PasteOutcome};
pub use export::{export, ExportReport};
pub use master::{discover_master, DEFAULT_MASTER_FILE, MASTER_ENV};

// Re-export core types
pub use balju_core::{
    AddError, AddOutcome, AddressTable, AppendMode, AppendRequest, AppendSummary, BatchReport,
    Catalog, ConfirmUnknownCode, ExportError, ExportTarget, FormField, ItemKind, OnUnknownCode,
    OrderBook, OrderForm, OrderHeader, OrderLineItem, PasteBlock, PastedRow, ProductRow,
    ProductTable, SchemaError, Table, WorkbookAppender, GIFT_SLOTS, ORDER_FORM_SHEET,
    ORDER_HISTORY_SHEET,
};
pub use balju_core::{is_binary_workbook, normalize_quantity, parse_line, split_block};

// Re-export I/O types
pub use balju_xlsx::{
    inspect, CatalogLayout, CatalogLoadError, CatalogLoader, SheetData, SheetPreview, XlsxError,
    XlsxWriter,
};

#[cfg(feature = "excel-com")]
pub use balju_excel_com::{BridgeError, ExcelComAppender, ExcelComConfig};
