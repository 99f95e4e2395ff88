//! # balju-core
//!
//! Core data structures and logic for the balju order-entry tool.
//!
//! This crate provides:
//! - [`Table`] - A header row plus data rows read from a master workbook sheet
//! - [`ProductTable`] / [`AddressTable`] - Typed views of the master catalog
//! - [`ProductTable::lookup`] - Resolves a product code into main and gift items
//! - [`parse_line`] / [`split_block`] - Clipboard paste parsing
//! - [`OrderBook`] - The ordered list of order line items
//! - [`WorkbookAppender`] - Capability for writing into an existing workbook
//!
//! ## Example
//!
//! ```rust
//! use balju_core::{OnUnknownCode, OrderBook, OrderHeader, ProductRow, ProductTable};
//!
//! let products = ProductTable::from_rows(vec![
//!     ProductRow::new("B2504240301", "DUALFIXPRO-TEAK").with_gift(1, "G001"),
//!     ProductRow::new("G001", "Gift Set"),
//! ]);
//!
//! let mut book = OrderBook::new();
//! let header = OrderHeader { partner: "Acme".into(), ..Default::default() };
//! book.add(&header, "B2504240301", &products, OnUnknownCode::AutoManual).unwrap();
//!
//! assert_eq!(book.len(), 2);
//! assert_eq!(book.items()[1].product_name, "Gift Set");
//! ```

pub mod book;
pub mod catalog;
pub mod error;
pub mod export;
pub mod item;
pub mod lookup;
pub mod paste;
pub mod table;

pub use book::{AddOutcome, BatchReport, ConfirmUnknownCode, OnUnknownCode, OrderBook};
pub use catalog::{AddressTable, Catalog, ProductRow, ProductTable};
pub use error::{AddError, ExportError, SchemaError};
pub use export::{
    column_widths, is_binary_workbook, order_form_header, order_form_rows, AppendMode,
    AppendRequest, AppendSummary, ExportTarget, OrderColumn, WorkbookAppender,
};
pub use item::{FormField, ItemKind, OrderForm, OrderHeader, OrderLineItem};
pub use paste::{normalize_quantity, parse_line, split_block, PasteBlock, PastedRow};
pub use table::Table;

/// Number of gift-code slots on a product row
pub const GIFT_SLOTS: usize = 5;

/// Name of the sheet written by the standard export
pub const ORDER_FORM_SHEET: &str = "발주서";

/// Name of the sheet written by binary-append export
pub const ORDER_HISTORY_SHEET: &str = "발주내역";
