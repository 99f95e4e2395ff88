//! Prelude module - common imports for balju users
//!
//! ```rust
//! use balju::prelude::*;
//! ```

pub use crate::{
    AddOutcome,
    AddressTable,
    AppendMode,
    BatchReport,
    Catalog,
    CatalogLayout,
    CatalogLoader,
    ConfirmUnknownCode,
    // Main types
    Desk,
    // Error types
    ExportError,
    ExportReport,

    FormField,
    ItemKind,
    OrderBook,
    OrderHeader,
    OrderLineItem,
    PasteOutcome,
    ProductRow,
    ProductTable,
    WorkbookAppender,
};
