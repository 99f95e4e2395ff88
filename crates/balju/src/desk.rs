//! The order desk: one clerk session
//!
//! A [`Desk`] owns the loaded catalog, the entry form, the order list and the
//! optional workbook automation used for `.xlsb` export.

use std::path::{Path, PathBuf};

use balju_core::{
    split_block, AddError, AddOutcome, AppendMode, BatchReport, Catalog, ConfirmUnknownCode,
    ExportError, ExportTarget, FormField, OnUnknownCode, OrderBook, OrderForm, OrderLineItem,
    PasteBlock, PastedRow, WorkbookAppender,
};
use balju_xlsx::{CatalogLayout, CatalogLoader};
use tracing::{error, info};

use crate::export::{export, ExportReport};

/// Result of pasting a block of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The block was blank
    Empty,
    /// One line: the form was filled and the code looked up. `preview` is
    /// empty when the code is unknown.
    Filled { preview: Vec<OrderLineItem> },
    /// Several lines were added directly
    Batch(BatchReport),
}

/// Clerk session state
pub struct Desk {
    catalog: Catalog,
    master_path: Option<PathBuf>,
    load_error: Option<String>,
    form: OrderForm,
    book: OrderBook,
    appender: Option<Box<dyn WorkbookAppender>>,
}

impl Desk {
    /// Create a desk over an already loaded catalog
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            master_path: None,
            load_error: None,
            form: OrderForm::default(),
            book: OrderBook::new(),
            appender: None,
        }
    }

    /// Load the master workbook and create a desk.
    ///
    /// A load failure is logged and kept in [`Desk::load_error`]; the desk
    /// then works against an empty catalog in which every lookup misses.
    pub fn open(master: &Path, layout: &CatalogLayout) -> Self {
        let (catalog, load_error) = match CatalogLoader::load_with(master, layout) {
            Ok(catalog) => (catalog, None),
            Err(e) => {
                error!(path = %master.display(), error = %e, "failed to load master data");
                (Catalog::empty(), Some(e.to_string()))
            }
        };

        Self {
            master_path: Some(master.to_path_buf()),
            load_error,
            ..Self::new(catalog)
        }
    }

    /// Use `appender` for `.xlsb` export
    pub fn with_appender(mut self, appender: Box<dyn WorkbookAppender>) -> Self {
        self.appender = Some(appender);
        self
    }

    /// Set or replace the `.xlsb` appender
    pub fn set_appender(&mut self, appender: Option<Box<dyn WorkbookAppender>>) {
        self.appender = appender;
    }

    /// Check if `.xlsb` export is available
    pub fn has_appender(&self) -> bool {
        self.appender.is_some()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Master workbook the catalog was loaded from
    pub fn master_path(&self) -> Option<&Path> {
        self.master_path.as_deref()
    }

    /// Why the master workbook failed to load, if it did
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    /// Set one form field
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Items the form's product code currently resolves to
    pub fn preview(&self) -> Vec<OrderLineItem> {
        self.catalog.products.lookup(&self.form.barcode)
    }

    /// Address recorded for a store on the address sheet
    pub fn address_of(&self, store: &str) -> Option<&str> {
        self.catalog.addresses.address_of(store)
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Add the form's code with the form's header.
    ///
    /// Unknown codes are confirmed through `confirm`. After a successful add
    /// the per-line fields (code, quantity, memo) are cleared.
    pub fn add(&mut self, confirm: &mut dyn ConfirmUnknownCode) -> Result<AddOutcome, AddError> {
        let outcome = self.book.add(
            &self.form.header,
            &self.form.barcode,
            &self.catalog.products,
            OnUnknownCode::Prompt(confirm),
        )?;

        if let AddOutcome::Added { items, matched } = outcome {
            info!(
                code = %self.form.barcode,
                items,
                matched,
                total = self.book.len(),
                "order line added"
            );
            self.form.clear_line_fields();
        }
        Ok(outcome)
    }

    /// Handle pasted text.
    ///
    /// One line fills the form for review; several lines are added without
    /// prompting.
    pub fn paste(&mut self, text: &str) -> PasteOutcome {
        match split_block(text) {
            PasteBlock::Empty => PasteOutcome::Empty,
            PasteBlock::Single(row) => {
                self.form = OrderForm {
                    header: row.header,
                    barcode: row.barcode,
                };
                PasteOutcome::Filled {
                    preview: self.preview(),
                }
            }
            PasteBlock::Batch(rows) => {
                PasteOutcome::Batch(self.book.add_pasted(&rows, &self.catalog.products))
            }
        }
    }

    /// Add every non-blank line of `text` without prompting, even when there
    /// is only one. Used for file imports.
    pub fn import(&mut self, text: &str) -> BatchReport {
        let rows: Vec<PastedRow> = match split_block(text) {
            PasteBlock::Empty => Vec::new(),
            PasteBlock::Single(row) => vec![row],
            PasteBlock::Batch(rows) => rows,
        };
        self.book.add_pasted(&rows, &self.catalog.products)
    }

    /// Remove items by their positions in the list
    pub fn remove(&mut self, indices: &[usize]) -> Vec<OrderLineItem> {
        self.book.remove_many(indices)
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.book.clear();
    }

    /// Export the order list to `destination`.
    ///
    /// `.xlsb` destinations go through the appender with `mode`; anything
    /// else becomes a new xlsx file. The list is left as it is either way.
    pub fn export(
        &mut self,
        destination: impl Into<PathBuf>,
        mode: AppendMode,
    ) -> Result<ExportReport, ExportError> {
        let target = ExportTarget::for_path(destination, mode);
        let appender = self
            .appender
            .as_mut()
            .map(|a| a.as_mut() as &mut dyn WorkbookAppender);
        let result = export(self.book.items(), &target, appender);

        match &result {
            Ok(report) => info!(
                path = %report.path().display(),
                rows = report.rows(),
                "export finished"
            ),
            Err(e) => error!(path = %target.path().display(), error = %e, "export failed"),
        }
        result
    }
}

impl std::fmt::Debug for Desk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("products", &self.catalog.products.len())
            .field("addresses", &self.catalog.addresses.len())
            .field("items", &self.book.len())
            .field("has_appender", &self.appender.is_some())
            .finish()
    }
}
