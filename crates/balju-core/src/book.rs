//! The order list

use tracing::{debug, info, warn};

use crate::catalog::ProductTable;
use crate::error::AddError;
use crate::item::{ItemKind, OrderHeader, OrderLineItem};
use crate::paste::PastedRow;

/// Asks the clerk whether a code missing from the catalog should be accepted.
pub trait ConfirmUnknownCode {
    /// Return `true` to add the code as a manual line
    fn confirm_unknown_code(&mut self, code: &str) -> bool;
}

impl<F> ConfirmUnknownCode for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm_unknown_code(&mut self, code: &str) -> bool {
        self(code)
    }
}

/// What to do when a code is not in the catalog
pub enum OnUnknownCode<'a> {
    /// Ask; a refusal cancels the add
    Prompt(&'a mut dyn ConfirmUnknownCode),
    /// Accept the code as a manual line without asking (batch paste)
    AutoManual,
}

/// Result of a successful add request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Items were appended to the list
    Added {
        /// Number of items appended
        items: usize,
        /// Whether the code was found in the catalog
        matched: bool,
    },
    /// The clerk declined an unknown code; the list is unchanged
    Declined,
}

impl AddOutcome {
    /// Number of items appended (0 when declined)
    pub fn items(&self) -> usize {
        match self {
            AddOutcome::Added { items, .. } => *items,
            AddOutcome::Declined => 0,
        }
    }
}

/// Aggregate result of a batch paste
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows that produced at least one item
    pub succeeded: usize,
    /// Rows that were rejected
    pub failed: usize,
    /// Total items appended
    pub items_added: usize,
    /// Rows added without a catalog match
    pub manual: usize,
    /// (row number, 1-based; reason) for each rejected row
    pub failures: Vec<(usize, String)>,
}

/// Ordered list of order line items.
///
/// Listings are rendered from this list, so a position shown to the clerk is
/// always the position removed by [`OrderBook::remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    items: Vec<OrderLineItem>,
}

impl OrderBook {
    /// Create an empty order list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order
    pub fn items(&self) -> &[OrderLineItem] {
        &self.items
    }

    /// Iterate over items
    pub fn iter(&self) -> std::slice::Iter<'_, OrderLineItem> {
        self.items.iter()
    }

    /// Resolve `code` and append one item per resolved product, each sharing
    /// `header`.
    ///
    /// An unknown code is either confirmed through the prompt or, in
    /// [`OnUnknownCode::AutoManual`] mode, appended as a single
    /// [`ItemKind::Manual`] line with an empty name.
    pub fn add(
        &mut self,
        header: &OrderHeader,
        code: &str,
        products: &ProductTable,
        on_unknown: OnUnknownCode<'_>,
    ) -> Result<AddOutcome, AddError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AddError::MissingCode);
        }

        let resolved = products.lookup(code);
        let matched = !resolved.is_empty();
        let items = if matched {
            resolved
        } else {
            let accept = match on_unknown {
                OnUnknownCode::Prompt(confirm) => confirm.confirm_unknown_code(code),
                OnUnknownCode::AutoManual => true,
            };
            if !accept {
                debug!(code, "unknown code declined");
                return Ok(AddOutcome::Declined);
            }
            warn!(code, "adding code not found in catalog as manual line");
            vec![OrderLineItem::new(ItemKind::Manual, "", code)]
        };

        let count = items.len();
        self.items.extend(
            items
                .into_iter()
                .map(|item| item.with_header(header.clone())),
        );
        debug!(code, count, total = self.items.len(), "order items added");

        Ok(AddOutcome::Added {
            items: count,
            matched,
        })
    }

    /// Add every pasted row without prompting. Unknown codes become manual
    /// lines; rows without a code are counted as failures.
    pub fn add_pasted(&mut self, rows: &[PastedRow], products: &ProductTable) -> BatchReport {
        let mut report = BatchReport::default();

        for (idx, row) in rows.iter().enumerate() {
            match self.add(&row.header, &row.barcode, products, OnUnknownCode::AutoManual) {
                Ok(AddOutcome::Added { items, matched }) => {
                    report.succeeded += 1;
                    report.items_added += items;
                    if !matched {
                        report.manual += 1;
                    }
                }
                Ok(AddOutcome::Declined) => {
                    report.failed += 1;
                    report.failures.push((idx + 1, "declined".to_string()));
                }
                Err(e) => {
                    report.failed += 1;
                    report.failures.push((idx + 1, e.to_string()));
                }
            }
        }

        info!(
            rows = rows.len(),
            succeeded = report.succeeded,
            failed = report.failed,
            items = report.items_added,
            "batch paste processed"
        );
        report
    }

    /// Remove the item at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<OrderLineItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove several items by their current positions.
    ///
    /// Positions are removed highest first so that every index refers to the
    /// list as it was before the call. Duplicates and out-of-range indices
    /// are ignored. Returns the removed items in list order.
    pub fn remove_many(&mut self, indices: &[usize]) -> Vec<OrderLineItem> {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.items.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed: Vec<OrderLineItem> = sorted
            .iter()
            .rev()
            .map(|&i| self.items.remove(i))
            .collect();
        removed.reverse();
        removed
    }

    /// Remove all items
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a OrderBook {
    type Item = &'a OrderLineItem;
    type IntoIter = std::slice::Iter<'a, OrderLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
