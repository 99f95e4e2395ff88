//! Export row layout and the workbook-append capability
//!
//! Both export paths write the same 13 columns. The standard path creates a
//! new xlsx file; the binary-append path writes into an existing `.xlsb`
//! workbook through a [`WorkbookAppender`].

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::item::{ItemKind, OrderLineItem};

/// Column width cap, in character units
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Number of leading rows sampled when sizing columns
pub const WIDTH_SAMPLE_ROWS: usize = 10;

/// Columns of the order form, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderColumn {
    Partner,
    Orderer,
    Recipient,
    Phone,
    Mobile,
    Address,
    Barcode,
    ProductName,
    GiftName,
    Quantity,
    Fee,
    ShippingFee,
    Memo,
}

impl OrderColumn {
    /// All columns in output order
    pub const ALL: [OrderColumn; 13] = [
        OrderColumn::Partner,
        OrderColumn::Orderer,
        OrderColumn::Recipient,
        OrderColumn::Phone,
        OrderColumn::Mobile,
        OrderColumn::Address,
        OrderColumn::Barcode,
        OrderColumn::ProductName,
        OrderColumn::GiftName,
        OrderColumn::Quantity,
        OrderColumn::Fee,
        OrderColumn::ShippingFee,
        OrderColumn::Memo,
    ];

    /// Header text written to row 1
    pub fn header(&self) -> &'static str {
        match self {
            OrderColumn::Partner => "거래처명",
            OrderColumn::Orderer => "주문인",
            OrderColumn::Recipient => "수취인",
            OrderColumn::Phone => "전화번호",
            OrderColumn::Mobile => "핸드폰",
            OrderColumn::Address => "주소",
            OrderColumn::Barcode => "바코드",
            OrderColumn::ProductName => "제품명",
            OrderColumn::GiftName => "사은품",
            OrderColumn::Quantity => "수량",
            OrderColumn::Fee => "수수료",
            OrderColumn::ShippingFee => "배송비",
            OrderColumn::Memo => "배송메모",
        }
    }

    /// Cell value of this column for an item.
    ///
    /// Main and manual items put their name under 제품명, gift items under
    /// 사은품.
    pub fn value<'a>(&self, item: &'a OrderLineItem) -> &'a str {
        let h = &item.header;
        match self {
            OrderColumn::Partner => &h.partner,
            OrderColumn::Orderer => &h.orderer,
            OrderColumn::Recipient => &h.recipient,
            OrderColumn::Phone => &h.phone,
            OrderColumn::Mobile => &h.mobile,
            OrderColumn::Address => &h.address,
            OrderColumn::Barcode => &item.product_code,
            OrderColumn::ProductName => match item.kind {
                ItemKind::Main | ItemKind::Manual => &item.product_name,
                ItemKind::Gift => "",
            },
            OrderColumn::GiftName => match item.kind {
                ItemKind::Gift => &item.product_name,
                ItemKind::Main | ItemKind::Manual => "",
            },
            OrderColumn::Quantity => &h.quantity,
            OrderColumn::Fee => &h.fee,
            OrderColumn::ShippingFee => &h.shipping_fee,
            OrderColumn::Memo => &h.memo,
        }
    }
}

/// Header row of the order form
pub fn order_form_header() -> [&'static str; 13] {
    OrderColumn::ALL.map(|c| c.header())
}

/// Data rows of the order form, one per item
pub fn order_form_rows(items: &[OrderLineItem]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            OrderColumn::ALL
                .iter()
                .map(|col| col.value(item).to_string())
                .collect()
        })
        .collect()
}

/// Column widths in character units.
///
/// Each width is the longest of the header and the non-empty values among
/// the first [`WIDTH_SAMPLE_ROWS`] rows, plus 2, capped at
/// [`MAX_COLUMN_WIDTH`].
pub fn column_widths<S: AsRef<str>>(header: &[&str], rows: &[Vec<S>]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .map(|(col, title)| {
            let sampled = rows
                .iter()
                .take(WIDTH_SAMPLE_ROWS)
                .filter_map(|row| row.get(col))
                .map(AsRef::<str>::as_ref)
                .filter(|v| !v.is_empty())
                .map(|v| v.chars().count() + 2);
            let widest = sampled.fold(title.chars().count() + 2, usize::max);
            widest.min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Check if a path names a binary (`.xlsb`) workbook
pub fn is_binary_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsb"))
}

/// How binary-append mode treats rows already in the order history sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppendMode {
    /// Write after the last used row
    #[default]
    Append,
    /// Clear from row 2 down, then write from row 2
    Overwrite,
}

/// Where an export goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A new xlsx file (created or replaced)
    NewWorkbook(PathBuf),
    /// An existing binary workbook, modified through a [`WorkbookAppender`]
    ExistingBinary { path: PathBuf, mode: AppendMode },
}

impl ExportTarget {
    /// Pick the target from the destination's extension
    pub fn for_path(path: impl Into<PathBuf>, mode: AppendMode) -> Self {
        let path = path.into();
        if is_binary_workbook(&path) {
            ExportTarget::ExistingBinary { path, mode }
        } else {
            ExportTarget::NewWorkbook(path)
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        match self {
            ExportTarget::NewWorkbook(path) => path,
            ExportTarget::ExistingBinary { path, .. } => path,
        }
    }
}

/// A request to write rows into an existing workbook
#[derive(Debug, Clone, Copy)]
pub struct AppendRequest<'a> {
    /// Existing workbook
    pub path: &'a Path,
    /// Sheet to write; created when missing
    pub sheet: &'a str,
    /// Header written to row 1 of a newly created sheet
    pub header: &'a [&'a str],
    /// Data rows
    pub rows: &'a [Vec<String>],
    pub mode: AppendMode,
}

/// What an appender did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSummary {
    /// 1-based row of the first data row written
    pub first_row: u32,
    /// Number of data rows written
    pub rows_written: usize,
    /// Whether the sheet had to be created
    pub sheet_created: bool,
}

/// Writes rows into an existing workbook through an external host.
///
/// Implementations must release the host (close the workbook, quit the
/// application) on every return path, including errors.
pub trait WorkbookAppender {
    /// Write `request.rows` into `request.sheet` of `request.path`
    fn append_rows(&mut self, request: &AppendRequest<'_>) -> Result<AppendSummary, ExportError>;
}
