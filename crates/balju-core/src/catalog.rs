//! Master catalog: products with their gift slots, and store addresses

use crate::error::SchemaError;
use crate::table::Table;
use crate::GIFT_SLOTS;

/// Header of the product code column
pub const CODE_COLUMN: &str = "품번";

/// Header of the product name column
pub const NAME_COLUMN: &str = "제품명";

/// Header of the store name column on the address sheet
pub const STORE_COLUMN: &str = "매장명";

/// Header of the address column on the address sheet
pub const ADDRESS_COLUMN: &str = "주소";

/// Header of gift slot `slot` (1-based)
pub fn gift_column(slot: usize) -> String {
    format!("사은품 {slot}")
}

/// One product from the master catalog
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductRow {
    /// Trimmed product code
    pub code: String,
    /// Display name
    pub name: String,
    /// Gift codes for slots 1..=5, trimmed. Blank cells and `nan` are `None`.
    pub gift_codes: [Option<String>; GIFT_SLOTS],
}

impl ProductRow {
    /// Create a product without gifts
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into().trim().to_string(),
            name: name.into(),
            gift_codes: Default::default(),
        }
    }

    /// Set gift slot `slot` (1-based). Out-of-range slots are ignored.
    pub fn with_gift(mut self, slot: usize, code: impl AsRef<str>) -> Self {
        if (1..=GIFT_SLOTS).contains(&slot) {
            self.gift_codes[slot - 1] = normalize_gift_code(Some(code.as_ref()));
        }
        self
    }

    /// Gift codes of the non-blank slots, in slot order
    pub fn gifts(&self) -> impl Iterator<Item = &str> {
        self.gift_codes.iter().filter_map(|g| g.as_deref())
    }
}

/// Normalize a gift slot cell: blank, missing and the text `nan` mean "no gift".
pub fn normalize_gift_code(cell: Option<&str>) -> Option<String> {
    let code = cell?.trim();
    if code.is_empty() || code == "nan" {
        None
    } else {
        Some(code.to_string())
    }
}

/// The product sheet, keyed by product code.
///
/// Rows whose code cell is empty are dropped when the table is built, so a
/// missing key can never match a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductTable {
    rows: Vec<ProductRow>,
}

impl ProductTable {
    /// Create an empty product table. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a product table from rows (rows with a blank code are dropped)
    pub fn from_rows(rows: impl IntoIterator<Item = ProductRow>) -> Self {
        Self {
            rows: rows.into_iter().filter(|r| !r.code.is_empty()).collect(),
        }
    }

    /// Build a product table from a loaded sheet.
    ///
    /// The code and name columns are required; missing gift columns yield
    /// empty slots.
    pub fn from_table(table: &Table) -> Result<Self, SchemaError> {
        if let Some(column) = [CODE_COLUMN, NAME_COLUMN]
            .into_iter()
            .find(|c| !table.has_column(c))
        {
            return Err(SchemaError::MissingColumn(column.to_string()));
        }
        let code_idx = table
            .column_index(CODE_COLUMN)
            .ok_or_else(|| SchemaError::MissingColumn(CODE_COLUMN.to_string()))?;
        let name_idx = table.column_index(NAME_COLUMN);
        let gift_idx: Vec<Option<usize>> = (1..=GIFT_SLOTS)
            .map(|slot| table.column_index(&gift_column(slot)))
            .collect();

        let mut rows = Vec::with_capacity(table.row_count());
        for cells in table.rows() {
            let code = match cells[code_idx].as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => code.to_string(),
                _ => continue,
            };
            let name = name_idx
                .and_then(|i| cells[i].clone())
                .unwrap_or_default();

            let mut gift_codes: [Option<String>; GIFT_SLOTS] = Default::default();
            for (slot, idx) in gift_idx.iter().enumerate() {
                gift_codes[slot] = idx.and_then(|i| normalize_gift_code(cells[i].as_deref()));
            }

            rows.push(ProductRow {
                code,
                name,
                gift_codes,
            });
        }

        Ok(Self { rows })
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no products
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over products in table order
    pub fn iter(&self) -> impl Iterator<Item = &ProductRow> {
        self.rows.iter()
    }
}

/// The address sheet.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressTable {
    table: Table,
}

impl AddressTable {
    /// Create an empty address table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a loaded sheet
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// The underlying sheet
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of address rows
    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    /// Check if there are no address rows
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Address recorded for a store (first match by table order)
    pub fn address_of(&self, store: &str) -> Option<&str> {
        let row = self.table.find_first(STORE_COLUMN, store)?;
        self.table.cell_by_name(row, ADDRESS_COLUMN)
    }
}

/// Both tables of the master workbook, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub products: ProductTable,
    pub addresses: AddressTable,
}

impl Catalog {
    /// An empty catalog, used when loading fails
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product_sheet() -> Table {
        let mut table = Table::with_headers([
            "품번", "제품명", "사은품 1", "사은품 2", "사은품 3", "사은품 4", "사은품 5",
        ]);
        table.push_row(vec![
            Some(" B1 ".into()),
            Some("Chair".into()),
            Some(" G1 ".into()),
            Some("nan".into()),
            None,
            Some("   ".into()),
            Some("G5".into()),
        ]);
        table.push_row(vec![None, Some("Orphan".into())]);
        table.push_row(vec![Some("G1".into()), Some("Cushion".into())]);
        table
    }

    #[test]
    fn test_from_table_normalizes_rows() {
        let products = ProductTable::from_table(&product_sheet()).unwrap();
        assert_eq!(products.len(), 2);

        let first = products.iter().next().unwrap();
        assert_eq!(first.code, "B1");
        assert_eq!(
            first.gift_codes,
            [Some("G1".to_string()), None, None, None, Some("G5".to_string())]
        );
        assert_eq!(first.gifts().collect::<Vec<_>>(), vec!["G1", "G5"]);
    }

    #[test]
    fn test_from_table_requires_code_column() {
        let table = Table::with_headers(["제품명"]);
        assert_eq!(
            ProductTable::from_table(&table),
            Err(SchemaError::MissingColumn("품번".into()))
        );
    }

    #[test]
    fn test_from_table_requires_name_column() {
        let mut table = Table::with_headers(["품번", "사은품 1"]);
        table.push_row(vec![Some("X".into()), Some("G1".into())]);
        assert_eq!(
            ProductTable::from_table(&table),
            Err(SchemaError::MissingColumn("제품명".into()))
        );
    }

    #[test]
    fn test_missing_gift_columns() {
        let mut table = Table::with_headers(["품번", "제품명"]);
        table.push_row(vec![Some("X".into()), None]);

        let products = ProductTable::from_table(&table).unwrap();
        let row = products.iter().next().unwrap();
        assert_eq!(row.name, "");
        assert!(row.gifts().next().is_none());
    }

    #[test]
    fn test_address_of() {
        let mut table = Table::new(vec![None, Some("매장명"), Some("주소")]);
        table.push_row(vec![None, Some("강남점".into()), Some("서울 강남구".into())]);
        table.push_row(vec![None, Some("강남점".into()), Some("duplicate".into())]);

        let addresses = AddressTable::from_table(table);
        assert_eq!(addresses.address_of(" 강남점"), Some("서울 강남구"));
        assert_eq!(addresses.address_of("부산점"), None);
    }

    #[test]
    fn test_with_gift_ignores_bad_slot() {
        let row = ProductRow::new("A", "a").with_gift(0, "X").with_gift(6, "Y");
        assert!(row.gifts().next().is_none());
    }
}
