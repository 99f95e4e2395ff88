//! Product code lookup

use tracing::debug;

use crate::catalog::{ProductRow, ProductTable};
use crate::item::{ItemKind, OrderLineItem};

impl ProductTable {
    /// Find the first product whose code equals the trimmed `code`
    pub fn find(&self, code: &str) -> Option<&ProductRow> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.iter().find(|row| row.code == code)
    }

    /// Display name of a product code
    pub fn resolve_name(&self, code: &str) -> Option<&str> {
        self.find(code).map(|row| row.name.as_str())
    }

    /// Resolve a product code into line items.
    ///
    /// Returns an empty vector when the code is unknown. Otherwise the first
    /// item is the [`ItemKind::Main`] product, followed by one
    /// [`ItemKind::Gift`] item per non-blank gift slot in slot order. A gift
    /// code that is not in the catalog still yields an item, with an empty
    /// name, so a product with N gift slots always produces 1 + N items.
    ///
    /// Returned items carry an empty header.
    pub fn lookup(&self, code: &str) -> Vec<OrderLineItem> {
        let code = code.trim();
        let Some(row) = self.find(code) else {
            debug!(code, "product code not in catalog");
            return Vec::new();
        };

        let mut items = Vec::with_capacity(1 + row.gifts().count());
        items.push(OrderLineItem::new(ItemKind::Main, row.name.clone(), code));

        for gift in row.gifts() {
            let name = self.resolve_name(gift).unwrap_or_default();
            if name.is_empty() {
                debug!(code, gift, "gift code has no catalog name");
            }
            items.push(OrderLineItem::new(ItemKind::Gift, name, gift));
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> ProductTable {
        ProductTable::from_rows(vec![
            ProductRow::new("B2504240301", "DUALFIXPRO-TEAK").with_gift(1, "G001"),
            ProductRow::new("G001", "Gift Set"),
            ProductRow::new("B1", "First").with_gift(2, "G001").with_gift(4, "NOPE"),
            ProductRow::new("B1", "Shadowed"),
        ])
    }

    #[test]
    fn test_lookup_main_and_gift() {
        let items = catalog().lookup("B2504240301");
        assert_eq!(
            items,
            vec![
                OrderLineItem::new(ItemKind::Main, "DUALFIXPRO-TEAK", "B2504240301"),
                OrderLineItem::new(ItemKind::Gift, "Gift Set", "G001"),
            ]
        );
    }

    #[test]
    fn test_lookup_trims_input() {
        let items = catalog().lookup("  B2504240301\t");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_code, "B2504240301");
    }

    #[test]
    fn test_unresolved_gift_keeps_empty_name() {
        let items = catalog().lookup("B1");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].product_name, "First");
        assert_eq!(items[1].product_name, "Gift Set");
        assert_eq!(items[2].kind, ItemKind::Gift);
        assert_eq!(items[2].product_name, "");
        assert_eq!(items[2].product_code, "NOPE");
    }

    #[test]
    fn test_unknown_code_is_empty() {
        assert!(catalog().lookup("ZZZ").is_empty());
        assert!(catalog().lookup("").is_empty());
        assert!(catalog().lookup("   ").is_empty());
        assert!(ProductTable::empty().lookup("B1").is_empty());
    }

    #[test]
    fn test_gift_without_own_gifts() {
        let items = catalog().lookup("G001");
        assert_eq!(items, vec![OrderLineItem::new(ItemKind::Main, "Gift Set", "G001")]);
    }
}
