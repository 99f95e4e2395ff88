//! Clipboard paste parsing
//!
//! Rows copied from the sales spreadsheet arrive as tab-separated lines. Each
//! field is taken from a fixed source column:
//!
//! | column | field          |
//! |--------|----------------|
//! | 0      | partner        |
//! | 1      | orderer        |
//! | 2      | recipient      |
//! | 4      | phone          |
//! | 5      | mobile         |
//! | 7      | address        |
//! | 8      | barcode        |
//! | 11     | quantity       |
//! | 12     | fee            |
//! | 13     | shipping_fee   |
//! | 14     | memo           |
//!
//! Columns 3, 6, 9 and 10 are ignored.

use crate::item::OrderHeader;

const PARTNER: usize = 0;
const ORDERER: usize = 1;
const RECIPIENT: usize = 2;
const PHONE: usize = 4;
const MOBILE: usize = 5;
const ADDRESS: usize = 7;
const BARCODE: usize = 8;
const QUANTITY: usize = 11;
const FEE: usize = 12;
const SHIPPING_FEE: usize = 13;
const MEMO: usize = 14;

/// One parsed paste line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PastedRow {
    pub header: OrderHeader,
    pub barcode: String,
}

/// A pasted block, classified by how many non-blank lines it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteBlock {
    /// Nothing but whitespace
    Empty,
    /// Exactly one line: goes to the entry form for review
    Single(PastedRow),
    /// Several lines: added directly
    Batch(Vec<PastedRow>),
}

/// Parse one tab-separated line. Never fails: missing columns are empty.
pub fn parse_line(line: &str) -> PastedRow {
    let line = line.trim_end_matches(['\r', '\n']);
    let cols: Vec<&str> = line.split('\t').collect();
    let field = |idx: usize| cols.get(idx).map(|s| s.trim()).unwrap_or_default().to_string();

    PastedRow {
        header: OrderHeader {
            partner: field(PARTNER),
            orderer: field(ORDERER),
            recipient: field(RECIPIENT),
            phone: field(PHONE),
            mobile: field(MOBILE),
            address: field(ADDRESS),
            quantity: normalize_quantity(&field(QUANTITY)),
            fee: field(FEE),
            shipping_fee: field(SHIPPING_FEE),
            memo: field(MEMO),
        },
        barcode: field(BARCODE),
    }
}

/// Quantities that are empty, `0`, or not all digits become `1`.
pub fn normalize_quantity(quantity: &str) -> String {
    let quantity = quantity.trim();
    if quantity.is_empty() || quantity == "0" || !quantity.bytes().all(|b| b.is_ascii_digit()) {
        "1".to_string()
    } else {
        quantity.to_string()
    }
}

/// Split a pasted block into rows, skipping blank lines.
pub fn split_block(text: &str) -> PasteBlock {
    let mut rows: Vec<PastedRow> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect();

    match rows.len() {
        0 => PasteBlock::Empty,
        1 => PasteBlock::Single(rows.remove(0)),
        _ => PasteBlock::Batch(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const EXAMPLE: &str =
        "Acme\tJohn\tJane\t\tX\t010-1111-2222\t\tSeoul\tB999\t\t\t0\t5000\t2000\tfast please";

    #[test]
    fn test_parse_example_line() {
        let row = parse_line(EXAMPLE);
        assert_eq!(
            row,
            PastedRow {
                header: OrderHeader {
                    partner: "Acme".into(),
                    orderer: "John".into(),
                    recipient: "Jane".into(),
                    phone: "X".into(),
                    mobile: "010-1111-2222".into(),
                    address: "Seoul".into(),
                    quantity: "1".into(),
                    fee: "5000".into(),
                    shipping_fee: "2000".into(),
                    memo: "fast please".into(),
                },
                barcode: "B999".into(),
            }
        );
    }

    #[test]
    fn test_ignored_columns() {
        let line = "p\to\tr\tIGNORED3\tph\tmo\tIGNORED6\tad\tbc\tIGNORED9\tIGNORED10\t2\tf\ts\tm";
        let row = parse_line(line);
        let h = &row.header;
        let all = [
            &h.partner, &h.orderer, &h.recipient, &h.phone, &h.mobile, &h.address,
            &h.quantity, &h.fee, &h.shipping_fee, &h.memo, &row.barcode,
        ];
        assert!(all.iter().all(|v| !v.contains("IGNORED")));
        assert_eq!(h.quantity, "2");
    }

    #[test]
    fn test_short_line_yields_empty_fields() {
        let row = parse_line("Acme\tJohn");
        assert_eq!(row.header.partner, "Acme");
        assert_eq!(row.header.orderer, "John");
        assert_eq!(row.header.recipient, "");
        assert_eq!(row.header.memo, "");
        assert_eq!(row.barcode, "");
        assert_eq!(row.header.quantity, "1");
    }

    #[test]
    fn test_values_are_trimmed() {
        let row = parse_line(" Acme \t John\r\n");
        assert_eq!(row.header.partner, "Acme");
        assert_eq!(row.header.orderer, "John");
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize_quantity(""), "1");
        assert_eq!(normalize_quantity("0"), "1");
        assert_eq!(normalize_quantity("abc"), "1");
        assert_eq!(normalize_quantity("-3"), "1");
        assert_eq!(normalize_quantity("2.5"), "1");
        assert_eq!(normalize_quantity("5"), "5");
        assert_eq!(normalize_quantity(" 12 "), "12");
    }

    #[test]
    fn test_split_block() {
        assert_eq!(split_block(""), PasteBlock::Empty);
        assert_eq!(split_block("  \n\t\n"), PasteBlock::Empty);

        match split_block("Acme\tJohn\n") {
            PasteBlock::Single(row) => assert_eq!(row.header.partner, "Acme"),
            other => panic!("expected single row, got {other:?}"),
        }

        match split_block("a\n\nb\r\nc") {
            PasteBlock::Batch(rows) => {
                let partners: Vec<_> = rows.iter().map(|r| r.header.partner.as_str()).collect();
                assert_eq!(partners, vec!["a", "b", "c"]);
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn parse_never_panics(line in "[^\n]{0,200}") {
            let row = parse_line(&line);
            prop_assert!(!row.header.quantity.is_empty());
        }

        #[test]
        fn missing_positions_are_empty(fields in prop::collection::vec("[a-z]{1,5}", 0..15)) {
            let line = fields.join("\t");
            let row = parse_line(&line);
            let expect = |idx: usize| fields.get(idx).cloned().unwrap_or_default();
            prop_assert_eq!(row.header.partner, expect(0));
            prop_assert_eq!(row.header.recipient, expect(2));
            prop_assert_eq!(row.header.address, expect(7));
            prop_assert_eq!(row.barcode, expect(8));
            prop_assert_eq!(row.header.memo, expect(14));
        }

        #[test]
        fn quantity_is_digits_and_not_zero(q in ".{0,8}") {
            let n = normalize_quantity(&q);
            prop_assert!(n.bytes().all(|b| b.is_ascii_digit()));
            prop_assert_ne!(n, "0");
        }
    }
}
