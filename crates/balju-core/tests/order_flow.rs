//! End-to-end tests for the lookup -> add -> remove -> export-rows flow

use balju_core::{
    order_form_rows, split_block, ItemKind, OnUnknownCode, OrderBook, OrderHeader, PasteBlock,
    ProductRow, ProductTable, Table,
};
use pretty_assertions::assert_eq;

fn row(cells: &[&str]) -> Vec<Option<String>> {
    cells
        .iter()
        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
        .collect()
}

fn master_sheet() -> Table {
    let mut table = Table::new(vec![
        Some("품번"),
        Some("제품명 "),
        Some("사은품 1"),
        Some("사은품 2"),
        Some("사은품 3"),
        Some("사은품 4"),
        Some("사은품 5"),
        None,
    ]);
    table.push_row(row(&["B2504240301", "DUALFIXPRO-TEAK", "G001", "", "", "", ""]));
    table.push_row(row(&["G001", "Gift Set"]));
    table.push_row(row(&["B3", "Three gifts", "G001", "nan", "G404", "", "G001"]));
    table
}

#[test]
fn test_lookup_counts_match_gift_slots() {
    let products = ProductTable::from_table(&master_sheet()).unwrap();

    for row in products.iter() {
        let gifts = row.gifts().count();
        let items = products.lookup(&row.code);
        assert_eq!(items.len(), 1 + gifts, "code {}", row.code);
        assert_eq!(items[0].kind, ItemKind::Main);
        assert!(items[1..].iter().all(|i| i.kind == ItemKind::Gift));
    }

    let names: Vec<_> = products
        .lookup("B3")
        .into_iter()
        .map(|i| i.product_name)
        .collect();
    assert_eq!(names, vec!["Three gifts", "Gift Set", "", "Gift Set"]);
}

#[test]
fn test_absent_codes_resolve_to_nothing() {
    let products = ProductTable::from_table(&master_sheet()).unwrap();
    for code in ["B250424030", "b2504240301", "G00", "nan", ""] {
        assert!(products.lookup(code).is_empty(), "code {code:?}");
    }
}

#[test]
fn test_delete_after_adds() {
    let products = ProductTable::from_rows(vec![ProductRow::new("P", "Product")]);
    let mut book = OrderBook::new();
    let n = 6;
    for i in 0..n {
        let header = OrderHeader {
            memo: format!("line {i}"),
            ..Default::default()
        };
        book.add(&header, "P", &products, OnUnknownCode::AutoManual)
            .unwrap();
    }

    book.remove(2);

    assert_eq!(book.len(), n - 1);
    let memos: Vec<_> = book.iter().map(|i| i.header.memo.as_str()).collect();
    assert_eq!(memos, vec!["line 0", "line 1", "line 3", "line 4", "line 5"]);
}

#[test]
fn test_batch_paste_to_rows() {
    let products = ProductTable::from_table(&master_sheet()).unwrap();
    let block = "Acme\tJohn\tJane\t\t02-000\t010-1111-2222\t\tSeoul\tB2504240301\t\t\t3\t5000\t2000\tfast\n\
                 Acme\tJohn\tJim\t\t\t\t\tBusan\tNEW-1\t\t\tx\t\t\t\n";

    let rows = match split_block(block) {
        PasteBlock::Batch(rows) => rows,
        other => panic!("expected batch, got {other:?}"),
    };

    let mut book = OrderBook::new();
    let report = book.add_pasted(&rows, &products);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.items_added, 3);

    let out = order_form_rows(book.items());
    assert_eq!(
        out[0],
        vec![
            "Acme", "John", "Jane", "02-000", "010-1111-2222", "Seoul", "B2504240301",
            "DUALFIXPRO-TEAK", "", "3", "5000", "2000", "fast",
        ]
    );
    assert_eq!(&out[1][6..9], &["G001", "", "Gift Set"]);
    assert_eq!(out[2][2], "Jim");
    assert_eq!(out[2][6], "NEW-1");
    assert_eq!(out[2][9], "1");
}
