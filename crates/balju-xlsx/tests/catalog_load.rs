//! Master workbook loading tests
//!
//! The master workbooks are generated with `XlsxWriter` and read back through
//! `CatalogLoader`.

use std::path::Path;

use balju_core::ItemKind;
use balju_xlsx::{CatalogLayout, CatalogLoadError, CatalogLoader, SheetData, XlsxWriter};
use pretty_assertions::assert_eq;

fn blank_rows(sheet: &mut SheetData, n: usize) {
    for _ in 0..n {
        sheet.push_row(Vec::<String>::new());
    }
}

fn product_sheet() -> SheetData {
    let mut sheet = SheetData::new("코드");
    sheet.push_row(["품번을 입력하세요"]);
    blank_rows(&mut sheet, 3);
    sheet.push_row([
        "", " 품번", "제품명", "사은품 1", "사은품 2", "사은품 3", "사은품 4", "사은품 5",
    ]);
    sheet.push_row(["", "B2504240301", "DUALFIXPRO-TEAK", "G001", "", "nan", "", "G002"]);
    sheet.push_row(["", "G001", "Gift Set", "", "", "", "", ""]);
    sheet.push_row(["", "G002", "Mini Fan", "", "", "", "", ""]);
    sheet
}

fn address_sheet() -> SheetData {
    let mut sheet = SheetData::new("25.12 주소");
    sheet.push_row(["2025년 12월 기준"]);
    sheet.push_row(["매장명", "주소"]);
    sheet.push_row(["Gangnam", "Seoul Gangnam-gu 1"]);
    sheet.push_row(["Haeundae", "Busan Haeundae-gu 2"]);
    sheet
}

fn write_master(path: &Path, sheets: &[SheetData]) {
    XlsxWriter::write_file(sheets, path).unwrap();
}

/// Test loading with the default layout
#[test]
fn test_load_default_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.xlsx");
    write_master(&path, &[product_sheet(), address_sheet()]);

    let catalog = CatalogLoader::load(&path).unwrap();
    assert_eq!(catalog.products.len(), 3);
    assert_eq!(catalog.addresses.len(), 2);
    assert_eq!(
        catalog.addresses.address_of("Haeundae"),
        Some("Busan Haeundae-gu 2")
    );

    let items = catalog.products.lookup("B2504240301");
    let summary: Vec<_> = items
        .iter()
        .map(|i| (i.kind, i.product_code.as_str(), i.product_name.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ItemKind::Main, "B2504240301", "DUALFIXPRO-TEAK"),
            (ItemKind::Gift, "G001", "Gift Set"),
            (ItemKind::Gift, "G002", "Mini Fan"),
        ]
    );
}

/// Test that a custom layout moves the header rows
#[test]
fn test_load_custom_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.xlsx");

    let mut products = SheetData::new("Products");
    products.push_row(["품번", "제품명"]);
    products.push_row(["P1", "Lamp"]);
    let mut addresses = SheetData::new("Stores");
    addresses.push_row(["매장명", "주소"]);

    write_master(&path, &[products, addresses]);

    let layout = CatalogLayout {
        product_sheet: "Products".into(),
        product_header_row: 0,
        address_sheet: "Stores".into(),
        address_header_row: 0,
    };
    let catalog = CatalogLoader::load_with(&path, &layout).unwrap();
    assert_eq!(catalog.products.lookup("P1")[0].product_name, "Lamp");
    assert!(catalog.addresses.is_empty());
}

/// Test the failure modes of a malformed master workbook
#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.xlsb");
    assert!(matches!(
        CatalogLoader::load(&missing),
        Err(CatalogLoadError::NotFound(_))
    ));

    let no_address = dir.path().join("no_address.xlsx");
    write_master(&no_address, &[product_sheet()]);
    match CatalogLoader::load(&no_address) {
        Err(CatalogLoadError::MissingSheet(sheet)) => assert_eq!(sheet, "25.12 주소"),
        other => panic!("expected missing sheet, got {other:?}"),
    }

    let mut no_code = SheetData::new("코드");
    blank_rows(&mut no_code, 4);
    no_code.push_row(["제품명"]);
    let no_code_path = dir.path().join("no_code.xlsx");
    write_master(&no_code_path, &[no_code, address_sheet()]);
    match CatalogLoader::load(&no_code_path) {
        Err(CatalogLoadError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "코드");
            assert_eq!(column, "품번");
        }
        other => panic!("expected missing column, got {other:?}"),
    }

    let mut no_name = SheetData::new("코드");
    blank_rows(&mut no_name, 4);
    no_name.push_row(["", "품번", "사은품 1"]);
    no_name.push_row(["", "B1", "G1"]);
    let no_name_path = dir.path().join("no_name.xlsx");
    write_master(&no_name_path, &[no_name, address_sheet()]);
    match CatalogLoader::load(&no_name_path) {
        Err(CatalogLoadError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "코드");
            assert_eq!(column, "제품명");
        }
        other => panic!("expected missing column, got {other:?}"),
    }

    let garbage = dir.path().join("garbage.xlsx");
    std::fs::write(&garbage, b"not a workbook").unwrap();
    assert!(matches!(
        CatalogLoader::load(&garbage),
        Err(CatalogLoadError::Open { .. })
    ));
}
