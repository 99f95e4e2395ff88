//! Text output shared by the subcommands and the session

use std::io::{self, Write};

use balju::prelude::*;
use balju::OrderForm;

/// One line per item: position, kind, code and name
pub fn items<W: Write>(out: &mut W, items: &[OrderLineItem]) -> io::Result<()> {
    for (idx, item) in items.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<6}  {:<16}  {}",
            idx + 1,
            item.kind.as_str(),
            item.product_code,
            item.product_name
        )?;
    }
    Ok(())
}

/// The order list with the header fields the clerk needs to tell lines apart
pub fn book<W: Write>(out: &mut W, book: &OrderBook) -> io::Result<()> {
    if book.is_empty() {
        return writeln!(out, "(order list is empty)");
    }
    for (idx, item) in book.iter().enumerate() {
        let h = &item.header;
        writeln!(
            out,
            "{:>3}  {:<6}  {:<16}  {:<24}  {} / {} x{}",
            idx + 1,
            item.kind.as_str(),
            item.product_code,
            item.product_name,
            h.partner,
            h.recipient,
            h.quantity
        )?;
    }
    writeln!(out, "{} item(s)", book.len())
}

/// Every form field with its label
pub fn form<W: Write>(out: &mut W, form: &OrderForm) -> io::Result<()> {
    for field in FormField::ALL {
        writeln!(
            out,
            "  {:<12} {:<8} {}",
            field.key(),
            field.label(),
            form.get(field)
        )?;
    }
    Ok(())
}

pub fn batch_report<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    writeln!(
        out,
        "Added {} row(s), {} item(s); {} manual; {} failed",
        report.succeeded, report.items_added, report.manual, report.failed
    )?;
    for (row, reason) in &report.failures {
        writeln!(out, "  row {row}: {reason}")?;
    }
    Ok(())
}

pub fn export_report<W: Write>(out: &mut W, report: &ExportReport) -> io::Result<()> {
    match report {
        ExportReport::Written { path, rows } => {
            writeln!(out, "Wrote {rows} row(s) to '{}'", path.display())
        }
        ExportReport::Appended { path, summary } => {
            writeln!(
                out,
                "Wrote {} row(s) to '{}' from row {}{}",
                summary.rows_written,
                path.display(),
                summary.first_row,
                if summary.sheet_created {
                    " (sheet created)"
                } else {
                    ""
                }
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_items_numbered_from_one() {
        let items = vec![
            OrderLineItem::new(ItemKind::Main, "DUALFIXPRO-TEAK", "B2504240301"),
            OrderLineItem::new(ItemKind::Gift, "Gift Set", "G001"),
        ];
        let mut out = Vec::new();
        super::items(&mut out, &items).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().map(str::trim_end).collect();
        assert_eq!(
            lines,
            vec![
                "  1  MAIN    B2504240301       DUALFIXPRO-TEAK",
                "  2  GIFT    G001              Gift Set",
            ]
        );
    }

    #[test]
    fn test_batch_report_lists_failures() {
        let report = BatchReport {
            succeeded: 1,
            failed: 1,
            items_added: 2,
            manual: 0,
            failures: vec![(2, "Product code is required".to_string())],
        };
        let mut out = Vec::new();
        batch_report(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Added 1 row(s), 2 item(s); 0 manual; 1 failed\n"));
        assert!(text.contains("  row 2: Product code is required"));
    }
}
