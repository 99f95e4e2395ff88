//! XLSX writer
//!
//! Writes plain text sheets: every non-empty cell becomes an inline string,
//! and optional column widths are emitted as `<cols>` entries.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use balju_core::{
    column_widths, order_form_header, order_form_rows, OrderLineItem, ORDER_FORM_SHEET,
};
use quick_xml::escape::escape;
use tracing::debug;

use crate::error::{XlsxError, XlsxResult};

/// Maximum sheet name length accepted by Excel
const MAX_SHEET_NAME_LEN: usize = 31;

/// A sheet to write: rows of text plus optional column widths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetData {
    /// Sheet name
    pub name: String,
    /// Rows, first row first
    pub rows: Vec<Vec<String>>,
    /// Width of each column in character units; empty for Excel defaults
    pub widths: Vec<usize>,
}

impl SheetData {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The 발주서 sheet for a list of items: header row, one row per item,
    /// and widths sized to the content.
    pub fn order_form(items: &[OrderLineItem]) -> Self {
        let header = order_form_header();
        let data = order_form_rows(items);
        let widths = column_widths(&header, &data);

        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header.iter().map(|h| h.to_string()).collect());
        rows.extend(data);

        Self {
            name: ORDER_FORM_SHEET.to_string(),
            rows,
            widths,
        }
    }

    /// Append a row
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    fn validate(&self) -> XlsxResult<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(XlsxError::InvalidSheet("sheet name is empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(XlsxError::InvalidSheet(format!(
                "'{}' is longer than {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }
        if let Some(c) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
            return Err(XlsxError::InvalidSheet(format!(
                "'{}' contains '{}'",
                name, c
            )));
        }
        Ok(())
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write sheets to a file path, replacing any existing file
    pub fn write_file<P: AsRef<Path>>(sheets: &[SheetData], path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        Self::check_sheets(sheets)?;
        let file = File::create(path)?;
        Self::write(sheets, file)?;
        debug!(path = %path.display(), sheets = sheets.len(), "xlsx written");
        Ok(())
    }

    /// Write sheets to a writer
    pub fn write<W: Write + Seek>(sheets: &[SheetData], writer: W) -> XlsxResult<()> {
        Self::check_sheets(sheets)?;

        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip, sheets.len())?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, sheets)?;
        Self::write_workbook_rels(&mut zip, sheets.len())?;
        Self::write_styles_xml(&mut zip)?;

        for (i, sheet) in sheets.iter().enumerate() {
            Self::write_worksheet(&mut zip, i, sheet)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn check_sheets(sheets: &[SheetData]) -> XlsxResult<()> {
        if sheets.is_empty() {
            return Err(XlsxError::InvalidSheet(
                "a workbook needs at least one sheet".into(),
            ));
        }
        for (i, sheet) in sheets.iter().enumerate() {
            sheet.validate()?;
            if sheets[..i]
                .iter()
                .any(|other| other.name.to_lowercase() == sheet.name.to_lowercase())
            {
                return Err(XlsxError::InvalidSheet(format!(
                    "duplicate sheet name '{}'",
                    sheet.name
                )));
            }
        }
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_count: usize,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheets: &[SheetData],
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in sheets.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name.as_str()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_count: usize,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            sheet_count + 1
        ));

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        index: usize,
        sheet: &SheetData,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !sheet.widths.is_empty() {
            content.push_str("\n    <cols>");
            for (i, width) in sheet.widths.iter().enumerate() {
                content.push_str(&format!(
                    "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
                    i + 1,
                    i + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            if row.iter().all(String::is_empty) {
                continue;
            }
            content.push_str(&format!("\n        <row r=\"{}\">", row_idx + 1));

            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let cell_ref = format!("{}{}", column_letters(col_idx as u32), row_idx + 1);
                let space = if value.trim() != value {
                    " xml:space=\"preserve\""
                } else {
                    ""
                };
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"inlineStr\"><is><t{}>{}</t></is></c>",
                    cell_ref,
                    space,
                    escape(value.as_str())
                ));
            }

            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Column letters for a 0-based column index (0 -> A, 26 -> AA)
pub fn column_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1;

    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    result
}
