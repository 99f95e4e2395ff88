//! Workbook preview

use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use crate::catalog::cell_text;
use crate::error::CatalogLoadError;

/// The first rows of one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPreview {
    /// Sheet name
    pub name: String,
    /// Leading rows as text, empty cells as `""`
    pub rows: Vec<Vec<String>>,
    /// Total number of rows in the used range
    pub total_rows: usize,
    /// Number of columns in the used range
    pub width: usize,
}

/// Read the first `max_rows` rows of every sheet in a workbook
pub fn inspect<P: AsRef<Path>>(
    path: P,
    max_rows: usize,
) -> Result<Vec<SheetPreview>, CatalogLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogLoadError::NotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| CatalogLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut previews = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| CatalogLoadError::Sheet {
                sheet: name.clone(),
                source,
            })?;

        let (total_rows, width) = range.get_size();
        let rows = range
            .rows()
            .take(max_rows)
            .map(|row| {
                row.iter()
                    .map(|cell| cell_text(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        previews.push(SheetPreview {
            name,
            rows,
            total_rows,
            width,
        });
    }

    Ok(previews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{SheetData, XlsxWriter};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inspect_limits_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.xlsx");

        let mut first = SheetData::new("코드");
        for i in 0..8 {
            first.push_row([format!("r{i}"), String::new(), "x".to_string()]);
        }
        let mut second = SheetData::new("주소");
        second.push_row(["매장명", "주소"]);

        XlsxWriter::write_file(&[first, second], &path).unwrap();

        let previews = inspect(&path, 3).unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].name, "코드");
        assert_eq!(previews[0].total_rows, 8);
        assert_eq!(previews[0].width, 3);
        assert_eq!(previews[0].rows.len(), 3);
        assert_eq!(previews[0].rows[2], vec!["r2", "", "x"]);
        assert_eq!(previews[1].rows, vec![vec!["매장명", "주소"]]);
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = inspect("/nonexistent/master.xlsb", 5).unwrap_err();
        assert!(matches!(err, CatalogLoadError::NotFound(_)));
    }
}
