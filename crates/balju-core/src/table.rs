//! Tabular sheet data

/// A sheet read from the master workbook: a normalized header row plus data rows.
///
/// Cells are `None` when empty. Every row has exactly as many cells as there
/// are headers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table from raw header cells.
    ///
    /// Headers are trimmed, blank headers become `Unnamed: N` and repeated
    /// headers get a `.1`, `.2`, ... suffix.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        Self {
            headers: normalize_headers(headers),
            rows: Vec::new(),
        }
    }

    /// Create a table from plain header names
    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(headers.into_iter().map(Some))
    }

    /// Append a data row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    /// Normalized header names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name (the name is trimmed before comparing)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Get a cell by data-row and column index
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Get a cell by data-row index and column name
    pub fn cell_by_name(&self, row: usize, column: &str) -> Option<&str> {
        self.cell(row, self.column_index(column)?)
    }

    /// Iterate over the values of one column
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = Option<&'a str>> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    /// Find the first data row whose trimmed value in `column` equals the
    /// trimmed `value`. Empty cells never match.
    pub fn find_first(&self, column: &str, value: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        let value = value.trim();
        self.rows.iter().position(|row| {
            row[idx]
                .as_deref()
                .map(str::trim)
                .is_some_and(|cell| cell == value)
        })
    }
}

/// Normalize raw header cells.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut headers: Vec<String> = Vec::new();
    for (idx, cell) in raw.into_iter().enumerate() {
        let base = match cell.as_ref().map(|s| s.as_ref().trim()) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("Unnamed: {idx}"),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while headers.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        headers.push(name);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_headers_are_trimmed_and_named() {
        let table = Table::new(vec![Some(" 품번 "), None, Some("제품명"), Some("  ")]);
        assert_eq!(
            table.headers(),
            &["품번", "Unnamed: 1", "제품명", "Unnamed: 3"]
        );
    }

    #[test]
    fn test_duplicate_headers_get_suffix() {
        let table = Table::with_headers(["주소", "주소", "주소"]);
        assert_eq!(table.headers(), &["주소", "주소.1", "주소.2"]);
        assert_eq!(table.column_index("주소"), Some(0));
    }

    #[test]
    fn test_rows_are_padded() {
        let mut table = Table::with_headers(["a", "b", "c"]);
        table.push_row(vec![Some("1".into())]);
        table.push_row(vec![
            Some("1".into()),
            Some("2".into()),
            Some("3".into()),
            Some("4".into()),
        ]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some("1"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.rows().nth(1).map(|r| r.len()), Some(3));
    }

    #[test]
    fn test_find_first_skips_empty_cells() {
        let mut table = Table::with_headers(["code", "name"]);
        table.push_row(vec![None, Some("blank".into())]);
        table.push_row(vec![Some(" X1 ".into()), Some("first".into())]);
        table.push_row(vec![Some("X1".into()), Some("second".into())]);

        assert_eq!(table.find_first("code", "X1"), Some(1));
        assert_eq!(table.find_first("code", ""), None);
        assert_eq!(table.find_first("missing", "X1"), None);
        assert_eq!(table.cell_by_name(1, "name"), Some("first"));
    }

    #[test]
    fn test_column_iterator() {
        let mut table = Table::with_headers(["code"]);
        table.push_row(vec![Some("A".into())]);
        table.push_row(vec![None]);

        let values: Vec<_> = table.column("code").unwrap().collect();
        assert_eq!(values, vec![Some("A"), None]);
        assert!(table.column("nope").is_none());
    }
}
