// Editor session state: the loaded table plus sort and filter state.
use crate::data::csv_parser::ParsedCsv;
use crate::data::csv_writer::serialize_csv;
use crate::error::EngineError;
use shared::models::{Convention, Delimiter, DisplayLocale, SheetCell, SortDirection, SortState, Table};
use shared::{decimal_count, format_number, parse_number};
use std::cmp::Ordering;

/// Fractional digits used for column totals.
pub const SUM_DECIMALS: usize = 2;

/// One editing session over a single loaded CSV file.
///
/// The session owns the table exclusively. Callers sequence writes (cell
/// edits, conversions, sorts) before reads (sums, exports).
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    table: Table,
    delimiter: Delimiter,
    sort_state: SortState,
    column_filters: Vec<String>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was loaded before.
    pub fn load(&mut self, parsed: ParsedCsv) {
        self.column_filters = vec![String::new(); parsed.table.headers.len()];
        self.table = parsed.table;
        self.delimiter = parsed.delimiter;
        self.sort_state = SortState::default();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        !self.table.headers.is_empty()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    pub fn column_filters(&self) -> &[String] {
        &self.column_filters
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), EngineError> {
        self.check_column(col)?;
        let count = self.table.rows.len();
        let cells = self
            .table
            .rows
            .get_mut(row)
            .ok_or(EngineError::RowOutOfRange { row, count })?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }

    /// Sorts by `col`, ascending unless that column is already ascending.
    ///
    /// Cells that parse as numbers compare numerically and come before text
    /// cells; text compares case-insensitively with digit runs read as
    /// numbers. Equal cells keep their relative order.
    pub fn toggle_sort(&mut self, col: usize, convention: Convention) -> Result<SortState, EngineError> {
        self.check_column(col)?;

        let direction = match self.sort_state {
            SortState {
                column: Some(current),
                direction: Some(SortDirection::Ascending),
            } if current == col => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };

        let mut keyed: Vec<(SortKey, Vec<String>)> = std::mem::take(&mut self.table.rows)
            .into_iter()
            .map(|row| {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                (SortKey::new(cell, convention), row)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        });
        self.table.rows = keyed.into_iter().map(|(_, row)| row).collect();

        self.sort_state = SortState {
            column: Some(col),
            direction: Some(direction),
        };
        Ok(self.sort_state)
    }

    pub fn set_filter(&mut self, col: usize, text: &str) -> Result<(), EngineError> {
        self.check_column(col)?;
        if self.column_filters.len() < self.table.headers.len() {
            self.column_filters.resize(self.table.headers.len(), String::new());
        }
        self.column_filters[col] = text.to_string();
        Ok(())
    }

    /// Indexes of rows whose cells contain every active filter, ignoring case.
    pub fn visible_rows(&self) -> Vec<usize> {
        let filters: Vec<(usize, String)> = self
            .column_filters
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_empty())
            .map(|(col, f)| (col, f.to_lowercase()))
            .collect();

        (0..self.table.rows.len())
            .filter(|&row| {
                filters
                    .iter()
                    .all(|(col, needle)| self.table.cell(row, *col).to_lowercase().contains(needle.as_str()))
            })
            .collect()
    }

    /// Sum of the numeric cells of `col`, `None` when none of them parse.
    pub fn column_sum(&self, col: usize, convention: Convention) -> Option<f64> {
        let mut values = (0..self.table.rows.len())
            .map(|row| self.table.cell(row, col))
            .filter(|cell| !cell.is_empty())
            .filter_map(|cell| parse_number(cell, convention))
            .filter(|v| v.is_finite())
            .peekable();
        values.peek()?;
        Some(values.sum())
    }

    pub fn column_sums(&self, convention: Convention) -> Vec<Option<f64>> {
        (0..self.table.headers.len())
            .map(|col| self.column_sum(col, convention))
            .collect()
    }

    /// Footer line: each total with two decimals, empty for text columns.
    pub fn formatted_sums(&self, convention: Convention, display: DisplayLocale) -> Vec<String> {
        self.column_sums(convention)
            .into_iter()
            .map(|sum| sum.map(|v| format_number(v, SUM_DECIMALS, display)).unwrap_or_default())
            .collect()
    }

    /// Rewrites every numeric cell of `cols` in the display locale, keeping
    /// the number of fractional digits the source text had. Returns how many
    /// cells changed.
    pub fn convert_columns(
        &mut self,
        cols: &[usize],
        convention: Convention,
        display: DisplayLocale,
    ) -> Result<usize, EngineError> {
        for &col in cols {
            self.check_column(col)?;
        }

        let mut converted = 0usize;
        for &col in cols {
            for row in self.table.rows.iter_mut() {
                let Some(cell) = row.get_mut(col) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                // Digit runs too long for f64 stay as typed.
                if let Some(value) = parse_number(cell, convention).filter(|v| v.is_finite()) {
                    let decimals = decimal_count(cell, convention);
                    *cell = format_number(value, decimals, display);
                    converted += 1;
                }
            }
        }
        Ok(converted)
    }

    /// Whole table as CSV text in the delimiter it was loaded with.
    pub fn to_csv(&self) -> Result<String, EngineError> {
        serialize_csv(&self.table.headers, &self.table.rows, self.delimiter)
    }

    /// Spreadsheet rows: the header row as text, then one cell per header
    /// where numeric-looking text becomes a number.
    pub fn to_sheet(&self, convention: Convention) -> Vec<Vec<SheetCell>> {
        let mut sheet = Vec::with_capacity(self.table.rows.len() + 1);
        sheet.push(self.table.headers.iter().cloned().map(SheetCell::Text).collect());
        for row in 0..self.table.rows.len() {
            let cells = (0..self.table.headers.len())
                .map(|col| {
                    let raw = self.table.cell(row, col);
                    match parse_number(raw, convention).filter(|v| v.is_finite()) {
                        Some(value) => SheetCell::Number(value),
                        None => SheetCell::Text(raw.to_string()),
                    }
                })
                .collect();
            sheet.push(cells);
        }
        sheet
    }

    fn check_column(&self, col: usize) -> Result<(), EngineError> {
        if !self.is_loaded() {
            return Err(EngineError::NoTableLoaded);
        }
        let count = self.table.headers.len();
        if col >= count {
            return Err(EngineError::ColumnOutOfRange { column: col, count });
        }
        Ok(())
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn new(cell: &str, convention: Convention) -> Self {
        match parse_number(cell, convention) {
            Some(value) => SortKey::Number(value),
            None => SortKey::Text(cell.to_lowercase()),
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => natural_cmp(a, b),
        }
    }
}

/// Character order, except that runs of ASCII digits compare by value.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l: String = std::iter::from_fn(|| left.next_if(char::is_ascii_digit)).collect();
                let r: String = std::iter::from_fn(|| right.next_if(char::is_ascii_digit)).collect();
                let (l, r) = (l.trim_start_matches('0'), r.trim_start_matches('0'));
                let ord = l.len().cmp(&r.len()).then_with(|| l.cmp(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                left.next();
                right.next();
                if x != y {
                    return x.cmp(&y);
                }
            }
        }
    }
}
