use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Headers plus row-of-cells view of a loaded CSV file.
///
/// Right after parsing every row has exactly `headers.len()` cells. Edits made
/// later are not re-normalized, so readers go through [`Table::cell`] which
/// treats a missing cell as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text, or `""` when the row or cell does not exist.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Finds a column by zero-based index or by exact header text.
    pub fn resolve_column(&self, key: &str) -> Option<usize> {
        if let Ok(idx) = key.parse::<usize>() {
            if idx < self.headers.len() {
                return Some(idx);
            }
        }
        self.headers.iter().position(|h| h == key)
    }
}

/// Field separators the editor understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }

    pub fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

/// How `.` and `,` are read when parsing numeric text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// `.` decimal, `,` grouping
    #[serde(rename = "en-US")]
    EnUs,
    /// `,` decimal, `.` grouping
    #[serde(rename = "pt-BR")]
    PtBr,
    /// Decided per value
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

impl Convention {
    pub fn code(self) -> &'static str {
        match self {
            Convention::EnUs => "en-US",
            Convention::PtBr => "pt-BR",
            Convention::Auto => "auto",
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Convention {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en-US" => Ok(Convention::EnUs),
            "pt-BR" => Ok(Convention::PtBr),
            "auto" => Ok(Convention::Auto),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// Locale used to render numbers back into cells and footers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayLocale {
    #[serde(rename = "en-US")]
    EnUs,
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "de-DE")]
    DeDe,
}

impl DisplayLocale {
    pub fn code(self) -> &'static str {
        match self {
            DisplayLocale::EnUs => "en-US",
            DisplayLocale::PtBr => "pt-BR",
            DisplayLocale::DeDe => "de-DE",
        }
    }

    pub fn decimal_separator(self) -> char {
        match self {
            DisplayLocale::EnUs => '.',
            DisplayLocale::PtBr | DisplayLocale::DeDe => ',',
        }
    }

    pub fn grouping_separator(self) -> char {
        match self {
            DisplayLocale::EnUs => ',',
            DisplayLocale::PtBr | DisplayLocale::DeDe => '.',
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DisplayLocale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en-US" => Ok(DisplayLocale::EnUs),
            "pt-BR" => Ok(DisplayLocale::PtBr),
            "de-DE" => Ok(DisplayLocale::DeDe),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale '{0}'")]
pub struct UnknownLocale(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Column currently sorted, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: Option<SortDirection>,
}

/// One cell of a spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetCell {
    Number(f64),
    Text(String),
}
