//! CSV tokenizer with delimiter detection and row normalization.
//!
//! The grammar works character by character over the whole text, so quoted
//! fields may contain delimiters and line breaks. Malformed input never fails:
//! an unterminated quote swallows the rest of the text, ragged rows are
//! reconciled against the header row, and blank lines are skipped.

use shared::models::{Delimiter, Table};
use std::iter::Peekable;
use tracing::{debug, warn};

/// Characters processed between cooperative yields in [`parse_csv_async`].
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// A parsed table together with the delimiter it was read with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub table: Table,
    pub delimiter: Delimiter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub chunk_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Picks `;` or `\t` when it strictly outnumbers the other candidates on the
/// first non-blank line, counting only separators outside quotes. Comma wins
/// every tie and is the fallback for blank text.
pub fn detect_delimiter(text: &str) -> Delimiter {
    let sample = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .find(|line| !trim_cell(line).is_empty());
    let Some(sample) = sample else {
        return Delimiter::Comma;
    };

    let (mut commas, mut semicolons, mut tabs) = (0usize, 0usize, 0usize);
    let mut in_quotes = false;
    let mut chars = sample.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            '\t' if !in_quotes => tabs += 1,
            _ => {}
        }
    }

    if semicolons > commas && semicolons > tabs {
        Delimiter::Semicolon
    } else if tabs > commas && tabs > semicolons {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// Parses CSV text, detecting the delimiter from its first non-blank line.
pub fn parse_csv(text: &str) -> ParsedCsv {
    if trim_cell(text).is_empty() {
        return ParsedCsv::default();
    }
    parse_csv_with_delimiter(text, detect_delimiter(text))
}

/// Parses CSV text with a caller-chosen delimiter.
pub fn parse_csv_with_delimiter(text: &str, delimiter: Delimiter) -> ParsedCsv {
    let mut tokenizer = Tokenizer::new(delimiter);
    tokenizer.feed(&mut text.chars().peekable(), usize::MAX);
    build_parsed(tokenizer.finish(), delimiter)
}

/// Chunked variant of [`parse_csv`] for large inputs.
///
/// Yields to the tokio scheduler after every `options.chunk_size` characters
/// and reports progress in percent after each chunk. The final report is
/// always exactly `100.0`, also for empty input. Output matches [`parse_csv`].
pub async fn parse_csv_async<F>(text: &str, options: ParseOptions, mut on_progress: F) -> ParsedCsv
where
    F: FnMut(f64),
{
    if trim_cell(text).is_empty() {
        on_progress(100.0);
        return ParsedCsv::default();
    }

    let delimiter = detect_delimiter(text);
    let total = text.chars().count();
    let chunk_size = options.chunk_size.max(1);
    let mut tokenizer = Tokenizer::new(delimiter);
    let mut chars = text.chars().peekable();
    let mut processed = 0usize;

    while processed < total {
        processed += tokenizer.feed(&mut chars, chunk_size);
        let progress = processed as f64 / total as f64 * 100.0;
        debug!(processed, total, progress, "CSV chunk parsed");
        on_progress(progress);

        if processed < total {
            tokio::task::yield_now().await;
        }
    }

    let parsed = build_parsed(tokenizer.finish(), delimiter);
    on_progress(100.0);
    parsed
}

/// Forces every row to exactly `headers.len()` cells.
///
/// Surplus trailing cells are glued back into the last cell with the
/// delimiter, short rows are padded with empty strings.
pub fn normalize_rows(headers: &[String], rows: Vec<Vec<String>>, delimiter: Delimiter) -> Vec<Vec<String>> {
    let width = headers.len();
    let glue = delimiter.as_char().to_string();

    rows.into_iter()
        .map(|mut row| {
            if width == 0 {
                row.clear();
            } else if row.len() > width {
                let tail = row.split_off(width - 1).join(&glue);
                row.push(tail);
            } else if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
        .collect()
}

fn build_parsed(mut rows: Vec<Vec<String>>, delimiter: Delimiter) -> ParsedCsv {
    if rows.is_empty() {
        return ParsedCsv {
            table: Table::default(),
            delimiter,
        };
    }
    let data_rows = rows.split_off(1);
    let headers = rows.pop().unwrap_or_default();
    let rows = normalize_rows(&headers, data_rows, delimiter);
    ParsedCsv {
        table: Table::new(headers, rows),
        delimiter,
    }
}

/// Strips Unicode whitespace and the byte-order mark. NEL (U+0085) is not
/// treated as whitespace and stays in the cell.
fn trim_cell(s: &str) -> &str {
    s.trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}')
}

/// Resumable tokenizer state, so the chunked parser can stop at any character.
struct Tokenizer {
    delimiter: char,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    in_quotes: bool,
}

impl Tokenizer {
    fn new(delimiter: Delimiter) -> Self {
        Tokenizer {
            delimiter: delimiter.as_char(),
            rows: Vec::new(),
            row: Vec::new(),
            cell: String::new(),
            in_quotes: false,
        }
    }

    /// Consumes at most `budget` characters (one more when an escaped quote or
    /// a `\r\n` pair straddles the limit) and returns how many were consumed.
    fn feed<I>(&mut self, chars: &mut Peekable<I>, budget: usize) -> usize
    where
        I: Iterator<Item = char>,
    {
        let mut consumed = 0usize;
        while consumed < budget {
            let Some(ch) = chars.next() else {
                break;
            };
            consumed += 1;

            match ch {
                '"' if self.in_quotes && chars.peek() == Some(&'"') => {
                    chars.next();
                    consumed += 1;
                    self.cell.push('"');
                }
                '"' => self.in_quotes = !self.in_quotes,
                c if c == self.delimiter && !self.in_quotes => self.end_cell(),
                '\n' if !self.in_quotes => self.end_row(),
                '\r' if !self.in_quotes => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        consumed += 1;
                    }
                    self.end_row();
                }
                c => self.cell.push(c),
            }
        }
        consumed
    }

    fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        self.row.push(trim_cell(&cell).to_string());
    }

    fn end_row(&mut self) {
        self.end_cell();
        let row = std::mem::take(&mut self.row);
        // Rows made only of empty cells are stray blank lines.
        if row.iter().any(|cell| !cell.is_empty()) {
            self.rows.push(row);
        }
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if self.in_quotes {
            warn!("CSV input ended inside a quoted field; remaining text kept as field content");
        }
        if !self.cell.is_empty() || !self.row.is_empty() {
            self.end_row();
        }
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_detect_delimiter_defaults_to_comma() {
        assert_eq!(detect_delimiter(""), Delimiter::Comma);
        assert_eq!(detect_delimiter("   \n\t\n"), Delimiter::Comma);
        assert_eq!(detect_delimiter("a,b;c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("single"), Delimiter::Comma);
    }

    #[test]
    fn test_detect_delimiter_semicolon_and_tab() {
        assert_eq!(detect_delimiter("Ativo;Data;Valor\nX;1;2"), Delimiter::Semicolon);
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), Delimiter::Tab);
        assert_eq!(detect_delimiter("a\tb;c\td"), Delimiter::Tab);
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_and_blank_lines() {
        assert_eq!(detect_delimiter("\n\n\"a;b;c\",d"), Delimiter::Comma);
        assert_eq!(detect_delimiter("\r\n  \r\nx;y\r\n"), Delimiter::Semicolon);
        // Escaped quote keeps the span open
        assert_eq!(detect_delimiter("\"a\"\";b;c\",d"), Delimiter::Comma);
    }

    #[test]
    fn test_parse_quoted_delimiter_in_header() {
        let parsed = parse_csv("a,\"b,c\",d\n1,2,3");
        assert_eq!(parsed.delimiter, Delimiter::Comma);
        assert_eq!(parsed.table.headers, strings(&["a", "b,c", "d"]));
        assert_eq!(parsed.table.rows, vec![strings(&["1", "2", "3"])]);
    }

    #[test]
    fn test_parse_escaped_quotes_and_newlines() {
        let parsed = parse_csv("name;note\nAna;\"said \"\"hi\"\"\nthen left\"");
        assert_eq!(parsed.delimiter, Delimiter::Semicolon);
        assert_eq!(parsed.table.rows, vec![strings(&["Ana", "said \"hi\"\nthen left"])]);
    }

    #[test]
    fn test_parse_line_endings() {
        let parsed = parse_csv("a,b\r\n1,2\r3,4\n5,6\r\n");
        assert_eq!(
            parsed.table.rows,
            vec![strings(&["1", "2"]), strings(&["3", "4"]), strings(&["5", "6"])]
        );
    }

    #[test]
    fn test_parse_trims_cells_and_skips_blank_rows() {
        let parsed = parse_csv("\u{feff} a , b \n\n , \n  1 ,2\n");
        assert_eq!(parsed.table.headers, strings(&["a", "b"]));
        assert_eq!(parsed.table.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn test_parse_keeps_next_line_character() {
        let parsed = parse_csv("a,b\n\u{85}x,y\u{a0}\n");
        assert_eq!(parsed.table.rows, vec![strings(&["\u{85}x", "y"])]);
    }

    #[test]
    fn test_parse_keeps_short_row_with_content() {
        let parsed = parse_csv("a,b,c\nonly\n");
        assert_eq!(parsed.table.rows, vec![strings(&["only", "", ""])]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_csv(""), ParsedCsv::default());
        assert_eq!(parse_csv(" \n \r\n"), ParsedCsv::default());
    }

    #[test]
    fn test_parse_unterminated_quote_degrades() {
        let parsed = parse_csv("a,b\n1,\"open\n2,3");
        assert_eq!(parsed.table.headers, strings(&["a", "b"]));
        assert_eq!(parsed.table.rows, vec![strings(&["1", "open\n2,3"])]);
    }

    #[test]
    fn test_normalize_rows_pads_and_glues() {
        let headers = strings(&["a", "b", "c"]);
        let rows = vec![
            strings(&["1"]),
            strings(&["1", "2", "3"]),
            strings(&["1", "2", "3", "4", "5"]),
        ];
        let normalized = normalize_rows(&headers, rows, Delimiter::Semicolon);
        assert_eq!(
            normalized,
            vec![
                strings(&["1", "", ""]),
                strings(&["1", "2", "3"]),
                strings(&["1", "2", "3;4;5"]),
            ]
        );
    }

    #[test]
    fn test_normalize_rows_without_headers() {
        let normalized = normalize_rows(&[], vec![strings(&["x", "y"])], Delimiter::Comma);
        assert_eq!(normalized, vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_parse_with_explicit_delimiter() {
        let parsed = parse_csv_with_delimiter("a;b\n1;2,5", Delimiter::Semicolon);
        assert_eq!(parsed.table.rows, vec![strings(&["1", "2,5"])]);
    }

    #[tokio::test]
    async fn test_async_parse_matches_sync_and_reports_progress() {
        let text = "id;valor;obs\r\n1;\"1.234,56\";\"a \"\"quoted\"\"\r\nnote\"\r\n2;10,5;x\n\n3;(7);y;extra";
        let mut progress = Vec::new();
        let parsed = parse_csv_async(text, ParseOptions { chunk_size: 4 }, |p| progress.push(p)).await;

        assert_eq!(parsed, parse_csv(text));
        assert!(progress.len() > 2);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 100.0);
    }

    #[tokio::test]
    async fn test_async_parse_empty_reports_complete() {
        let mut progress = Vec::new();
        let parsed = parse_csv_async("", ParseOptions::default(), |p| progress.push(p)).await;
        assert_eq!(parsed, ParsedCsv::default());
        assert_eq!(progress, vec![100.0]);
    }

    proptest! {
        #[test]
        fn prop_comma_without_semicolon_or_tab(text in "[a-z0-9,\" \r\n]{0,60}") {
            prop_assert_eq!(detect_delimiter(&text), Delimiter::Comma);
        }
    }
}
