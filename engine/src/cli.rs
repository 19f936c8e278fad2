//! Command-line arguments for the `csv-engine` binary.
//!
//! The binary runs one editing pass over a file: load, optional conversion,
//! sort and filters, then totals and exports.

use clap::Parser;
use shared::models::{Convention, DisplayLocale};
use std::path::PathBuf;

use crate::config::settings::DEFAULT_SETTINGS_FILE;
use crate::services::PreferencesUpdate;

/// Load, convert and export delimited text files
#[derive(Parser, Debug)]
#[command(name = "csv-engine", version, about = "Load, convert and export delimited text files")]
pub struct CliArgs {
    /// CSV file to open
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Preferences file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// How numbers in the file are written (en-US, pt-BR or auto)
    #[arg(long, value_name = "LOCALE")]
    pub source_format: Option<Convention>,

    /// Locale converted numbers are rendered in (en-US, pt-BR or de-DE)
    #[arg(long, value_name = "LOCALE")]
    pub currency_format: Option<DisplayLocale>,

    /// Column to convert, by zero-based index or header name
    #[arg(long = "convert", value_name = "COL")]
    pub convert: Vec<String>,

    /// Column to sort by
    #[arg(long, value_name = "COL")]
    pub sort: Option<String>,

    /// Sort descending (used with --sort)
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Show only rows whose COL contains TEXT, ignoring case
    #[arg(long = "filter", value_name = "COL=TEXT", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Print column totals
    #[arg(long)]
    pub sums: bool,

    /// Write edited_file.csv
    #[arg(long)]
    pub csv: bool,

    /// Write edited_file.xlsx
    #[arg(long)]
    pub xlsx: bool,

    /// Directory exports are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Store the given locales in the preferences file
    #[arg(long)]
    pub save_settings: bool,
}

impl CliArgs {
    pub fn preferences_update(&self) -> PreferencesUpdate {
        PreferencesUpdate {
            currency_format: self.currency_format,
            source_format: self.source_format,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(col, text)| (col.to_string(), text.to_string()))
        .ok_or_else(|| format!("expected COL=TEXT, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = CliArgs::try_parse_from([
            "csv-engine",
            "data.csv",
            "--source-format",
            "pt-BR",
            "--currency-format",
            "en-US",
            "--convert",
            "Preço",
            "--convert",
            "2",
            "--sort",
            "Produto",
            "--desc",
            "--filter",
            "Produto=caf=é",
            "--csv",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.convert, vec!["Preço", "2"]);
        assert_eq!(args.sort.as_deref(), Some("Produto"));
        assert!(args.desc);
        assert_eq!(args.filters, vec![("Produto".to_string(), "caf=é".to_string())]);
        assert!(args.csv && !args.xlsx);
        assert_eq!(args.settings, PathBuf::from(DEFAULT_SETTINGS_FILE));
        assert_eq!(
            args.preferences_update(),
            PreferencesUpdate {
                currency_format: Some(DisplayLocale::EnUs),
                source_format: Some(Convention::PtBr),
            }
        );
    }

    #[test]
    fn test_rejects_unknown_locale_and_bad_filter() {
        assert!(CliArgs::try_parse_from(["csv-engine", "a.csv", "--currency-format", "fr-FR"]).is_err());
        assert!(CliArgs::try_parse_from(["csv-engine", "a.csv", "--filter", "nofilter"]).is_err());
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(CliArgs::try_parse_from(["csv-engine", "a.csv", "--desc"]).is_err());
    }
}
