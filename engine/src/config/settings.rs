// Editor preferences, persisted as a small JSON document.
use crate::data::csv_parser::{ParseOptions, DEFAULT_CHUNK_SIZE};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use shared::models::{Convention, DisplayLocale};
use std::io::ErrorKind;
use std::path::Path;

/// Default location for persisted preferences.
pub const DEFAULT_SETTINGS_FILE: &str = "csv-editor-settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Locale converted numbers and totals are rendered in.
    pub currency_format: DisplayLocale,
    /// How source cells are read.
    pub source_format: Convention,
    pub chunk_size: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            currency_format: DisplayLocale::PtBr,
            source_format: Convention::Auto,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EditorSettings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let settings: EditorSettings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_size == 0 {
            return Err(EngineError::ConfigError("chunkSize must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            chunk_size: self.chunk_size,
        }
    }
}
