// engine/src/services/editor_service/mod.rs
// CsvEditorService and its handler submodules.

use crate::config::settings::EditorSettings;
use crate::data::session::EditorSession;
use crate::error::EngineError;
use shared::models::{Convention, Delimiter, DisplayLocale, SortState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod column_sums;
pub mod convert_columns;
pub mod export_data;
pub mod helpers;
pub mod load_csv_file;
pub mod toggle_sort;
pub mod update_preferences;

/// What a load produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub columns: usize,
    pub delimiter: Delimiter,
}

/// Preference changes; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub currency_format: Option<DisplayLocale>,
    pub source_format: Option<Convention>,
}

pub struct CsvEditorService {
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
    settings_path: Option<PathBuf>,
}

impl CsvEditorService {
    pub fn new(session: Arc<RwLock<EditorSession>>, settings: Arc<RwLock<EditorSettings>>) -> Self {
        CsvEditorService {
            session,
            settings,
            settings_path: None,
        }
    }

    /// Preference updates are saved to `path` from now on.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn session(&self) -> Arc<RwLock<EditorSession>> {
        self.session.clone()
    }

    pub async fn settings(&self) -> EditorSettings {
        self.settings.read().await.clone()
    }

    pub async fn load_csv_file(&self, path: &Path) -> Result<LoadSummary, EngineError> {
        tracing::info!(path = %path.display(), "Loading CSV file");
        let summary =
            load_csv_file::handle_load_csv_file(path, self.session.clone(), self.settings.clone()).await?;
        tracing::info!(
            rows = summary.rows,
            columns = summary.columns,
            delimiter = ?summary.delimiter,
            "CSV file loaded"
        );
        Ok(summary)
    }

    pub async fn load_csv_text(&self, text: &str) -> Result<LoadSummary, EngineError> {
        tracing::info!(bytes = text.len(), "Loading CSV text");
        load_csv_file::handle_load_csv_text(text, self.session.clone(), self.settings.clone()).await
    }

    /// `columns` are zero-based indexes or header names. Returns the number
    /// of cells rewritten.
    pub async fn convert_columns(&self, columns: &[String]) -> Result<usize, EngineError> {
        tracing::info!(?columns, "Converting columns");
        convert_columns::handle_convert_columns(columns, self.session.clone(), self.settings.clone()).await
    }

    pub async fn toggle_sort(&self, column: &str) -> Result<SortState, EngineError> {
        tracing::info!(column, "Toggling sort");
        toggle_sort::handle_toggle_sort(column, self.session.clone(), self.settings.clone()).await
    }

    /// Sets one column filter and returns the indexes of the rows left visible.
    pub async fn set_filter(&self, column: &str, text: &str) -> Result<Vec<usize>, EngineError> {
        tracing::info!(column, filter = text, "Setting column filter");
        column_sums::handle_set_filter(column, text, self.session.clone()).await
    }

    /// Footer totals in the current display locale, empty for text columns.
    pub async fn column_sums(&self) -> Result<Vec<String>, EngineError> {
        column_sums::handle_column_sums(self.session.clone(), self.settings.clone()).await
    }

    pub async fn export_csv(&self, out_dir: &Path) -> Result<PathBuf, EngineError> {
        let path = export_data::handle_export_csv(out_dir, self.session.clone()).await?;
        tracing::info!(path = %path.display(), "Exported CSV");
        Ok(path)
    }

    pub async fn export_xlsx(&self, out_dir: &Path) -> Result<PathBuf, EngineError> {
        let path = export_data::handle_export_xlsx(out_dir, self.session.clone(), self.settings.clone()).await?;
        tracing::info!(path = %path.display(), "Exported XLSX");
        Ok(path)
    }

    pub async fn update_preferences(&self, update: PreferencesUpdate) -> Result<EditorSettings, EngineError> {
        tracing::info!(
            currency_format = ?update.currency_format,
            source_format = ?update.source_format,
            "Updating preferences"
        );
        update_preferences::handle_update_preferences(update, self.settings.clone(), self.settings_path.clone())
            .await
    }
}
