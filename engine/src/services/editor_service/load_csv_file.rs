// Handler for loading a CSV file into the editor session
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::LoadSummary;
use crate::config::settings::EditorSettings;
use crate::data::csv_parser::parse_csv_async;
use crate::data::session::EditorSession;
use crate::error::EngineError;

/// Progress is logged each time it crosses another quarter.
const PROGRESS_LOG_STEP: f64 = 25.0;

pub async fn handle_load_csv_file(
    path: &Path,
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<LoadSummary, EngineError> {
    let text = tokio::fs::read_to_string(path).await?;
    handle_load_csv_text(&text, session, settings).await
}

pub async fn handle_load_csv_text(
    text: &str,
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<LoadSummary, EngineError> {
    let options = settings.read().await.parse_options();

    let mut next_report = PROGRESS_LOG_STEP;
    let parsed = parse_csv_async(text, options, |progress| {
        if progress >= next_report {
            tracing::info!(progress = progress.round(), "Parsing CSV");
            while next_report <= progress {
                next_report += PROGRESS_LOG_STEP;
            }
        }
    })
    .await;

    let summary = LoadSummary {
        rows: parsed.table.row_count(),
        columns: parsed.table.column_count(),
        delimiter: parsed.delimiter,
    };
    session.write().await.load(parsed);
    Ok(summary)
}
