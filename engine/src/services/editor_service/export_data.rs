// Handlers for writing the edited table as CSV or XLSX
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::helpers::ensure_loaded;
use crate::config::settings::EditorSettings;
use crate::data::csv_writer::CSV_FILE_NAME;
use crate::data::session::EditorSession;
use crate::data::xlsx_export::{write_xlsx, XLSX_FILE_NAME};
use crate::error::EngineError;

pub async fn handle_export_csv(
    out_dir: &Path,
    session: Arc<RwLock<EditorSession>>,
) -> Result<PathBuf, EngineError> {
    let text = {
        let session = session.read().await;
        ensure_loaded(session.table())?;
        session.to_csv()?
    };
    let path = out_dir.join(CSV_FILE_NAME);
    tokio::fs::create_dir_all(out_dir).await?;
    tokio::fs::write(&path, text).await?;
    Ok(path)
}

pub async fn handle_export_xlsx(
    out_dir: &Path,
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<PathBuf, EngineError> {
    let convention = settings.read().await.source_format;
    let sheet = {
        let session = session.read().await;
        ensure_loaded(session.table())?;
        session.to_sheet(convention)
    };
    let path = out_dir.join(XLSX_FILE_NAME);
    tokio::fs::create_dir_all(out_dir).await?;
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_xlsx(&sheet, &target))
        .await
        .map_err(|e| EngineError::ProcessingError(format!("XLSX writer task failed: {}", e)))??;
    Ok(path)
}
