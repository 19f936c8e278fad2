// Handler for changing and persisting editor preferences
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::PreferencesUpdate;
use crate::config::settings::EditorSettings;
use crate::error::EngineError;

pub async fn handle_update_preferences(
    update: PreferencesUpdate,
    settings: Arc<RwLock<EditorSettings>>,
    settings_path: Option<PathBuf>,
) -> Result<EditorSettings, EngineError> {
    let mut settings = settings.write().await;
    if let Some(currency_format) = update.currency_format {
        settings.currency_format = currency_format;
    }
    if let Some(source_format) = update.source_format {
        settings.source_format = source_format;
    }

    if let Some(path) = settings_path {
        let snapshot = settings.clone();
        tokio::task::spawn_blocking(move || snapshot.save(&path))
            .await
            .map_err(|e| EngineError::ProcessingError(format!("Settings writer task failed: {}", e)))??;
    }
    Ok(settings.clone())
}
