// Handler for rewriting numeric columns in the display locale
use std::sync::Arc;
use tokio::sync::RwLock;

use super::helpers::{ensure_loaded, resolve_columns};
use crate::config::settings::EditorSettings;
use crate::data::session::EditorSession;
use crate::error::EngineError;

pub async fn handle_convert_columns(
    columns: &[String],
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<usize, EngineError> {
    let (convention, display_locale) = {
        let settings = settings.read().await;
        (settings.source_format, settings.currency_format)
    };

    let mut session = session.write().await;
    ensure_loaded(session.table())?;
    let indexes = resolve_columns(session.table(), columns)?;
    let converted = session.convert_columns(&indexes, convention, display_locale)?;
    tracing::debug!(?indexes, converted, locale = %display_locale, "Converted columns");
    Ok(converted)
}
