// Handlers for the filter row and the totals footer
use std::sync::Arc;
use tokio::sync::RwLock;

use super::helpers::{ensure_loaded, resolve_column};
use crate::config::settings::EditorSettings;
use crate::data::session::EditorSession;
use crate::error::EngineError;

pub async fn handle_column_sums(
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<Vec<String>, EngineError> {
    let (convention, display) = {
        let settings = settings.read().await;
        (settings.source_format, settings.currency_format)
    };
    let session = session.read().await;
    ensure_loaded(session.table())?;
    Ok(session.formatted_sums(convention, display))
}

pub async fn handle_set_filter(
    column: &str,
    text: &str,
    session: Arc<RwLock<EditorSession>>,
) -> Result<Vec<usize>, EngineError> {
    let mut session = session.write().await;
    ensure_loaded(session.table())?;
    let index = resolve_column(session.table(), column)?;
    session.set_filter(index, text)?;
    Ok(session.visible_rows())
}
