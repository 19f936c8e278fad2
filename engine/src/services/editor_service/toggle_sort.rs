// Handler for header-click sorting
use std::sync::Arc;
use tokio::sync::RwLock;

use super::helpers::{ensure_loaded, resolve_column};
use crate::config::settings::EditorSettings;
use crate::data::session::EditorSession;
use crate::error::EngineError;
use shared::models::SortState;

pub async fn handle_toggle_sort(
    column: &str,
    session: Arc<RwLock<EditorSession>>,
    settings: Arc<RwLock<EditorSettings>>,
) -> Result<SortState, EngineError> {
    let convention = settings.read().await.source_format;
    let mut session = session.write().await;
    ensure_loaded(session.table())?;
    let index = resolve_column(session.table(), column)?;
    session.toggle_sort(index, convention)
}
