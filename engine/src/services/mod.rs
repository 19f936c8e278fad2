// In-process editor service. Handlers live in one submodule each.
pub mod editor_service;

pub use editor_service::{CsvEditorService, LoadSummary, PreferencesUpdate};
