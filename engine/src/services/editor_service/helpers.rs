// Helper functions shared by the editor service handlers
use crate::error::EngineError;
use shared::models::Table;

/// Resolves a column given either as a zero-based index or an exact header.
pub fn resolve_column(table: &Table, key: &str) -> Result<usize, EngineError> {
    table
        .resolve_column(key)
        .ok_or_else(|| EngineError::ColumnNotFound(key.to_string()))
}

pub fn resolve_columns<S: AsRef<str>>(table: &Table, keys: &[S]) -> Result<Vec<usize>, EngineError> {
    keys.iter().map(|key| resolve_column(table, key.as_ref())).collect()
}

pub fn ensure_loaded(table: &Table) -> Result<(), EngineError> {
    if table.headers.is_empty() {
        return Err(EngineError::NoTableLoaded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Produto".to_string(), "Preço".to_string(), "2".to_string()],
            vec![],
        )
    }

    #[test]
    fn test_resolve_by_index_and_header() {
        let table = table();
        assert_eq!(resolve_columns(&table, &["1", "Produto"]).unwrap(), vec![1, 0]);
        assert_eq!(resolve_column(&table, "Preço").unwrap(), 1);
    }

    #[test]
    fn test_resolve_unknown_column() {
        let err = resolve_column(&table(), "Total").unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound(ref key) if key == "Total"));
    }

    #[test]
    fn test_ensure_loaded() {
        assert!(matches!(ensure_loaded(&Table::default()), Err(EngineError::NoTableLoaded)));
        assert!(ensure_loaded(&table()).is_ok());
    }
}
