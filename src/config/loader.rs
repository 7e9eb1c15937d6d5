//! Stage catalog loading
//!
//! The catalog is process-wide read-only reference data: load it once at
//! startup and share it; reload by loading a fresh catalog and swapping the
//! reference, never by mutating in place from request-handling code.

use std::path::Path;

use crate::domain::StageCatalog;
use crate::errors::Result;
use crate::fs;
use crate::schemas::Stage;

/// Load a stage catalog from a JSON file.
///
/// The file holds a flat array of stage objects. Catalog invariants
/// (non-empty, unique ids) are enforced on construction.
///
/// # Errors
/// * `FileNotFound` / `InvalidJson` - File problems
/// * `EmptyCatalog` / `DuplicateStage` - Invariant violations
pub fn load_catalog(path: &Path) -> Result<StageCatalog> {
    let stages: Vec<Stage> = fs::read_json(path)?;
    StageCatalog::new(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_catalog() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stages.json");
        let content = r#"[
            {"id": "s1", "name": "Qualified", "display_order": 1, "stage_type": "progress"},
            {"id": "s2", "name": "Discovery", "display_order": 2, "stage_type": "progress"},
            {"id": "won", "name": "Closed Won", "display_order": 9, "stage_type": "closed_won"},
            {"id": "lost", "name": "Closed Lost", "stage_type": "closed_lost", "active": false}
        ]"#;
        std::fs::write(&path, content).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.active_stages().len(), 3);
        assert!(catalog.stage("lost").is_some());
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stages.json");
        let content = r#"[
            {"id": "s1", "name": "Qualified", "display_order": 1, "stage_type": "progress"},
            {"id": "s1", "name": "Qualified again", "display_order": 2, "stage_type": "progress"}
        ]"#;
        std::fs::write(&path, content).unwrap();
        assert_eq!(load_catalog(&path).unwrap_err().code(), "DUPLICATE_STAGE");
    }

    #[test]
    fn test_load_rejects_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stages.json");
        std::fs::write(&path, "[]").unwrap();
        assert_eq!(load_catalog(&path).unwrap_err().code(), "EMPTY_CATALOG");
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_catalog(&temp.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code(), "FILE_NOT_FOUND");
    }
}
