//! Stage catalog - the ordered reference set of pipeline stages
//!
//! The catalog is read-only per operation: tens of rows loaded wholesale,
//! safe to share across opportunities. All ordering logic lives here so the
//! classifier and validator agree on what "ahead" means.

use crate::errors::{DealflowError, Result};
use crate::schemas::Stage;

/// Read-only, in-memory set of pipeline stages.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

impl StageCatalog {
    /// Build a catalog, rejecting empty input and duplicate ids.
    ///
    /// # Errors
    /// * `EmptyCatalog` - If no stages are supplied
    /// * `DuplicateStage` - If two stages share an id
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            return Err(DealflowError::EmptyCatalog);
        }
        let mut seen = std::collections::HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(DealflowError::DuplicateStage(stage.id.clone()));
            }
        }
        Ok(StageCatalog { stages })
    }

    /// Look up a stage by id, including inactive stages.
    ///
    /// Historical entries may reference stages that have since been
    /// deactivated, so lookup never filters on the active flag.
    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Look up a stage by id, failing fast on an unknown id.
    ///
    /// An unknown id indicates a caller bug (stale catalog), not a domain
    /// rule violation.
    pub fn require(&self, id: &str) -> Result<&Stage> {
        self.stage(id).ok_or_else(|| DealflowError::UnknownStage(id.to_string()))
    }

    /// Look up a stage a submission wants to move to or newly aim at.
    ///
    /// Deactivated stages stay resolvable through `require` for historical
    /// references, but may not receive new traffic.
    ///
    /// # Errors
    /// * `UnknownStage` - If the id is missing from the catalog
    /// * `InactiveStage` - If the stage has been deactivated
    pub fn require_active(&self, id: &str) -> Result<&Stage> {
        let stage = self.require(id)?;
        if !stage.active {
            return Err(DealflowError::InactiveStage(id.to_string()));
        }
        Ok(stage)
    }

    /// Active stages sorted for display: display order ascending, None last,
    /// ties broken by id ascending.
    pub fn active_stages(&self) -> Vec<&Stage> {
        let mut active: Vec<&Stage> = self.stages.iter().filter(|s| s.active).collect();
        active.sort_by(|a, b| {
            match (a.display_order, b.display_order) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            }
        });
        active
    }

    /// Display order of a stage, if it has one
    pub fn order_of(&self, id: &str) -> Result<Option<i32>> {
        Ok(self.require(id)?.display_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::StageType;

    fn sample_stages() -> Vec<Stage> {
        vec![
            Stage::new("s3", "Proposal", Some(3), StageType::Progress),
            Stage::new("s1", "Qualified", Some(1), StageType::Progress),
            Stage::new("won", "Closed Won", Some(9), StageType::ClosedWon),
            Stage::new("lost", "Closed Lost", None, StageType::ClosedLost),
            Stage::new("hold", "On Hold", None, StageType::Pending),
            Stage::new("s2", "Discovery", Some(2), StageType::Progress),
        ]
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(StageCatalog::new(vec![]).unwrap_err().code(), "EMPTY_CATALOG");
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut stages = sample_stages();
        stages.push(Stage::new("s1", "Qualified again", Some(7), StageType::Progress));
        assert_eq!(StageCatalog::new(stages).unwrap_err().code(), "DUPLICATE_STAGE");
    }

    #[test]
    fn test_active_stages_sorted() {
        let catalog = StageCatalog::new(sample_stages()).unwrap();
        let ids: Vec<&str> = catalog.active_stages().iter().map(|s| s.id.as_str()).collect();
        // ordered stages first, None orders last tie-broken by id
        assert_eq!(ids, vec!["s1", "s2", "s3", "won", "hold", "lost"]);
    }

    #[test]
    fn test_inactive_excluded_from_listing_but_still_resolvable() {
        let mut stages = sample_stages();
        stages[1].active = false; // s1
        let catalog = StageCatalog::new(stages).unwrap();
        assert!(catalog.active_stages().iter().all(|s| s.id != "s1"));
        assert!(catalog.stage("s1").is_some());
        assert!(catalog.require("s1").is_ok());
        assert_eq!(catalog.require_active("s1").unwrap_err().code(), "INACTIVE_STAGE");
    }

    #[test]
    fn test_require_unknown() {
        let catalog = StageCatalog::new(sample_stages()).unwrap();
        assert_eq!(catalog.require("nope").unwrap_err().code(), "UNKNOWN_STAGE");
    }
}
