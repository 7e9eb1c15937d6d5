//! Stage schema - pipeline stage reference data

use serde::{Deserialize, Serialize};

/// Classification of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    /// Ordinary progression stage, positioned by display order
    Progress,
    /// Terminal success
    ClosedWon,
    /// Terminal failure
    ClosedLost,
    /// On-hold state outside the linear order
    Pending,
}

impl StageType {
    /// Whether a stage of this type participates in the linear display order.
    ///
    /// ClosedLost and Pending are "side" states: their display order, if any,
    /// carries no ordering meaning.
    pub fn is_ordered(self) -> bool {
        matches!(self, StageType::Progress | StageType::ClosedWon)
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageType::Progress => write!(f, "progress"),
            StageType::ClosedWon => write!(f, "closed_won"),
            StageType::ClosedLost => write!(f, "closed_lost"),
            StageType::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for StageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "progress" => Ok(StageType::Progress),
            "closed_won" => Ok(StageType::ClosedWon),
            "closed_lost" => Ok(StageType::ClosedLost),
            "pending" => Ok(StageType::Pending),
            _ => Err(format!("Unknown stage type: {}", s)),
        }
    }
}

/// One pipeline stage.
///
/// Stages are administrative reference data: created and edited by
/// configuration, never deleted (only deactivated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Unique identifier for the stage
    pub id: String,

    /// Human-readable display name
    pub name: String,

    /// Position in the linear pipeline order (meaningful only for
    /// Progress/ClosedWon stages). None sorts last.
    #[serde(default)]
    pub display_order: Option<i32>,

    /// Stage classification
    pub stage_type: StageType,

    /// Whether the stage is available for new transitions
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Stage {
    /// Create a new active stage
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        display_order: Option<i32>,
        stage_type: StageType,
    ) -> Self {
        Stage {
            id: id.into(),
            name: name.into(),
            display_order,
            stage_type,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_stage_type_roundtrip() {
        for st in [
            StageType::Progress,
            StageType::ClosedWon,
            StageType::ClosedLost,
            StageType::Pending,
        ] {
            assert_eq!(StageType::from_str(&st.to_string()).unwrap(), st);
        }
    }

    #[test]
    fn test_stage_type_unknown() {
        assert!(StageType::from_str("archived").is_err());
    }

    #[test]
    fn test_is_ordered() {
        assert!(StageType::Progress.is_ordered());
        assert!(StageType::ClosedWon.is_ordered());
        assert!(!StageType::ClosedLost.is_ordered());
        assert!(!StageType::Pending.is_ordered());
    }

    #[test]
    fn test_stage_json_defaults() {
        let stage: Stage = serde_json::from_str(
            r#"{"id": "s1", "name": "Qualified", "stage_type": "progress"}"#,
        )
        .unwrap();
        assert!(stage.active);
        assert_eq!(stage.display_order, None);
    }
}
