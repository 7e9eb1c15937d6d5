//! Opportunity schema - the mutable pipeline state of one tracked company

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current pipeline state of one opportunity.
///
/// The engine owns every mutation of this snapshot; the surrounding store is
/// the system of record for persistence. All builder methods return a new
/// value and never mutate the original.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpportunityState {
    /// Current stage (None only before the first recorded event)
    #[serde(default)]
    pub stage_id: Option<String>,

    /// Target stage the opportunity is aiming for (None = no goal set)
    #[serde(default)]
    pub target_stage_id: Option<String>,

    /// Date the target should be reached by
    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    /// Date the current target was committed to
    #[serde(default)]
    pub target_set_on: Option<NaiveDate>,

    /// Why the opportunity is on hold (expected while stage is pending)
    #[serde(default)]
    pub pending_reason: Option<String>,

    /// When a pending opportunity expects a response
    #[serde(default)]
    pub pending_response_date: Option<NaiveDate>,

    /// Why the opportunity was lost (expected while stage is closed_lost)
    #[serde(default)]
    pub lost_reason: Option<String>,
}

impl OpportunityState {
    /// Return a new state positioned at the given stage
    pub fn with_stage(mut self, stage_id: impl Into<String>) -> Self {
        self.stage_id = Some(stage_id.into());
        self
    }

    /// Return a new state with the given target stage and date
    pub fn with_target(
        mut self,
        target_stage_id: Option<String>,
        target_date: Option<NaiveDate>,
        set_on: Option<NaiveDate>,
    ) -> Self {
        self.target_stage_id = target_stage_id;
        self.target_date = target_date;
        self.target_set_on = set_on;
        self
    }

    /// Whether any target field is currently set
    pub fn has_target(&self) -> bool {
        self.target_stage_id.is_some() || self.target_date.is_some()
    }
}

/// One proposed change submitted to the engine.
///
/// Carries the full proposed state for the stage axis, the target axis and
/// the reason axis; the detector diffs it against the current
/// `OpportunityState` to decide what actually happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionInput {
    /// Proposed current stage
    pub new_stage_id: String,

    /// Proposed target stage (None = clear / keep unset)
    #[serde(default)]
    pub new_target_stage_id: Option<String>,

    /// Proposed target date
    #[serde(default)]
    pub new_target_date: Option<NaiveDate>,

    /// Free-text note attached to the events of this submission
    #[serde(default)]
    pub note: Option<String>,

    /// Proposed lost-reason text
    #[serde(default)]
    pub lost_reason: Option<String>,

    /// Proposed pending-reason text
    #[serde(default)]
    pub pending_reason: Option<String>,

    /// Proposed pending response date
    #[serde(default)]
    pub pending_response_date: Option<NaiveDate>,

    /// True when the operator has acknowledged previously shown alerts
    #[serde(default)]
    pub acknowledged: bool,
}

impl TransitionInput {
    /// Create an input that only moves the current stage
    pub fn to_stage(new_stage_id: impl Into<String>) -> Self {
        TransitionInput {
            new_stage_id: new_stage_id.into(),
            new_target_stage_id: None,
            new_target_date: None,
            note: None,
            lost_reason: None,
            pending_reason: None,
            pending_response_date: None,
            acknowledged: false,
        }
    }

    /// Return a new input with the given target
    pub fn with_target(
        mut self,
        target_stage_id: Option<String>,
        target_date: Option<NaiveDate>,
    ) -> Self {
        self.new_target_stage_id = target_stage_id;
        self.new_target_date = target_date;
        self
    }

    /// Return a new input with the given note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Return a new input with the acknowledged flag set
    pub fn with_acknowledged(mut self) -> Self {
        self.acknowledged = true;
        self
    }

    /// Whether the proposed note is non-empty after trimming
    pub fn has_note(&self) -> bool {
        self.note.as_deref().map(|n| !n.trim().is_empty()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_do_not_mutate() {
        let state = OpportunityState::default().with_stage("s1");
        let original = state.clone();
        let _updated = state.clone().with_target(
            Some("s3".into()),
            NaiveDate::from_ymd_opt(2026, 9, 1),
            NaiveDate::from_ymd_opt(2026, 8, 1),
        );
        assert_eq!(state, original);
    }

    #[test]
    fn test_has_target() {
        let state = OpportunityState::default().with_stage("s1");
        assert!(!state.has_target());
        let with_date_only =
            state.clone().with_target(None, NaiveDate::from_ymd_opt(2026, 9, 1), None);
        assert!(with_date_only.has_target());
    }

    #[test]
    fn test_has_note_trims_whitespace() {
        let input = TransitionInput::to_stage("s2").with_note("   ");
        assert!(!input.has_note());
        let input = TransitionInput::to_stage("s2").with_note("pushed back by buyer");
        assert!(input.has_note());
    }
}
