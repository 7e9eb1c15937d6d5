//! Transition planning and application
//!
//! Pure driver for one submission: detect events, validate them, gate the
//! commit on alert severity and acknowledgement, and produce the next
//! opportunity snapshot. Never mutates its inputs; the caller persists the
//! returned state and appends the planned events inside one transaction.
//! Abandoning a plan before commit leaves no partial state anywhere.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::catalog::StageCatalog;
use crate::domain::detector::{detect_events, detect_initial_events, DetectedChanges};
use crate::domain::validation::{validate, ValidationContext};
use crate::errors::{DealflowError, Result};
use crate::schemas::{
    EventType, HistoryEntry, OpportunityState, StageType, TransitionInput, ValidationReport,
};

/// What the caller may do with a planned transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// An error alert is present; commit must never proceed
    Blocked,
    /// Warnings/infos must be shown to the operator and acknowledged
    /// (with a non-empty note where required) before resubmission
    NeedsAcknowledgement {
        /// True when at least one alert demands an explanatory note
        note_required: bool,
    },
    /// No outstanding alerts; the plan may be committed as-is
    Ready,
}

/// One validated, not-yet-committed transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    /// Events this submission will record
    pub detected: DetectedChanges,
    /// Alerts produced by the rule set
    pub report: ValidationReport,
}

impl TransitionPlan {
    /// Decide what the caller may do with this plan.
    ///
    /// Acknowledgement never unblocks an error; it only unlocks warnings and
    /// infos, and only together with a note when one is required.
    pub fn outcome(&self, input: &TransitionInput) -> TransitionOutcome {
        if !self.report.is_valid() {
            return TransitionOutcome::Blocked;
        }
        if self.report.is_empty() {
            return TransitionOutcome::Ready;
        }
        let note_required = self.report.requires_note();
        if !input.acknowledged || (note_required && !input.has_note()) {
            return TransitionOutcome::NeedsAcknowledgement { note_required };
        }
        TransitionOutcome::Ready
    }

    /// Fail fast unless the plan is ready to commit.
    ///
    /// # Errors
    /// * `Blocked` - An error alert is present (regardless of acknowledgement)
    /// * `NoteRequired` - A warning demands a note and none was supplied
    /// * `AcknowledgementRequired` - Alerts were not acknowledged
    pub fn ensure_committable(&self, input: &TransitionInput) -> Result<()> {
        match self.outcome(input) {
            TransitionOutcome::Ready => Ok(()),
            TransitionOutcome::Blocked => {
                let first_error = self
                    .report
                    .alerts
                    .first()
                    .map(|a| a.message.clone())
                    .unwrap_or_default();
                Err(DealflowError::Blocked(first_error))
            }
            TransitionOutcome::NeedsAcknowledgement { note_required: true }
                if input.acknowledged =>
            {
                Err(DealflowError::NoteRequired(
                    "an alert on this change requires an explanatory note".into(),
                ))
            }
            TransitionOutcome::NeedsAcknowledgement { .. } => {
                Err(DealflowError::AcknowledgementRequired(
                    "alerts on this change must be acknowledged by the operator".into(),
                ))
            }
        }
    }
}

/// Plan an update to an existing opportunity.
///
/// # Errors
/// * `NoChanges` - The submission is a no-op (caller bug or duplicate submit)
/// * `MissingCurrentStage` / `UnknownStage` - Structural input failures
pub fn plan_transition(
    state: &OpportunityState,
    input: &TransitionInput,
    catalog: &StageCatalog,
    history: &[HistoryEntry],
    today: NaiveDate,
) -> Result<TransitionPlan> {
    let detected = detect_events(state, input, catalog)?;
    if !detected.has_changes() {
        return Err(DealflowError::NoChanges(
            "every proposed field equals the current state".into(),
        ));
    }
    let report = validate(&ValidationContext {
        state,
        input,
        detected: &detected,
        catalog,
        history,
        is_new_record: false,
        today,
    })?;
    debug!(
        events = detected.events.len(),
        alerts = report.alerts.len(),
        valid = report.is_valid(),
        "planned transition"
    );
    Ok(TransitionPlan { detected, report })
}

/// Plan the creation of a brand-new opportunity.
///
/// Runs exactly once per opportunity lifetime; the general path takes over
/// afterwards.
pub fn plan_initial(
    input: &TransitionInput,
    catalog: &StageCatalog,
    today: NaiveDate,
) -> Result<TransitionPlan> {
    let detected = detect_initial_events(input, catalog)?;
    let blank = OpportunityState::default();
    let report = validate(&ValidationContext {
        state: &blank,
        input,
        detected: &detected,
        catalog,
        history: &[],
        is_new_record: true,
        today,
    })?;
    Ok(TransitionPlan { detected, report })
}

/// Produce the next opportunity snapshot for a committable plan.
///
/// The input state is never mutated. Target fields are cleared when the
/// goal was achieved (with no replacement) or the opportunity closed won or
/// lost; a suspension keeps the stored goal so the opportunity can resume
/// toward it. Reason fields track the side state the opportunity will be in.
///
/// # Errors
/// Same gating errors as [`TransitionPlan::ensure_committable`], plus
/// `UnknownStage` if the catalog went stale.
pub fn apply(
    plan: &TransitionPlan,
    state: &OpportunityState,
    input: &TransitionInput,
    catalog: &StageCatalog,
    today: NaiveDate,
) -> Result<OpportunityState> {
    plan.ensure_committable(input)?;
    let proposed = catalog.require(&input.new_stage_id)?;

    let mut next = state.clone();
    next.stage_id = Some(input.new_stage_id.clone());

    let committed = plan.detected.contains(EventType::Commit)
        || plan.detected.contains(EventType::Recommit);
    let cleared = plan.detected.contains(EventType::Achieved)
        || plan.detected.contains(EventType::Won)
        || plan.detected.contains(EventType::Lost);
    let suspended = plan.detected.contains(EventType::Suspended);
    if committed {
        next.target_stage_id = input.new_target_stage_id.clone();
        next.target_date = input.new_target_date;
        next.target_set_on = Some(today);
    } else if cleared {
        next.target_stage_id = None;
        next.target_date = None;
        next.target_set_on = None;
    } else if suspended {
        // keep the stored goal; the form blanking its target fields on the
        // way to hold is not a cancellation
    } else {
        next.target_stage_id = input.new_target_stage_id.clone();
        next.target_date = input.new_target_date;
        if !next.has_target() {
            next.target_set_on = None;
        }
    }

    if proposed.stage_type == StageType::ClosedLost {
        next.lost_reason = input.lost_reason.clone();
    }
    if proposed.stage_type == StageType::Pending {
        next.pending_reason = input.pending_reason.clone();
        next.pending_response_date = input.pending_response_date;
    }

    Ok(next)
}
