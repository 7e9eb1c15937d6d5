//! Event detection
//!
//! Expands one submitted change into the discrete events the ledger will
//! record. A single submission can touch three independent axes: the stage
//! axis (where the opportunity is), the target axis (where it is aiming),
//! and the reason axis (why it is lost or on hold).
//!
//! Both axes are computed in a single pass and the achievement-absorption
//! rule is applied as an explicit suppression step, so the invariant "an
//! achieved stage change never co-emits a target-axis event for the implicit
//! clearing" is enforced in one place.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::catalog::StageCatalog;
use crate::domain::classifier::{classify, ChangeType};
use crate::errors::{DealflowError, Result};
use crate::schemas::{EventType, OpportunityState, RecommitScope, StageType, TransitionInput};

/// One detected, independently loggable event
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEvent {
    /// What happened
    pub event_type: EventType,
    /// Stage before the change (stage-axis events; None on the initial event)
    pub from_stage_id: Option<String>,
    /// Stage after the change (stage-axis events)
    pub to_stage_id: Option<String>,
    /// Target stage recorded by a target-axis event
    pub target_stage_id: Option<String>,
    /// Target date recorded by a target-axis event
    pub target_date: Option<NaiveDate>,
    /// Note supplied with the submission
    pub note: Option<String>,
    /// Lost-reason snapshot at event time
    pub lost_reason: Option<String>,
    /// Pending-reason snapshot at event time
    pub pending_reason: Option<String>,
    /// Set only on Recommit events
    pub recommit_scope: Option<RecommitScope>,
}

impl DetectedEvent {
    pub(crate) fn bare(event_type: EventType) -> Self {
        DetectedEvent {
            event_type,
            from_stage_id: None,
            to_stage_id: None,
            target_stage_id: None,
            target_date: None,
            note: None,
            lost_reason: None,
            pending_reason: None,
            recommit_scope: None,
        }
    }
}

/// Result of one detection pass
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedChanges {
    /// Events in axis order: stage, then target, then reason
    pub events: Vec<DetectedEvent>,
}

impl DetectedChanges {
    /// True iff at least one event was produced on any axis
    pub fn has_changes(&self) -> bool {
        !self.events.is_empty()
    }

    /// True iff an event of the given type is present
    pub fn contains(&self, event_type: EventType) -> bool {
        self.events.iter().any(|e| e.event_type == event_type)
    }
}

/// Map a stage-change classification onto the event it records.
fn stage_event_type(change: ChangeType) -> Option<EventType> {
    match change {
        ChangeType::None => None,
        ChangeType::Achieved => Some(EventType::Achieved),
        ChangeType::Progress => Some(EventType::Progress),
        ChangeType::Back => Some(EventType::Back),
        ChangeType::Won => Some(EventType::Won),
        ChangeType::Lost => Some(EventType::Lost),
        ChangeType::Suspended => Some(EventType::Suspended),
        ChangeType::Resumed => Some(EventType::Resumed),
        ChangeType::Revived => Some(EventType::Revived),
    }
}

/// Trimmed, empty-as-None view of a reason/note field
fn normalize(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Detect the events for the creation of a brand-new opportunity.
///
/// Produces a `progress` event (from = None) for the initial stage, and a
/// `commit` event when a target stage and/or date is supplied alongside it.
/// Used exactly once per opportunity lifetime.
pub fn detect_initial_events(
    input: &TransitionInput,
    catalog: &StageCatalog,
) -> Result<DetectedChanges> {
    let stage = catalog.require_active(&input.new_stage_id)?;
    if let Some(target_id) = input.new_target_stage_id.as_deref() {
        catalog.require_active(target_id)?;
    }

    let mut events = Vec::new();

    let mut initial = DetectedEvent::bare(EventType::Progress);
    initial.to_stage_id = Some(stage.id.clone());
    initial.note = normalize(input.note.as_deref()).map(str::to_owned);
    initial.lost_reason = normalize(input.lost_reason.as_deref()).map(str::to_owned);
    initial.pending_reason = normalize(input.pending_reason.as_deref()).map(str::to_owned);
    events.push(initial);

    if input.new_target_stage_id.is_some() || input.new_target_date.is_some() {
        let mut commit = DetectedEvent::bare(EventType::Commit);
        commit.target_stage_id = input.new_target_stage_id.clone();
        commit.target_date = input.new_target_date;
        events.push(commit);
    }

    debug!(stage = %stage.id, events = events.len(), "detected initial events");
    Ok(DetectedChanges { events })
}

/// Detect the events for an update to an existing opportunity.
///
/// The stage axis and the target axis are evaluated independently and a
/// single submission may emit on both; the reason axis fires only while the
/// relevant side state stays active (a reason edit submitted from any other
/// stage is ignored). `has_changes()` on the result is false for a no-op
/// submission, which callers must reject before validation.
///
/// # Errors
/// * `MissingCurrentStage` - If the state has no current stage (use the
///   initial path instead)
/// * `UnknownStage` - If any referenced stage id is absent from the catalog
/// * `InactiveStage` - If the submission moves to, or newly targets, a
///   deactivated stage. The current stage and an unchanged echoed target may
///   reference deactivated stages; existing opportunities always keep a way
///   out.
pub fn detect_events(
    state: &OpportunityState,
    input: &TransitionInput,
    catalog: &StageCatalog,
) -> Result<DetectedChanges> {
    let current_stage_id =
        state.stage_id.as_deref().ok_or(DealflowError::MissingCurrentStage)?;
    let current_type = catalog.require(current_stage_id)?.stage_type;
    let proposed_type = if input.new_stage_id == current_stage_id {
        catalog.require(&input.new_stage_id)?.stage_type
    } else {
        catalog.require_active(&input.new_stage_id)?.stage_type
    };
    if let Some(target_id) = input.new_target_stage_id.as_deref() {
        if state.target_stage_id.as_deref() == Some(target_id) {
            catalog.require(target_id)?;
        } else {
            catalog.require_active(target_id)?;
        }
    }

    let mut events = Vec::new();

    // Stage axis.
    let change = classify(
        current_stage_id,
        &input.new_stage_id,
        state.target_stage_id.as_deref(),
        catalog,
    )?;
    if let Some(event_type) = stage_event_type(change) {
        let mut event = DetectedEvent::bare(event_type);
        event.from_stage_id = Some(current_stage_id.to_string());
        event.to_stage_id = Some(input.new_stage_id.clone());
        event.note = normalize(input.note.as_deref()).map(str::to_owned);
        if proposed_type == StageType::ClosedLost {
            event.lost_reason = normalize(input.lost_reason.as_deref()).map(str::to_owned);
        }
        if proposed_type == StageType::Pending {
            event.pending_reason =
                normalize(input.pending_reason.as_deref()).map(str::to_owned);
        }
        events.push(event);
    }

    // Target axis. Reaching the recorded target clears it implicitly, so an
    // achieved change evaluates the axis as if no target were set: only a
    // genuinely new goal emits (as a fresh commit), and the clearing itself
    // emits nothing. A form that resubmits the reached goal verbatim is
    // treated as "no new goal", not as a fresh commit.
    let achieved = change == ChangeType::Achieved;
    let resubmitted_same = input.new_target_stage_id.as_deref()
        == state.target_stage_id.as_deref()
        && input.new_target_date == state.target_date;
    let (old_target_stage, old_target_date) = if achieved {
        (None, None)
    } else {
        (state.target_stage_id.as_deref(), state.target_date)
    };
    let (new_target_stage, new_target_date) = if achieved && resubmitted_same {
        (None, None)
    } else {
        (input.new_target_stage_id.as_deref(), input.new_target_date)
    };
    let was_set = old_target_stage.is_some() || old_target_date.is_some();
    let now_set = new_target_stage.is_some() || new_target_date.is_some();
    let stage_changed = old_target_stage != new_target_stage;
    let date_changed = old_target_date != new_target_date;

    if !was_set && now_set {
        let mut event = DetectedEvent::bare(EventType::Commit);
        event.target_stage_id = new_target_stage.map(str::to_owned);
        event.target_date = new_target_date;
        events.push(event);
    } else if was_set && now_set && (stage_changed || date_changed) {
        let mut event = DetectedEvent::bare(EventType::Recommit);
        event.target_stage_id = new_target_stage.map(str::to_owned);
        event.target_date = new_target_date;
        event.recommit_scope = Some(match (stage_changed, date_changed) {
            (true, true) => RecommitScope::Both,
            (true, false) => RecommitScope::Stage,
            (false, true) => RecommitScope::Date,
            (false, false) => unreachable!("guarded by stage_changed || date_changed"),
        });
        events.push(event);
    } else if was_set && !now_set {
        // Clearing the goal while closing or suspending is part of the
        // close, not a cancellation the operator performed.
        let closing = matches!(
            change,
            ChangeType::Won | ChangeType::Lost | ChangeType::Suspended
        );
        if !closing {
            events.push(DetectedEvent::bare(EventType::Cancel));
        }
    }

    // Reason axis: compared only while the relevant side state stays active.
    // A transition *into* the side state carries its reason on the stage
    // event instead; a dormant edit from an unrelated stage is ignored.
    if current_type == StageType::ClosedLost && proposed_type == StageType::ClosedLost {
        let old = normalize(state.lost_reason.as_deref());
        let new = normalize(input.lost_reason.as_deref());
        if old != new {
            let mut event = DetectedEvent::bare(EventType::ReasonUpdated);
            event.lost_reason = new.map(str::to_owned);
            events.push(event);
        }
    }
    if current_type == StageType::Pending && proposed_type == StageType::Pending {
        let old = normalize(state.pending_reason.as_deref());
        let new = normalize(input.pending_reason.as_deref());
        if old != new {
            let mut event = DetectedEvent::bare(EventType::ReasonUpdated);
            event.pending_reason = new.map(str::to_owned);
            events.push(event);
        }
    }

    debug!(
        from = current_stage_id,
        to = %input.new_stage_id,
        events = events.len(),
        "detected events"
    );
    Ok(DetectedChanges { events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::Stage;
    use chrono::NaiveDate;

    fn catalog() -> StageCatalog {
        StageCatalog::new(vec![
            Stage::new("s1", "Qualified", Some(1), StageType::Progress),
            Stage::new("s2", "Discovery", Some(2), StageType::Progress),
            Stage::new("s3", "Proposal", Some(3), StageType::Progress),
            Stage::new("s4", "Negotiation", Some(4), StageType::Progress),
            Stage::new("won", "Closed Won", Some(9), StageType::ClosedWon),
            Stage::new("lost", "Closed Lost", None, StageType::ClosedLost),
            Stage::new("hold", "On Hold", None, StageType::Pending),
        ])
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(stage: &str) -> OpportunityState {
        OpportunityState::default().with_stage(stage)
    }

    #[test]
    fn test_noop_yields_no_events() {
        let state = at("s2");
        let input = TransitionInput::to_stage("s2");
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert!(!detected.has_changes());
        assert!(detected.events.is_empty());
    }

    #[test]
    fn test_plain_forward_move() {
        let state = at("s1");
        let input = TransitionInput::to_stage("s2");
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        let event = &detected.events[0];
        assert_eq!(event.event_type, EventType::Progress);
        assert_eq!(event.from_stage_id.as_deref(), Some("s1"));
        assert_eq!(event.to_stage_id.as_deref(), Some("s2"));
    }

    #[test]
    fn test_stage_and_target_axes_in_one_submission() {
        let state = at("s1");
        let input = TransitionInput::to_stage("s2")
            .with_target(Some("s4".into()), Some(date(2026, 10, 1)));
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        let types: Vec<EventType> = detected.events.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::Progress, EventType::Commit]);
        assert_eq!(detected.events[1].target_stage_id.as_deref(), Some("s4"));
    }

    #[test]
    fn test_recommit_scopes() {
        let base = at("s2").with_target(
            Some("s3".into()),
            Some(date(2026, 9, 1)),
            Some(date(2026, 8, 1)),
        );

        let stage_only = TransitionInput::to_stage("s2")
            .with_target(Some("s4".into()), Some(date(2026, 9, 1)));
        let detected = detect_events(&base, &stage_only, &catalog()).unwrap();
        assert_eq!(detected.events[0].event_type, EventType::Recommit);
        assert_eq!(detected.events[0].recommit_scope, Some(RecommitScope::Stage));

        let date_only = TransitionInput::to_stage("s2")
            .with_target(Some("s3".into()), Some(date(2026, 11, 15)));
        let detected = detect_events(&base, &date_only, &catalog()).unwrap();
        assert_eq!(detected.events[0].recommit_scope, Some(RecommitScope::Date));

        let both = TransitionInput::to_stage("s2")
            .with_target(Some("s4".into()), Some(date(2026, 11, 15)));
        let detected = detect_events(&base, &both, &catalog()).unwrap();
        assert_eq!(detected.events[0].recommit_scope, Some(RecommitScope::Both));
    }

    #[test]
    fn test_unchanged_target_emits_nothing() {
        let state = at("s2").with_target(Some("s3".into()), Some(date(2026, 9, 1)), None);
        let input = TransitionInput::to_stage("s2")
            .with_target(Some("s3".into()), Some(date(2026, 9, 1)));
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert!(!detected.has_changes());
    }

    #[test]
    fn test_cancel_on_cleared_target() {
        let state = at("s2").with_target(Some("s3".into()), None, None);
        let input = TransitionInput::to_stage("s2");
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Cancel);
    }

    #[test]
    fn test_achievement_absorbs_target_clearing() {
        // progress order 2, target order 4, move straight to order 4
        let state = at("s2").with_target(Some("s4".into()), Some(date(2026, 9, 1)), None);
        let input = TransitionInput::to_stage("s4");
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Achieved);
        assert!(!detected.contains(EventType::Cancel));
        assert!(!detected.contains(EventType::Recommit));
    }

    #[test]
    fn test_achievement_consumes_resubmitted_goal() {
        // the form resubmits the reached goal verbatim; that is not a fresh
        // commit of the same target
        let state = at("s2").with_target(Some("s4".into()), Some(date(2026, 9, 1)), None);
        let input = TransitionInput::to_stage("s4")
            .with_target(Some("s4".into()), Some(date(2026, 9, 1)));
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Achieved);
    }

    #[test]
    fn test_achievement_with_fresh_goal_commits() {
        let state = at("s2").with_target(Some("s3".into()), None, None);
        let input = TransitionInput::to_stage("s3").with_target(Some("won".into()), None);
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        let types: Vec<EventType> = detected.events.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::Achieved, EventType::Commit]);
    }

    #[test]
    fn test_closing_suppresses_cancel() {
        let state = at("s3").with_target(Some("s4".into()), Some(date(2026, 9, 1)), None);
        let input = TransitionInput::to_stage("won");
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Won);

        let mut lost_input = TransitionInput::to_stage("lost");
        lost_input.lost_reason = Some("chose competitor".into());
        let detected = detect_events(&state, &lost_input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Lost);
        assert_eq!(detected.events[0].lost_reason.as_deref(), Some("chose competitor"));
    }

    #[test]
    fn test_reason_edit_while_lost() {
        let mut state = at("lost");
        state.lost_reason = Some("no budget".into());
        let mut input = TransitionInput::to_stage("lost");
        input.lost_reason = Some("budget moved to next year".into());
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::ReasonUpdated);
        assert_eq!(
            detected.events[0].lost_reason.as_deref(),
            Some("budget moved to next year")
        );
    }

    #[test]
    fn test_dormant_reason_edit_is_ignored() {
        // editing a lost-reason while the opportunity sits in a progress
        // stage is silently dropped
        let mut state = at("s2");
        state.lost_reason = Some("stale text".into());
        let mut input = TransitionInput::to_stage("s2");
        input.lost_reason = Some("different text".into());
        let detected = detect_events(&state, &input, &catalog()).unwrap();
        assert!(!detected.has_changes());
    }

    #[test]
    fn test_initial_events() {
        let input = TransitionInput::to_stage("s1")
            .with_target(Some("s3".into()), Some(date(2026, 12, 1)));
        let detected = detect_initial_events(&input, &catalog()).unwrap();
        let types: Vec<EventType> = detected.events.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::Progress, EventType::Commit]);
        assert_eq!(detected.events[0].from_stage_id, None);
        assert_eq!(detected.events[0].to_stage_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_initial_without_target_is_single_event() {
        let input = TransitionInput::to_stage("s1");
        let detected = detect_initial_events(&input, &catalog()).unwrap();
        assert_eq!(detected.events.len(), 1);
        assert_eq!(detected.events[0].event_type, EventType::Progress);
    }

    #[test]
    fn test_missing_current_stage_fails_fast() {
        let state = OpportunityState::default();
        let input = TransitionInput::to_stage("s2");
        let err = detect_events(&state, &input, &catalog()).unwrap_err();
        assert_eq!(err.code(), "MISSING_CURRENT_STAGE");
    }

    #[test]
    fn test_deactivated_stage_rejects_new_traffic_only() {
        let mut retired = Stage::new("s5", "Legacy Review", Some(5), StageType::Progress);
        retired.active = false;
        let catalog = StageCatalog::new(vec![
            Stage::new("s1", "Qualified", Some(1), StageType::Progress),
            Stage::new("s2", "Discovery", Some(2), StageType::Progress),
            retired,
        ])
        .unwrap();

        let err =
            detect_events(&at("s1"), &TransitionInput::to_stage("s5"), &catalog).unwrap_err();
        assert_eq!(err.code(), "INACTIVE_STAGE");

        let aiming = TransitionInput::to_stage("s2").with_target(Some("s5".into()), None);
        let err = detect_events(&at("s1"), &aiming, &catalog).unwrap_err();
        assert_eq!(err.code(), "INACTIVE_STAGE");

        let err = detect_initial_events(&TransitionInput::to_stage("s5"), &catalog).unwrap_err();
        assert_eq!(err.code(), "INACTIVE_STAGE");

        // an opportunity stranded in the retired stage can still move out
        let detected =
            detect_events(&at("s5"), &TransitionInput::to_stage("s2"), &catalog).unwrap();
        assert_eq!(detected.events[0].event_type, EventType::Back);

        // an unchanged echoed target pointing at the retired stage stays valid
        let state = at("s1").with_target(Some("s5".into()), None, None);
        let echo = TransitionInput::to_stage("s2").with_target(Some("s5".into()), None);
        let detected = detect_events(&state, &echo, &catalog).unwrap();
        assert_eq!(detected.events[0].event_type, EventType::Progress);
        assert_eq!(detected.events.len(), 1);
    }

    #[test]
    fn test_unknown_target_stage_fails_fast() {
        let state = at("s1");
        let input = TransitionInput::to_stage("s2").with_target(Some("ghost".into()), None);
        let err = detect_events(&state, &input, &catalog()).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_STAGE");
    }
}
