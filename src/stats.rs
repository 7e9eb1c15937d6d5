//! Derived pipeline statistics
//!
//! Pure reshaping of the active history plus the current state; nothing here
//! writes anywhere. Voided entries must already be excluded by the caller
//! (pass the output of `HistoryLedger::list_active`).

use chrono::{DateTime, NaiveDate, Utc};

use crate::schemas::{EventType, HistoryEntry, OpportunityState};

/// Summary of one opportunity's pipeline behaviour
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PipelineSummary {
    /// Non-void achieved events
    pub achieved_count: usize,

    /// Non-void cancel events
    pub cancel_count: usize,

    /// Non-void back events (regressions)
    pub back_count: usize,

    /// round(achieved / (achieved + cancel) * 100); 0 when no goals were
    /// ever resolved
    pub achievement_rate: u32,

    /// When the opportunity entered its current stage
    pub stage_start_date: Option<DateTime<Utc>>,

    /// Whole calendar days spent in the current stage (midnight to
    /// midnight, not elapsed hours)
    pub current_stage_days: Option<i64>,
}

/// Derive statistics from the current state and its active history.
///
/// `today` is the reference date for dwell-time computation; passing it in
/// keeps the function pure and testable.
pub fn summarize(
    state: &OpportunityState,
    active_history: &[HistoryEntry],
    today: NaiveDate,
) -> PipelineSummary {
    let achieved_count = count(active_history, EventType::Achieved);
    let cancel_count = count(active_history, EventType::Cancel);
    let back_count = count(active_history, EventType::Back);

    let resolved = achieved_count + cancel_count;
    let achievement_rate = if resolved == 0 {
        0
    } else {
        ((achieved_count as f64 / resolved as f64) * 100.0).round() as u32
    };

    let stage_start_date = stage_start(state, active_history);
    let current_stage_days =
        stage_start_date.map(|start| (today - start.date_naive()).num_days());

    PipelineSummary {
        achieved_count,
        cancel_count,
        back_count,
        achievement_rate,
        stage_start_date,
        current_stage_days,
    }
}

fn count(history: &[HistoryEntry], event_type: EventType) -> usize {
    history
        .iter()
        .filter(|e| !e.voided && e.event_type == event_type)
        .count()
}

/// Most recent event that put the opportunity into its current stage.
///
/// Any stage-axis event counts, including the initial event (from = None)
/// and regressions: whatever last moved the opportunity to where it now
/// stands starts the dwell clock.
fn stage_start(
    state: &OpportunityState,
    active_history: &[HistoryEntry],
) -> Option<DateTime<Utc>> {
    let current = state.stage_id.as_deref()?;
    active_history
        .iter()
        .filter(|e| !e.voided && e.event_type.is_stage_event())
        .filter(|e| e.to_stage_id.as_deref() == Some(current))
        .map(|e| e.recorded_at)
        .max()
}
