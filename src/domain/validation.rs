//! Validation rules for proposed transitions
//!
//! Runs a fixed rule set over the proposed state and the detected events and
//! produces a severity-graded report. Every applicable alert is included,
//! not just the first. A report with an error-severity alert blocks the
//! submission entirely; warnings and infos are surfaced to the operator for
//! acknowledgement.

use chrono::NaiveDate;

use crate::domain::catalog::StageCatalog;
use crate::domain::detector::DetectedChanges;
use crate::errors::Result;
use crate::schemas::{
    Alert, EventType, HistoryEntry, OpportunityState, StageType, TransitionInput,
    ValidationReport,
};

/// Everything the rule set needs to see for one submission
#[derive(Debug)]
pub struct ValidationContext<'a> {
    /// Current persisted state (defaults for a brand-new record)
    pub state: &'a OpportunityState,

    /// The proposed change
    pub input: &'a TransitionInput,

    /// Events detected for this submission
    pub detected: &'a DetectedChanges,

    /// Stage reference data
    pub catalog: &'a StageCatalog,

    /// Existing non-void history of the opportunity
    pub history: &'a [HistoryEntry],

    /// True on the creation path
    pub is_new_record: bool,

    /// Reference date for past-date checks
    pub today: NaiveDate,
}

/// Run the full rule set and produce a report, most severe alerts first.
///
/// # Errors
/// * `UnknownStage` - If a referenced stage id is absent from the catalog
pub fn validate(ctx: &ValidationContext<'_>) -> Result<ValidationReport> {
    let mut alerts = Vec::new();

    check_target_order(ctx, &mut alerts)?;
    check_required_reason(ctx, &mut alerts)?;
    check_regression_note(ctx, &mut alerts);
    check_past_target_date(ctx, &mut alerts);
    check_goalless_achievement(ctx, &mut alerts);

    Ok(ValidationReport::from_alerts(alerts))
}

/// ERROR: a goal must be strictly ahead of the current stage.
///
/// Applies only while both the proposed stage and the proposed target are
/// progress-typed and carry a display order; closed_won targets and side
/// states are exempt.
fn check_target_order(ctx: &ValidationContext<'_>, alerts: &mut Vec<Alert>) -> Result<()> {
    let target_id = match ctx.input.new_target_stage_id.as_deref() {
        Some(id) => id,
        None => return Ok(()),
    };
    // An achieving move consumed a verbatim-resubmitted goal; with no
    // target-axis event there is no goal left to check.
    if ctx.detected.contains(EventType::Achieved)
        && !ctx.detected.contains(EventType::Commit)
        && !ctx.detected.contains(EventType::Recommit)
    {
        return Ok(());
    }
    let stage = ctx.catalog.require(&ctx.input.new_stage_id)?;
    let target = ctx.catalog.require(target_id)?;

    if stage.stage_type == StageType::Progress && target.stage_type == StageType::Progress {
        if let (Some(stage_order), Some(target_order)) =
            (stage.display_order, target.display_order)
        {
            if target_order <= stage_order {
                alerts.push(Alert::error(format!(
                    "Target stage \"{}\" must be ahead of the current stage \"{}\"",
                    target.name, stage.name
                )));
            }
        }
    }
    Ok(())
}

/// ERROR: entering or staying in a side state requires its reason text.
fn check_required_reason(ctx: &ValidationContext<'_>, alerts: &mut Vec<Alert>) -> Result<()> {
    let proposed = ctx.catalog.require(&ctx.input.new_stage_id)?;
    let touched = ctx.is_new_record
        || ctx.detected.contains(EventType::Lost)
        || ctx.detected.contains(EventType::Suspended)
        || ctx.detected.contains(EventType::ReasonUpdated);
    if !touched {
        return Ok(());
    }

    match proposed.stage_type {
        StageType::ClosedLost if is_blank(ctx.input.lost_reason.as_deref()) => {
            alerts.push(Alert::error(format!(
                "A lost reason is required to move into \"{}\"",
                proposed.name
            )));
        }
        StageType::Pending if is_blank(ctx.input.pending_reason.as_deref()) => {
            alerts.push(Alert::error(format!(
                "A pending reason is required to move into \"{}\"",
                proposed.name
            )));
        }
        _ => {}
    }
    Ok(())
}

/// WARNING (note required): a regression is being recorded.
fn check_regression_note(ctx: &ValidationContext<'_>, alerts: &mut Vec<Alert>) {
    if !ctx.detected.contains(EventType::Back) {
        return;
    }
    let prior_backs = ctx
        .history
        .iter()
        .filter(|e| !e.voided && e.event_type == EventType::Back)
        .count();
    let message = if prior_backs > 0 {
        format!(
            "Moving back to an earlier stage (regression #{} for this opportunity); \
             an explanatory note is required",
            prior_backs + 1
        )
    } else {
        "Moving back to an earlier stage; an explanatory note is required".to_string()
    };
    alerts.push(Alert::warning_with_note(message));
}

/// WARNING: a target date in the past is being set.
fn check_past_target_date(ctx: &ValidationContext<'_>, alerts: &mut Vec<Alert>) {
    for event in &ctx.detected.events {
        if !matches!(event.event_type, EventType::Commit | EventType::Recommit) {
            continue;
        }
        if let Some(date) = event.target_date {
            if date < ctx.today {
                alerts.push(Alert::warning(format!("Target date {} is in the past", date)));
            }
        }
    }
}

/// INFO: the goal was reached and nothing new was targeted.
fn check_goalless_achievement(ctx: &ValidationContext<'_>, alerts: &mut Vec<Alert>) {
    if ctx.detected.contains(EventType::Achieved) && !ctx.detected.contains(EventType::Commit) {
        alerts.push(Alert::info(
            "Target stage reached; the opportunity now has no active goal",
        ));
    }
}

fn is_blank(text: Option<&str>) -> bool {
    text.map(str::trim).map(str::is_empty).unwrap_or(true)
}
