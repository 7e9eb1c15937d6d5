//! Change classification
//!
//! Labels a proposed stage change with its semantic category. Pure function
//! of its inputs; the precedence of the rules below is load-bearing (side
//! states are checked before any order comparison).

use crate::domain::catalog::StageCatalog;
use crate::errors::Result;
use crate::schemas::StageType;

/// Semantic category of a stage change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Proposed stage equals the previous stage
    None,
    /// Recorded target stage reached
    Achieved,
    /// Forward move to a later progress stage
    Progress,
    /// Backward move to an earlier progress stage
    Back,
    /// Closed as won
    Won,
    /// Closed as lost
    Lost,
    /// Put on hold
    Suspended,
    /// Returned from hold to the pipeline
    Resumed,
    /// Returned from closed-lost to the pipeline
    Revived,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeType::None => "no change",
            ChangeType::Achieved => "target stage reached",
            ChangeType::Progress => "moved to a later stage",
            ChangeType::Back => "moved back to an earlier stage",
            ChangeType::Won => "closed as won",
            ChangeType::Lost => "closed as lost",
            ChangeType::Suspended => "put on hold",
            ChangeType::Resumed => "resumed from hold",
            ChangeType::Revived => "revived from closed-lost",
        };
        write!(f, "{}", s)
    }
}

/// Classify a proposed stage change.
///
/// Precedence:
/// 1. same stage -> None
/// 2. proposed closed_won -> Won
/// 3. proposed closed_lost -> Lost
/// 4. proposed pending -> Suspended
/// 5. previous pending -> Resumed
/// 6. previous closed_lost -> Revived
/// 7. both progress -> Achieved / Progress / Back by display order
///
/// Only a strictly lower display order counts as `Back`; equal orders (and
/// stages with no order, which sort last) classify as `Progress`, so a
/// lateral move between peer stages is never flagged as a regression.
///
/// The first-ever classification for a brand-new opportunity (previous stage
/// null) does not go through here; the detector's initial-event path covers
/// it.
///
/// # Errors
/// * `UnknownStage` - If either stage id is missing from the catalog
pub fn classify(
    previous_stage_id: &str,
    proposed_stage_id: &str,
    current_target_stage_id: Option<&str>,
    catalog: &StageCatalog,
) -> Result<ChangeType> {
    if previous_stage_id == proposed_stage_id {
        return Ok(ChangeType::None);
    }

    let previous = catalog.require(previous_stage_id)?;
    let proposed = catalog.require(proposed_stage_id)?;

    match proposed.stage_type {
        StageType::ClosedWon => return Ok(ChangeType::Won),
        StageType::ClosedLost => return Ok(ChangeType::Lost),
        StageType::Pending => return Ok(ChangeType::Suspended),
        StageType::Progress => {}
    }

    // Proposed stage is progress-typed from here on.
    match previous.stage_type {
        StageType::Pending => return Ok(ChangeType::Resumed),
        StageType::ClosedLost => return Ok(ChangeType::Revived),
        // A move out of closed_won back into the pipeline has no dedicated
        // category; order comparison below treats it like a regression.
        StageType::ClosedWon | StageType::Progress => {}
    }

    let prev_order = previous.display_order.unwrap_or(i32::MAX);
    let new_order = proposed.display_order.unwrap_or(i32::MAX);

    if current_target_stage_id == Some(proposed_stage_id) && new_order > prev_order {
        return Ok(ChangeType::Achieved);
    }
    if new_order < prev_order {
        Ok(ChangeType::Back)
    } else {
        Ok(ChangeType::Progress)
    }
}
