//! History schema - immutable audit records of pipeline events

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of event recorded in the history ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A target stage and/or date was newly set
    Commit,
    /// The recorded target stage was reached
    Achieved,
    /// An existing target was changed (stage, date, or both)
    Recommit,
    /// Moved forward to a later progress stage
    Progress,
    /// Moved back to an earlier progress stage
    Back,
    /// An existing target was cleared without replacement
    Cancel,
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
    /// A lost/pending reason text was edited
    ReasonUpdated,
}

impl EventType {
    /// True for events produced by the stage axis (they carry from/to stages)
    pub fn is_stage_event(self) -> bool {
        matches!(
            self,
            EventType::Achieved
                | EventType::Progress
                | EventType::Back
                | EventType::Won
                | EventType::Lost
                | EventType::Suspended
                | EventType::Resumed
                | EventType::Revived
        )
    }

    /// True for events produced by the target axis
    pub fn is_target_event(self) -> bool {
        matches!(self, EventType::Commit | EventType::Recommit | EventType::Cancel)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::Commit => "commit",
            EventType::Achieved => "achieved",
            EventType::Recommit => "recommit",
            EventType::Progress => "progress",
            EventType::Back => "back",
            EventType::Cancel => "cancel",
            EventType::Won => "won",
            EventType::Lost => "lost",
            EventType::Suspended => "suspended",
            EventType::Resumed => "resumed",
            EventType::Revived => "revived",
            EventType::ReasonUpdated => "reason_updated",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(EventType::Commit),
            "achieved" => Ok(EventType::Achieved),
            "recommit" => Ok(EventType::Recommit),
            "progress" => Ok(EventType::Progress),
            "back" => Ok(EventType::Back),
            "cancel" => Ok(EventType::Cancel),
            "won" => Ok(EventType::Won),
            "lost" => Ok(EventType::Lost),
            "suspended" => Ok(EventType::Suspended),
            "resumed" => Ok(EventType::Resumed),
            "revived" => Ok(EventType::Revived),
            "reason_updated" => Ok(EventType::ReasonUpdated),
            _ => Err(format!("Unknown event type: {}", s)),
        }
    }
}

/// Which target field(s) a recommit changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommitScope {
    /// Only the target stage changed
    Stage,
    /// Only the target date changed
    Date,
    /// Both target stage and date changed
    Both,
}

/// One immutable audit record.
///
/// Entries are never physically deleted; `voided` is the only field that may
/// change after creation. All entries written from one submission share a
/// `batch_id`, `recorded_at` and `actor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Opportunity this entry belongs to
    pub opportunity_id: String,

    /// Submission the entry was written from; grouping key for display
    pub batch_id: Uuid,

    /// What happened
    pub event_type: EventType,

    /// Stage before the event (stage-axis events; None on the initial event)
    #[serde(default)]
    pub from_stage_id: Option<String>,

    /// Stage after the event (stage-axis events)
    #[serde(default)]
    pub to_stage_id: Option<String>,

    /// Target stage recorded by a target-axis event
    #[serde(default)]
    pub target_stage_id: Option<String>,

    /// Target date recorded by a target-axis event
    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    /// Free-text note supplied with the submission
    #[serde(default)]
    pub note: Option<String>,

    /// True when the submission required and received alert acknowledgement
    #[serde(default)]
    pub acknowledged: bool,

    /// Lost-reason text at the time of the event
    #[serde(default)]
    pub lost_reason: Option<String>,

    /// Pending-reason text at the time of the event
    #[serde(default)]
    pub pending_reason: Option<String>,

    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,

    /// Who performed the change (opaque identifier from the caller)
    pub actor: String,

    /// Logical deletion flag; voided entries are excluded from all reads
    #[serde(default)]
    pub voided: bool,

    /// Set only on Recommit events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommit_scope: Option<RecommitScope>,
}
