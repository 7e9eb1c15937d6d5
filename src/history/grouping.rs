//! Display grouping for history entries
//!
//! All entries written from one submission share a batch id; display buckets
//! on that exact key. Within a group, events follow a fixed priority table
//! so a reader sees what happened before what was newly targeted: closing
//! and goal events, then progression, then target setting, then reason
//! edits.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::schemas::{EventType, HistoryEntry};

/// Display rank of an event within its group; lower shows first.
fn display_priority(event_type: EventType) -> u8 {
    match event_type {
        EventType::Achieved
        | EventType::Won
        | EventType::Lost
        | EventType::Suspended
        | EventType::Resumed
        | EventType::Revived => 0,
        EventType::Progress | EventType::Back => 1,
        EventType::Commit | EventType::Recommit | EventType::Cancel => 2,
        EventType::ReasonUpdated => 3,
    }
}

/// One submission's worth of history entries, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryGroup {
    /// Shared submission id
    pub batch_id: Uuid,
    /// Shared timestamp of the submission
    pub recorded_at: DateTime<Utc>,
    /// Shared actor of the submission
    pub actor: String,
    /// Member entries ordered by display priority
    pub entries: Vec<HistoryEntry>,
}

impl HistoryGroup {
    /// First non-null note among member entries
    pub fn note(&self) -> Option<&str> {
        self.entries.iter().find_map(|e| e.note.as_deref())
    }

    /// First non-null lost-reason snapshot among member entries
    pub fn lost_reason(&self) -> Option<&str> {
        self.entries.iter().find_map(|e| e.lost_reason.as_deref())
    }

    /// First non-null pending-reason snapshot among member entries
    pub fn pending_reason(&self) -> Option<&str> {
        self.entries.iter().find_map(|e| e.pending_reason.as_deref())
    }
}

/// Bucket entries by submission, newest first.
///
/// Expects non-void entries (e.g. from `HistoryLedger::list_active`); void
/// filtering is the caller's responsibility so grouping stays a pure
/// reshaping step.
pub fn group(entries: &[HistoryEntry]) -> Vec<HistoryGroup> {
    let mut groups: Vec<HistoryGroup> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|g| g.batch_id == entry.batch_id) {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(HistoryGroup {
                batch_id: entry.batch_id,
                recorded_at: entry.recorded_at,
                actor: entry.actor.clone(),
                entries: vec![entry.clone()],
            }),
        }
    }
    for group in &mut groups {
        group.entries.sort_by_key(|e| display_priority(e.event_type));
    }
    groups.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    groups
}
