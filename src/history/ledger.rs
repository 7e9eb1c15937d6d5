//! Append-only history ledger
//!
//! One entry per detected event; entries are never physically deleted, only
//! marked void. The ledger is the in-process model of the external store's
//! history table: callers are expected to serialize appends per opportunity
//! (per-row lock or transactional isolation), while different opportunities
//! are fully independent.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::DetectedEvent;
use crate::errors::{DealflowError, Result};
use crate::fs;
use crate::schemas::HistoryEntry;

/// In-memory append-only event log, JSON-snapshottable.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        HistoryLedger::default()
    }

    /// Record all events of one submission.
    ///
    /// Every entry written here shares one freshly minted batch id plus the
    /// given timestamp and actor, which is what display grouping keys on.
    ///
    /// # Returns
    /// The batch id assigned to this submission
    pub fn append(
        &mut self,
        opportunity_id: &str,
        events: &[DetectedEvent],
        actor: &str,
        acknowledged: bool,
        recorded_at: DateTime<Utc>,
    ) -> Uuid {
        let batch_id = Uuid::new_v4();
        for event in events {
            self.entries.push(HistoryEntry {
                id: Uuid::new_v4(),
                opportunity_id: opportunity_id.to_string(),
                batch_id,
                event_type: event.event_type,
                from_stage_id: event.from_stage_id.clone(),
                to_stage_id: event.to_stage_id.clone(),
                target_stage_id: event.target_stage_id.clone(),
                target_date: event.target_date,
                note: event.note.clone(),
                acknowledged,
                lost_reason: event.lost_reason.clone(),
                pending_reason: event.pending_reason.clone(),
                recorded_at,
                actor: actor.to_string(),
                voided: false,
                recommit_scope: event.recommit_scope,
            });
        }
        info!(
            opportunity = opportunity_id,
            batch = %batch_id,
            events = events.len(),
            "appended history batch"
        );
        batch_id
    }

    /// Mark an entry void. Idempotent: voiding an already-void entry is a
    /// no-op success, since the end state is identical.
    ///
    /// # Errors
    /// * `UnknownEntry` - If no entry with this id exists
    pub fn void(&mut self, entry_id: Uuid) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| DealflowError::UnknownEntry(entry_id.to_string()))?;
        entry.voided = true;
        debug!(entry = %entry_id, "voided history entry");
        Ok(())
    }

    /// Non-void entries for one opportunity, newest first.
    ///
    /// Entries sharing a timestamp (one batch) keep their append order.
    pub fn list_active(&self, opportunity_id: &str) -> Vec<HistoryEntry> {
        let mut active: Vec<HistoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.opportunity_id == opportunity_id && !e.voided)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        active
    }

    /// All entries including voided ones, in append order
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Load a ledger snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let entries: Vec<HistoryEntry> = fs::read_json(path)?;
        Ok(HistoryLedger { entries })
    }

    /// Write a ledger snapshot to a JSON file (atomic write)
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write_json(path, &self.entries)
    }
}
