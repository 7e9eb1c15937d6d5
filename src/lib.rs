//! Dealflow - A sales-pipeline stage-transition engine
//!
//! This library decides, validates, records and summarizes how a sales
//! opportunity moves through an ordered sequence of pipeline stages:
//! - Schema definitions for stages, opportunity state, history entries and alerts
//! - Domain logic: change classification, event detection, alert validation,
//!   and transition planning with acknowledgement gating
//! - An append-only history ledger with logical voiding and display grouping
//! - Derived statistics (achievement rate, regression count, dwell time)
//! - JSON catalog loading and ledger snapshots
//!
//! The engine is pure per request: the caller reads the current state, plans
//! a transition, shows any alerts to the operator, and only then persists the
//! next state and appends the planned events. Appends for one opportunity
//! must be serialized by the caller; different opportunities are independent.

pub mod config;
pub mod domain;
pub mod errors;
pub mod fs;
pub mod history;
pub mod schemas;
pub mod stats;

// Re-export commonly used types
pub use domain::{
    apply, plan_initial, plan_transition, StageCatalog, TransitionOutcome, TransitionPlan,
};
pub use errors::{DealflowError, Result};
pub use history::{group, HistoryGroup, HistoryLedger};
pub use schemas::{
    Alert, EventType, HistoryEntry, OpportunityState, Severity, Stage, StageType,
    TransitionInput, ValidationReport,
};
pub use stats::{summarize, PipelineSummary};
