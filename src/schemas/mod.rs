//! Schema types for dealflow
//!
//! All types serialize to JSON compatible with the surrounding CRM's store.

mod alert;
mod history;
mod opportunity;
mod stage;

pub use alert::{Alert, Severity, ValidationReport};
pub use history::{EventType, HistoryEntry, RecommitScope};
pub use opportunity::{OpportunityState, TransitionInput};
pub use stage::{Stage, StageType};
