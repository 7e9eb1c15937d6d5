//! History ledger and display grouping

mod grouping;
mod ledger;

pub use grouping::{group, HistoryGroup};
pub use ledger::HistoryLedger;
