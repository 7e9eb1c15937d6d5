//! File system utilities for dealflow
//!
//! JSON snapshot reading and writing for the catalog config and ledger.

mod json;

pub use json::{read_json, write_json};
