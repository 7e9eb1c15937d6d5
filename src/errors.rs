//! Error types for the dealflow engine
//!
//! Each error type has a corresponding error code for programmatic handling.
//! Domain validation failures are NOT errors: they are returned as
//! `ValidationReport` values. Errors here indicate caller bugs (stale
//! catalog, duplicate submission) or I/O problems, per the engine's
//! fail-fast contract for structural failures.

use thiserror::Error;

/// Result type alias for dealflow operations
pub type Result<T> = std::result::Result<T, DealflowError>;

/// Main error type for all dealflow operations
#[derive(Debug, Error)]
pub enum DealflowError {
    /// A stage id referenced by the caller is not in the supplied catalog
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// A submission moves to or newly targets a deactivated stage
    #[error("Stage is deactivated: {0}")]
    InactiveStage(String),

    /// The stage catalog was constructed with no stages
    #[error("Stage catalog is empty")]
    EmptyCatalog,

    /// The stage catalog contains two stages with the same id
    #[error("Duplicate stage id in catalog: {0}")]
    DuplicateStage(String),

    /// A general-path transition was requested for an opportunity with no
    /// recorded current stage (the initial path must be used instead)
    #[error("Opportunity has no current stage; use the initial-event path")]
    MissingCurrentStage,

    /// A submission produced zero detected events (nothing to persist)
    #[error("No changes detected: {0}")]
    NoChanges(String),

    /// Commit was attempted on a plan that carries a blocking alert
    #[error("Transition blocked by validation: {0}")]
    Blocked(String),

    /// Commit was attempted without acknowledging warning/info alerts
    #[error("Acknowledgement required: {0}")]
    AcknowledgementRequired(String),

    /// Commit was attempted without the note a warning alert demands
    #[error("Explanatory note required: {0}")]
    NoteRequired(String),

    /// A history entry id is not present in the ledger
    #[error("Unknown history entry: {0}")]
    UnknownEntry(String),

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DealflowError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            DealflowError::UnknownStage(_) => "UNKNOWN_STAGE",
            DealflowError::InactiveStage(_) => "INACTIVE_STAGE",
            DealflowError::EmptyCatalog => "EMPTY_CATALOG",
            DealflowError::DuplicateStage(_) => "DUPLICATE_STAGE",
            DealflowError::MissingCurrentStage => "MISSING_CURRENT_STAGE",
            DealflowError::NoChanges(_) => "NO_CHANGES",
            DealflowError::Blocked(_) => "VALIDATION_BLOCKED",
            DealflowError::AcknowledgementRequired(_) => "ACK_REQUIRED",
            DealflowError::NoteRequired(_) => "NOTE_REQUIRED",
            DealflowError::UnknownEntry(_) => "UNKNOWN_ENTRY",
            DealflowError::InvalidJson(_) => "INVALID_JSON",
            DealflowError::FileNotFound(_) => "FILE_NOT_FOUND",
            DealflowError::Io(_) => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DealflowError::UnknownStage("s9".into()).code(), "UNKNOWN_STAGE");
        assert_eq!(DealflowError::InactiveStage("s9".into()).code(), "INACTIVE_STAGE");
        assert_eq!(DealflowError::EmptyCatalog.code(), "EMPTY_CATALOG");
        assert_eq!(DealflowError::DuplicateStage("s1".into()).code(), "DUPLICATE_STAGE");
        assert_eq!(DealflowError::MissingCurrentStage.code(), "MISSING_CURRENT_STAGE");
        assert_eq!(DealflowError::NoChanges("test".into()).code(), "NO_CHANGES");
        assert_eq!(DealflowError::Blocked("test".into()).code(), "VALIDATION_BLOCKED");
        assert_eq!(
            DealflowError::AcknowledgementRequired("test".into()).code(),
            "ACK_REQUIRED"
        );
        assert_eq!(DealflowError::NoteRequired("test".into()).code(), "NOTE_REQUIRED");
        assert_eq!(DealflowError::UnknownEntry("e1".into()).code(), "UNKNOWN_ENTRY");
    }

    #[test]
    fn test_error_display() {
        let err = DealflowError::UnknownStage("stage-9".into());
        assert!(err.to_string().contains("stage-9"));
    }
}
